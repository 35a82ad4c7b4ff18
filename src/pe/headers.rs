//! DOS stub, COFF file header, and the bits of the optional header we care about.
//! See https://learn.microsoft.com/en-us/windows/win32/debug/pe-format
use crate::error::{Error, Result, require};
use crate::introspect::WordSize;
use crate::io::{Reader, Stream};
use crate::primitives::{FileOffset, Rva};

pub const MZ_MAGIC: [u8; 2] = *b"MZ";
pub const PE_SIGNATURE: [u8; 4] = *b"PE\0\0";

const DOS_HEADER_SIZE: usize = 0x40;
const LFANEW_OFFSET: usize = 0x3c; // e_lfanew, offset of the PE signature
const COFF_HEADER_SIZE: usize = 20;

pub const PE32_MAGIC: u16 = 0x10b;
pub const PE32_PLUS_MAGIC: u16 = 0x20b;

pub const IMPORT_DIRECTORY: usize = 1;
pub const DEBUG_DIRECTORY: usize = 6;

#[derive(Clone, Debug)]
pub struct CoffHeader {
    /// CPU type, e.g. 0x14c for i386 or 0x8664 for x64. Not used for the word size:
    /// the optional header magic is what says how wide addresses are.
    pub machine: u16,

    pub num_sections: u16,

    pub timestamp: u32,

    /// Size of the optional header that immediately follows this header.
    pub optional_header_size: u16,

    pub characteristics: u16,
}

/// Location and size of one of the optional header's data directories.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DataDirectory {
    pub rva: Rva,
    pub size: u32,
}

impl DataDirectory {
    pub const ABSENT: DataDirectory = DataDirectory {
        rva: Rva(0),
        size: 0,
    };

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

#[derive(Clone, Debug)]
pub struct OptionalHeader {
    /// PE32 or PE32+.
    pub magic: u16,

    /// Number of data directories the image claims to have.
    pub num_directories: u32,

    pub import: DataDirectory,

    pub debug: DataDirectory,
}

impl OptionalHeader {
    pub fn word_size(&self) -> WordSize {
        if self.magic == PE32_PLUS_MAGIC {
            WordSize::SixtyFour
        } else {
            WordSize::ThirtyTwo
        }
    }
}

#[derive(Clone, Debug)]
pub struct PeHeaders {
    /// Where the "PE\0\0" signature lives.
    pub pe_offset: FileOffset,
    pub coff: CoffHeader,
    pub optional: OptionalHeader,

    /// Offset of the first section header, just past the optional header.
    pub section_table: FileOffset,
}

impl PeHeaders {
    pub fn new(reader: &Reader) -> Result<Self> {
        let dos = reader.slice(0, DOS_HEADER_SIZE)?;
        require(dos[..2] == MZ_MAGIC, || {
            "not a PE/COFF file (bad DOS magic)".to_string()
        })?;

        let pe_offset = reader.read_word(LFANEW_OFFSET)? as usize;
        let signature = reader.slice(pe_offset, PE_SIGNATURE.len())?;
        require(signature == PE_SIGNATURE, || {
            format!("not a PE/COFF file (no PE signature at offset {pe_offset:#x})")
        })?;

        let coff_offset = pe_offset + PE_SIGNATURE.len();
        reader.slice(coff_offset, COFF_HEADER_SIZE)?;
        let coff = CoffHeader::new(reader, coff_offset)?;

        let optional_offset = coff_offset + COFF_HEADER_SIZE;
        let optional = OptionalHeader::new(reader, optional_offset, coff.optional_header_size)?;
        let section_table = optional_offset + coff.optional_header_size as usize;

        Ok(PeHeaders {
            pe_offset: FileOffset(pe_offset as u64),
            coff,
            optional,
            section_table: FileOffset(section_table as u64),
        })
    }
}

impl CoffHeader {
    fn new(reader: &Reader, offset: usize) -> Result<Self> {
        let mut s = Stream::new(reader, offset);
        let machine = s.read_half()?;
        let num_sections = s.read_half()?;
        let timestamp = s.read_word()?;
        let _symbol_table = s.read_word()?; // deprecated COFF symbols
        let _num_symbols = s.read_word()?;
        let optional_header_size = s.read_half()?;
        let characteristics = s.read_half()?;
        Ok(CoffHeader {
            machine,
            num_sections,
            timestamp,
            optional_header_size,
            characteristics,
        })
    }
}

impl OptionalHeader {
    fn new(reader: &Reader, offset: usize, size: u16) -> Result<Self> {
        let size = size as usize;
        require(size >= 2, || {
            format!("optional header at {offset:#x} is too small ({size} bytes) for an image")
        })?;
        reader.slice(offset, size)?;

        // The data directories follow the Windows specific fields which are wider
        // for PE32+ because ImageBase and the stack/heap sizes are 64-bit.
        let magic = reader.read_half(offset)?;
        let count_offset = match magic {
            PE32_MAGIC => 92,
            PE32_PLUS_MAGIC => 108,
            _ => {
                return Err(Error::Unsupported(format!(
                    "unknown optional header magic {magic:#x} at offset {offset:#x}"
                )));
            }
        };

        let num_directories = if count_offset + 4 <= size {
            reader.read_word(offset + count_offset)?
        } else {
            0
        };
        let directory = |index: usize| -> Result<DataDirectory> {
            let entry = count_offset + 4 + 8 * index;
            if index >= num_directories as usize || entry + 8 > size {
                return Ok(DataDirectory::ABSENT);
            }
            let mut s = Stream::new(reader, offset + entry);
            let rva = Rva(s.read_word()? as u64);
            let size = s.read_word()?;
            Ok(DataDirectory { rva, size })
        };

        Ok(OptionalHeader {
            magic,
            num_directories,
            import: directory(IMPORT_DIRECTORY)?,
            debug: directory(DEBUG_DIRECTORY)?,
        })
    }
}
