use crate::error::{Error, Result, require};
use crate::io::{Reader, Stream};

pub const ELF_MAGIC: [u8; 4] = [0x7f, b'E', b'L', b'F'];
pub const IDENT_SIZE: usize = 16;

const CLASS_32: u8 = 1;
const CLASS_64: u8 = 2;
const DATA_LSB: u8 = 1;
const DATA_MSB: u8 = 2;

/// Validates the identification bytes and returns a reader set up for the file's word
/// size and byte order.
pub fn identify(reader: Reader) -> Result<Reader> {
    // see https://en.wikipedia.org/wiki/Executable_and_Linkable_Format
    let ident = reader.slice(0, IDENT_SIZE)?;
    require(ident[..4] == ELF_MAGIC, || "not an ELF file (bad magic)".to_string())?;

    let sixty_four_bit = match ident[4] {
        CLASS_32 => false,
        CLASS_64 => true,
        class => {
            return Err(Error::Unsupported(format!(
                "unknown ELF class {class} at offset 0x4"
            )));
        }
    };
    let little_endian = match ident[5] {
        DATA_LSB => true,
        DATA_MSB => false,
        data => {
            return Err(Error::Unsupported(format!(
                "unknown ELF data encoding {data} at offset 0x5"
            )));
        }
    };
    Ok(reader.with_layout(little_endian, sixty_four_bit))
}

/// Elf32_Ehdr or Elf64_Ehdr minus e_ident.
#[derive(Clone, Debug)]
pub struct ElfHeader {
    /// Relocatable, executable, shared object, or core.
    pub etype: u16,

    /// CPU architecture.
    pub machine: u16,

    pub entry: u64,

    pub ph_offset: u64,

    pub section_offset: u64,

    pub flags: u32,

    pub ph_entry_size: u16,

    pub num_ph_entries: u16,

    pub section_entry_size: u16,

    /// Zero if the count doesn't fit, in which case section zero's size holds it.
    pub num_section_entries: u16,

    /// SHN_XINDEX if the index doesn't fit, in which case section zero's link holds it.
    pub string_table_index: u16,
}

impl ElfHeader {
    pub fn new(reader: &Reader) -> Result<Self> {
        let size = if reader.sixty_four_bit { 64 } else { 52 };
        reader.slice(0, size)?;

        let mut s = Stream::new(reader, IDENT_SIZE);
        let etype = s.read_half()?;
        let machine = s.read_half()?;
        let _version = s.read_word()?;
        let entry = s.read_addr()?;
        let ph_offset = s.read_addr()?;
        let section_offset = s.read_addr()?;
        let flags = s.read_word()?;
        let _header_size = s.read_half()?;
        let ph_entry_size = s.read_half()?;
        let num_ph_entries = s.read_half()?;
        let section_entry_size = s.read_half()?;
        let num_section_entries = s.read_half()?;
        let string_table_index = s.read_half()?;
        Ok(ElfHeader {
            etype,
            machine,
            entry,
            ph_offset,
            section_offset,
            flags,
            ph_entry_size,
            num_ph_entries,
            section_entry_size,
            num_section_entries,
            string_table_index,
        })
    }
}
