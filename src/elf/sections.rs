//! Used by the linker and debugger. Dependency info lives in the .dynamic section,
//! debug info (if any) in .symtab and the .debug_* sections.
use super::{ElfHeader, Reader, Stream};
use crate::error::{Error, Result, require};
use crate::primitives::{Bytes, FileOffset, Rva};

const SHN_XINDEX: u16 = 0xffff;
const SHN_UNDEF: u16 = 0;

/// Describes a section.
#[derive(Clone, Debug)]
pub struct SectionHeader {
    // Elf32_Shdr or Elf64_Shdr, see https://gist.github.com/x0nu11byt3/bcb35c3de461e5fb66173071a2379779
    /// Index into the section name string table. Zero means no name.
    pub name: u32,

    /// Type of the section.
    pub stype: SectionType,

    /// Write, alloc, and/or exec.
    pub flags: u64,

    /// Addressing for the bytes in the section using offsets from the start of the ELF file.
    pub obytes: Bytes<FileOffset>,

    /// Address of the section once loaded, zero for sections that aren't loaded.
    pub vaddr: Rva,

    /// Link to another section with related information, usually a string
    /// or symbol table.
    pub link: u32,

    /// Additional section info.
    pub info: u32,

    /// Section alignment.
    pub align: u64,

    /// Set if the section holds a table of entries.
    pub entry_size: u64,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SectionType {
    /// Dynamic linking information.
    Dynamic,

    // Dynamic linker symbol table.
    DynamicSymbolTable,

    /// Uninitialized data, occupies no file space.
    NoBits,

    /// Arbitrary metadata.
    Note,

    /// Not to be used.
    Null,

    /// CPU instructions or constant data.
    ProgBits,

    /// Relocation entries with addends.
    RelocationsWith,

    /// Relocation entries without addends.
    RelocationsWithout,

    /// Strings for use by the linker and debugger.
    StringTable,

    /// Symbol hash table.
    SymbolHashTable,

    /// Full symbol table, removed by strip.
    SymbolTable,

    /// Anything else: init arrays, GNU versioning, processor specific, etc.
    Other(u32),
}

impl SectionType {
    pub fn from_u32(value: u32) -> Self {
        match value {
            0x0 => SectionType::Null,
            0x1 => SectionType::ProgBits,
            0x2 => SectionType::SymbolTable,
            0x3 => SectionType::StringTable,
            0x4 => SectionType::RelocationsWith,
            0x5 => SectionType::SymbolHashTable,
            0x6 => SectionType::Dynamic,
            0x7 => SectionType::Note,
            0x8 => SectionType::NoBits,
            0x9 => SectionType::RelocationsWithout,
            0xb => SectionType::DynamicSymbolTable,
            _ => SectionType::Other(value),
        }
    }
}

impl SectionHeader {
    pub fn min_entry_size(sixty_four_bit: bool) -> u16 {
        if sixty_four_bit { 64 } else { 40 }
    }

    pub fn new(reader: &Reader, offset: usize) -> Result<Self> {
        let mut s = Stream::new(reader, offset);
        // The 64-bit layout is the same as the 32-bit one except that flags, addr,
        // offset, size, align, and entry size are eight bytes.
        let name = s.read_word()?;
        let stype = SectionType::from_u32(s.read_word()?);
        let flags = s.read_addr()?;
        let vaddr = s.read_addr()?;
        let offset = s.read_addr()?;
        let size = s.read_addr()?;
        let link = s.read_word()?;
        let info = s.read_word()?;
        let align = s.read_addr()?;
        let entry_size = s.read_addr()?;
        Ok(SectionHeader {
            name,
            stype,
            flags,
            obytes: Bytes::new(FileOffset(offset), size),
            vaddr: Rva(vaddr),
            link,
            info,
            align,
            entry_size,
        })
    }
}

/// A section header along with its resolved name.
#[derive(Clone, Debug)]
pub struct ElfSection {
    pub name: String,
    pub header: SectionHeader,
}

/// Reads the section header table and resolves section names. Files without a section
/// table (the offset is zero) have no sections.
pub fn load_sections(reader: &Reader, header: &ElfHeader) -> Result<Vec<ElfSection>> {
    if header.section_offset == 0 {
        return Ok(Vec::new());
    }
    let table = FileOffset(header.section_offset).as_usize();
    let entry_size = header.section_entry_size as usize;
    let min_size = SectionHeader::min_entry_size(reader.sixty_four_bit);
    require(entry_size != 0, || {
        "section header entry size is zero".to_string()
    })?;
    require(entry_size >= min_size as usize, || {
        format!("section header entry size {entry_size} is smaller than {min_size}")
    })?;

    // Large files use section zero to hold the real count and string table index.
    let mut count = header.num_section_entries as usize;
    let mut string_index = header.string_table_index;
    let mut headers = Vec::new();
    if count == 0 || string_index == SHN_XINDEX {
        let first = SectionHeader::new(reader, table)?;
        if count == 0 {
            count = usize::try_from(first.obytes.size).unwrap_or(usize::MAX);
        }
        if string_index == SHN_XINDEX {
            string_index = u16::try_from(first.link).map_err(|_| {
                Error::Format(format!("section name table index {} is too large", first.link))
            })?;
        }
    }
    let mut offset = table;
    for _ in 0..count {
        headers.push(SectionHeader::new(reader, offset)?);
        offset = offset.saturating_add(entry_size);
    }

    if string_index == SHN_UNDEF {
        // no section names
        return Ok(headers
            .into_iter()
            .map(|header| ElfSection {
                name: String::new(),
                header,
            })
            .collect());
    }

    let strings = headers
        .get(string_index as usize)
        .ok_or_else(|| {
            Error::Format(format!(
                "section name table index {string_index} is out of range ({count} sections)"
            ))
        })?
        .obytes;
    headers
        .into_iter()
        .map(|header| {
            let name = read_name(reader, strings, header.name as u64)?;
            Ok(ElfSection { name, header })
        })
        .collect()
}

/// Returns a string from a string table. Note that index can point into the middle of
/// a string.
pub fn read_name(reader: &Reader, table: Bytes<FileOffset>, index: u64) -> Result<String> {
    require(index < table.size, || {
        format!(
            "string index {index:#x} is outside the string table at {} ({:#x} bytes)",
            table.start, table.size
        )
    })?;
    reader.read_string((table.start + index).as_usize(), table.end().as_usize())
}
