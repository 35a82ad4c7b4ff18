//! The debug directory. Linkers emit a CodeView record pointing at the PDB when
//! symbolic debug info is produced. That makes a decent guess at "debug build" but it
//! is only a heuristic: release builds linked with /DEBUG carry one too.
use super::{DataDirectory, SectionMap};
use crate::error::Result;
use crate::io::{Reader, Stream};

pub const DEBUG_ENTRY_SIZE: usize = 28;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DebugType {
    Unknown,

    /// COFF line numbers and symbol table.
    Coff,

    /// Visual C++ debug information, typically a reference to a PDB.
    CodeView,

    /// Frame pointer omission information.
    Fpo,

    /// Location of a DBG file.
    Misc,

    /// Produced by the linker for reproducible builds.
    Repro,

    /// Extended DLL characteristics bits.
    ExDllCharacteristics,

    Other(u32),
}

impl DebugType {
    pub fn from_u32(value: u32) -> Self {
        match value {
            0 => DebugType::Unknown,
            1 => DebugType::Coff,
            2 => DebugType::CodeView,
            3 => DebugType::Fpo,
            4 => DebugType::Misc,
            16 => DebugType::Repro,
            20 => DebugType::ExDllCharacteristics,
            _ => DebugType::Other(value),
        }
    }
}

/// IMAGE_DEBUG_DIRECTORY
#[derive(Clone, Debug)]
pub struct DebugEntry {
    pub timestamp: u32,
    pub dtype: DebugType,
    pub data_size: u32,
    pub data_offset: u32,
}

impl DebugEntry {
    pub fn new(reader: &Reader, offset: usize) -> Result<Self> {
        let mut s = Stream::new(reader, offset);
        let _characteristics = s.read_word()?;
        let timestamp = s.read_word()?;
        let _major_version = s.read_half()?;
        let _minor_version = s.read_half()?;
        let dtype = DebugType::from_u32(s.read_word()?);
        let data_size = s.read_word()?;
        let _data_rva = s.read_word()?;
        let data_offset = s.read_word()?;
        Ok(DebugEntry {
            timestamp,
            dtype,
            data_size,
            data_offset,
        })
    }
}

/// All of the entries in the directory. The count comes from the directory size but
/// the scan never goes past the end of the section containing it.
pub fn debug_entries(
    reader: &Reader,
    sections: &SectionMap,
    directory: DataDirectory,
) -> Result<Vec<DebugEntry>> {
    let mut entries = Vec::new();
    if directory.is_empty() {
        return Ok(entries);
    }

    let section = sections.find(directory.rva)?;
    let mut offset = section.offset_of(directory.rva);
    let end = section.obytes.end();
    let count = directory.size as usize / DEBUG_ENTRY_SIZE;
    for _ in 0..count {
        if offset + DEBUG_ENTRY_SIZE as u64 > end {
            break;
        }
        entries.push(DebugEntry::new(reader, offset.as_usize())?);
        offset = offset + DEBUG_ENTRY_SIZE as u64;
    }
    Ok(entries)
}

pub fn has_symbolic_debug_info(entries: &[DebugEntry]) -> bool {
    entries.iter().any(|e| e.dtype == DebugType::CodeView)
}
