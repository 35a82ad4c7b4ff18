//! Unix ELF executables and shared objects.
//! Quick ELF reference: https://gist.github.com/x0nu11byt3/bcb35c3de461e5fb66173071a2379779
//!
//! ELF files start with an ELF header which includes:
//! * A magic number to identify the file as an ELF file.
//! * The class (32 or 64-bit) and byte order used for every field that follows.
//! * The offset to and number of section headers.
//! * The index of the section holding section names.
//!
//! Only sections are used here. The .dynamic section lists DT_NEEDED entries whose
//! values are offsets into .dynstr. A missing .dynamic means a statically linked
//! binary.
pub mod dynamic;
pub mod header;
pub mod sections;

pub use dynamic::*;
pub use header::*;
pub use sections::*;

use crate::error::Result;
use crate::introspect::{ExecutableInfo, Format, SectionSummary, WordSize};
use crate::io::{Reader, Stream};

/// Sections whose presence suggests an unstripped (debug) build.
const DEBUG_SECTIONS: [&str; 2] = [".symtab", ".debug_info"];

pub struct ElfFile {
    pub header: ElfHeader,
    pub reader: Reader,
    pub sections: Vec<ElfSection>,
}

impl ElfFile {
    pub fn new(reader: Reader) -> Result<Self> {
        let reader = identify(reader)?;
        let header = ElfHeader::new(&reader)?;
        let sections = load_sections(&reader, &header)?;
        Ok(ElfFile {
            header,
            reader,
            sections,
        })
    }

    pub fn word_size(&self) -> WordSize {
        if self.reader.sixty_four_bit {
            WordSize::SixtyFour
        } else {
            WordSize::ThirtyTwo
        }
    }

    /// Returns the first section with the given name.
    pub fn find_section(&self, name: &str) -> Option<&ElfSection> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn dependencies(&self) -> Result<Vec<String>> {
        match self.find_section(".dynamic") {
            Some(dynamic) => needed_libraries(&self.reader, dynamic, self.find_section(".dynstr")),
            None => Ok(Vec::new()), // statically linked
        }
    }

    /// This is a heuristic: strip removes .symtab so its absence is taken to mean a
    /// release build, but plenty of release builds are shipped unstripped.
    pub fn is_debug_build(&self) -> bool {
        self.sections
            .iter()
            .any(|s| DEBUG_SECTIONS.contains(&s.name.as_str()) && s.header.obytes.size > 0)
    }

    pub fn info(&self) -> Result<ExecutableInfo> {
        Ok(ExecutableInfo {
            format: Format::Elf,
            word_size: self.word_size(),
            is_debug_build: self.is_debug_build(),
            dependencies: self.dependencies()?,
        })
    }

    pub fn section_summaries(&self) -> Vec<SectionSummary> {
        self.sections
            .iter()
            .map(|s| SectionSummary {
                name: s.name.clone(),
                offset: s.header.obytes.start,
                size: s.header.obytes.size,
                addr: s.header.vaddr.0,
            })
            .collect()
    }
}
