//! Windows PE/COFF executables and DLLs.
//!
//! A PE file starts with a legacy DOS header whose e_lfanew field (at 0x3c) points
//! at the "PE\0\0" signature. That is followed by:
//! * The COFF file header: machine type, number of sections, optional header size.
//! * The optional header: its magic says PE32 (32-bit) or PE32+ (64-bit) and it ends
//!   with the data directories, e.g. imports and debug info.
//! * The section table which maps RVAs onto raw file offsets.
pub mod debug;
pub mod headers;
pub mod imports;
pub mod sections;

pub use debug::*;
pub use headers::*;
pub use imports::*;
pub use sections::*;

use crate::error::Result;
use crate::introspect::{ExecutableInfo, Format, SectionSummary, WordSize};
use crate::io::Reader;

pub struct PeFile {
    pub reader: Reader,
    pub headers: PeHeaders,
    pub sections: SectionMap,
}

impl PeFile {
    pub fn new(reader: Reader) -> Result<Self> {
        let headers = PeHeaders::new(&reader)?;
        let sections = SectionMap::new(&reader, headers.section_table, headers.coff.num_sections)?;
        Ok(PeFile {
            reader,
            headers,
            sections,
        })
    }

    pub fn word_size(&self) -> WordSize {
        self.headers.optional.word_size()
    }

    pub fn dependencies(&self) -> Result<Vec<String>> {
        imported_libraries(&self.reader, &self.sections, self.headers.optional.import)
    }

    pub fn debug_entries(&self) -> Result<Vec<DebugEntry>> {
        debug_entries(&self.reader, &self.sections, self.headers.optional.debug)
    }

    pub fn is_debug_build(&self) -> Result<bool> {
        Ok(has_symbolic_debug_info(&self.debug_entries()?))
    }

    pub fn info(&self) -> Result<ExecutableInfo> {
        Ok(ExecutableInfo {
            format: Format::Pe,
            word_size: self.word_size(),
            is_debug_build: self.is_debug_build()?,
            dependencies: self.dependencies()?,
        })
    }

    pub fn section_summaries(&self) -> Vec<SectionSummary> {
        self.sections
            .sections()
            .iter()
            .map(|s| SectionSummary {
                name: s.name.clone(),
                offset: s.obytes.start,
                size: s.obytes.size,
                addr: s.vbytes.start.0,
            })
            .collect()
    }
}
