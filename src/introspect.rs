//! Format independent entry points: pick a parser from the platform hint (or the
//! magic bytes) and normalize what it finds.
use crate::elf::{self, ElfFile};
use crate::error::{Error, Result};
use crate::io::Reader;
use crate::pe::{self, PeFile};
use crate::primitives::FileOffset;
use rayon::prelude::*;
use std::fmt;
use std::path::{Path, PathBuf};

/// Smallest number of bytes that can identify either format.
const MIN_IDENT_SIZE: usize = elf::IDENT_SIZE;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WordSize {
    ThirtyTwo,
    SixtyFour,
}

impl WordSize {
    pub fn bits(self) -> u32 {
        match self {
            WordSize::ThirtyTwo => 32,
            WordSize::SixtyFour => 64,
        }
    }
}

impl fmt::Display for WordSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

/// What a successful parse found out about a binary.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExecutableInfo {
    pub format: Format,
    pub word_size: WordSize,

    /// Heuristic, see PeFile::is_debug_build and ElfFile::is_debug_build.
    pub is_debug_build: bool,

    /// Libraries the binary directly depends on, exactly as named in the file. Order
    /// and duplicates are preserved and no attempt is made to locate the files.
    pub dependencies: Vec<String>,
}

/// One row of a binary's section table.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SectionSummary {
    pub name: String,
    pub offset: FileOffset,
    pub size: u64,

    /// RVA for PE, virtual address for ELF.
    pub addr: u64,
}

/// The platform a binary was built for, used to decide how to read it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Platform {
    Windows,
    WinRt,
    Unix,

    /// Sniff the magic bytes.
    Unknown,
}

/// The container formats that can be introspected.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Format {
    Pe,
    Elf,
}

impl Format {
    /// Uses the leading magic bytes to decide the format.
    pub fn detect(reader: &Reader) -> Result<Format> {
        let ident = reader.slice(0, MIN_IDENT_SIZE)?;
        if ident.starts_with(&elf::ELF_MAGIC) {
            Ok(Format::Elf)
        } else if ident.starts_with(&pe::MZ_MAGIC) {
            Ok(Format::Pe)
        } else {
            Err(Error::Format(format!(
                "not a PE/COFF or ELF file (magic {:02x} {:02x} {:02x} {:02x})",
                ident[0], ident[1], ident[2], ident[3]
            )))
        }
    }

    fn for_platform(platform: Platform, reader: &Reader) -> Result<Format> {
        match platform {
            Platform::Windows | Platform::WinRt => Ok(Format::Pe),
            Platform::Unix => Ok(Format::Elf),
            Platform::Unknown => Format::detect(reader),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Pe => f.write_str("PE/COFF"),
            Format::Elf => f.write_str("ELF"),
        }
    }
}

/// A parsed binary of either format.
pub enum Executable {
    Pe(PeFile),
    Elf(ElfFile),
}

impl Executable {
    pub fn open(path: &Path, platform: Platform) -> Result<Self> {
        Executable::from_reader(Reader::open(path)?, platform)
    }

    pub fn from_reader(reader: Reader, platform: Platform) -> Result<Self> {
        match Format::for_platform(platform, &reader)? {
            Format::Pe => Ok(Executable::Pe(PeFile::new(reader)?)),
            Format::Elf => Ok(Executable::Elf(ElfFile::new(reader)?)),
        }
    }

    pub fn info(&self) -> Result<ExecutableInfo> {
        match self {
            Executable::Pe(pe) => pe.info(),
            Executable::Elf(elf) => elf.info(),
        }
    }

    pub fn section_summaries(&self) -> Vec<SectionSummary> {
        match self {
            Executable::Pe(pe) => pe.section_summaries(),
            Executable::Elf(elf) => elf.section_summaries(),
        }
    }
}

/// Word size, debug flag, and direct dependencies of the binary at path.
pub fn introspect(path: &Path, platform: Platform) -> Result<ExecutableInfo> {
    Executable::open(path, platform)?.info()
}

pub fn introspect_reader(reader: Reader, platform: Platform) -> Result<ExecutableInfo> {
    Executable::from_reader(reader, platform)?.info()
}

/// For callers that only care about which libraries need to be deployed.
pub fn dependencies_only(path: &Path, platform: Platform) -> Result<Vec<String>> {
    Ok(introspect(path, platform)?.dependencies)
}

/// Introspects each path on the rayon thread pool. Results are in the same order as
/// paths and one failure doesn't affect the others.
pub fn introspect_all(paths: &[PathBuf], platform: Platform) -> Vec<Result<ExecutableInfo>> {
    paths
        .par_iter()
        .map(|path| introspect(path, platform))
        .collect()
}

pub fn section_summaries(path: &Path, platform: Platform) -> Result<Vec<SectionSummary>> {
    Ok(Executable::open(path, platform)?.section_summaries())
}
