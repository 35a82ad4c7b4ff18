//! Finds out what a compiled binary needs at run time without loading it: its word
//! size, whether it looks like a debug build, and the shared libraries it directly
//! depends on. Windows PE/COFF and Unix ELF files are parsed by hand.
//!
//! Deployment tools call this once per candidate binary and use the dependency names
//! as seeds for locating and copying libraries. Resolving names to paths and walking
//! the transitive closure is left to them.
pub mod cli;
pub mod commands;
pub mod elf;
pub mod error;
pub mod introspect;
pub mod io;
pub mod pe;
pub mod primitives;
pub mod utils;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
pub use introspect::{
    Executable, ExecutableInfo, Format, Platform, SectionSummary, WordSize, dependencies_only,
    introspect, introspect_all, introspect_reader, section_summaries,
};
