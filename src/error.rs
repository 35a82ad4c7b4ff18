//! Failures reported by the introspection core. Every failure is terminal for the
//! call that produced it: there are no partial results.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The file couldn't be opened or is shorter than a structure it was asked to
    /// yield.
    #[error("I/O error: {0}")]
    Io(String),

    /// The bytes are there but break the container's structural rules, e.g. bad
    /// magic or an RVA outside every section.
    #[error("format error: {0}")]
    Format(String),

    /// Structurally valid but a variant that isn't interpreted, e.g. an unknown ELF
    /// class byte.
    #[error("unsupported: {0}")]
    Unsupported(String),
}

impl Error {
    pub fn truncated(offset: usize, size: usize, len: usize) -> Self {
        Error::Io(format!(
            "truncated executable: needed {size} bytes at offset {offset:#x} but file is {len:#x} bytes"
        ))
    }
}

/// Returns a Format error unless predicate holds.
pub fn require(predicate: bool, err: impl FnOnce() -> String) -> Result<()> {
    if predicate {
        Ok(())
    } else {
        Err(Error::Format(err()))
    }
}
