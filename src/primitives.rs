use std::fmt;
use std::ops::{Add, Sub};

/// An index into a byte within an executable file.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FileOffset(pub u64);

/// A relative virtual address, i.e. an address relative to the image's load base.
/// ELF section addresses are also stored as these (with a zero base).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Rva(pub u64);

/// A range of bytes addressed using either file offsets or relative virtual addresses.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Bytes<A>
where
    A: Add<u64, Output = A> + Copy + Ord,
{
    pub start: A,
    pub size: u64,
}

impl<A: Add<u64, Output = A> + Copy + Ord> Bytes<A> {
    pub fn new(start: A, size: u64) -> Self {
        Bytes { start, size }
    }

    pub fn contains(&self, addr: A) -> bool {
        addr >= self.start && addr < self.end()
    }

    pub fn end(&self) -> A {
        self.start + self.size
    }
}

impl Add<u64> for FileOffset {
    type Output = FileOffset;

    fn add(self, rhs: u64) -> Self::Output {
        FileOffset(self.0.saturating_add(rhs))
    }
}

impl Add<u64> for Rva {
    type Output = Rva;

    fn add(self, rhs: u64) -> Self::Output {
        Rva(self.0.saturating_add(rhs))
    }
}

impl Sub<Rva> for Rva {
    type Output = u64;

    fn sub(self, rhs: Rva) -> Self::Output {
        self.0 - rhs.0
    }
}

impl FileOffset {
    /// Offsets come out of headers as u64 but reads are done with usize.
    pub fn as_usize(self) -> usize {
        usize::try_from(self.0).unwrap_or(usize::MAX)
    }
}

impl fmt::Display for FileOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl fmt::Display for Rva {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}
