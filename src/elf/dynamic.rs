//! The .dynamic section: (tag, value) pairs for the dynamic linker, terminated by a
//! DT_NULL entry.
use super::{ElfSection, Reader, read_name};
use crate::error::{Error, Result};
use crate::primitives::FileOffset;

pub const DT_NULL: u64 = 0;
pub const DT_NEEDED: u64 = 1;
pub const DT_STRTAB: u64 = 5;

/// Elf32_Dyn or Elf64_Dyn. The tag is signed in the spec but every tag we look at is
/// small and positive.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DynamicEntry {
    pub tag: u64,
    pub value: u64,
}

/// Walks the entries of a .dynamic section. Iteration stops at DT_NULL or when the
/// next entry would run past the end of the section, whichever happens first. Clone it
/// to restart from the beginning.
#[derive(Clone)]
pub struct DynamicEntries<'a> {
    reader: &'a Reader,
    offset: FileOffset,
    end: FileOffset,
    entry_size: u64,
    done: bool,
}

impl<'a> DynamicEntries<'a> {
    pub fn new(reader: &'a Reader, section: &ElfSection) -> Self {
        let entry_size = if reader.sixty_four_bit { 16 } else { 8 };
        DynamicEntries {
            reader,
            offset: section.header.obytes.start,
            end: section.header.obytes.end(),
            entry_size,
            done: false,
        }
    }
}

impl Iterator for DynamicEntries<'_> {
    type Item = Result<DynamicEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.offset + self.entry_size > self.end {
            self.done = true;
            return None;
        }
        let offset = self.offset.as_usize();
        let word = (self.entry_size / 2) as usize;
        let entry = self.reader.read_addr(offset).and_then(|tag| {
            let value = self.reader.read_addr(offset + word)?;
            Ok(DynamicEntry { tag, value })
        });
        match entry {
            Ok(entry) if entry.tag == DT_NULL => {
                self.done = true;
                None
            }
            Ok(entry) => {
                self.offset = self.offset + self.entry_size;
                Some(Ok(entry))
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// Names from the DT_NEEDED entries, in declared order with duplicates kept. The
/// values are offsets into .dynstr.
pub fn needed_libraries(
    reader: &Reader,
    dynamic: &ElfSection,
    dynstr: Option<&ElfSection>,
) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in DynamicEntries::new(reader, dynamic) {
        let entry = entry?;
        if entry.tag == DT_NEEDED {
            let dynstr = dynstr.ok_or_else(|| {
                Error::Format(format!(
                    "DT_NEEDED entry in .dynamic at {} but there is no .dynstr section",
                    dynamic.header.obytes.start
                ))
            })?;
            names.push(read_name(reader, dynstr.header.obytes, entry.value)?);
        }
    }
    Ok(names)
}
