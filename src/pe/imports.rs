//! The import directory: one descriptor per DLL the image links against, terminated
//! by an all zero descriptor.
use super::{DataDirectory, SectionMap};
use crate::error::Result;
use crate::io::{Reader, Stream};
use crate::primitives::{FileOffset, Rva};

pub const IMPORT_DESCRIPTOR_SIZE: usize = 20;

/// IMAGE_IMPORT_DESCRIPTOR
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ImportDescriptor {
    /// RVA of the import lookup table (names or ordinals of the imported symbols).
    pub lookup_table: u32,
    pub timestamp: u32,
    pub forwarder_chain: u32,

    /// RVA of the DLL's null-terminated ASCII name.
    pub name: Rva,

    /// RVA of the import address table.
    pub address_table: u32,
}

impl ImportDescriptor {
    pub fn new(reader: &Reader, offset: usize) -> Result<Self> {
        let mut s = Stream::new(reader, offset);
        Ok(ImportDescriptor {
            lookup_table: s.read_word()?,
            timestamp: s.read_word()?,
            forwarder_chain: s.read_word()?,
            name: Rva(s.read_word()? as u64),
            address_table: s.read_word()?,
        })
    }

    pub fn is_terminator(&self) -> bool {
        self.lookup_table == 0
            && self.timestamp == 0
            && self.forwarder_chain == 0
            && self.name.0 == 0
            && self.address_table == 0
    }
}

/// Walks the descriptors in table order. Iteration stops at the all zero terminator
/// or when the next descriptor would run past the end of the section holding the
/// table, whichever happens first. Clone it to restart from the beginning.
#[derive(Clone)]
pub struct ImportDescriptors<'a> {
    reader: &'a Reader,
    offset: FileOffset,
    end: FileOffset,
    done: bool,
}

impl<'a> ImportDescriptors<'a> {
    pub fn new(reader: &'a Reader, sections: &SectionMap, directory: DataDirectory) -> Result<Self> {
        if directory.is_empty() {
            return Ok(ImportDescriptors {
                reader,
                offset: FileOffset(0),
                end: FileOffset(0),
                done: true,
            });
        }
        let section = sections.find(directory.rva)?;
        Ok(ImportDescriptors {
            reader,
            offset: section.offset_of(directory.rva),
            end: section.obytes.end(),
            done: false,
        })
    }
}

impl Iterator for ImportDescriptors<'_> {
    type Item = Result<ImportDescriptor>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.offset + IMPORT_DESCRIPTOR_SIZE as u64 > self.end {
            self.done = true;
            return None;
        }
        match ImportDescriptor::new(self.reader, self.offset.as_usize()) {
            Ok(descriptor) if descriptor.is_terminator() => {
                self.done = true;
                None
            }
            Ok(descriptor) => {
                self.offset = self.offset + IMPORT_DESCRIPTOR_SIZE as u64;
                Some(Ok(descriptor))
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// Names of the DLLs the image imports from, in table order with duplicates kept.
pub fn imported_libraries(
    reader: &Reader,
    sections: &SectionMap,
    directory: DataDirectory,
) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for descriptor in ImportDescriptors::new(reader, sections, directory)? {
        let descriptor = descriptor?;
        let section = sections.find(descriptor.name)?;
        let offset = section.offset_of(descriptor.name);
        names.push(reader.read_string(offset.as_usize(), section.obytes.end().as_usize())?);
    }
    Ok(names)
}
