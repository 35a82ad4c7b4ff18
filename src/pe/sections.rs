//! The section table, used to translate RVAs found in data directories into file
//! offsets.
use crate::error::{Error, Result};
use crate::io::{Reader, Stream};
use crate::primitives::{Bytes, FileOffset, Rva};
use rangemap::RangeMap;

pub const SECTION_HEADER_SIZE: usize = 40;

#[derive(Clone, Debug)]
pub struct PeSection {
    /// Up to eight bytes, null padded.
    pub name: String,

    /// Size of the section once loaded, may be larger than the raw size (the rest is
    /// zero filled).
    pub virtual_size: u32,

    /// Addressing for the section's raw data using RVAs. Note that this uses the raw
    /// size: only bytes that actually exist in the file can be translated.
    pub vbytes: Bytes<Rva>,

    /// Addressing for the section's raw data using offsets from the start of the file.
    pub obytes: Bytes<FileOffset>,

    /// Code, data, readable, writable, etc.
    pub characteristics: u32,
}

impl PeSection {
    fn new(reader: &Reader, offset: usize) -> Result<Self> {
        let raw_name = reader.slice(offset, 8)?;
        let len = raw_name.iter().position(|&b| b == 0).unwrap_or(raw_name.len());
        let name = String::from_utf8_lossy(&raw_name[..len]).into_owned();

        let mut s = Stream::new(reader, offset + 8);
        let virtual_size = s.read_word()?;
        let virtual_address = s.read_word()? as u64;
        let raw_size = s.read_word()? as u64;
        let raw_offset = s.read_word()? as u64;
        s.skip(12); // relocations, line numbers, and their counts
        let characteristics = s.read_word()?;

        Ok(PeSection {
            name,
            virtual_size,
            vbytes: Bytes::new(Rva(virtual_address), raw_size),
            obytes: Bytes::new(FileOffset(raw_offset), raw_size),
            characteristics,
        })
    }

    /// Caller is responsible for making sure that rva is within this section.
    pub fn offset_of(&self, rva: Rva) -> FileOffset {
        self.obytes.start + (rva - self.vbytes.start)
    }
}

/// Sections in table order along with a range map so that RVAs can be quickly
/// resolved.
pub struct SectionMap {
    sections: Vec<PeSection>,
    by_rva: RangeMap<Rva, usize>,
}

impl SectionMap {
    pub fn new(reader: &Reader, table: FileOffset, count: u16) -> Result<Self> {
        let mut sections = Vec::with_capacity(count as usize);
        let mut offset = table.as_usize();
        for _ in 0..count {
            sections.push(PeSection::new(reader, offset)?);
            offset += SECTION_HEADER_SIZE;
        }

        // Overlapping sections aren't legal but, if they do happen, the earliest entry
        // in the table wins. Later inserts overwrite earlier ones so go backwards.
        let mut by_rva = RangeMap::new();
        for (index, section) in sections.iter().enumerate().rev() {
            if section.vbytes.size > 0 {
                by_rva.insert(section.vbytes.start..section.vbytes.end(), index);
            }
        }

        Ok(SectionMap { sections, by_rva })
    }

    pub fn sections(&self) -> &[PeSection] {
        &self.sections
    }

    pub fn find(&self, rva: Rva) -> Result<&PeSection> {
        self.by_rva
            .get(&rva)
            .map(|&index| &self.sections[index])
            .ok_or_else(|| Error::Format(format!("RVA out of range: {rva} isn't in any section")))
    }

    pub fn rva_to_offset(&self, rva: Rva) -> Result<FileOffset> {
        Ok(self.find(rva)?.offset_of(rva))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pe::PeHeaders;
    use crate::testing::PeBuilder;

    fn load(bytes: Vec<u8>) -> SectionMap {
        let reader = Reader::from_vec(bytes);
        let headers = PeHeaders::new(&reader).unwrap();
        SectionMap::new(&reader, headers.section_table, headers.coff.num_sections).unwrap()
    }

    #[test]
    fn translates_rvas() {
        let map = load(PeBuilder::new().import("USER32.DLL").build());
        let section = &map.sections()[0];
        assert_eq!(section.name, ".idata");
        assert_eq!(section.vbytes.start, Rva(0x1000));
        assert_eq!(section.obytes.start, FileOffset(0x200));

        assert_eq!(map.rva_to_offset(Rva(0x1000)).unwrap(), FileOffset(0x200));
        assert_eq!(map.rva_to_offset(Rva(0x1004)).unwrap(), FileOffset(0x204));

        let last = section.vbytes.end().0 - 1;
        assert_eq!(
            map.rva_to_offset(Rva(last)).unwrap(),
            FileOffset(0x200 + section.obytes.size - 1)
        );
    }

    #[test]
    fn out_of_range_rvas() {
        let map = load(PeBuilder::new().import("USER32.DLL").build());
        let end = map.sections()[0].vbytes.end();
        assert!(matches!(map.rva_to_offset(end), Err(Error::Format(_))));
        assert!(matches!(map.rva_to_offset(Rva(0xfff)), Err(Error::Format(_))));
        assert!(matches!(map.rva_to_offset(Rva(0)), Err(Error::Format(_))));
    }

    #[test]
    fn truncated_section_table() {
        let bytes = PeBuilder::new().import("USER32.DLL").build();
        let reader = Reader::from_vec(bytes);
        let headers = PeHeaders::new(&reader).unwrap();

        // Claim far more sections than the file has room for.
        let result = SectionMap::new(&reader, headers.section_table, 1000);
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
