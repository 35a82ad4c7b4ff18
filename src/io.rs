//! Bounded random access to the bytes of an executable. Nothing here indexes a slice
//! directly: every read checks its range and reports a truncated file as an error.
use crate::error::{Error, Result};
use memmap2::Mmap;
use std::fs::File;
use std::ops::Deref;
use std::path::Path;

#[derive(Debug)]
enum Source {
    Mapped(Mmap),
    Buffer(Vec<u8>),
}

impl Deref for Source {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            Source::Mapped(map) => &map[..],
            Source::Buffer(bytes) => &bytes[..],
        }
    }
}

#[derive(Debug)]
pub struct Reader {
    pub little_endian: bool,
    pub sixty_four_bit: bool,
    bytes: Source,
}

impl Reader {
    /// Defaults to little endian and 32-bit which is what PE files always use for
    /// their headers. ELF files reset this once the identification bytes are read.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .map_err(|err| Error::Io(format!("couldn't open {}: {err}", path.display())))?;
        let len = file
            .metadata()
            .map_err(|err| Error::Io(format!("couldn't stat {}: {err}", path.display())))?
            .len();

        // Some platforms refuse to map empty files.
        if len == 0 {
            return Ok(Reader::from_vec(Vec::new()));
        }

        // This is unsafe because it has undefined behavior if the underlying file is
        // modified while the memory map is in use.
        let map = unsafe { Mmap::map(&file) }
            .map_err(|err| Error::Io(format!("couldn't map {}: {err}", path.display())))?;
        Ok(Reader {
            little_endian: true,
            sixty_four_bit: false,
            bytes: Source::Mapped(map),
        })
    }

    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Reader {
            little_endian: true,
            sixty_four_bit: false,
            bytes: Source::Buffer(bytes),
        }
    }

    pub fn with_layout(mut self, little_endian: bool, sixty_four_bit: bool) -> Self {
        self.little_endian = little_endian;
        self.sixty_four_bit = sixty_four_bit;
        self
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn slice(&self, offset: usize, size: usize) -> Result<&[u8]> {
        offset
            .checked_add(size)
            .and_then(|end| self.bytes.get(offset..end))
            .ok_or_else(|| Error::truncated(offset, size, self.len()))
    }

    pub fn read_byte(&self, offset: usize) -> Result<u8> {
        Ok(self.slice(offset, 1)?[0])
    }

    pub fn read_half(&self, offset: usize) -> Result<u16> {
        let bytes: [u8; 2] = self.array(offset)?;
        if self.little_endian {
            Ok(u16::from_le_bytes(bytes))
        } else {
            Ok(u16::from_be_bytes(bytes))
        }
    }

    pub fn read_word(&self, offset: usize) -> Result<u32> {
        let bytes: [u8; 4] = self.array(offset)?;
        if self.little_endian {
            Ok(u32::from_le_bytes(bytes))
        } else {
            Ok(u32::from_be_bytes(bytes))
        }
    }

    pub fn read_xword(&self, offset: usize) -> Result<u64> {
        let bytes: [u8; 8] = self.array(offset)?;
        if self.little_endian {
            Ok(u64::from_le_bytes(bytes))
        } else {
            Ok(u64::from_be_bytes(bytes))
        }
    }

    /// Read either a u32 or u64 word depending on whether the file is 64-bit.
    /// But, for sanity, always return the result as 64 bits.
    pub fn read_addr(&self, offset: usize) -> Result<u64> {
        if self.sixty_four_bit {
            self.read_xword(offset)
        } else {
            Ok(self.read_word(offset)? as u64)
        }
    }

    /// Read a null-terminated UTF-8 string that must end before `limit`. Running off
    /// the end of the file is a truncation, running past `limit` or invalid UTF-8 is
    /// a format error.
    pub fn read_string(&self, offset: usize, limit: usize) -> Result<String> {
        let mut end = offset;
        loop {
            if end >= limit {
                return Err(Error::Format(format!(
                    "unterminated string at offset {offset:#x} (limit {limit:#x})"
                )));
            }
            if self.read_byte(end)? == 0 {
                break;
            }
            end += 1;
        }
        let bytes = self.slice(offset, end - offset)?;
        String::from_utf8(bytes.to_vec()).map_err(|err| {
            Error::Format(format!("string at offset {offset:#x} is not UTF-8: {err}"))
        })
    }

    fn array<const N: usize>(&self, offset: usize) -> Result<[u8; N]> {
        let slice = self.slice(offset, N)?;
        let mut bytes = [0; N];
        bytes.copy_from_slice(slice);
        Ok(bytes)
    }
}

/// Cursor over a Reader used to walk fixed layout records field by field.
pub struct Stream<'a> {
    pub reader: &'a Reader,
    pub offset: usize,
}

impl<'a> Stream<'a> {
    pub fn new(reader: &'a Reader, offset: usize) -> Self {
        Stream { reader, offset }
    }

    pub fn skip(&mut self, count: usize) {
        self.offset = self.offset.saturating_add(count);
    }

    pub fn read_byte(&mut self) -> Result<u8> {
        let byte = self.reader.read_byte(self.offset)?;
        self.offset += 1;
        Ok(byte)
    }

    pub fn read_half(&mut self) -> Result<u16> {
        let half = self.reader.read_half(self.offset)?;
        self.offset += 2;
        Ok(half)
    }

    pub fn read_word(&mut self) -> Result<u32> {
        let word = self.reader.read_word(self.offset)?;
        self.offset += 4;
        Ok(word)
    }

    pub fn read_xword(&mut self) -> Result<u64> {
        let xword = self.reader.read_xword(self.offset)?;
        self.offset += 8;
        Ok(xword)
    }

    /// Four or eight bytes depending on the reader's word size.
    pub fn read_addr(&mut self) -> Result<u64> {
        let addr = self.reader.read_addr(self.offset)?;
        self.offset += if self.reader.sixty_four_bit { 8 } else { 4 };
        Ok(addr)
    }
}
