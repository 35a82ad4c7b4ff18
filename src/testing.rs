//! Builders for small synthetic PE and ELF images used by the unit tests.
use crate::elf::{DT_NEEDED, DT_NULL, DT_STRTAB};

/// Little helper for laying out fields with a given endianness and word size.
struct Out {
    bytes: Vec<u8>,
    little_endian: bool,
    sixty_four_bit: bool,
}

impl Out {
    fn new(little_endian: bool, sixty_four_bit: bool) -> Self {
        Out {
            bytes: Vec::new(),
            little_endian,
            sixty_four_bit,
        }
    }

    fn byte(&mut self, value: u8) {
        self.bytes.push(value);
    }

    fn half(&mut self, value: u16) {
        if self.little_endian {
            self.bytes.extend_from_slice(&value.to_le_bytes());
        } else {
            self.bytes.extend_from_slice(&value.to_be_bytes());
        }
    }

    fn word(&mut self, value: u32) {
        if self.little_endian {
            self.bytes.extend_from_slice(&value.to_le_bytes());
        } else {
            self.bytes.extend_from_slice(&value.to_be_bytes());
        }
    }

    fn xword(&mut self, value: u64) {
        if self.little_endian {
            self.bytes.extend_from_slice(&value.to_le_bytes());
        } else {
            self.bytes.extend_from_slice(&value.to_be_bytes());
        }
    }

    fn addr(&mut self, value: u64) {
        if self.sixty_four_bit {
            self.xword(value);
        } else {
            self.word(value as u32);
        }
    }

    fn align(&mut self, alignment: usize) {
        while self.bytes.len() % alignment != 0 {
            self.bytes.push(0);
        }
    }
}

const PE_SECTION_RVA: u32 = 0x1000;
const PE_SECTION_OFFSET: usize = 0x200;

/// Builds a PE image with a single ".idata" section at RVA 0x1000, file offset 0x200.
/// The section holds the DLL names, then the debug directory, and finally the import
/// descriptors so a missing terminator runs into the end of the section.
pub struct PeBuilder {
    sixty_four_bit: bool,
    machine: Option<u16>,
    optional_magic: Option<u16>,
    optional_header_size: Option<u16>,
    num_directories: u32,
    imports: Vec<String>,
    import_table: bool,
    import_terminator: bool,
    import_rva: Option<u32>,
    name_rva: Option<u32>,
    debug_types: Vec<u32>,
    debug_rva: Option<u32>,
}

impl PeBuilder {
    pub fn new() -> Self {
        PeBuilder {
            sixty_four_bit: false,
            machine: None,
            optional_magic: None,
            optional_header_size: None,
            num_directories: 16,
            imports: Vec::new(),
            import_table: false,
            import_terminator: true,
            import_rva: None,
            name_rva: None,
            debug_types: Vec::new(),
            debug_rva: None,
        }
    }

    pub fn sixty_four_bit(mut self) -> Self {
        self.sixty_four_bit = true;
        self
    }

    pub fn machine(mut self, machine: u16) -> Self {
        self.machine = Some(machine);
        self
    }

    pub fn optional_magic(mut self, magic: u16) -> Self {
        self.optional_magic = Some(magic);
        self
    }

    pub fn optional_header_size(mut self, size: u16) -> Self {
        self.optional_header_size = Some(size);
        self
    }

    pub fn num_directories(mut self, count: u32) -> Self {
        self.num_directories = count;
        self
    }

    pub fn import(mut self, name: &str) -> Self {
        self.imports.push(name.to_string());
        self
    }

    /// Emit an import directory even when there are no imports.
    pub fn empty_import_table(mut self) -> Self {
        self.import_table = true;
        self
    }

    pub fn without_import_terminator(mut self) -> Self {
        self.import_terminator = false;
        self
    }

    /// Point the import directory somewhere else.
    pub fn import_rva(mut self, rva: u32) -> Self {
        self.import_rva = Some(rva);
        self
    }

    /// Point every import descriptor's name somewhere else.
    pub fn name_rva(mut self, rva: u32) -> Self {
        self.name_rva = Some(rva);
        self
    }

    pub fn debug_entry(mut self, dtype: u32) -> Self {
        self.debug_types.push(dtype);
        self
    }

    /// Point the debug directory somewhere else.
    pub fn debug_rva(mut self, rva: u32) -> Self {
        self.debug_rva = Some(rva);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        // section contents
        let mut data = Out::new(true, false);
        let mut name_rvas = Vec::new();
        for name in self.imports.iter() {
            name_rvas.push(PE_SECTION_RVA + data.bytes.len() as u32);
            data.bytes.extend_from_slice(name.as_bytes());
            data.byte(0);
        }
        data.align(4);

        let debug_rva = PE_SECTION_RVA + data.bytes.len() as u32;
        for &dtype in self.debug_types.iter() {
            data.word(0); // characteristics
            data.word(0x5f000000); // timestamp
            data.half(0);
            data.half(0);
            data.word(dtype);
            data.word(0x40); // size of data
            data.word(0); // rva of data
            data.word(0); // file offset of data
        }
        let debug_size = (self.debug_types.len() * 28) as u32;

        let import_start = data.bytes.len();
        for name_rva in name_rvas.iter() {
            data.word(0x3000); // lookup table
            data.word(0);
            data.word(0);
            data.word(self.name_rva.unwrap_or(*name_rva));
            data.word(0x3100); // address table
        }
        let has_import_table = !self.imports.is_empty() || self.import_table;
        if has_import_table && self.import_terminator {
            data.bytes.extend_from_slice(&[0; 20]);
        }
        let import_size = (data.bytes.len() - import_start) as u32;
        let import_rva = PE_SECTION_RVA + import_start as u32;

        // headers
        let optional_size: usize = if self.sixty_four_bit { 240 } else { 224 };
        let mut out = Out::new(true, false);
        out.bytes.extend_from_slice(b"MZ");
        out.bytes.resize(0x3c, 0);
        out.word(0x40);
        out.bytes.extend_from_slice(b"PE\0\0");

        let machine = if self.sixty_four_bit { 0x8664 } else { 0x14c };
        out.half(self.machine.unwrap_or(machine));
        out.half(1); // number of sections
        out.word(0x5f000000);
        out.word(0);
        out.word(0);
        out.half(self.optional_header_size.unwrap_or(optional_size as u16));
        out.half(0x0102); // executable, 32-bit machine

        let optional_start = out.bytes.len();
        let magic = if self.sixty_four_bit { 0x20b } else { 0x10b };
        out.half(self.optional_magic.unwrap_or(magic));
        let count_offset = if self.sixty_four_bit { 108 } else { 92 };
        out.bytes.resize(optional_start + count_offset, 0);
        out.word(self.num_directories);
        for index in 0..16u32 {
            if index >= self.num_directories {
                out.xword(0);
            } else if index == 1 && has_import_table {
                out.word(self.import_rva.unwrap_or(import_rva));
                out.word(import_size);
            } else if index == 6 && debug_size > 0 {
                out.word(self.debug_rva.unwrap_or(debug_rva));
                out.word(debug_size);
            } else {
                out.xword(0);
            }
        }
        assert_eq!(out.bytes.len(), optional_start + optional_size);

        out.bytes.extend_from_slice(b".idata\0\0");
        out.word(data.bytes.len() as u32); // virtual size
        out.word(PE_SECTION_RVA);
        out.word(data.bytes.len() as u32); // raw size
        out.word(PE_SECTION_OFFSET as u32);
        out.bytes.extend_from_slice(&[0; 12]);
        out.word(0xc0000040); // initialized data, read, write

        assert!(out.bytes.len() <= PE_SECTION_OFFSET);
        out.bytes.resize(PE_SECTION_OFFSET, 0);
        out.bytes.extend_from_slice(&data.bytes);
        out.bytes
    }
}

struct SectionPlan {
    name: String,
    stype: u32,
    link: u32,
    entry_size: u64,
    contents: Vec<u8>,
}

/// Builds an ELF image with a section header table (placed at the very end of the
/// file) but no program headers.
pub struct ElfBuilder {
    sixty_four_bit: bool,
    little_endian: bool,
    class: Option<u8>,
    data: Option<u8>,
    needed: Vec<String>,
    dynamic: bool,
    dynstr: bool,
    dynamic_terminator: bool,
    needed_offset: Option<u64>,
    extra: Vec<(String, u32, u64)>,
    section_entry_size: Option<u16>,
    extended_numbering: bool,
}

impl ElfBuilder {
    pub fn new() -> Self {
        ElfBuilder {
            sixty_four_bit: true,
            little_endian: true,
            class: None,
            data: None,
            needed: Vec::new(),
            dynamic: true,
            dynstr: true,
            dynamic_terminator: true,
            needed_offset: None,
            extra: Vec::new(),
            section_entry_size: None,
            extended_numbering: false,
        }
    }

    pub fn thirty_two_bit(mut self) -> Self {
        self.sixty_four_bit = false;
        self
    }

    pub fn big_endian(mut self) -> Self {
        self.little_endian = false;
        self
    }

    pub fn class(mut self, class: u8) -> Self {
        self.class = Some(class);
        self
    }

    pub fn data_encoding(mut self, data: u8) -> Self {
        self.data = Some(data);
        self
    }

    pub fn needed(mut self, name: &str) -> Self {
        self.needed.push(name.to_string());
        self
    }

    /// Statically linked: no .dynamic or .dynstr sections.
    pub fn static_link(mut self) -> Self {
        self.dynamic = false;
        self
    }

    pub fn without_dynstr(mut self) -> Self {
        self.dynstr = false;
        self
    }

    pub fn without_dynamic_terminator(mut self) -> Self {
        self.dynamic_terminator = false;
        self
    }

    /// Make every DT_NEEDED entry use this .dynstr offset.
    pub fn needed_offset(mut self, offset: u64) -> Self {
        self.needed_offset = Some(offset);
        self
    }

    /// Add a section, .symtab gets the right type, everything else is PROGBITS.
    pub fn section(mut self, name: &str, size: u64) -> Self {
        let stype = if name == ".symtab" { 2 } else { 1 };
        self.extra.push((name.to_string(), stype, size));
        self
    }

    pub fn section_entry_size(mut self, size: u16) -> Self {
        self.section_entry_size = Some(size);
        self
    }

    /// Use section zero to hold the section count and string table index.
    pub fn extended_numbering(mut self) -> Self {
        self.extended_numbering = true;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let wide = self.sixty_four_bit;
        let word = if wide { 8 } else { 4 };
        let mut plans = Vec::new();

        let mut dynstr_index = 0;
        if self.dynamic && self.dynstr {
            let mut contents = vec![0];
            for name in self.needed.iter() {
                contents.extend_from_slice(name.as_bytes());
                contents.push(0);
            }
            plans.push(SectionPlan {
                name: ".dynstr".to_string(),
                stype: 3,
                link: 0,
                entry_size: 0,
                contents,
            });
            dynstr_index = plans.len() as u32; // the null section is index 0
        }

        if self.dynamic {
            let mut d = Out::new(self.little_endian, wide);
            let mut str_offset = 1;
            for (i, name) in self.needed.iter().enumerate() {
                d.addr(DT_NEEDED);
                d.addr(self.needed_offset.unwrap_or(str_offset));
                str_offset += name.len() as u64 + 1;
                if i == 0 {
                    // something that isn't DT_NEEDED to skip over
                    d.addr(DT_STRTAB);
                    d.addr(0x4000);
                }
            }
            if self.dynamic_terminator {
                d.addr(DT_NULL);
                d.addr(0);

                // linkers pad with extra entries after the terminator, these must be ignored
                d.addr(DT_NEEDED);
                d.addr(1);
            }
            plans.push(SectionPlan {
                name: ".dynamic".to_string(),
                stype: 6,
                link: dynstr_index,
                entry_size: 2 * word as u64,
                contents: d.bytes,
            });
        }

        for (name, stype, size) in self.extra.iter() {
            plans.push(SectionPlan {
                name: name.clone(),
                stype: *stype,
                link: 0,
                entry_size: if *stype == 2 { 3 * word as u64 } else { 0 },
                contents: vec![0; *size as usize],
            });
        }

        let mut shstrtab = vec![0];
        let mut name_offsets = Vec::new();
        for plan in plans.iter() {
            name_offsets.push(shstrtab.len() as u32);
            shstrtab.extend_from_slice(plan.name.as_bytes());
            shstrtab.push(0);
        }
        name_offsets.push(shstrtab.len() as u32);
        shstrtab.extend_from_slice(b".shstrtab\0");
        plans.push(SectionPlan {
            name: ".shstrtab".to_string(),
            stype: 3,
            link: 0,
            entry_size: 0,
            contents: shstrtab,
        });
        let num_sections = plans.len() + 1;
        let shstrndx = plans.len() as u16;

        // section contents go right after the ELF header
        let header_size: usize = if wide { 64 } else { 52 };
        let mut body = Out::new(self.little_endian, wide);
        body.bytes.resize(header_size, 0);
        let mut offsets = Vec::new();
        for plan in plans.iter() {
            body.align(8);
            offsets.push(body.bytes.len() as u64);
            body.bytes.extend_from_slice(&plan.contents);
        }
        body.align(8);
        let section_table = body.bytes.len() as u64;

        // null section, possibly holding the extended counts
        if self.extended_numbering {
            body.word(0);
            body.word(0);
            body.addr(0);
            body.addr(0);
            body.addr(0);
            body.addr(num_sections as u64);
            body.word(shstrndx as u32);
            body.word(0);
            body.addr(0);
            body.addr(0);
        } else {
            body.bytes.resize(body.bytes.len() + if wide { 64 } else { 40 }, 0);
        }
        for (i, plan) in plans.iter().enumerate() {
            body.word(name_offsets[i]);
            body.word(plan.stype);
            body.addr(if plan.stype == 6 { 3 } else { 0 }); // flags
            body.addr(0x1000 * (i as u64 + 1));
            body.addr(offsets[i]);
            body.addr(plan.contents.len() as u64);
            body.word(plan.link);
            body.word(0);
            body.addr(8);
            body.addr(plan.entry_size);
        }

        let mut h = Out::new(self.little_endian, wide);
        h.bytes.extend_from_slice(&[0x7f, b'E', b'L', b'F']);
        h.byte(self.class.unwrap_or(if wide { 2 } else { 1 }));
        h.byte(self.data.unwrap_or(if self.little_endian { 1 } else { 2 }));
        h.byte(1); // version
        h.bytes.resize(16, 0);
        h.half(3); // shared object
        h.half(if wide { 62 } else { 3 }); // x86-64 or i386
        h.word(1);
        h.addr(0x1040); // entry
        h.addr(0); // no program headers
        h.addr(section_table);
        h.word(0);
        h.half(header_size as u16);
        h.half(0);
        h.half(0);
        h.half(self.section_entry_size.unwrap_or(if wide { 64 } else { 40 }));
        if self.extended_numbering {
            h.half(0);
            h.half(0xffff);
        } else {
            h.half(num_sections as u16);
            h.half(shstrndx);
        }
        assert_eq!(h.bytes.len(), header_size);

        body.bytes[..header_size].copy_from_slice(&h.bytes);
        body.bytes
    }
}
