//! Relocatable ELF64 little-endian x86-64 object writer.
//!
//! Takes the collaborator data the core hands off — section byte
//! sequences, a symbol table keyed by name, and relocation records — and
//! serializes them into a `.o` file a real linker accepts. Nothing here
//! is consulted by `branch`/`buffer`/`encode`; this module only reads
//! their public output.

use core::fmt;
use std::collections::HashMap;
use std::error::Error;

const EI_NIDENT: usize = 16;
const ET_REL: u16 = 1;
const EM_X86_64: u16 = 62;
const EV_CURRENT: u32 = 1;

const SHT_NULL: u32 = 0;
const SHT_PROGBITS: u32 = 1;
const SHT_SYMTAB: u32 = 2;
const SHT_STRTAB: u32 = 3;
const SHT_RELA: u32 = 4;
const SHT_NOBITS: u32 = 8;

const SHF_WRITE: u64 = 0x1;
const SHF_ALLOC: u64 = 0x2;
const SHF_EXECINSTR: u64 = 0x4;

const SHN_UNDEF: u16 = 0;

/// One named byte region contributed to the object (`.text`, `.data`,
/// `.bss`, `.tdata`, `.tbss`, ...). For a `SHT_NOBITS` section (`.bss`,
/// `.tbss`) `bytes` still determines the reserved size but is not written
/// to the file.
#[derive(Debug, Clone)]
pub struct Section {
    /// Section name, without a leading dot requirement (`"text"` or
    /// `".text"` both work; the writer does not normalize it).
    pub name: String,
    /// Section contents. For `.bss`/`.tbss` this is a zero-filled
    /// placeholder whose length is the only part that matters.
    pub bytes: Vec<u8>,
    /// Required alignment in bytes; rounded up to at least 1.
    pub align: u64,
}

impl Section {
    fn is_nobits(&self) -> bool {
        self.name == ".bss" || self.name == ".tbss"
    }

    fn flags(&self) -> u64 {
        match self.name.as_str() {
            ".text" => SHF_ALLOC | SHF_EXECINSTR,
            ".data" | ".bss" => SHF_ALLOC | SHF_WRITE,
            ".tdata" | ".tbss" => SHF_ALLOC | SHF_WRITE | 0x400, // SHF_TLS
            _ => SHF_ALLOC,
        }
    }
}

/// Binding of a [`Symbol`], packed into the high nibble of `st_info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolBinding {
    Local = 0,
    Global = 1,
    Weak = 2,
}

/// Kind of a [`Symbol`], packed into the low nibble of `st_info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolType {
    NoType = 0,
    Object = 1,
    Func = 2,
    Section = 3,
    File = 4,
}

/// A symbol-table entry.
#[derive(Debug, Clone)]
pub struct Symbol {
    /// Symbol name. Empty string is legal (section symbols conventionally
    /// have no name) and maps to string-table offset 0.
    pub name: String,
    /// Name of the defining section, or `None` for an undefined
    /// (externally-resolved) symbol.
    pub section: Option<String>,
    /// Value relative to the defining section's start.
    pub value: u64,
    /// Size in bytes, or 0 if unknown/not applicable.
    pub size: u64,
    pub binding: SymbolBinding,
    pub kind: SymbolType,
}

/// Relocation type. Only the forms the core's branch engine actually
/// needs are named; `r_info`'s low 32 bits are this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelocationKind {
    /// `R_X86_64_PC32`: S + A − P. What `resolve_all`'s `CALL`/`JMP rel32`
    /// sites to an external symbol need.
    Pc32 = 2,
    /// `R_X86_64_PLT32`: same computation, through the PLT.
    Plt32 = 4,
    /// `R_X86_64_64`: absolute 64-bit S + A.
    Abs64 = 1,
}

/// A relocation entry, `.rela.text`-style (explicit addend).
#[derive(Debug, Clone)]
pub struct Relocation {
    /// Byte offset within the defining section (normally `.text`) of the
    /// field to patch.
    pub offset: u64,
    /// Name of the symbol this relocation resolves against. Must appear
    /// in the `symbols` slice passed to [`write_relocatable_object`].
    pub symbol: String,
    pub kind: RelocationKind,
    pub addend: i64,
    /// Name of the section the relocation applies to (conventionally
    /// `.text`).
    pub applies_to: String,
}

/// A request this writer refuses, because the inputs don't describe a
/// valid object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectError {
    /// A relocation or symbol named a section that wasn't in `sections`.
    UnknownSection { name: String },
    /// A relocation named a symbol that wasn't in `symbols`.
    UnknownSymbol { name: String },
}

impl fmt::Display for ObjectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectError::UnknownSection { name } => {
                write!(f, "section {name:?} was referenced but not supplied")
            }
            ObjectError::UnknownSymbol { name } => {
                write!(f, "symbol {name:?} was referenced but not defined")
            }
        }
    }
}

impl Error for ObjectError {}

/// Builds a null-terminated string table, leading null byte first so
/// offset 0 means "no name".
struct StringTable {
    bytes: Vec<u8>,
    offsets: HashMap<String, u32>,
}

impl StringTable {
    fn new() -> Self {
        Self {
            bytes: vec![0],
            offsets: HashMap::new(),
        }
    }

    fn intern(&mut self, s: &str) -> u32 {
        if s.is_empty() {
            return 0;
        }
        if let Some(&off) = self.offsets.get(s) {
            return off;
        }
        let off = self.bytes.len() as u32;
        self.bytes.extend_from_slice(s.as_bytes());
        self.bytes.push(0);
        self.offsets.insert(s.to_string(), off);
        off
    }
}

fn pad_to(buf: &mut Vec<u8>, align: u64) {
    if align <= 1 {
        return;
    }
    let rem = buf.len() as u64 % align;
    if rem != 0 {
        buf.resize(buf.len() + (align - rem) as usize, 0);
    }
}

/// Serializes `sections`/`symbols`/`relocations` into a relocatable
/// ELF64 little-endian x86-64 object (`e_type = ET_REL`,
/// `e_machine = EM_X86_64`).
///
/// # Errors
///
/// Returns [`ObjectError`] if a relocation or symbol names a section that
/// isn't present in `sections`, or a relocation names a symbol that isn't
/// present in `symbols`.
pub fn write_relocatable_object(
    sections: &[Section],
    symbols: &[Symbol],
    relocations: &[Relocation],
) -> Result<Vec<u8>, ObjectError> {
    let section_index: HashMap<&str, usize> = sections
        .iter()
        .enumerate()
        .map(|(i, s)| (s.name.as_str(), i))
        .collect();

    for sym in symbols {
        if let Some(name) = &sym.section {
            if !section_index.contains_key(name.as_str()) {
                return Err(ObjectError::UnknownSection { name: name.clone() });
            }
        }
    }
    for rel in relocations {
        if !section_index.contains_key(rel.applies_to.as_str()) {
            return Err(ObjectError::UnknownSection {
                name: rel.applies_to.clone(),
            });
        }
        if !symbols.iter().any(|s| s.name == rel.symbol) {
            return Err(ObjectError::UnknownSymbol {
                name: rel.symbol.clone(),
            });
        }
    }

    // Locals before globals/weaks, each group order-preserving, so
    // sh_info (first non-local index) is a single boundary.
    let mut ordered: Vec<&Symbol> = symbols.iter().collect();
    ordered.sort_by_key(|s| if matches!(s.binding, SymbolBinding::Local) { 0 } else { 1 });
    let local_count = ordered
        .iter()
        .take_while(|s| matches!(s.binding, SymbolBinding::Local))
        .count();

    let mut symtab_index: HashMap<&str, u32> = HashMap::new();
    // Index 0 is the mandatory null symbol.
    for (i, sym) in ordered.iter().enumerate() {
        symtab_index.insert(sym.name.as_str(), (i + 1) as u32);
    }

    let mut shstrtab = StringTable::new();
    let mut strtab = StringTable::new();

    let section_names: Vec<&str> = sections.iter().map(|s| s.name.as_str()).collect();
    let has_rela = !relocations.is_empty();
    let mut all_section_names = section_names.clone();
    all_section_names.extend([".symtab", ".strtab", ".shstrtab"]);
    if has_rela {
        all_section_names.push(".rela.text");
    }
    for name in &all_section_names {
        shstrtab.intern(name);
    }
    for sym in &ordered {
        strtab.intern(&sym.name);
    }

    // --- symtab ---
    let mut symtab_bytes = Vec::new();
    push_sym(&mut symtab_bytes, 0, 0, 0, SHN_UNDEF, 0, 0); // null symbol
    for sym in &ordered {
        let name_off = strtab.intern(&sym.name);
        let info = ((sym.binding as u8) << 4) | (sym.kind as u8);
        let shndx = sym
            .section
            .as_ref()
            .map(|n| (section_index[n.as_str()] + 1) as u16)
            .unwrap_or(SHN_UNDEF);
        push_sym(&mut symtab_bytes, name_off, info, 0, shndx, sym.value, sym.size);
    }

    // --- rela.text ---
    let mut rela_bytes = Vec::new();
    for rel in relocations {
        let sym_idx = symtab_index[rel.symbol.as_str()];
        let r_info = (u64::from(sym_idx) << 32) | (rel.kind as u64);
        rela_bytes.extend_from_slice(&rel.offset.to_le_bytes());
        rela_bytes.extend_from_slice(&r_info.to_le_bytes());
        rela_bytes.extend_from_slice(&rel.addend.to_le_bytes());
    }

    // --- lay out the file ---
    // section header indices: 0 = null, then caller sections, then
    // symtab/strtab/shstrtab[/rela.text].
    let symtab_shidx = sections.len() + 1;
    let strtab_shidx = sections.len() + 2;
    let shstrtab_shidx = sections.len() + 3;
    let rela_shidx = sections.len() + 4;

    let mut file = vec![0u8; 64]; // ELF header reserved up front
    let mut headers: Vec<Elf64Shdr> = Vec::new();
    headers.push(Elf64Shdr::null());

    for sec in sections {
        let align = sec.align.max(1);
        let sh_type = if sec.is_nobits() { SHT_NOBITS } else { SHT_PROGBITS };
        if sec.is_nobits() {
            headers.push(Elf64Shdr {
                name: shstrtab.intern(&sec.name),
                sh_type,
                flags: sec.flags(),
                addr: 0,
                offset: file.len() as u64,
                size: sec.bytes.len() as u64,
                link: 0,
                info: 0,
                addralign: align,
                entsize: 0,
            });
        } else {
            pad_to(&mut file, align);
            let offset = file.len() as u64;
            file.extend_from_slice(&sec.bytes);
            headers.push(Elf64Shdr {
                name: shstrtab.intern(&sec.name),
                sh_type,
                flags: sec.flags(),
                addr: 0,
                offset,
                size: sec.bytes.len() as u64,
                link: 0,
                info: 0,
                addralign: align,
                entsize: 0,
            });
        }
    }

    pad_to(&mut file, 8);
    let symtab_offset = file.len() as u64;
    file.extend_from_slice(&symtab_bytes);
    headers.push(Elf64Shdr {
        name: shstrtab.intern(".symtab"),
        sh_type: SHT_SYMTAB,
        flags: 0,
        addr: 0,
        offset: symtab_offset,
        size: symtab_bytes.len() as u64,
        link: strtab_shidx as u32,
        info: (local_count + 1) as u32,
        addralign: 8,
        entsize: 24,
    });

    let strtab_offset = file.len() as u64;
    file.extend_from_slice(&strtab.bytes);
    headers.push(Elf64Shdr {
        name: shstrtab.intern(".strtab"),
        sh_type: SHT_STRTAB,
        flags: 0,
        addr: 0,
        offset: strtab_offset,
        size: strtab.bytes.len() as u64,
        link: 0,
        info: 0,
        addralign: 1,
        entsize: 0,
    });

    let shstrtab_offset = file.len() as u64;
    // shstrtab's own name must be interned before we snapshot its bytes.
    let shstrtab_name = shstrtab.intern(".shstrtab");
    file.extend_from_slice(&shstrtab.bytes);
    headers.push(Elf64Shdr {
        name: shstrtab_name,
        sh_type: SHT_STRTAB,
        flags: 0,
        addr: 0,
        offset: shstrtab_offset,
        size: shstrtab.bytes.len() as u64,
        link: 0,
        info: 0,
        addralign: 1,
        entsize: 0,
    });

    if has_rela {
        pad_to(&mut file, 8);
        let rela_offset = file.len() as u64;
        let text_shidx = section_index.get(".text").copied().map(|i| i + 1).unwrap_or(0);
        file.extend_from_slice(&rela_bytes);
        headers.push(Elf64Shdr {
            name: shstrtab.intern(".rela.text"),
            sh_type: SHT_RELA,
            flags: 0,
            addr: 0,
            offset: rela_offset,
            size: rela_bytes.len() as u64,
            link: symtab_shidx as u32,
            info: text_shidx as u32,
            addralign: 8,
            entsize: 24,
        });
    }

    debug_assert_eq!(headers.len(), if has_rela { rela_shidx + 1 } else { rela_shidx });

    pad_to(&mut file, 8);
    let shoff = file.len() as u64;
    for h in &headers {
        h.write_into(&mut file);
    }

    let e_shnum = headers.len() as u16;
    write_elf_header(
        &mut file[..64],
        shoff,
        e_shnum,
        shstrtab_shidx as u16,
    );

    Ok(file)
}

fn push_sym(buf: &mut Vec<u8>, name: u32, info: u8, other: u8, shndx: u16, value: u64, size: u64) {
    buf.extend_from_slice(&name.to_le_bytes());
    buf.push(info);
    buf.push(other);
    buf.extend_from_slice(&shndx.to_le_bytes());
    buf.extend_from_slice(&value.to_le_bytes());
    buf.extend_from_slice(&size.to_le_bytes());
}

struct Elf64Shdr {
    name: u32,
    sh_type: u32,
    flags: u64,
    addr: u64,
    offset: u64,
    size: u64,
    link: u32,
    info: u32,
    addralign: u64,
    entsize: u64,
}

impl Elf64Shdr {
    fn null() -> Self {
        Self {
            name: 0,
            sh_type: SHT_NULL,
            flags: 0,
            addr: 0,
            offset: 0,
            size: 0,
            link: 0,
            info: 0,
            addralign: 0,
            entsize: 0,
        }
    }

    fn write_into(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.name.to_le_bytes());
        buf.extend_from_slice(&self.sh_type.to_le_bytes());
        buf.extend_from_slice(&self.flags.to_le_bytes());
        buf.extend_from_slice(&self.addr.to_le_bytes());
        buf.extend_from_slice(&self.offset.to_le_bytes());
        buf.extend_from_slice(&self.size.to_le_bytes());
        buf.extend_from_slice(&self.link.to_le_bytes());
        buf.extend_from_slice(&self.info.to_le_bytes());
        buf.extend_from_slice(&self.addralign.to_le_bytes());
        buf.extend_from_slice(&self.entsize.to_le_bytes());
    }
}

fn write_elf_header(header: &mut [u8], shoff: u64, shnum: u16, shstrndx: u16) {
    let mut ident = [0u8; EI_NIDENT];
    ident[0..4].copy_from_slice(b"\x7FELF");
    ident[4] = 2; // ELFCLASS64
    ident[5] = 1; // ELFDATA2LSB
    ident[6] = 1; // EV_CURRENT

    header[0..16].copy_from_slice(&ident);
    header[16..18].copy_from_slice(&ET_REL.to_le_bytes());
    header[18..20].copy_from_slice(&EM_X86_64.to_le_bytes());
    header[20..24].copy_from_slice(&EV_CURRENT.to_le_bytes());
    header[24..32].copy_from_slice(&0u64.to_le_bytes()); // e_entry
    header[32..40].copy_from_slice(&0u64.to_le_bytes()); // e_phoff
    header[40..48].copy_from_slice(&shoff.to_le_bytes());
    header[48..52].copy_from_slice(&0u32.to_le_bytes()); // e_flags
    header[52..54].copy_from_slice(&64u16.to_le_bytes()); // e_ehsize
    header[54..56].copy_from_slice(&0u16.to_le_bytes()); // e_phentsize
    header[56..58].copy_from_slice(&0u16.to_le_bytes()); // e_phnum
    header[58..60].copy_from_slice(&64u16.to_le_bytes()); // e_shentsize
    header[60..62].copy_from_slice(&shnum.to_le_bytes());
    header[62..64].copy_from_slice(&shstrndx.to_le_bytes());
}
