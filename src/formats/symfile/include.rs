use binrw::BinRead;

pub static SYMFILE_MAGIC: u32 = 0xB12791EE;

#[derive(BinRead)]
pub struct SymHeader {
    pub magic: u32,
    _unknown: u32,
    /// Total size of the symbol data after this header.
    pub size: u32,
    pub n_symbols: u32,
    /// Size of the hash/line table between the entries and the names.
    pub tail_size: u32,
}

#[derive(BinRead)]
pub struct SymEntry {
    pub addr: u32,
    pub end: u32,
    pub name_offset: u32,
}
