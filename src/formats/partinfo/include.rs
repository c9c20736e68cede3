use crate::utils::common;
use binrw::BinRead;

pub static PARTINFO_MAGICS: [u32; 3] = [0x20110729, 0x20120716, 0x20140825];
pub static MAX_DEVICES: usize = 4;
pub static MAX_PARTITIONS: u8 = 64;

#[derive(BinRead)]
pub struct PartmapHeader {
    pub magic: u32,
    pub cur_epk_ver: u32,
    pub old_epk_ver: u32,
    pub nmap: u8,
    pub npartition: u8,
    _padding: [u8; 2],
}
impl PartmapHeader {
    pub fn is_sane(&self) -> bool {
        PARTINFO_MAGICS.contains(&self.magic)
            && (1..=MAX_DEVICES).contains(&(self.nmap as usize))
            && (1..=MAX_PARTITIONS).contains(&self.npartition)
    }
}

#[derive(BinRead)]
pub struct DeviceInfo {
    name_bytes: [u8; 32],
    pub size: u64,
    pub phys: u64,
    pub virt: u32,
    pub cached: u32,
    pub bandwidth: u32,
    pub used: u32,
}
impl DeviceInfo {
    pub fn name(&self) -> String {
        common::string_from_bytes(&self.name_bytes)
    }
}

#[derive(BinRead)]
pub struct PartitionInfo {
    name_bytes: [u8; 32],
    pub offset: u64,
    pub size: u64,
    filename_bytes: [u8; 64],
    pub filesize: u32,
    pub sw_ver: u32,
    pub used: u8,
    pub valid: u8,
    _padding: [u8; 2],
    pub mask_flags: u32,
}
impl PartitionInfo {
    pub fn name(&self) -> String {
        common::string_from_bytes(&self.name_bytes)
    }
    pub fn filename(&self) -> String {
        common::string_from_bytes(&self.filename_bytes)
    }
}

pub fn version_string(version: u32) -> String {
    let v = version.to_le_bytes();
    format!("{:02x}.{:02x}.{:02x}", v[2], v[1], v[0])
}
