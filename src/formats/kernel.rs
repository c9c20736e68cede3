use std::any::Any;
use crate::{AppContext, InputTarget, formats::{Format, Stage, DetectResult, ExtractResult}};
pub fn format() -> Format {
    Format { name: "uImage kernel", detect_func: is_kernel_file, run_func: extract_kernel }
}

use std::io::{Seek, SeekFrom};
use binrw::{BinRead, BinReaderExt};
use crate::utils::common;

const UIMAGE_MAGIC: u32 = 0x27051956;
const UIMAGE_HEADER_SIZE: u64 = 64;

#[derive(BinRead)]
#[br(big)]
pub struct UImageHeader {
    pub magic: u32,
    _header_crc: u32,
    pub time: u32,
    pub size: u32,
    pub load_address: u32,
    pub entry_point: u32,
    _data_crc: u32,
    pub os: u8,
    pub arch: u8,
    pub image_type: u8,
    pub compression: u8,
    name_bytes: [u8; 32],
}
impl UImageHeader {
    pub fn name(&self) -> String {
        common::string_from_bytes(&self.name_bytes)
    }
    fn compression_name(&self) -> &'static str {
        match self.compression {
            0 => "none",
            1 => "gzip",
            2 => "bzip2",
            3 => "lzma",
            4 => "lzo",
            5 => "lz4",
            _ => "unknown",
        }
    }
}

pub fn is_kernel_file(_app_ctx: &AppContext, target: &InputTarget) -> DetectResult {
    let magic = common::read_file(target.file(), 0, 4)?;
    if magic == UIMAGE_MAGIC.to_be_bytes() {
        Ok(Some(Box::new(())))
    } else {
        Ok(None)
    }
}

pub fn extract_kernel(app_ctx: &AppContext, target: &InputTarget, _ctx: Box<dyn Any>) -> ExtractResult {
    let mut file = target.file();
    file.seek(SeekFrom::Start(0))?;
    let header: UImageHeader = file.read_be()?;

    println!("Image name: {}\nLoad address: {:#010x}\nEntry point: {:#010x}\nData size: {}\nCompression: {}",
            header.name(), header.load_address, header.entry_point, header.size, header.compression_name());

    if UIMAGE_HEADER_SIZE + header.size as u64 > target.len() {
        return Err(format!("Image claims {} bytes but only {} follow the header!", header.size, target.len() - UIMAGE_HEADER_SIZE).into());
    }
    let data = common::read_exact(&mut file, header.size as usize)?;

    let output_path = common::derived_path(app_ctx, target, ".unpaked");
    common::write_file(&output_path, &data)?;

    Ok(Stage::Derived(output_path))
}

#[cfg(test)]
pub mod tests {
    use super::*;

    pub fn uimage(name: &str, payload: &[u8]) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&UIMAGE_MAGIC.to_be_bytes());
        data.extend_from_slice(&0u32.to_be_bytes()); // header crc
        data.extend_from_slice(&0x5000_0000u32.to_be_bytes()); // time
        data.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        data.extend_from_slice(&0x8000u32.to_be_bytes()); // load
        data.extend_from_slice(&0x8000u32.to_be_bytes()); // entry
        data.extend_from_slice(&0u32.to_be_bytes()); // data crc
        data.extend_from_slice(&[5, 2, 2, 0]); // linux, arm, kernel, none
        let mut name_bytes = [0u8; 32];
        name_bytes[..name.len()].copy_from_slice(name.as_bytes());
        data.extend_from_slice(&name_bytes);
        data.extend_from_slice(payload);
        data
    }

    #[test]
    fn payload_after_header() {
        let dir = common::scratch_dir("kernel");
        let app_ctx = AppContext::new(&dir, &dir);
        let mut image = uimage("Linux-2.6.35", b"zImage bytes");
        image.extend_from_slice(b"trailing padding");
        let target = common::scratch_target(&dir, "kernel", &image);

        let ctx = is_kernel_file(&app_ctx, &target).unwrap().unwrap();
        let stage = extract_kernel(&app_ctx, &target, ctx).unwrap();
        assert_eq!(stage, Stage::Derived(dir.join("kernel.unpaked")));
        assert_eq!(std::fs::read(dir.join("kernel.unpaked")).unwrap(), b"zImage bytes");
    }

    #[test]
    fn size_past_end() {
        let dir = common::scratch_dir("kernel-short");
        let app_ctx = AppContext::new(&dir, &dir);
        let mut image = uimage("x", b"0123456789");
        image.truncate(image.len() - 1);
        let target = common::scratch_target(&dir, "kernel", &image);
        assert!(extract_kernel(&app_ctx, &target, Box::new(())).is_err());
    }
}
