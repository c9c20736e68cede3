use std::any::Any;
use crate::{AppContext, InputTarget, formats::{Format, Stage, DetectResult, ExtractResult}};
pub fn format() -> Format {
    Format { name: "LZHS boot image", detect_func: is_lzhs_file, run_func: extract_lzhs }
}

use crate::utils::common;
use crate::utils::lzhs::{self, LzhsHeader, HEADER_SIZE};

pub fn is_lzhs_file(_app_ctx: &AppContext, target: &InputTarget) -> DetectResult {
    let header_bytes = common::read_file(target.file(), 0, HEADER_SIZE)?;
    let Ok(header) = LzhsHeader::parse(&header_bytes) else { return Ok(None) };
    if header.is_plausible(target.len()) {
        Ok(Some(Box::new(header)))
    } else {
        Ok(None)
    }
}

pub fn extract_lzhs(app_ctx: &AppContext, target: &InputTarget, ctx: Box<dyn Any>) -> ExtractResult {
    let header = ctx.downcast::<LzhsHeader>().map_err(|_| "Missing LZHS header")?;
    println!("Uncompressed size: {}\nCompressed size: {}\nChecksum: {:#04x}",
            header.uncompressed_size, header.compressed_size, header.checksum);

    let data = common::read_all(target.file())?;
    let out_data = lzhs::decompress(&data)?;
    println!("- Checksum OK");

    let output_path = common::derived_path(app_ctx, target, ".unlzhs");
    common::write_file(&output_path, &out_data)?;

    Ok(Stage::Derived(output_path))
}
