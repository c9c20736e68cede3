use std::any::Any;
use crate::{AppContext, InputTarget, formats::{Format, Stage, DetectResult, ExtractResult}};
pub fn format() -> Format {
    Format { name: "LZO", detect_func: is_lzo_file, run_func: extract_lzo }
}

use crate::utils::common;
use crate::utils::lzop::{decompress_lzop, LZOP_MAGIC};

pub fn is_lzo_file(_app_ctx: &AppContext, target: &InputTarget) -> DetectResult {
    let header = common::read_file(target.file(), 0, 9)?;
    if header == LZOP_MAGIC {
        Ok(Some(Box::new(())))
    } else {
        Ok(None)
    }
}

pub fn extract_lzo(app_ctx: &AppContext, target: &InputTarget, _ctx: Box<dyn Any>) -> ExtractResult {
    let data = common::read_all(target.file())?;
    let out_data = decompress_lzop(&data)?;

    let output_path = common::derived_path(app_ctx, target, ".lzounpack");
    common::write_file(&output_path, &out_data)?;
    println!("- Decompressed {} -> {} bytes", data.len(), out_data.len());

    Ok(Stage::Derived(output_path))
}
