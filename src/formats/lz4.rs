use std::any::Any;
use crate::{AppContext, InputTarget, formats::{Format, Stage, DetectResult, ExtractResult}};
pub fn format() -> Format {
    Format { name: "LZ4", detect_func: is_lz4_file, run_func: extract_lz4 }
}

use crate::utils::common;
use crate::utils::compression::decompress_lz4;

/// Largest output of a single block.
const MAX_BLOCK_SIZE: i32 = 8 * 1024 * 1024;

pub fn is_lz4_file(_app_ctx: &AppContext, target: &InputTarget) -> DetectResult {
    let header = common::read_file(target.file(), 0, 4)?;
    if header == b"LZ4P" {
        Ok(Some(Box::new(())))
    } else {
        Ok(None)
    }
}

pub fn extract_lz4(app_ctx: &AppContext, target: &InputTarget, _ctx: Box<dyn Any>) -> ExtractResult {
    let data = common::read_all(target.file())?;
    let mut out_data = Vec::new();
    let mut pos = 4;
    let mut block_count = 0;

    while pos + 4 <= data.len() {
        let block_size = u32::from_le_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]]) as usize;
        pos += 4;
        if block_size == 0 {
            break;
        }
        let block = data.get(pos..pos + block_size)
            .ok_or_else(|| format!("Block {} at {:#x} runs past the end of the file!", block_count, pos - 4))?;
        out_data.extend_from_slice(&decompress_lz4(block, MAX_BLOCK_SIZE)?);
        pos += block_size;
        block_count += 1;
    }
    println!("- {} blocks, {} bytes", block_count, out_data.len());

    let output_path = common::derived_path(app_ctx, target, ".unlz4");
    common::write_file(&output_path, &out_data)?;

    Ok(Stage::Derived(output_path))
}
