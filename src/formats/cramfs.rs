use std::any::Any;
use crate::{AppContext, InputTarget, formats::{Format, Stage, DetectResult, ExtractResult}};
pub fn format_be() -> Format {
    Format { name: "CramFS (big endian)", detect_func: is_cramfs_be_file, run_func: swap_cramfs_be }
}
pub fn format_le() -> Format {
    Format { name: "CramFS", detect_func: is_cramfs_le_file, run_func: extract_cramfs_le }
}

use std::ffi::OsStr;
use crate::utils::common;
use crate::utils::external::{remove_dir_if_exists, run_tool};

const CRAMFS_MAGIC: u32 = 0x28CD3D45;
const CRAMFS_SIGNATURE: &[u8] = b"Compressed ROMFS";

fn cramfs_magic(target: &InputTarget) -> Result<Option<u32>, Box<dyn std::error::Error>> {
    let header = common::read_file(target.file(), 0, 32)?;
    if header.len() < 32 || &header[16..32] != CRAMFS_SIGNATURE {
        return Ok(None);
    }
    Ok(Some(u32::from_le_bytes([header[0], header[1], header[2], header[3]])))
}

pub fn is_cramfs_be_file(_app_ctx: &AppContext, target: &InputTarget) -> DetectResult {
    if cramfs_magic(target)? == Some(CRAMFS_MAGIC.swap_bytes()) {
        Ok(Some(Box::new(())))
    } else {
        Ok(None)
    }
}

pub fn is_cramfs_le_file(_app_ctx: &AppContext, target: &InputTarget) -> DetectResult {
    if cramfs_magic(target)? == Some(CRAMFS_MAGIC) {
        Ok(Some(Box::new(())))
    } else {
        Ok(None)
    }
}

/// Byte swaps a big endian image; the swapped copy goes through the chain
/// again as a little endian one.
pub fn swap_cramfs_be(app_ctx: &AppContext, target: &InputTarget, _ctx: Box<dyn Any>) -> ExtractResult {
    let output_path = common::derived_path(app_ctx, target, ".cramswap");
    run_tool("cramfsswap", [target.path.as_os_str(), output_path.as_os_str()])?;
    println!("- Swapped to {}", output_path.display());

    Ok(Stage::Derived(output_path))
}

pub fn extract_cramfs_le(app_ctx: &AppContext, target: &InputTarget, _ctx: Box<dyn Any>) -> ExtractResult {
    let dest = common::derived_path(app_ctx, target, ".uncramfs");
    remove_dir_if_exists(&dest)?;

    run_tool("cramfsck", [OsStr::new("-x"), dest.as_os_str(), target.path.as_os_str()])?;
    println!("- Extracted to {}", dest.display());

    Ok(Stage::Terminal)
}
