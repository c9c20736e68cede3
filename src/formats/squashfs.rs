use std::any::Any;
use crate::{AppContext, InputTarget, formats::{Format, Stage, DetectResult, ExtractResult}};
pub fn format() -> Format {
    Format { name: "SquashFS", detect_func: is_squashfs_file, run_func: extract_squashfs }
}

use std::ffi::OsStr;
use crate::utils::common;
use crate::utils::external::{remove_dir_if_exists, run_tool};

pub fn is_squashfs_file(_app_ctx: &AppContext, target: &InputTarget) -> DetectResult {
    let magic = common::read_file(target.file(), 0, 4)?;
    if magic == b"hsqs" || magic == b"sqsh" {
        Ok(Some(Box::new(())))
    } else {
        Ok(None)
    }
}

pub fn extract_squashfs(app_ctx: &AppContext, target: &InputTarget, _ctx: Box<dyn Any>) -> ExtractResult {
    let dest = common::derived_path(app_ctx, target, ".unsquashfs");
    remove_dir_if_exists(&dest)?;

    run_tool("unsquashfs", [OsStr::new("-d"), dest.as_os_str(), target.path.as_os_str()])?;
    println!("- Extracted to {}", dest.display());

    Ok(Stage::Terminal)
}
