use std::any::Any;
use crate::{AppContext, InputTarget, formats::{Format, Stage, DetectResult, ExtractResult}};
pub fn format() -> Format {
    Format { name: "JFFS2", detect_func: is_jffs2_file, run_func: extract_jffs2 }
}

use std::ffi::OsStr;
use crate::utils::common;
use crate::utils::external::{remove_dir_if_exists, run_tool};

const JFFS2_MAGIC: u16 = 0x1985;
/// Node types an image can start with: dirent, inode, clean marker, padding.
const JFFS2_NODE_TYPES: [u16; 4] = [0xE001, 0xE002, 0x2003, 0x2004];

pub fn is_jffs2_file(_app_ctx: &AppContext, target: &InputTarget) -> DetectResult {
    let header = common::read_file(target.file(), 0, 4)?;
    if header.len() < 4 {
        return Ok(None);
    }
    let le = (u16::from_le_bytes([header[0], header[1]]), u16::from_le_bytes([header[2], header[3]]));
    let be = (u16::from_be_bytes([header[0], header[1]]), u16::from_be_bytes([header[2], header[3]]));
    for (magic, node_type) in [le, be] {
        if magic == JFFS2_MAGIC && JFFS2_NODE_TYPES.contains(&node_type) {
            return Ok(Some(Box::new(())));
        }
    }
    Ok(None)
}

pub fn extract_jffs2(app_ctx: &AppContext, target: &InputTarget, _ctx: Box<dyn Any>) -> ExtractResult {
    let dest = common::derived_path(app_ctx, target, ".unjffs2");
    remove_dir_if_exists(&dest)?;

    run_tool("jefferson", [OsStr::new("-d"), dest.as_os_str(), target.path.as_os_str()])?;
    println!("- Extracted to {}", dest.display());

    Ok(Stage::Terminal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn either_byte_order() {
        let dir = common::scratch_dir("jffs2");
        let app_ctx = AppContext::new(&dir, &dir);
        let le = common::scratch_target(&dir, "le", &[0x85, 0x19, 0x03, 0x20, 0, 0, 0, 0x0C]);
        assert!(is_jffs2_file(&app_ctx, &le).unwrap().is_some());
        let be = common::scratch_target(&dir, "be", &[0x19, 0x85, 0xE0, 0x01]);
        assert!(is_jffs2_file(&app_ctx, &be).unwrap().is_some());
        let unknown_node = common::scratch_target(&dir, "x", &[0x85, 0x19, 0x00, 0x00]);
        assert!(is_jffs2_file(&app_ctx, &unknown_node).unwrap().is_none());
    }
}
