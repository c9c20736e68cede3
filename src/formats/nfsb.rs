use std::any::Any;
use crate::{AppContext, InputTarget, formats::{Format, Stage, DetectResult, ExtractResult}};
pub fn format() -> Format {
    Format { name: "NFSB", detect_func: is_nfsb_file, run_func: extract_nfsb }
}

use std::fs::File;
use std::io::{self, Seek, SeekFrom};
use crate::error::ExtractError;
use crate::utils::common;

/// The wrapped image starts after a fixed size header block.
const NFSB_HEADER_SIZE: u64 = 0x1000;

pub fn is_nfsb_file(_app_ctx: &AppContext, target: &InputTarget) -> DetectResult {
    let header = common::read_file(target.file(), 0, 4)?;
    if header == b"NFSB" {
        Ok(Some(Box::new(())))
    } else {
        Ok(None)
    }
}

pub fn extract_nfsb(app_ctx: &AppContext, target: &InputTarget, _ctx: Box<dyn Any>) -> ExtractResult {
    if target.len() < NFSB_HEADER_SIZE {
        return Err(format!("NFSB file is only {} bytes!", target.len()).into());
    }
    let mut file = target.file();
    file.seek(SeekFrom::Start(NFSB_HEADER_SIZE))?;

    let output_path = common::derived_path(app_ctx, target, ".unnfsb");
    let write_err = |source| ExtractError::WriteFailure { path: output_path.clone(), source };
    let mut out_file = File::create(&output_path).map_err(write_err)?;
    let copied = io::copy(&mut file, &mut out_file).map_err(write_err)?;
    println!("- Payload: {} bytes", copied);

    Ok(Stage::Derived(output_path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_header_block() {
        let dir = common::scratch_dir("nfsb");
        let app_ctx = AppContext::new(&dir, &dir);
        let mut data = b"NFSB".to_vec();
        data.resize(0x1000, 0xAA);
        data.extend_from_slice(b"hsqs payload");
        let target = common::scratch_target(&dir, "lgapp.pak", &data);

        let ctx = is_nfsb_file(&app_ctx, &target).unwrap().unwrap();
        let stage = extract_nfsb(&app_ctx, &target, ctx).unwrap();
        let out = dir.join("lgapp.pak.unnfsb");
        assert_eq!(stage, Stage::Derived(out.clone()));
        assert_eq!(std::fs::read(out).unwrap(), b"hsqs payload");
    }

    #[test]
    fn short_file_is_an_error() {
        let dir = common::scratch_dir("nfsb-short");
        let app_ctx = AppContext::new(&dir, &dir);
        let target = common::scratch_target(&dir, "short", b"NFSB....");
        assert!(extract_nfsb(&app_ctx, &target, Box::new(())).is_err());
    }
}
