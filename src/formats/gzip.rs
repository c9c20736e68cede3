use std::any::Any;
use crate::{AppContext, InputTarget, formats::{Format, Stage, DetectResult, ExtractResult}};
pub fn format() -> Format {
    Format { name: "gzip", detect_func: is_gzip_file, run_func: extract_gzip }
}

use std::path::{Path, PathBuf};
use crate::utils::common;
use crate::utils::compression::decompress_gzip;

pub fn is_gzip_file(_app_ctx: &AppContext, target: &InputTarget) -> DetectResult {
    let magic = common::read_file(target.file(), 0, 3)?;
    // deflate is the only method gzip defines
    if magic == b"\x1F\x8B\x08" {
        Ok(Some(Box::new(())))
    } else {
        Ok(None)
    }
}

/// Where the inflated data goes: the name stored in the gzip header, else
/// the input name without its `.gz`.
fn output_name(target: &InputTarget, stored_name: Option<String>) -> String {
    let stored = stored_name
        .as_deref()
        .and_then(|n| Path::new(n).file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty());
    if let Some(name) = stored {
        return name;
    }
    let input_name = target.file_name();
    match input_name.strip_suffix(".gz") {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => format!("{}.ungz", input_name),
    }
}

pub fn extract_gzip(app_ctx: &AppContext, target: &InputTarget, _ctx: Box<dyn Any>) -> ExtractResult {
    let data = common::read_all(target.file())?;
    let (out_data, stored_name) = decompress_gzip(&data)?;

    let mut output_path: PathBuf = app_ctx.output_dir.join(output_name(target, stored_name));
    if output_path == target.path {
        output_path = common::derived_path(app_ctx, target, ".ungz");
    }
    common::write_file(&output_path, &out_data)?;
    println!("- Inflated {} -> {} bytes: {}", data.len(), out_data.len(), output_path.display());

    Ok(Stage::Derived(output_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::{write::GzEncoder, Compression, GzBuilder};
    use std::io::Write;

    #[test]
    fn uses_stored_name() {
        let dir = common::scratch_dir("gzip-named");
        let app_ctx = AppContext::new(&dir, &dir);
        let mut enc = GzBuilder::new().filename("../../etc/boot.img").write(Vec::new(), Compression::default());
        enc.write_all(b"boot image").unwrap();
        let target = common::scratch_target(&dir, "boot.bin", &enc.finish().unwrap());

        let ctx = is_gzip_file(&app_ctx, &target).unwrap().unwrap();
        let stage = extract_gzip(&app_ctx, &target, ctx).unwrap();
        // only the final component of the stored name is used
        assert_eq!(stage, Stage::Derived(dir.join("boot.img")));
        assert_eq!(std::fs::read(dir.join("boot.img")).unwrap(), b"boot image");
    }

    #[test]
    fn strips_gz_suffix() {
        let dir = common::scratch_dir("gzip-plain");
        let app_ctx = AppContext::new(&dir, &dir);
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(b"tar data").unwrap();
        let target = common::scratch_target(&dir, "rootfs.tar.gz", &enc.finish().unwrap());

        let stage = extract_gzip(&app_ctx, &target, Box::new(())).unwrap();
        assert_eq!(stage, Stage::Derived(dir.join("rootfs.tar")));
    }

    #[test]
    fn stored_name_equal_to_input() {
        let dir = common::scratch_dir("gzip-same");
        let app_ctx = AppContext::new(&dir, &dir);
        let mut enc = GzBuilder::new().filename("image").write(Vec::new(), Compression::default());
        enc.write_all(b"data").unwrap();
        let target = common::scratch_target(&dir, "image", &enc.finish().unwrap());

        let stage = extract_gzip(&app_ctx, &target, Box::new(())).unwrap();
        assert_eq!(stage, Stage::Derived(dir.join("image.ungz")));
    }

    #[test]
    fn other_methods_are_not_gzip() {
        let dir = common::scratch_dir("gzip-detect");
        let app_ctx = AppContext::new(&dir, &dir);
        let target = common::scratch_target(&dir, "x", b"\x1F\x8B\x01rest");
        assert!(is_gzip_file(&app_ctx, &target).unwrap().is_none());
    }
}
