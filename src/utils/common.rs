use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::error::ExtractError;
use crate::{AppContext, InputTarget};

/// Reads up to `size` bytes at `offset`. The result is shorter when the file
/// ends first, so probes on small files simply fail to match.
pub fn read_file(mut file: &File, offset: u64, size: usize) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    file.seek(SeekFrom::Start(offset))?;
    let mut buffer = Vec::with_capacity(size);
    file.take(size as u64).read_to_end(&mut buffer)?;

    // reset seek (!
    file.seek(SeekFrom::Start(offset))?;
    Ok(buffer)
}

pub fn read_exact<R: Read>(reader: &mut R, size: usize) -> io::Result<Vec<u8>> {
    let mut buf = vec![0u8; size];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

pub fn read_all(mut file: &File) -> io::Result<Vec<u8>> {
    file.seek(SeekFrom::Start(0))?;
    let mut data = Vec::new();
    file.read_to_end(&mut data)?;
    Ok(data)
}

pub fn string_from_bytes(buf: &[u8]) -> String {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    String::from_utf8_lossy(&buf[..end]).to_string()
}

/// A name read from firmware, checked to be a single path component so it
/// stays inside the output directory.
pub fn safe_name(name: &str) -> Result<String, Box<dyn std::error::Error>> {
    if name.is_empty() || name == "." || name == ".." || name.contains(|c: char| matches!(c, '/' | '\\' | '\0')) {
        return Err(format!("Refusing to use {:?} as a file name!", name).into());
    }
    Ok(name.to_string())
}

/// `<output_dir>/<input name><suffix>`
pub fn derived_path(app_ctx: &AppContext, target: &InputTarget, suffix: &str) -> PathBuf {
    app_ctx.output_dir.join(format!("{}{}", target.file_name(), suffix))
}

/// `<output_dir>/<input name><suffix>/`, created empty.
pub fn derived_dir(app_ctx: &AppContext, target: &InputTarget, suffix: &str) -> Result<PathBuf, ExtractError> {
    let dir = derived_path(app_ctx, target, suffix);
    fs::create_dir_all(&dir).map_err(|source| ExtractError::WriteFailure { path: dir.clone(), source })?;
    Ok(dir)
}

pub fn write_file(path: &Path, data: &[u8]) -> Result<(), ExtractError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| ExtractError::WriteFailure { path: parent.to_path_buf(), source })?;
        }
    }
    fs::write(path, data).map_err(|source| ExtractError::WriteFailure { path: path.to_path_buf(), source })
}

/// Appends to `path`, creating it if needed. Segmented paks are written this way.
pub fn append_file(path: &Path, data: &[u8]) -> Result<(), ExtractError> {
    use std::io::Write;
    let mut file = fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .map_err(|source| ExtractError::WriteFailure { path: path.to_path_buf(), source })?;
    file.write_all(data).map_err(|source| ExtractError::WriteFailure { path: path.to_path_buf(), source })
}

/// Fresh per-test directory under the system temp dir.
#[cfg(test)]
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("epkextract-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// Writes `data` to `name` in `dir` and opens it as a stage input.
#[cfg(test)]
pub fn scratch_target(dir: &Path, name: &str, data: &[u8]) -> InputTarget {
    let path = dir.join(name);
    fs::write(&path, data).unwrap();
    InputTarget::open(&path).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_stops_at_nul() {
        assert_eq!(string_from_bytes(b"boot\0\0junk"), "boot");
        assert_eq!(string_from_bytes(b"kernel"), "kernel");
    }

    #[test]
    fn names_must_stay_in_one_directory() {
        assert_eq!(safe_name("rootfs").unwrap(), "rootfs");
        assert_eq!(safe_name("boot.img").unwrap(), "boot.img");
        for bad in ["", ".", "..", "../../evil", "a/b", "a\\b", "/etc"] {
            assert!(safe_name(bad).is_err(), "{:?} accepted", bad);
        }
    }

    #[test]
    fn short_read_at_end_of_file() {
        let path = std::env::temp_dir().join(format!("epkextract-common-{}", std::process::id()));
        fs::write(&path, b"0123456789").unwrap();
        let file = File::open(&path).unwrap();
        assert_eq!(read_file(&file, 8, 16).unwrap(), b"89");
        assert!(read_file(&file, 20, 4).unwrap().is_empty());
        fs::remove_file(&path).unwrap();
    }
}
