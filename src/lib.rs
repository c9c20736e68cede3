pub mod dispatch;
pub mod error;
pub mod formats;
pub mod keys;
pub mod utils;

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use keys::AesKey;

/// Settings shared by every stage of an extraction. Read-only once built, so
/// independent extractions may run side by side.
pub struct AppContext {
    /// Where derived files and extracted trees are written.
    pub output_dir: PathBuf,
    /// Directory holding `AES.key` and `TVKEY`.
    pub config_dir: PathBuf,
    pub keys: Vec<AesKey>,
    /// Longest chain of stages `dispatch::resolve` will follow.
    pub max_depth: usize,
}

impl AppContext {
    pub fn new(output_dir: impl Into<PathBuf>, config_dir: impl Into<PathBuf>) -> Self {
        AppContext {
            output_dir: output_dir.into(),
            config_dir: config_dir.into(),
            keys: Vec::new(),
            max_depth: dispatch::DEFAULT_MAX_DEPTH,
        }
    }
}

/// The file one stage works on.
pub struct InputTarget {
    pub path: PathBuf,
    file: File,
    len: u64,
}

impl InputTarget {
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        Ok(InputTarget { path: path.to_path_buf(), file, len })
    }

    pub fn file(&self) -> &File {
        &self.file
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
