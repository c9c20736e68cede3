use std::any::Any;
use std::path::PathBuf;
use crate::{AppContext, InputTarget};

/// What an extractor produced.
#[derive(Debug, PartialEq, Eq)]
pub enum Stage {
    /// A single derived file that should be identified in turn.
    Derived(PathBuf),
    /// Output is a tree or a final artifact; the chain ends here.
    Terminal,
}

pub type DetectResult = Result<Option<Box<dyn Any>>, Box<dyn std::error::Error>>;
pub type ExtractResult = Result<Stage, Box<dyn std::error::Error>>;

pub struct Format {
    pub name: &'static str,
    pub detect_func: fn(&AppContext, &InputTarget) -> DetectResult,
    pub run_func: fn(&AppContext, &InputTarget, Box<dyn Any>) -> ExtractResult,
}

pub mod lzo;
pub mod nfsb;
pub mod lz4;
pub mod squashfs;
pub mod gzip;
pub mod cramfs;

pub mod epk;
pub mod epk1;
pub mod epk2;
pub mod epk3;

pub mod kernel;
pub mod lzhs;
pub mod partinfo;
pub mod jffs2;
pub mod str_pif;
pub mod symfile;

/// Every known format in probe order. Compression and filesystem wrappers
/// go first; the name-based PIF probe and the symbol table go last.
pub fn get_registry() -> Vec<Format> {
    vec![
        crate::formats::lzo::format(),
        crate::formats::nfsb::format(),
        crate::formats::lz4::format(),
        crate::formats::squashfs::format(),
        crate::formats::gzip::format(),
        crate::formats::cramfs::format_be(),
        crate::formats::cramfs::format_le(),
        crate::formats::epk2::format(),
        crate::formats::epk3::format(),
        crate::formats::epk1::format(),
        crate::formats::kernel::format(),
        crate::formats::lzhs::format(),
        crate::formats::partinfo::format(),
        crate::formats::jffs2::format(),
        crate::formats::str_pif::str_format(),
        crate::formats::str_pif::pif_format(),
        crate::formats::symfile::format(),
    ]
}
