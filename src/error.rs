use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Outcome of a failed extraction chain.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported input file format: {}", .0.display())]
    UnrecognizedFormat(PathBuf),

    #[error("cannot read {}: {source}", path.display())]
    ReadFailure { path: PathBuf, source: io::Error },

    #[error("cannot write {}: {source}", path.display())]
    WriteFailure { path: PathBuf, source: io::Error },

    #[error("gave up after {0} stages")]
    ChainTooLong(usize),

    #[error("{format} stage failed on {}: {cause}", path.display())]
    Stage {
        format: &'static str,
        path: PathBuf,
        cause: Box<dyn std::error::Error>,
    },
}
