use std::path::PathBuf;

use crate::parser::ParseError;
use crate::resolve::ResolveError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Input not found: {}", .0.display())]
    InputUnavailable(PathBuf),
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}
