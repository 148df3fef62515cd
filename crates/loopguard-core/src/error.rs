use std::result;

use thiserror::Error;

/// Error taxonomy for the loop-guard engine.
///
/// `Parse` and `Generation` are recovered by the transform entry point
/// (the original source is returned unchanged); `Config` is a caller
/// contract violation and is the only variant a caller sees as `Err`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("parse error: {0}")]
    Parse(String),
    #[error("code generation error: {0}")]
    Generation(String),
    #[error("invalid guard configuration: {0}")]
    Config(String),
}

pub type Result<T> = result::Result<T, Error>;

// The code generator writes through io::Write.
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Generation(e.to_string())
    }
}
