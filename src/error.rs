//! CLI Error Types

use derive_more::{Display, Error};
use std::path::PathBuf;

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("could not load configuration")]
    Config,
    #[display("could not set up chapter source")]
    Source,
    #[display("could not load chapter")]
    Load,
    #[display("could not read {}", _0.display())]
    Read(#[error(not(source))] PathBuf),
    #[display("could not sanitize {}", _0.display())]
    Sanitize(#[error(not(source))] PathBuf),
    #[display("could not write output")]
    Output,
    #[display("{_0}")]
    Unsupported(#[error(not(source))] String),
}
