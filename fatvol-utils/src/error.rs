use std::io;

use fatvol::error::Error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Volume(#[from] Error<io::Error>),
    #[error("host file {path}: {source}")]
    Host { path: String, source: io::Error },
}

impl CommandError {
    pub fn host(path: &str) -> impl FnOnce(io::Error) -> Self + '_ {
        move |source| Self::Host { path: path.to_owned(), source }
    }
}

pub type Result<T> = std::result::Result<T, CommandError>;
