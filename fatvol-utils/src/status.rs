use std::io;

use derive_more::Display;
use fatvol::error::{Error, OperationError};

/// One-line outcome printed after a command touching the volume tree
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq)]
pub enum Status {
    #[display("OK")]
    Ok,
    #[display("PATH NOT FOUND")]
    PathNotFound,
    #[display("FILE NOT FOUND")]
    FileNotFound,
    #[display("EXIST")]
    Exist,
    #[display("NOT EMPTY")]
    NotEmpty,
}

impl Status {
    pub fn of(error: &Error<io::Error>) -> Option<Self> {
        match error {
            Error::Operation(OperationError::PathNotFound) => Some(Self::PathNotFound),
            Error::Operation(OperationError::NotDirectory) => Some(Self::PathNotFound),
            Error::Operation(OperationError::NotFound) => Some(Self::FileNotFound),
            Error::Operation(OperationError::AlreadyExists) => Some(Self::Exist),
            Error::Operation(OperationError::NotEmpty) => Some(Self::NotEmpty),
            _ => None,
        }
    }
}
