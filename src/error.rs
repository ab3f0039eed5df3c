use displaydoc::Display;

use crate::types::ClusterID;

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    /// Volume size yields no usable data cluster
    Size,
    /// Name exceeds 12 bytes
    NameTooLong,
    /// Name is empty, reserved or contains invalid characters
    InvalidName,
}

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, thiserror::Error)]
pub enum OperationError {
    /// Path not found
    PathNotFound,
    /// No such file or directory
    NotFound,
    /// File or directory already exists
    AlreadyExists,
    /// Directory not empty
    NotEmpty,
    /// Not a directory
    NotDirectory,
    /// Is a directory
    IsDirectory,
}

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, thiserror::Error)]
pub enum AllocationError {
    /// No free cluster left
    NoMoreCluster,
}

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, thiserror::Error)]
pub enum DataError {
    /// Not a fatvol volume
    NotFATVolume,
    /// Superblock geometry inconsistent
    Superblock,
    /// Storage shorter than the volume size recorded in the superblock
    Truncated,
    /// Malformed directory record
    Metadata,
    /// Corrupted cluster chain
    FATChain,
    /// Cluster {0} out of range
    ClusterOutOfRange(ClusterID),
}

#[derive(Debug, thiserror::Error)]
pub enum Error<E> {
    #[error("I/O error: {0:?}")]
    IO(E),
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Operation(#[from] OperationError),
    #[error(transparent)]
    Allocation(#[from] AllocationError),
    #[error(transparent)]
    Data(#[from] DataError),
}

impl<E> Error<E> {
    /// True when the error was caused by a corrupted chain or a BAD cluster
    pub fn is_corrupted(&self) -> bool {
        matches!(self, Self::Data(DataError::FATChain))
    }
}

impl<E> PartialEq<OperationError> for Error<E> {
    fn eq(&self, other: &OperationError) -> bool {
        matches!(self, Self::Operation(e) if e == other)
    }
}
