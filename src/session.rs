use alloc::string::String;

use crate::types::ClusterID;

/// Current directory of a session, handed to every path-taking operation of a volume
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cursor {
    pub(crate) cluster_id: ClusterID,
    pub(crate) path: String,
}

impl Cursor {
    pub(crate) fn new(root: ClusterID) -> Self {
        Self { cluster_id: root, path: String::from("/") }
    }

    pub fn cluster(&self) -> ClusterID {
        self.cluster_id
    }

    /// Normalized absolute path, `/` for root
    pub fn path(&self) -> &str {
        &self.path
    }
}
