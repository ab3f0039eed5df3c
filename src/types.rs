use derive_more::{Display, From, Into};

/// Index into the flat cluster space shared by the boot record, both tables and the data region
#[derive(Copy, Clone, Debug, Default, Display, From, Into, Eq, Hash, Ord, PartialOrd, PartialEq)]
pub struct ClusterID(u32);

impl ClusterID {
    /// Never a valid data cluster, the boot record always occupies it
    pub(crate) const BOOT: Self = Self(0);
}
