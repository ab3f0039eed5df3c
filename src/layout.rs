use core::ops::Range;

use crate::error::InputError;
use crate::types::ClusterID;

pub const CLUSTER_SIZE: u32 = 1024;
pub const TABLE_ENTRY_SIZE: u32 = 4;

/// Geometry of a volume, computed once at format time and stored in the superblock
///
/// ```text
/// [0, cluster_size)                    boot region, holds the superblock
/// [table1_offset, table2_offset)       allocation table copy 1
/// [table2_offset, data_offset)         allocation table copy 2
/// [data_offset, total_size)            directory and file clusters
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VolumeLayout {
    pub total_size: u32,
    pub cluster_size: u32,
    pub table_entry_size: u32,
    pub table_cluster_count: u32,
    /// Number of table entries, covering reserved and data clusters alike
    pub cluster_count: u32,
    pub table1_offset: u32,
    pub table2_offset: u32,
    pub data_offset: u32,
}

impl VolumeLayout {
    pub fn new(total_size: u64) -> Result<Self, InputError> {
        if total_size > i32::MAX as u64 {
            return Err(InputError::Size);
        }
        let total_size = total_size as u32;
        let cluster_count = total_size / CLUSTER_SIZE;
        let table_size = cluster_count * TABLE_ENTRY_SIZE;
        let table_cluster_count = table_size.div_ceil(CLUSTER_SIZE);
        let table1_offset = CLUSTER_SIZE;
        let table2_offset = table1_offset + table_cluster_count * CLUSTER_SIZE;
        let data_offset = table2_offset + table_cluster_count * CLUSTER_SIZE;
        let layout = Self {
            total_size,
            cluster_size: CLUSTER_SIZE,
            table_entry_size: TABLE_ENTRY_SIZE,
            table_cluster_count,
            cluster_count,
            table1_offset,
            table2_offset,
            data_offset,
        };
        if cluster_count == 0 || layout.data_clusters().is_empty() {
            return Err(InputError::Size);
        }
        debug!("Layout for {} bytes: {:?}", total_size, layout);
        Ok(layout)
    }

    /// Clusters taken by the boot record and both table copies
    pub fn reserved_clusters(&self) -> u32 {
        2 * self.table_cluster_count + 1
    }

    pub fn table_size(&self) -> u32 {
        self.table_cluster_count * self.cluster_size
    }

    pub fn first_data_cluster(&self) -> ClusterID {
        self.reserved_clusters().into()
    }

    /// Root directory always takes the first data cluster
    pub fn root(&self) -> ClusterID {
        self.first_data_cluster()
    }

    pub fn data_clusters(&self) -> Range<u32> {
        self.reserved_clusters()..self.cluster_count
    }

    pub fn is_data_cluster(&self, cluster_id: ClusterID) -> bool {
        self.data_clusters().contains(&u32::from(cluster_id))
    }

    /// Byte offset of a data cluster, caller guarantees `cluster_id` is a data cluster
    pub fn cluster_offset(&self, cluster_id: ClusterID) -> u64 {
        let index = u32::from(cluster_id) - self.reserved_clusters();
        self.data_offset as u64 + index as u64 * self.cluster_size as u64
    }

    /// Byte offset of a cluster's entry in table copy 0 or 1
    pub fn table_entry_offset(&self, copy: usize, cluster_id: ClusterID) -> u64 {
        let base = match copy {
            0 => self.table1_offset,
            _ => self.table2_offset,
        };
        base as u64 + u32::from(cluster_id) as u64 * self.table_entry_size as u64
    }

    /// Check every field matches the geometry derived from `total_size`,
    /// without trusting any of the stored fields in arithmetic
    pub(crate) fn is_consistent(&self) -> bool {
        match Self::new(self.total_size as u64) {
            Ok(layout) => layout == *self,
            Err(_) => false,
        }
    }
}
