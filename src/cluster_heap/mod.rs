pub(crate) mod directory;
pub(crate) mod file;

use core::fmt::Debug;

use alloc::vec::Vec;

use crate::error::{DataError, Error};
use crate::fat::FAT;
use crate::io::{self, Wrapper};
use crate::layout::{VolumeLayout, CLUSTER_SIZE};
use crate::region::fat::Entry;
use crate::types::ClusterID;

pub(crate) type Cluster = [u8; CLUSTER_SIZE as usize];

/// Data region of a volume together with the table that chains it
pub(crate) struct ClusterHeap<IO> {
    pub io: Wrapper<IO>,
    pub fat: FAT,
    pub layout: VolumeLayout,
}

impl<E: Debug, IO: io::IO<Error = E>> ClusterHeap<IO> {
    pub fn new(io: Wrapper<IO>, layout: VolumeLayout) -> Self {
        Self { io, fat: FAT::new(layout), layout }
    }

    fn offset(&self, cluster_id: ClusterID, offset: usize, length: usize) -> Result<u64, Error<E>> {
        if !self.layout.is_data_cluster(cluster_id) || offset + length > CLUSTER_SIZE as usize {
            return Err(DataError::ClusterOutOfRange(cluster_id).into());
        }
        Ok(self.layout.cluster_offset(cluster_id) + offset as u64)
    }

    pub fn read(&mut self, cluster_id: ClusterID, offset: usize, buf: &mut [u8]) -> Result<(), Error<E>> {
        let offset = self.offset(cluster_id, offset, buf.len())?;
        self.io.read(offset, buf)
    }

    pub fn write(&mut self, cluster_id: ClusterID, offset: usize, data: &[u8]) -> Result<(), Error<E>> {
        let offset = self.offset(cluster_id, offset, data.len())?;
        self.io.write(offset, data)
    }

    pub fn read_cluster(&mut self, cluster_id: ClusterID) -> Result<Cluster, Error<E>> {
        let mut cluster = [0u8; CLUSTER_SIZE as usize];
        self.read(cluster_id, 0, &mut cluster)?;
        Ok(cluster)
    }

    pub fn zero_cluster(&mut self, cluster_id: ClusterID) -> Result<(), Error<E>> {
        let offset = self.offset(cluster_id, 0, CLUSTER_SIZE as usize)?;
        self.io.zero(offset, CLUSTER_SIZE as u64)
    }

    /// Allocate a cluster and zero its content
    pub fn allocate_zeroed(&mut self) -> Result<ClusterID, Error<E>> {
        let cluster_id = self.fat.allocate(&mut self.io)?;
        self.zero_cluster(cluster_id)?;
        Ok(cluster_id)
    }

    pub fn allocate(&mut self) -> Result<ClusterID, Error<E>> {
        self.fat.allocate(&mut self.io)
    }

    pub fn link(&mut self, from: ClusterID, to: ClusterID) -> Result<(), Error<E>> {
        trace!("Link cluster {} to {}", from, to);
        self.fat.set_entry(&mut self.io, from, Entry::Next(to))
    }

    pub fn release(&mut self, head: ClusterID) -> Result<(), Error<E>> {
        self.fat.clear_chain(&mut self.io, head)
    }

    pub fn chain(&mut self, head: ClusterID) -> Result<Vec<ClusterID>, Error<E>> {
        self.fat.chain(&mut self.io, head)
    }

    pub fn into_inner(self) -> IO {
        self.io.into_inner()
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::ClusterHeap;
    use crate::error::{DataError, Error};
    use crate::io::memory::MemoryIO;
    use crate::io::Wrapper;
    use crate::layout::VolumeLayout;

    pub fn heap(size: u64) -> ClusterHeap<MemoryIO> {
        let layout = VolumeLayout::new(size).unwrap();
        let mut io = Wrapper::new(MemoryIO::default());
        io.zero(0, layout.total_size as u64).unwrap();
        let mut heap = ClusterHeap::new(io, layout);
        heap.fat.initialize(&mut heap.io).unwrap();
        heap
    }

    #[test]
    fn test_cluster_bounds() {
        let mut heap = heap(64 * 1024);
        let cluster_id = heap.allocate_zeroed().unwrap();
        heap.write(cluster_id, 1020, b"abcd").unwrap();
        let cluster = heap.read_cluster(cluster_id).unwrap();
        assert_eq!(&cluster[1020..], b"abcd");
        assert!(matches!(
            heap.write(cluster_id, 1021, b"abcd"),
            Err(Error::Data(DataError::ClusterOutOfRange(_)))
        ));
        assert!(heap.read_cluster(1.into()).is_err());
        assert!(heap.read_cluster(64.into()).is_err());
    }
}
