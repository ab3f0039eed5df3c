use core::fmt::Debug;

use alloc::vec::Vec;

use super::ClusterHeap;
use crate::error::{DataError, Error};
use crate::layout::CLUSTER_SIZE;
use crate::region::fat::Entry;
use crate::types::ClusterID;

impl<E: Debug, IO: crate::io::IO<Error = E>> ClusterHeap<IO> {
    /// Read `size` bytes following the chain from `first_cluster`,
    /// a chain shorter than `size` yields what it holds
    pub fn read_content(&mut self, first_cluster: ClusterID, size: u32) -> Result<Vec<u8>, Error<E>> {
        let size = size as usize;
        let mut bytes = Vec::with_capacity(size);
        let mut cursor = Some(first_cluster);
        let mut steps = 0;
        while let Some(cluster_id) = cursor {
            if bytes.len() >= size {
                break;
            }
            if steps >= self.layout.cluster_count {
                return Err(DataError::FATChain.into());
            }
            steps += 1;
            // a BAD cluster fails here before its content is touched
            let next = self.fat.next(&mut self.io, cluster_id)?;
            let length = core::cmp::min(CLUSTER_SIZE as usize, size - bytes.len());
            let start = bytes.len();
            bytes.resize(start + length, 0);
            self.read(cluster_id, 0, &mut bytes[start..])?;
            cursor = next;
        }
        if bytes.len() < size {
            warn!("Chain from {} holds {} of {} bytes", first_cluster, bytes.len(), size);
        }
        Ok(bytes)
    }

    /// Write `data` from `first_cluster` on, reusing the existing chain,
    /// extending it when needed and releasing whatever is left over
    pub fn write_content(&mut self, first_cluster: ClusterID, data: &[u8]) -> Result<(), Error<E>> {
        let existing = self.chain(first_cluster)?;
        let needed = core::cmp::max(1, data.len().div_ceil(CLUSTER_SIZE as usize));
        let mut chunks = data.chunks(CLUSTER_SIZE as usize);
        let mut previous: Option<ClusterID> = None;
        for index in 0..needed {
            let cluster_id = match (existing.get(index), previous) {
                (Some(&cluster_id), _) => cluster_id,
                (None, Some(previous)) => {
                    let cluster_id = self.allocate()?;
                    self.link(previous, cluster_id)?;
                    cluster_id
                }
                (None, None) => first_cluster,
            };
            if let Some(chunk) = chunks.next() {
                trace!("Write {} bytes to cluster {}", chunk.len(), cluster_id);
                self.write(cluster_id, 0, chunk)?;
            }
            previous = Some(cluster_id);
        }
        let last = previous.unwrap_or(first_cluster);
        self.fat.set_entry(&mut self.io, last, Entry::Last)?;
        if let Some(&surplus) = existing.get(needed) {
            debug!("Release surplus clusters from {}", surplus);
            self.release(surplus)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::cluster_heap::test::heap;
    use crate::error::{AllocationError, DataError, Error};
    use crate::region::fat::Entry;

    fn payload(size: usize) -> Vec<u8> {
        (0..size).map(|i| (i * 7 % 251) as u8).collect()
    }

    #[test]
    fn test_spanning_clusters() {
        let mut heap = heap(64 * 1024);
        let first = heap.allocate().unwrap();
        let data = payload(2500);
        heap.write_content(first, &data).unwrap();
        let chain = heap.chain(first).unwrap();
        assert_eq!(chain.len(), 3);
        let last = heap.read_cluster(chain[2]).unwrap();
        assert_eq!(&last[..452], &data[2048..]);
        assert_eq!(heap.read_content(first, 2500).unwrap(), data);
        assert_eq!(heap.read_content(first, 100).unwrap(), &data[..100]);
    }

    #[test]
    fn test_read_write() {
        let mut heap = heap(64 * 1024);
        for size in [0usize, 1, 1023, 1024, 1025, 4096] {
            let first = heap.allocate().unwrap();
            let data = payload(size);
            heap.write_content(first, &data).unwrap();
            assert_eq!(heap.read_content(first, size as u32).unwrap(), data);
            heap.release(first).unwrap();
        }
    }

    #[test]
    fn test_rewrite_shrinks_chain() {
        let mut heap = heap(64 * 1024);
        let first = heap.allocate().unwrap();
        heap.write_content(first, &payload(3000)).unwrap();
        let chain = heap.chain(first).unwrap();
        heap.write_content(first, b"short").unwrap();
        assert_eq!(heap.chain(first).unwrap(), vec![first]);
        assert_eq!(heap.fat.read_entry(&mut heap.io, chain[1]).unwrap(), Entry::Free);
        assert_eq!(heap.fat.read_entry(&mut heap.io, chain[2]).unwrap(), Entry::Free);
        assert_eq!(heap.read_content(first, 5).unwrap(), b"short");
    }

    #[test]
    fn test_short_chain_truncates() {
        let mut heap = heap(64 * 1024);
        let first = heap.allocate().unwrap();
        heap.write_content(first, &payload(1000)).unwrap();
        assert_eq!(heap.read_content(first, 5000).unwrap().len(), 1024);
    }

    #[test]
    fn test_bad_cluster() {
        let mut heap = heap(64 * 1024);
        let first = heap.allocate().unwrap();
        heap.write_content(first, &payload(2048)).unwrap();
        let chain = heap.chain(first).unwrap();
        heap.fat.mark_bad(&mut heap.io, chain[1]).unwrap();
        let result = heap.read_content(first, 2048);
        assert!(matches!(result, Err(Error::Data(DataError::FATChain))));
    }

    #[test]
    fn test_no_space_keeps_written() {
        let mut heap = heap(8 * 1024);
        let first = heap.allocate().unwrap();
        let result = heap.write_content(first, &payload(8 * 1024));
        assert!(matches!(result, Err(Error::Allocation(AllocationError::NoMoreCluster))));
        let chain = heap.chain(first).unwrap();
        assert_eq!(chain.len(), 5);
        assert_eq!(heap.read_content(first, 5 * 1024).unwrap(), &payload(8 * 1024)[..5 * 1024]);
    }
}
