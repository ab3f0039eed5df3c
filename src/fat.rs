use alloc::vec::Vec;

use crate::error::{AllocationError, DataError, Error};
use crate::io::{self, Wrapper};
use crate::layout::VolumeLayout;
use crate::region::fat::{Entry, BAD, FREE, LAST};
use crate::types::ClusterID;

const NUM_COPIES: usize = 2;

/// Both allocation table copies, every write lands on the same index in each of them
#[derive(Copy, Clone, Debug)]
pub(crate) struct FAT {
    layout: VolumeLayout,
}

impl FAT {
    pub fn new(layout: VolumeLayout) -> Self {
        Self { layout }
    }

    fn check_range(&self, cluster_id: ClusterID) -> Result<(), DataError> {
        if u32::from(cluster_id) >= self.layout.cluster_count {
            return Err(DataError::ClusterOutOfRange(cluster_id));
        }
        Ok(())
    }

    /// Entries of one copy, `entries_per_chunk` at a time
    fn for_each_chunk<E, IO, F>(&self, io: &mut Wrapper<IO>, copy: usize, mut f: F) -> Result<(), Error<E>>
    where
        IO: io::IO<Error = E>,
        F: FnMut(u32, &[i32]) -> bool,
    {
        let entries_per_chunk = self.layout.cluster_size / self.layout.table_entry_size;
        let mut buffer = [0u8; 4096];
        let mut values = [0i32; 1024];
        let mut index = 0;
        while index < self.layout.cluster_count {
            let count = core::cmp::min(entries_per_chunk, self.layout.cluster_count - index);
            let bytes = &mut buffer[..count as usize * 4];
            io.read(self.layout.table_entry_offset(copy, index.into()), bytes)?;
            for (value, chunk) in values.iter_mut().zip(bytes.chunks_exact(4)) {
                *value = i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            }
            if f(index, &values[..count as usize]) {
                break;
            }
            index += count;
        }
        Ok(())
    }

    /// Write both copies of a freshly formatted table, reserved clusters are terminated
    pub fn initialize<E, IO: io::IO<Error = E>>(&self, io: &mut Wrapper<IO>) -> Result<(), Error<E>> {
        let table_size = self.layout.table_size() as u64;
        let reserved = self.layout.reserved_clusters();
        for copy in 0..NUM_COPIES {
            let base = self.layout.table_entry_offset(copy, ClusterID::BOOT);
            io.zero(base, table_size)?;
            for index in 0..reserved {
                io.write_i32(self.layout.table_entry_offset(copy, index.into()), LAST)?;
            }
        }
        Ok(())
    }

    /// First-fit scan of copy 1 over the data clusters
    pub fn find_free<E, IO: io::IO<Error = E>>(&self, io: &mut Wrapper<IO>) -> Result<ClusterID, Error<E>> {
        let first = self.layout.reserved_clusters();
        let mut found: Option<u32> = None;
        self.for_each_chunk(io, 0, |base, values| {
            let position = values.iter().enumerate().position(|(i, &value)| {
                base + i as u32 >= first && value == FREE
            });
            found = position.map(|i| base + i as u32);
            found.is_some()
        })?;
        found.map(ClusterID::from).ok_or(Error::Allocation(AllocationError::NoMoreCluster))
    }

    pub fn read_raw<E, IO: io::IO<Error = E>>(
        &self,
        io: &mut Wrapper<IO>,
        copy: usize,
        cluster_id: ClusterID,
    ) -> Result<i32, Error<E>> {
        self.check_range(cluster_id)?;
        io.read_i32(self.layout.table_entry_offset(copy, cluster_id))
    }

    /// Reads copy 1
    pub fn read_entry<E, IO: io::IO<Error = E>>(
        &self,
        io: &mut Wrapper<IO>,
        cluster_id: ClusterID,
    ) -> Result<Entry, Error<E>> {
        let value = self.read_raw(io, 0, cluster_id)?;
        Entry::try_from(value).map_err(|value| {
            warn!("Invalid entry {} for cluster {}", value, cluster_id);
            Error::Data(DataError::FATChain)
        })
    }

    pub fn set_entry<E, IO: io::IO<Error = E>>(
        &self,
        io: &mut Wrapper<IO>,
        cluster_id: ClusterID,
        entry: Entry,
    ) -> Result<(), Error<E>> {
        self.check_range(cluster_id)?;
        let value = i32::from(entry);
        for copy in 0..NUM_COPIES {
            io.write_i32(self.layout.table_entry_offset(copy, cluster_id), value)?;
        }
        Ok(())
    }

    /// Take the lowest free cluster and terminate it, so it can't be handed out twice
    pub fn allocate<E, IO: io::IO<Error = E>>(&self, io: &mut Wrapper<IO>) -> Result<ClusterID, Error<E>> {
        let cluster_id = self.find_free(io)?;
        self.set_entry(io, cluster_id, Entry::Last)?;
        trace!("Allocated cluster {}", cluster_id);
        Ok(cluster_id)
    }

    /// Cluster following `cluster_id` in its chain, `None` at the end
    pub fn next<E, IO: io::IO<Error = E>>(
        &self,
        io: &mut Wrapper<IO>,
        cluster_id: ClusterID,
    ) -> Result<Option<ClusterID>, Error<E>> {
        match self.read_entry(io, cluster_id)? {
            Entry::Next(next) if self.layout.is_data_cluster(next) => Ok(Some(next)),
            Entry::Last => Ok(None),
            entry => {
                warn!("Unexpected entry {:?} in chain on cluster {}", entry, cluster_id);
                Err(DataError::FATChain.into())
            }
        }
    }

    /// Every cluster of the chain starting at `head`, bounded by the cluster count
    pub fn chain<E, IO: io::IO<Error = E>>(
        &self,
        io: &mut Wrapper<IO>,
        head: ClusterID,
    ) -> Result<Vec<ClusterID>, Error<E>> {
        if !self.layout.is_data_cluster(head) {
            return Err(DataError::ClusterOutOfRange(head).into());
        }
        let mut chain = Vec::new();
        let mut cursor = Some(head);
        while let Some(cluster_id) = cursor {
            if chain.len() >= self.layout.cluster_count as usize {
                warn!("Chain from cluster {} never terminates", head);
                return Err(DataError::FATChain.into());
            }
            chain.push(cluster_id);
            cursor = self.next(io, cluster_id)?;
        }
        Ok(chain)
    }

    /// Release every cluster from `head` to the end of its chain
    pub fn clear_chain<E, IO: io::IO<Error = E>>(
        &self,
        io: &mut Wrapper<IO>,
        head: ClusterID,
    ) -> Result<(), Error<E>> {
        trace!("Release clusters starts with cluster {}", head);
        let mut cluster_id = head;
        for released in 0..self.layout.cluster_count {
            if !self.layout.is_data_cluster(cluster_id) {
                warn!("Cluster {} out of range", cluster_id);
                return Err(DataError::FATChain.into());
            }
            let entry = self.read_entry(io, cluster_id)?;
            match entry {
                Entry::BadCluster => {
                    warn!("Encountered bad cluster {}, left marked", cluster_id);
                    return Ok(());
                }
                Entry::Free if released == 0 => {
                    warn!("Cluster {} already free", head);
                    return Ok(());
                }
                Entry::Free => {
                    warn!("Chain from {} broken by free cluster {}", head, cluster_id);
                    return Err(DataError::FATChain.into());
                }
                _ => (),
            }
            self.set_entry(io, cluster_id, Entry::Free)?;
            trace!("Released cluster {}", cluster_id);
            match entry {
                Entry::Next(next) => cluster_id = next,
                _ => return Ok(()),
            }
        }
        warn!("Chain from cluster {} never terminates", head);
        Err(DataError::FATChain.into())
    }

    pub fn mark_bad<E, IO: io::IO<Error = E>>(
        &self,
        io: &mut Wrapper<IO>,
        cluster_id: ClusterID,
    ) -> Result<(), Error<E>> {
        debug!("Mark cluster {} bad", cluster_id);
        self.set_entry(io, cluster_id, Entry::BadCluster)
    }

    fn scan<E, IO, F>(&self, io: &mut Wrapper<IO>, f: F) -> Result<Vec<ClusterID>, Error<E>>
    where
        IO: io::IO<Error = E>,
        F: Fn(i32, i32) -> bool,
    {
        let mut copies: [Vec<i32>; NUM_COPIES] = [Vec::new(), Vec::new()];
        for (copy, values) in copies.iter_mut().enumerate() {
            values.reserve(self.layout.cluster_count as usize);
            self.for_each_chunk(io, copy, |_, chunk| {
                values.extend_from_slice(chunk);
                false
            })?;
        }
        let pairs = copies[0].iter().zip(copies[1].iter()).enumerate();
        Ok(pairs.filter(|&(_, (&a, &b))| f(a, b)).map(|(i, _)| ClusterID::from(i as u32)).collect())
    }

    /// Clusters marked BAD in either copy, in ascending order
    pub fn scan_bad<E, IO: io::IO<Error = E>>(&self, io: &mut Wrapper<IO>) -> Result<Vec<ClusterID>, Error<E>> {
        self.scan(io, |a, b| a == BAD || b == BAD)
    }

    /// Clusters whose entries differ between the two copies
    pub fn mismatches<E, IO: io::IO<Error = E>>(
        &self,
        io: &mut Wrapper<IO>,
    ) -> Result<Vec<ClusterID>, Error<E>> {
        self.scan(io, |a, b| a != b)
    }

    /// Raw values of both copies, indexed by cluster
    pub fn entries<E, IO: io::IO<Error = E>>(&self, io: &mut Wrapper<IO>) -> Result<Vec<(i32, i32)>, Error<E>> {
        let mut entries: Vec<(i32, i32)> = Vec::with_capacity(self.layout.cluster_count as usize);
        self.for_each_chunk(io, 0, |_, chunk| {
            entries.extend(chunk.iter().map(|&value| (value, 0)));
            false
        })?;
        let mut index = 0;
        self.for_each_chunk(io, 1, |_, chunk| {
            for &value in chunk {
                entries[index].1 = value;
                index += 1;
            }
            false
        })?;
        Ok(entries)
    }

    pub fn count_free<E, IO: io::IO<Error = E>>(&self, io: &mut Wrapper<IO>) -> Result<u32, Error<E>> {
        let first = self.layout.reserved_clusters();
        let mut count = 0;
        self.for_each_chunk(io, 0, |base, values| {
            let free = values.iter().enumerate().filter(|&(i, &value)| {
                base + i as u32 >= first && value == FREE
            });
            count += free.count() as u32;
            false
        })?;
        Ok(count)
    }
}

#[cfg(test)]
mod test {
    use super::FAT;
    use crate::error::{AllocationError, DataError, Error};
    use crate::io::memory::MemoryIO;
    use crate::io::Wrapper;
    use crate::layout::VolumeLayout;
    use crate::region::fat::Entry;
    use crate::types::ClusterID;

    fn setup(size: u64) -> (FAT, Wrapper<MemoryIO>) {
        let layout = VolumeLayout::new(size).unwrap();
        let mut io = Wrapper::new(MemoryIO::default());
        io.zero(0, layout.total_size as u64).unwrap();
        let fat = FAT::new(layout);
        fat.initialize(&mut io).unwrap();
        (fat, io)
    }

    #[test]
    fn test_reserved_clusters() {
        let (fat, mut io) = setup(64 * 1024);
        assert_eq!(fat.read_entry(&mut io, 0.into()).unwrap(), Entry::Last);
        assert_eq!(fat.read_entry(&mut io, 2.into()).unwrap(), Entry::Last);
        assert_eq!(fat.read_entry(&mut io, 3.into()).unwrap(), Entry::Free);
        assert_eq!(u32::from(fat.find_free(&mut io).unwrap()), 3);
    }

    #[test]
    fn test_allocation_exclusive() {
        let (fat, mut io) = setup(16 * 1024);
        let mut allocated = Vec::new();
        loop {
            match fat.allocate(&mut io) {
                Ok(cluster_id) => {
                    assert!(!allocated.contains(&cluster_id));
                    allocated.push(cluster_id);
                }
                Err(Error::Allocation(AllocationError::NoMoreCluster)) => break,
                Err(e) => panic!("{:?}", e),
            }
        }
        let expected: Vec<ClusterID> = (3..16u32).map(ClusterID::from).collect();
        assert_eq!(allocated, expected);

        fat.set_entry(&mut io, 7.into(), Entry::Free).unwrap();
        assert_eq!(u32::from(fat.allocate(&mut io).unwrap()), 7);
    }

    #[test]
    fn test_mirror() {
        let (fat, mut io) = setup(64 * 1024);
        fat.set_entry(&mut io, 10.into(), Entry::Next(11.into())).unwrap();
        assert_eq!(fat.read_raw(&mut io, 0, 10.into()).unwrap(), 11);
        assert_eq!(fat.read_raw(&mut io, 1, 10.into()).unwrap(), 11);
        assert!(fat.mismatches(&mut io).unwrap().is_empty());

        let offset = VolumeLayout::new(64 * 1024).unwrap().table_entry_offset(1, 12.into());
        io.write_i32(offset, -1).unwrap();
        assert_eq!(fat.mismatches(&mut io).unwrap(), vec![ClusterID::from(12)]);
        assert!(fat.set_entry(&mut io, 64.into(), Entry::Last).is_err());
    }

    #[test]
    fn test_chain_and_clear() {
        let (fat, mut io) = setup(64 * 1024);
        let a = fat.allocate(&mut io).unwrap();
        let b = fat.allocate(&mut io).unwrap();
        let c = fat.allocate(&mut io).unwrap();
        fat.set_entry(&mut io, a, Entry::Next(b)).unwrap();
        fat.set_entry(&mut io, b, Entry::Next(c)).unwrap();
        assert_eq!(fat.chain(&mut io, a).unwrap(), vec![a, b, c]);

        let free = fat.count_free(&mut io).unwrap();
        fat.clear_chain(&mut io, a).unwrap();
        assert_eq!(fat.count_free(&mut io).unwrap(), free + 3);
        assert_eq!(fat.find_free(&mut io).unwrap(), a);
    }

    #[test]
    fn test_cycle_detected() {
        let (fat, mut io) = setup(64 * 1024);
        fat.set_entry(&mut io, 5.into(), Entry::Next(6.into())).unwrap();
        fat.set_entry(&mut io, 6.into(), Entry::Next(5.into())).unwrap();
        assert!(matches!(fat.chain(&mut io, 5.into()), Err(Error::Data(DataError::FATChain))));
        assert!(matches!(fat.clear_chain(&mut io, 5.into()), Err(Error::Data(DataError::FATChain))));
    }

    #[test]
    fn test_clear_broken_chain() {
        let (fat, mut io) = setup(64 * 1024);
        fat.set_entry(&mut io, 5.into(), Entry::Next(6.into())).unwrap();
        let result = fat.clear_chain(&mut io, 5.into());
        assert!(matches!(result, Err(Error::Data(DataError::FATChain))));
        assert_eq!(fat.read_entry(&mut io, 5.into()).unwrap(), Entry::Free);

        // releasing an already free head is a no-op
        fat.clear_chain(&mut io, 7.into()).unwrap();
        assert_eq!(fat.read_entry(&mut io, 7.into()).unwrap(), Entry::Free);
    }

    #[test]
    fn test_bad_cluster() {
        let (fat, mut io) = setup(64 * 1024);
        let a = fat.allocate(&mut io).unwrap();
        let b = fat.allocate(&mut io).unwrap();
        fat.set_entry(&mut io, a, Entry::Next(b)).unwrap();
        fat.mark_bad(&mut io, b).unwrap();
        assert_eq!(fat.scan_bad(&mut io).unwrap(), vec![b]);
        assert!(matches!(fat.chain(&mut io, a), Err(Error::Data(DataError::FATChain))));

        fat.clear_chain(&mut io, a).unwrap();
        assert_eq!(fat.read_entry(&mut io, a).unwrap(), Entry::Free);
        assert_eq!(fat.read_entry(&mut io, b).unwrap(), Entry::BadCluster);
        assert_eq!(fat.find_free(&mut io).unwrap(), a);
        fat.allocate(&mut io).unwrap();
        assert_eq!(u32::from(fat.find_free(&mut io).unwrap()), u32::from(b) + 1);
    }
}
