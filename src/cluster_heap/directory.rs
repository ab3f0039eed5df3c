use core::fmt::Debug;

use alloc::vec::Vec;

use super::ClusterHeap;
use crate::error::{DataError, Error, InputError, OperationError};
use crate::layout::CLUSTER_SIZE;
use crate::region::data::{validate_name, DirectoryEntry, RawRecord, CURRENT, PARENT, RECORD_SIZE};
use crate::types::ClusterID;

pub(crate) const RECORDS_PER_CLUSTER: usize = CLUSTER_SIZE as usize / RECORD_SIZE;

/// Position of a record inside a directory
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Slot {
    pub cluster_id: ClusterID,
    pub index: usize,
}

impl Slot {
    pub fn new(cluster_id: ClusterID, index: usize) -> Self {
        Self { cluster_id, index }
    }

    fn offset(&self) -> usize {
        self.index * RECORD_SIZE
    }
}

impl<E: Debug, IO: crate::io::IO<Error = E>> ClusterHeap<IO> {
    pub fn read_record(&mut self, slot: Slot) -> Result<DirectoryEntry, Error<E>> {
        let mut raw: RawRecord = [0u8; RECORD_SIZE];
        self.read(slot.cluster_id, slot.offset(), &mut raw)?;
        Ok(DirectoryEntry::decode(&raw)?)
    }

    pub fn write_record(&mut self, slot: Slot, entry: &DirectoryEntry) -> Result<(), Error<E>> {
        trace!("Write record {:?} to slot {} of cluster {}", entry.name(), slot.index, slot.cluster_id);
        self.write(slot.cluster_id, slot.offset(), &entry.encode())
    }

    /// Walk through directory records in chain order, tombstones included,
    /// stop at the first record `f` accepts
    pub fn walk<F>(&mut self, directory: ClusterID, mut f: F) -> Result<Option<(Slot, DirectoryEntry)>, Error<E>>
    where
        F: FnMut(&DirectoryEntry) -> bool,
    {
        for cluster_id in self.chain(directory)? {
            let cluster = self.read_cluster(cluster_id)?;
            for index in 0..RECORDS_PER_CLUSTER {
                let mut raw: RawRecord = [0u8; RECORD_SIZE];
                raw.copy_from_slice(&cluster[index * RECORD_SIZE..(index + 1) * RECORD_SIZE]);
                let entry = DirectoryEntry::decode(&raw)?;
                if f(&entry) {
                    return Ok(Some((Slot::new(cluster_id, index), entry)));
                }
            }
        }
        Ok(None)
    }

    /// Every record of the directory, callers filter tombstones
    pub fn list_entries(&mut self, directory: ClusterID) -> Result<Vec<DirectoryEntry>, Error<E>> {
        let mut entries = Vec::new();
        self.walk(directory, |entry| {
            entries.push(entry.clone());
            false
        })?;
        Ok(entries)
    }

    pub fn find(&mut self, directory: ClusterID, name: &str) -> Result<Option<(Slot, DirectoryEntry)>, Error<E>> {
        self.walk(directory, |entry| !entry.is_tombstone() && entry.name() == name)
    }

    pub fn exists(&mut self, directory: ClusterID, name: &str) -> Result<bool, Error<E>> {
        Ok(self.find(directory, name)?.is_some())
    }

    /// No live record besides `.` and `..`
    pub fn is_empty(&mut self, directory: ClusterID) -> Result<bool, Error<E>> {
        let found = self.walk(directory, |entry| !entry.is_tombstone() && !entry.is_bootstrap())?;
        Ok(found.is_none())
    }

    pub fn parent_of(&mut self, directory: ClusterID) -> Result<ClusterID, Error<E>> {
        let entry = self.read_record(Slot::new(directory, 1))?;
        if !entry.is_directory || entry.name() != PARENT {
            warn!("Cluster {} does not start a directory", directory);
            return Err(DataError::Metadata.into());
        }
        Ok(entry.first_cluster)
    }

    pub fn set_parent(&mut self, directory: ClusterID, parent: ClusterID) -> Result<(), Error<E>> {
        self.write_record(Slot::new(directory, 1), &DirectoryEntry::parent(parent))
    }

    /// Zero the first cluster of a directory and write its `.` and `..` records
    pub fn init_directory(&mut self, directory: ClusterID, parent: ClusterID) -> Result<(), Error<E>> {
        self.zero_cluster(directory)?;
        self.write_record(Slot::new(directory, 0), &DirectoryEntry::current(directory))?;
        self.set_parent(directory, parent)
    }

    /// Place a record into the first tombstone slot, or into a freshly linked cluster
    pub fn append_record(&mut self, directory: ClusterID, entry: &DirectoryEntry) -> Result<Slot, Error<E>> {
        let slot = match self.walk(directory, |entry| entry.is_tombstone())? {
            Some((slot, _)) => slot,
            None => {
                let chain = self.chain(directory)?;
                let last = *chain.last().ok_or(Error::Data(DataError::FATChain))?;
                let cluster_id = self.allocate_zeroed()?;
                self.link(last, cluster_id)?;
                debug!("Directory {} extended with cluster {}", directory, cluster_id);
                Slot::new(cluster_id, 0)
            }
        };
        self.write_record(slot, entry)?;
        Ok(slot)
    }

    pub fn create_entry(
        &mut self,
        parent: ClusterID,
        name: &str,
        is_directory: bool,
    ) -> Result<(Slot, DirectoryEntry), Error<E>> {
        let name = validate_name(name)?;
        if self.exists(parent, &name)? {
            return Err(OperationError::AlreadyExists.into());
        }
        let cluster_id = self.allocate()?;
        let entry = match is_directory {
            true => DirectoryEntry::directory(name, cluster_id),
            false => DirectoryEntry::file(name, 0, cluster_id),
        };
        let result = match is_directory {
            true => self.init_directory(cluster_id, parent),
            false => Ok(()),
        };
        match result.and_then(|_| self.append_record(parent, &entry)) {
            Ok(slot) => Ok((slot, entry)),
            Err(e) => {
                warn!("Create {} failed, release cluster {}", entry.name(), cluster_id);
                if let Err(release) = self.release(cluster_id) {
                    warn!("Release cluster {} failed: {:?}", cluster_id, release);
                }
                Err(e)
            }
        }
    }

    /// Overwrite the record of `name` with a tombstone, leaving its clusters untouched
    pub fn detach(&mut self, parent: ClusterID, name: &str) -> Result<DirectoryEntry, Error<E>> {
        if name.is_empty() || name == CURRENT || name == PARENT {
            return Err(InputError::InvalidName.into());
        }
        let (slot, entry) = self.find(parent, name)?.ok_or(Error::Operation(OperationError::NotFound))?;
        self.write_record(slot, &DirectoryEntry::default())?;
        Ok(entry)
    }

    pub fn remove_entry(&mut self, parent: ClusterID, name: &str) -> Result<DirectoryEntry, Error<E>> {
        if name.is_empty() || name == CURRENT || name == PARENT {
            return Err(InputError::InvalidName.into());
        }
        let (slot, entry) = self.find(parent, name)?.ok_or(Error::Operation(OperationError::NotFound))?;
        if entry.is_directory && !self.is_empty(entry.first_cluster)? {
            return Err(OperationError::NotEmpty.into());
        }
        self.release(entry.first_cluster)?;
        self.write_record(slot, &DirectoryEntry::default())?;
        Ok(entry)
    }
}
