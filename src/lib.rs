#![doc = include_str!("../README.md")]
#![cfg_attr(not(any(test, feature = "std")), no_std)]

extern crate alloc;

#[macro_use]
extern crate hex_literal;
extern crate heapless;
#[macro_use]
extern crate log;

mod cluster_heap;
mod endian;
pub mod error;
mod fat;
pub mod io;
pub mod layout;
mod path;
mod region;
mod session;
pub mod types;

use core::fmt::Debug;

use alloc::vec::Vec;

use cluster_heap::ClusterHeap;
use error::{DataError, Error, InputError, OperationError};
use io::Wrapper;
use layout::{VolumeLayout, CLUSTER_SIZE};
pub use region::data::{DirectoryEntry, Name};
use region::boot::{Superblock, SUPERBLOCK_SIZE};
use region::fat::Entry;
pub use session::Cursor;
use types::ClusterID;

/// Outcome of a consistency pass over both allocation table copies
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Report {
    /// Clusters marked BAD in either copy
    pub bad: Vec<ClusterID>,
    /// Clusters whose entries differ between the two copies
    pub mismatched: Vec<ClusterID>,
}

impl Report {
    pub fn is_clean(&self) -> bool {
        self.bad.is_empty() && self.mismatched.is_empty()
    }
}

pub struct Volume<IO> {
    heap: ClusterHeap<IO>,
}

impl<E: Debug, IO: io::IO<Error = E>> Volume<IO> {
    /// Lay out a fresh volume of `size` bytes over `io` and create its root directory
    pub fn format(io: IO, size: u64) -> Result<Self, Error<E>> {
        let layout = VolumeLayout::new(size)?;
        debug!("Format volume of {} bytes", layout.total_size);
        let mut io = Wrapper::new(io);
        io.zero(0, layout.total_size as u64)?;
        io.write(0, &Superblock::new(&layout).to_bytes())?;
        let mut heap = ClusterHeap::new(io, layout);
        heap.fat.initialize(&mut heap.io)?;
        let root = layout.root();
        heap.fat.set_entry(&mut heap.io, root, Entry::Last)?;
        heap.init_directory(root, root)?;
        heap.io.flush()?;
        debug!("Root directory on cluster {}", root);
        Ok(Self { heap })
    }

    /// Mount an existing volume
    pub fn open(io: IO) -> Result<Self, Error<E>> {
        let mut io = Wrapper::new(io);
        let mut bytes = [0u8; SUPERBLOCK_SIZE];
        io.read(0, &mut bytes)?;
        let superblock = Superblock::from_bytes(bytes);
        if !superblock.is_fatvol() {
            return Err(DataError::NotFATVolume.into());
        }
        let layout = superblock.layout();
        if !layout.is_consistent() || superblock.root_cluster.to_ne() != u32::from(layout.root()) {
            warn!("Inconsistent superblock {:?}", layout);
            return Err(DataError::Superblock.into());
        }
        if superblock.table_size.to_ne() != layout.cluster_count * layout.table_entry_size {
            return Err(DataError::Superblock.into());
        }
        let mut last = [0u8; 1];
        if io.read(layout.total_size as u64 - 1, &mut last).is_err() {
            warn!("Storage ends before {} bytes", layout.total_size);
            return Err(DataError::Truncated.into());
        }
        debug!("Open volume with layout {:?}", layout);
        Ok(Self { heap: ClusterHeap::new(io, layout) })
    }

    pub fn layout(&self) -> &VolumeLayout {
        &self.heap.layout
    }

    pub fn root(&self) -> ClusterID {
        self.heap.layout.root()
    }

    /// A cursor standing at the root directory
    pub fn session(&self) -> Cursor {
        Cursor::new(self.root())
    }

    /// Resolve everything but the last component of `path`, returning
    /// the parent directory cluster and the bare leaf name
    pub fn resolve_path<'a>(&mut self, cursor: &Cursor, path: &'a str) -> Result<(ClusterID, &'a str), Error<E>> {
        path::resolve(&mut self.heap, cursor.cluster_id, path, false)
    }

    /// Resolve `path` to the cluster of the directory it names
    pub fn resolve_directory(&mut self, cursor: &Cursor, path: &str) -> Result<ClusterID, Error<E>> {
        Ok(path::resolve(&mut self.heap, cursor.cluster_id, path, true)?.0)
    }

    pub fn change_directory(&mut self, cursor: &mut Cursor, path: &str) -> Result<(), Error<E>> {
        let cluster_id = self.resolve_directory(cursor, path)?;
        cursor.path = path::join(&cursor.path, path);
        cursor.cluster_id = cluster_id;
        debug!("Current directory {} on cluster {}", cursor.path, cluster_id);
        Ok(())
    }

    /// Record of the entry `path` names, a path naming a directory
    /// without a leaf (`/`, `..`) yields that directory's `.` record
    pub fn stat(&mut self, cursor: &Cursor, path: &str) -> Result<DirectoryEntry, Error<E>> {
        let (parent, name) = self.resolve_path(cursor, path)?;
        if name.is_empty() {
            return Ok(DirectoryEntry::current(parent));
        }
        match self.heap.find(parent, name)? {
            Some((_, entry)) => Ok(entry),
            None => Err(OperationError::NotFound.into()),
        }
    }

    pub fn exists(&mut self, cursor: &Cursor, path: &str) -> Result<bool, Error<E>> {
        let (parent, name) = self.resolve_path(cursor, path)?;
        match name.is_empty() {
            true => Ok(true),
            false => self.heap.exists(parent, name),
        }
    }

    pub fn create_directory(&mut self, cursor: &Cursor, path: &str) -> Result<ClusterID, Error<E>> {
        let (parent, name) = self.resolve_path(cursor, path)?;
        let (_, entry) = self.heap.create_entry(parent, name, true)?;
        self.heap.io.flush()?;
        Ok(entry.first_cluster)
    }

    /// Remove a file or an empty directory and release its clusters
    pub fn remove_entry(&mut self, cursor: &Cursor, path: &str) -> Result<DirectoryEntry, Error<E>> {
        let (parent, name) = self.resolve_path(cursor, path)?;
        let entry = self.heap.remove_entry(parent, name)?;
        self.heap.io.flush()?;
        Ok(entry)
    }

    pub fn remove_file(&mut self, cursor: &Cursor, path: &str) -> Result<DirectoryEntry, Error<E>> {
        if self.stat(cursor, path)?.is_directory {
            return Err(OperationError::IsDirectory.into());
        }
        self.remove_entry(cursor, path)
    }

    pub fn remove_directory(&mut self, cursor: &Cursor, path: &str) -> Result<DirectoryEntry, Error<E>> {
        if !self.stat(cursor, path)?.is_directory {
            return Err(OperationError::NotDirectory.into());
        }
        self.remove_entry(cursor, path)
    }

    /// Every record of a directory in chain order, tombstones included
    pub fn list_entries(&mut self, directory: ClusterID) -> Result<Vec<DirectoryEntry>, Error<E>> {
        self.heap.list_entries(directory)
    }

    /// Live records of the directory `path` names
    pub fn list(&mut self, cursor: &Cursor, path: &str) -> Result<Vec<DirectoryEntry>, Error<E>> {
        let directory = self.resolve_directory(cursor, path)?;
        let mut entries = self.heap.list_entries(directory)?;
        entries.retain(|entry| !entry.is_tombstone());
        Ok(entries)
    }

    pub fn read_file(&mut self, cursor: &Cursor, path: &str) -> Result<Vec<u8>, Error<E>> {
        let entry = self.stat(cursor, path)?;
        if entry.is_directory {
            return Err(OperationError::IsDirectory.into());
        }
        self.heap.read_content(entry.first_cluster, entry.size)
    }

    /// Create a file at `path` holding `data`
    pub fn write_new_file(&mut self, cursor: &Cursor, path: &str, data: &[u8]) -> Result<DirectoryEntry, Error<E>> {
        if data.len() > i32::MAX as usize {
            return Err(InputError::Size.into());
        }
        let (parent, name) = self.resolve_path(cursor, path)?;
        let (slot, mut entry) = self.heap.create_entry(parent, name, false)?;
        self.heap.write_content(entry.first_cluster, data)?;
        entry.size = data.len() as u32;
        self.heap.write_record(slot, &entry)?;
        self.heap.io.flush()?;
        debug!("Wrote {} bytes to {}", entry.size, path);
        Ok(entry)
    }

    pub fn copy_file(&mut self, cursor: &Cursor, source: &str, dest: &str) -> Result<DirectoryEntry, Error<E>> {
        let data = self.read_file(cursor, source)?;
        self.write_new_file(cursor, dest, &data)
    }

    /// Parent cluster and name the entry moved from `source` lands on,
    /// an existing directory at `dest` receives it under its own name
    fn move_target<'a>(
        &mut self,
        cursor: &Cursor,
        dest: &'a str,
        name: &'a str,
    ) -> Result<(ClusterID, &'a str), Error<E>> {
        let (parent, leaf) = self.resolve_path(cursor, dest)?;
        if leaf.is_empty() {
            return Ok((parent, name));
        }
        match self.heap.find(parent, leaf)? {
            Some((_, entry)) if entry.is_directory => Ok((entry.first_cluster, name)),
            Some(_) => Err(OperationError::AlreadyExists.into()),
            None => Ok((parent, leaf)),
        }
    }

    /// Files are copied then removed, directories are relinked under their new parent
    pub fn move_entry(&mut self, cursor: &Cursor, source: &str, dest: &str) -> Result<DirectoryEntry, Error<E>> {
        let (source_parent, source_name) = self.resolve_path(cursor, source)?;
        if source_name.is_empty() {
            return Err(InputError::InvalidName.into());
        }
        let (_, mut entry) = match self.heap.find(source_parent, source_name)? {
            Some(found) => found,
            None => return Err(OperationError::NotFound.into()),
        };
        let (parent, name) = self.move_target(cursor, dest, source_name)?;
        if parent == source_parent && name == source_name {
            return Ok(entry);
        }
        if !entry.is_directory {
            let data = self.heap.read_content(entry.first_cluster, entry.size)?;
            let (slot, mut moved) = self.heap.create_entry(parent, name, false)?;
            self.heap.write_content(moved.first_cluster, &data)?;
            moved.size = entry.size;
            self.heap.write_record(slot, &moved)?;
            self.heap.remove_entry(source_parent, source_name)?;
            self.heap.io.flush()?;
            return Ok(moved);
        }

        let mut ancestor = parent;
        for _ in 0..self.heap.layout.cluster_count {
            if ancestor == entry.first_cluster {
                return Err(InputError::InvalidName.into());
            }
            if ancestor == self.root() {
                break;
            }
            ancestor = self.heap.parent_of(ancestor)?;
        }
        entry.name = region::data::validate_name(name)?;
        if self.heap.exists(parent, name)? {
            return Err(OperationError::AlreadyExists.into());
        }
        self.heap.append_record(parent, &entry)?;
        self.heap.detach(source_parent, source_name)?;
        self.heap.set_parent(entry.first_cluster, parent)?;
        self.heap.io.flush()?;
        Ok(entry)
    }

    /// Clusters of the entry `path` names, in chain order
    pub fn cluster_chain(&mut self, cursor: &Cursor, path: &str) -> Result<Vec<ClusterID>, Error<E>> {
        let entry = self.stat(cursor, path)?;
        self.heap.chain(entry.first_cluster)
    }

    /// Mark the first cluster of `path` BAD, leaving its record as is
    pub fn mark_bad(&mut self, cursor: &Cursor, path: &str) -> Result<ClusterID, Error<E>> {
        let (parent, name) = self.resolve_path(cursor, path)?;
        if name.is_empty() {
            return Err(InputError::InvalidName.into());
        }
        let (_, entry) = match self.heap.find(parent, name)? {
            Some(found) => found,
            None => return Err(OperationError::NotFound.into()),
        };
        self.heap.fat.mark_bad(&mut self.heap.io, entry.first_cluster)?;
        self.heap.io.flush()?;
        Ok(entry.first_cluster)
    }

    pub fn scan_bad(&mut self) -> Result<Vec<ClusterID>, Error<E>> {
        self.heap.fat.scan_bad(&mut self.heap.io)
    }

    pub fn check(&mut self) -> Result<Report, Error<E>> {
        let bad = self.heap.fat.scan_bad(&mut self.heap.io)?;
        let mismatched = self.heap.fat.mismatches(&mut self.heap.io)?;
        if !mismatched.is_empty() {
            warn!("{} table entries differ between copies", mismatched.len());
        }
        Ok(Report { bad, mismatched })
    }

    /// Raw values of both table copies, indexed by cluster
    pub fn table_entries(&mut self) -> Result<Vec<(i32, i32)>, Error<E>> {
        self.heap.fat.entries(&mut self.heap.io)
    }

    pub fn free_clusters(&mut self) -> Result<u32, Error<E>> {
        self.heap.fat.count_free(&mut self.heap.io)
    }

    pub fn read_cluster(&mut self, cluster_id: ClusterID) -> Result<[u8; CLUSTER_SIZE as usize], Error<E>> {
        self.heap.read_cluster(cluster_id)
    }

    pub fn flush(&mut self) -> Result<(), Error<E>> {
        self.heap.io.flush()
    }

    pub fn into_inner(self) -> IO {
        self.heap.into_inner()
    }
}
