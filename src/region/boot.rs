// Boot region, first cluster of the volume

use core::mem::{size_of, transmute};

use crate::endian::Little as LE;
use crate::layout::VolumeLayout;
use crate::region::data::RECORD_SIZE;

pub(crate) const FILESYSTEM_NAME: [u8; 8] = hex!("46 41 54 56 4F 4C 20 20"); // "FATVOL  "
pub(crate) const REVISION: u16 = 0x0100;
pub(crate) const SUPERBLOCK_SIZE: usize = 52;

#[derive(Copy, Clone, Debug)]
#[repr(C)]
pub(crate) struct Superblock {
    pub filesystem_name: [u8; 8],
    pub revision: LE<u16>,
    pub record_size: LE<u16>,
    pub total_size: LE<u32>,
    pub cluster_size: LE<u32>,
    pub table_entry_size: LE<u32>,
    pub table_size: LE<u32>, // unit byte
    pub table_cluster_count: LE<u32>,
    pub cluster_count: LE<u32>,
    pub table1_offset: LE<u32>,
    pub table2_offset: LE<u32>,
    pub data_offset: LE<u32>,
    pub root_cluster: LE<u32>,
}

const _: () = assert!(size_of::<Superblock>() == SUPERBLOCK_SIZE);

impl Superblock {
    pub fn new(layout: &VolumeLayout) -> Self {
        Self {
            filesystem_name: FILESYSTEM_NAME,
            revision: REVISION.into(),
            record_size: (RECORD_SIZE as u16).into(),
            total_size: layout.total_size.into(),
            cluster_size: layout.cluster_size.into(),
            table_entry_size: layout.table_entry_size.into(),
            table_size: (layout.cluster_count * layout.table_entry_size).into(),
            table_cluster_count: layout.table_cluster_count.into(),
            cluster_count: layout.cluster_count.into(),
            table1_offset: layout.table1_offset.into(),
            table2_offset: layout.table2_offset.into(),
            data_offset: layout.data_offset.into(),
            root_cluster: u32::from(layout.root()).into(),
        }
    }

    pub fn is_fatvol(&self) -> bool {
        self.filesystem_name == FILESYSTEM_NAME
            && self.revision.to_ne() == REVISION
            && self.record_size.to_ne() as usize == RECORD_SIZE
    }

    pub fn layout(&self) -> VolumeLayout {
        VolumeLayout {
            total_size: self.total_size.to_ne(),
            cluster_size: self.cluster_size.to_ne(),
            table_entry_size: self.table_entry_size.to_ne(),
            table_cluster_count: self.table_cluster_count.to_ne(),
            cluster_count: self.cluster_count.to_ne(),
            table1_offset: self.table1_offset.to_ne(),
            table2_offset: self.table2_offset.to_ne(),
            data_offset: self.data_offset.to_ne(),
        }
    }

    pub fn to_bytes(self) -> [u8; SUPERBLOCK_SIZE] {
        // Every field is a byte array or a little-endian integer, no padding in between
        unsafe { transmute(self) }
    }

    pub fn from_bytes(bytes: [u8; SUPERBLOCK_SIZE]) -> Self {
        unsafe { transmute(bytes) }
    }
}

#[cfg(test)]
mod test {
    use memoffset::offset_of;

    use super::{Superblock, FILESYSTEM_NAME};
    use crate::layout::VolumeLayout;

    #[test]
    fn test_field_offsets() {
        assert_eq!(offset_of!(Superblock, revision), 8);
        assert_eq!(offset_of!(Superblock, record_size), 10);
        assert_eq!(offset_of!(Superblock, total_size), 12);
        assert_eq!(offset_of!(Superblock, table_cluster_count), 28);
        assert_eq!(offset_of!(Superblock, table1_offset), 36);
        assert_eq!(offset_of!(Superblock, data_offset), 44);
        assert_eq!(offset_of!(Superblock, root_cluster), 48);
    }

    #[test]
    fn test_superblock_bytes() {
        let layout = VolumeLayout::new(64 * 1024).unwrap();
        let bytes = Superblock::new(&layout).to_bytes();
        assert_eq!(&bytes[..8], b"FATVOL  ");
        assert_eq!(&bytes[..8], &FILESYSTEM_NAME);
        assert_eq!(bytes[10], 21);
        assert_eq!(u32::from_le_bytes(bytes[12..16].try_into().unwrap()), 65536);
        assert_eq!(u32::from_le_bytes(bytes[44..48].try_into().unwrap()), layout.data_offset);

        let superblock = Superblock::from_bytes(bytes);
        assert!(superblock.is_fatvol());
        assert_eq!(superblock.layout(), layout);
    }
}
