use bitfield::bitfield;

use crate::error::{DataError, InputError};
use crate::types::ClusterID;

pub(crate) const NAME_SIZE: usize = 12;
/// name[12] + size(i32) + first_cluster(i32) + attributes(u8)
pub(crate) const RECORD_SIZE: usize = NAME_SIZE + 4 + 4 + 1;
pub(crate) type RawRecord = [u8; RECORD_SIZE];

pub(crate) const CURRENT: &str = ".";
pub(crate) const PARENT: &str = "..";

pub type Name = heapless::String<NAME_SIZE>;

bitfield! {
    #[derive(Copy, Clone, Debug, Default)]
    pub struct Attributes(u8);
    pub directory, set_directory: 0;
}

/// One decoded directory record, all fields zero marks a free slot
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: Name,
    /// Payload length in bytes, always 0 for directories
    pub size: u32,
    pub first_cluster: ClusterID,
    pub is_directory: bool,
}

pub(crate) fn validate_name(name: &str) -> Result<Name, InputError> {
    if name.is_empty() || name == CURRENT || name == PARENT {
        return Err(InputError::InvalidName);
    }
    if name.len() > NAME_SIZE {
        return Err(InputError::NameTooLong);
    }
    if !name.bytes().all(|b| b.is_ascii_graphic() && b != b'/') {
        return Err(InputError::InvalidName);
    }
    let mut output = Name::new();
    output.push_str(name).map_err(|_| InputError::NameTooLong)?;
    Ok(output)
}

fn to_name(name: &str) -> Name {
    let mut output = Name::new();
    output.push_str(name).ok();
    output
}

impl DirectoryEntry {
    pub fn file(name: Name, size: u32, first_cluster: ClusterID) -> Self {
        Self { name, size, first_cluster, is_directory: false }
    }

    pub fn directory(name: Name, first_cluster: ClusterID) -> Self {
        Self { name, size: 0, first_cluster, is_directory: true }
    }

    /// `.` record, pointing at the directory itself
    pub(crate) fn current(first_cluster: ClusterID) -> Self {
        Self::directory(to_name(CURRENT), first_cluster)
    }

    /// `..` record, pointing at the parent directory
    pub(crate) fn parent(first_cluster: ClusterID) -> Self {
        Self::directory(to_name(PARENT), first_cluster)
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn is_tombstone(&self) -> bool {
        self.name.is_empty() && self.size == 0 && self.first_cluster == ClusterID::default()
    }

    pub fn is_bootstrap(&self) -> bool {
        self.is_directory && (self.name() == CURRENT || self.name() == PARENT)
    }

    pub(crate) fn encode(&self) -> RawRecord {
        let mut raw = [0u8; RECORD_SIZE];
        raw[..self.name.len()].copy_from_slice(self.name.as_bytes());
        raw[12..16].copy_from_slice(&(self.size as i32).to_le_bytes());
        raw[16..20].copy_from_slice(&(u32::from(self.first_cluster) as i32).to_le_bytes());
        let mut attributes = Attributes::default();
        attributes.set_directory(self.is_directory);
        raw[20] = attributes.0;
        raw
    }

    pub(crate) fn decode(raw: &RawRecord) -> Result<Self, DataError> {
        let length = raw[..NAME_SIZE].iter().position(|&b| b == 0).unwrap_or(NAME_SIZE);
        let name = core::str::from_utf8(&raw[..length]).map_err(|_| DataError::Metadata)?;
        let size = i32::from_le_bytes([raw[12], raw[13], raw[14], raw[15]]);
        let first_cluster = i32::from_le_bytes([raw[16], raw[17], raw[18], raw[19]]);
        if size < 0 || first_cluster < 0 {
            return Err(DataError::Metadata);
        }
        Ok(Self {
            name: to_name(name),
            size: size as u32,
            first_cluster: (first_cluster as u32).into(),
            is_directory: Attributes(raw[20]).directory(),
        })
    }
}

#[cfg(test)]
mod test {
    use super::{validate_name, DirectoryEntry, RECORD_SIZE};
    use crate::error::{DataError, InputError};

    #[test]
    fn test_record_layout() {
        let name = validate_name("REPORT.TXT").unwrap();
        let raw = DirectoryEntry::file(name, 2500, 12.into()).encode();
        assert_eq!(&raw[..10], b"REPORT.TXT");
        assert_eq!(&raw[10..12], &[0, 0]);
        assert_eq!(&raw[12..16], &2500i32.to_le_bytes());
        assert_eq!(&raw[16..20], &12i32.to_le_bytes());
        assert_eq!(raw[20], 0);

        let raw = DirectoryEntry::directory(validate_name("docs").unwrap(), 10.into()).encode();
        assert_eq!(raw[20], 1);
        let entry = DirectoryEntry::decode(&raw).unwrap();
        assert!(entry.is_directory);
        assert_eq!(entry.name(), "docs");
        assert_eq!(u32::from(entry.first_cluster), 10);
    }

    #[test]
    fn test_full_width_name() {
        let name = validate_name("ABCDEFGH.TXT").unwrap();
        let raw = DirectoryEntry::file(name, 1, 20.into()).encode();
        assert_eq!(DirectoryEntry::decode(&raw).unwrap().name(), "ABCDEFGH.TXT");
    }

    #[test]
    fn test_tombstone() {
        let raw = [0u8; RECORD_SIZE];
        let entry = DirectoryEntry::decode(&raw).unwrap();
        assert!(entry.is_tombstone());
        assert_eq!(DirectoryEntry::default().encode(), raw);
        assert!(!DirectoryEntry::current(9.into()).is_tombstone());
        assert!(DirectoryEntry::parent(9.into()).is_bootstrap());
    }

    #[test]
    fn test_malformed_record() {
        let mut raw = DirectoryEntry::current(9.into()).encode();
        raw[12..16].copy_from_slice(&(-5i32).to_le_bytes());
        assert_eq!(DirectoryEntry::decode(&raw), Err(DataError::Metadata));
        let mut raw = [0u8; RECORD_SIZE];
        raw[0] = 0xFF;
        assert_eq!(DirectoryEntry::decode(&raw), Err(DataError::Metadata));
    }

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("ABCDEFGHI.TXT"), Err(InputError::NameTooLong));
        assert_eq!(validate_name(""), Err(InputError::InvalidName));
        assert_eq!(validate_name(".."), Err(InputError::InvalidName));
        assert_eq!(validate_name("a b"), Err(InputError::InvalidName));
        assert_eq!(validate_name("naïve"), Err(InputError::InvalidName));
        assert!(validate_name("a.b").is_ok());
    }
}
