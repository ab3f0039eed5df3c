use crate::types::ClusterID;

pub(crate) const FREE: i32 = 0;
pub(crate) const LAST: i32 = -1;
pub(crate) const BAD: i32 = -2;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Entry {
    Free,
    Next(ClusterID),
    Last,
    BadCluster,
}

impl TryFrom<i32> for Entry {
    type Error = i32;
    fn try_from(value: i32) -> Result<Self, i32> {
        match value {
            FREE => Ok(Self::Free),
            LAST => Ok(Self::Last),
            BAD => Ok(Self::BadCluster),
            1..=i32::MAX => Ok(Self::Next((value as u32).into())),
            _ => Err(value),
        }
    }
}

impl From<Entry> for i32 {
    fn from(entry: Entry) -> i32 {
        match entry {
            Entry::Free => FREE,
            Entry::Next(cluster_id) => u32::from(cluster_id) as i32,
            Entry::Last => LAST,
            Entry::BadCluster => BAD,
        }
    }
}

#[cfg(test)]
mod test {
    use super::Entry;

    #[test]
    fn test_entry_values() {
        assert_eq!(Entry::try_from(0), Ok(Entry::Free));
        assert_eq!(Entry::try_from(-1), Ok(Entry::Last));
        assert_eq!(Entry::try_from(-2), Ok(Entry::BadCluster));
        assert_eq!(Entry::try_from(42), Ok(Entry::Next(42.into())));
        assert_eq!(Entry::try_from(-7), Err(-7));
        assert_eq!(i32::from(Entry::Next(9.into())), 9);
    }
}
