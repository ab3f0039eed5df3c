/// Boot region, holds the superblock
pub(crate) mod boot;

/// Table region, two identical copies of one `i32` entry per cluster
pub(crate) mod fat;

/// Data region, directory records and file payloads
pub(crate) mod data;
