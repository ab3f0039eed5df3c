use std::fs;

use fatvol::Cursor;

use crate::error::{CommandError, Result};
use crate::Volume;

/// Copy a host file into the volume
pub fn incp(volume: &mut Volume, cursor: &Cursor, source: &str, path: &str) -> Result<()> {
    let bytes = fs::read(source).map_err(CommandError::host(source))?;
    let entry = volume.write_new_file(cursor, path, &bytes)?;
    debug!("Copied {} bytes from {} starting at cluster {}", entry.size, source, entry.first_cluster);
    Ok(())
}
