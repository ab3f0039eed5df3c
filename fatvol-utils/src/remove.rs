use fatvol::Cursor;

use crate::error::Result;
use crate::Volume;

pub fn remove(volume: &mut Volume, cursor: &Cursor, path: &str) -> Result<()> {
    let entry = volume.remove_file(cursor, path)?;
    debug!("Removed {} starting at cluster {}", entry.name(), entry.first_cluster);
    Ok(())
}

pub fn remove_directory(volume: &mut Volume, cursor: &Cursor, path: &str) -> Result<()> {
    let entry = volume.remove_directory(cursor, path)?;
    debug!("Removed directory {} on cluster {}", entry.name(), entry.first_cluster);
    Ok(())
}
