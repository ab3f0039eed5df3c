use std::fs;
use std::io::{self, Write};

use fatvol::Cursor;

use crate::error::{CommandError, Result};
use crate::Volume;

pub fn cat(volume: &mut Volume, cursor: &Cursor, path: &str) -> Result<()> {
    let bytes = volume.read_file(cursor, path)?;
    let mut stdout = io::stdout();
    stdout.write_all(&bytes).map_err(CommandError::host("stdout"))?;
    stdout.flush().map_err(CommandError::host("stdout"))
}

/// Copy a volume file out to the host
pub fn outcp(volume: &mut Volume, cursor: &Cursor, path: &str, target: &str) -> Result<()> {
    let bytes = volume.read_file(cursor, path)?;
    fs::write(target, &bytes).map_err(CommandError::host(target))?;
    debug!("Copied {} bytes from {} to {}", bytes.len(), path, target);
    Ok(())
}
