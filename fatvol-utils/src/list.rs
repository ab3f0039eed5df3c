use fatvol::Cursor;

use crate::error::Result;
use crate::Volume;

pub fn list(volume: &mut Volume, cursor: &Cursor, path: &str) -> Result<()> {
    for entry in volume.list(cursor, path)? {
        print!("{}", if entry.is_directory { "d" } else { "-" });
        print!(" {:8}", entry.size);
        print!(" {:6}", entry.first_cluster);
        match entry.is_directory && !entry.is_bootstrap() {
            true => println!(" {}/", entry.name()),
            false => println!(" {}", entry.name()),
        }
    }
    Ok(())
}
