use std::fs;
use std::io::prelude::*;
use std::io::SeekFrom;
use std::path::Path;

/// Volume backed by a host file
#[derive(Debug)]
pub struct FileIO {
    file: fs::File,
}

impl FileIO {
    /// Open an existing volume file for reading and writing
    pub fn open<P: AsRef<Path>>(filepath: P) -> std::io::Result<Self> {
        let file = fs::File::options().read(true).write(true).open(filepath)?;
        Ok(Self { file })
    }

    /// Create or truncate a volume file, ready to be formatted
    pub fn create<P: AsRef<Path>>(filepath: P) -> std::io::Result<Self> {
        let mut options = fs::File::options();
        let file = options.read(true).write(true).create(true).truncate(true).open(filepath)?;
        Ok(Self { file })
    }
}

impl super::IO for FileIO {
    type Error = std::io::Error;

    fn read(&mut self, offset: u64, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.read_exact(buf)
    }

    fn write(&mut self, offset: u64, data: &[u8]) -> Result<(), Self::Error> {
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.file.flush()
    }
}

#[cfg(test)]
mod test {
    use super::FileIO;
    use crate::io::IO;

    #[test]
    fn test_file_io() {
        let path = std::env::temp_dir().join(format!("fatvol-io-{}.img", std::process::id()));
        let mut io = FileIO::create(&path).unwrap();
        io.write(1024, b"cluster").unwrap();
        io.flush().unwrap();
        drop(io);

        let mut io = FileIO::open(&path).unwrap();
        let mut buf = [0xFFu8; 8];
        io.read(1020, &mut buf).unwrap();
        assert_eq!(&buf, b"\0\0\0\0clus");
        assert!(io.read(1030, &mut buf).is_err());
        std::fs::remove_file(&path).unwrap();
    }
}
