#[cfg(feature = "std")]
pub mod std;

pub mod memory;

use core::fmt::Debug;

use crate::error::Error;

/// Byte-addressed backing storage of a volume
pub trait IO {
    type Error: Debug;

    /// Fill `buf` with the bytes starting at absolute `offset`
    fn read(&mut self, offset: u64, buf: &mut [u8]) -> Result<(), Self::Error>;
    /// Store `data` at absolute `offset`, growing the storage if needed
    fn write(&mut self, offset: u64, data: &[u8]) -> Result<(), Self::Error>;
    fn flush(&mut self) -> Result<(), Self::Error>;
}

const ZEROS: [u8; 1024] = [0u8; 1024];

pub(crate) struct Wrapper<IO>(IO);

impl<E, T: IO<Error = E>> Wrapper<T> {
    pub fn new(io: T) -> Self {
        Self(io)
    }

    pub fn into_inner(self) -> T {
        self.0
    }

    pub fn read(&mut self, offset: u64, buf: &mut [u8]) -> Result<(), Error<E>> {
        self.0.read(offset, buf).map_err(|e| Error::IO(e))
    }

    pub fn write(&mut self, offset: u64, data: &[u8]) -> Result<(), Error<E>> {
        self.0.write(offset, data).map_err(|e| Error::IO(e))
    }

    pub fn read_i32(&mut self, offset: u64) -> Result<i32, Error<E>> {
        let mut bytes = [0u8; 4];
        self.read(offset, &mut bytes)?;
        Ok(i32::from_le_bytes(bytes))
    }

    pub fn write_i32(&mut self, offset: u64, value: i32) -> Result<(), Error<E>> {
        self.write(offset, &value.to_le_bytes())
    }

    /// Zero `length` bytes starting at `offset`
    pub fn zero(&mut self, mut offset: u64, length: u64) -> Result<(), Error<E>> {
        let end = offset + length;
        while offset < end {
            let size = core::cmp::min(end - offset, ZEROS.len() as u64) as usize;
            self.write(offset, &ZEROS[..size])?;
            offset += size as u64;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), Error<E>> {
        self.0.flush().map_err(|e| Error::IO(e))
    }
}

#[cfg(test)]
mod test {
    use super::memory::MemoryIO;
    use super::Wrapper;

    #[test]
    fn test_integer_little_endian() {
        let mut io = Wrapper::new(MemoryIO::default());
        io.write_i32(8, -2).unwrap();
        io.write_i32(12, 0x01020304).unwrap();
        assert_eq!(io.read_i32(8).unwrap(), -2);
        let mut bytes = [0u8; 4];
        io.read(12, &mut bytes).unwrap();
        assert_eq!(bytes, [4, 3, 2, 1]);
    }

    #[test]
    fn test_zero_spans_chunks() {
        let mut io = Wrapper::new(MemoryIO::new(vec![0xAA; 4096]));
        io.zero(100, 3000).unwrap();
        let bytes = io.into_inner().into_inner();
        assert_eq!(bytes[99], 0xAA);
        assert!(bytes[100..3100].iter().all(|&b| b == 0));
        assert_eq!(bytes[3100], 0xAA);
    }

    #[test]
    fn test_read_out_of_range() {
        let mut io = Wrapper::new(MemoryIO::new(vec![0; 16]));
        let mut buf = [0u8; 8];
        assert!(io.read(12, &mut buf).is_err());
    }
}
