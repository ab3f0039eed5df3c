use alloc::vec::Vec;

/// Read past the end of a memory backed volume
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct OutOfRange {
    pub offset: u64,
    pub length: usize,
}

/// Volume kept entirely in memory, mostly useful for tests and tooling
#[derive(Clone, Debug, Default)]
pub struct MemoryIO {
    bytes: Vec<u8>,
}

impl MemoryIO {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.bytes
    }
}

impl super::IO for MemoryIO {
    type Error = OutOfRange;

    fn read(&mut self, offset: u64, buf: &mut [u8]) -> Result<(), Self::Error> {
        let error = OutOfRange { offset, length: buf.len() };
        let start = usize::try_from(offset).map_err(|_| error)?;
        let end = start.checked_add(buf.len()).ok_or(error)?;
        let bytes = self.bytes.get(start..end).ok_or(error)?;
        buf.copy_from_slice(bytes);
        Ok(())
    }

    fn write(&mut self, offset: u64, data: &[u8]) -> Result<(), Self::Error> {
        let error = OutOfRange { offset, length: data.len() };
        let start = usize::try_from(offset).map_err(|_| error)?;
        let end = start.checked_add(data.len()).ok_or(error)?;
        if self.bytes.len() < end {
            self.bytes.resize(end, 0);
        }
        self.bytes[start..end].copy_from_slice(data);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
