/*!
    Bounds-checked sequential reader over an immutable byte buffer.

    Every read either returns the requested bytes and advances the cursor,
    or fails with [`ReadError::OutOfBounds`] and leaves the cursor where it
    was. Integers are big-endian throughout.
*/

use thiserror::Error;

/**
    Errors from [`Reader`] operations.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReadError {
    #[error("read of {needed} bytes at offset {offset} exceeds buffer ({remaining} remaining)")]
    OutOfBounds {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    #[error("unsupported integer width {0} (expected 1, 2, 4 or 8)")]
    UnsupportedWidth(usize),
}

/**
    Sequential big-endian reader with a cursor starting at 0.
*/
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /**
        Current cursor position (bytes consumed so far).
    */
    pub const fn position(&self) -> usize {
        self.offset
    }

    /**
        Bytes left between the cursor and the end of the buffer.
    */
    pub const fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /**
        Read the next `n` bytes.
    */
    pub fn read_fixed(&mut self, n: usize) -> Result<&'a [u8], ReadError> {
        if n > self.remaining() {
            return Err(ReadError::OutOfBounds {
                offset: self.offset,
                needed: n,
                remaining: self.remaining(),
            });
        }
        let out = &self.data[self.offset..self.offset + n];
        self.offset += n;
        Ok(out)
    }

    /**
        Read the next `N` bytes into an array.
    */
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], ReadError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_fixed(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, ReadError> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, ReadError> {
        self.read_array().map(u16::from_be_bytes)
    }

    pub fn read_u32(&mut self) -> Result<u32, ReadError> {
        self.read_array().map(u32::from_be_bytes)
    }

    /**
        Read a big-endian unsigned integer of `width` bytes (1, 2, 4 or 8).
    */
    pub fn read_uint(&mut self, width: usize) -> Result<u64, ReadError> {
        match width {
            1 => self.read_u8().map(u64::from),
            2 => self.read_u16().map(u64::from),
            4 => self.read_u32().map(u64::from),
            8 => self.read_array().map(u64::from_be_bytes),
            other => Err(ReadError::UnsupportedWidth(other)),
        }
    }

    /**
        Read a `width`-byte big-endian length `L`, then `L` bytes of payload.

        The declared length is checked against the remaining buffer before any
        payload is touched. On failure the cursor is restored to the start of
        the length field.
    */
    pub fn read_length_prefixed(&mut self, width: usize) -> Result<&'a [u8], ReadError> {
        let start = self.offset;
        let len = self.read_uint(width)?;
        let payload = usize::try_from(len)
            .map_err(|_| ReadError::OutOfBounds {
                offset: self.offset,
                needed: usize::MAX,
                remaining: self.remaining(),
            })
            .and_then(|len| self.read_fixed(len));
        if payload.is_err() {
            self.offset = start;
        }
        payload
    }
}
