use super::{options, store_error};
use crate::error::{ArborError, Result};
use bincode::Options;
use serde::de::DeserializeOwned;
use std::io::{self, ErrorKind, Read};

/// Reads back the primitives written by [`super::StoreWriter`].
///
/// Running out of input is a format error, never a partial value.
pub struct StoreReader<R: ?Sized> {
    peeked: Option<u8>,
    inner: R,
}

impl<R: Read> StoreReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            peeked: None,
            inner,
        }
    }
}

impl<R: Read + ?Sized> StoreReader<R> {
    fn read<T: DeserializeOwned>(&mut self) -> Result<T> {
        let source = Source {
            peeked: &mut self.peeked,
            inner: &mut self.inner,
        };
        options().deserialize_from(source).map_err(store_error)
    }

    pub fn read_compact_size(&mut self) -> Result<u64> {
        self.read()
    }

    pub fn read_len(&mut self) -> Result<usize> {
        let len = self.read_compact_size()?;
        usize::try_from(len).map_err(|_| ArborError::Malformed(format!("length {len} too large")))
    }

    pub fn read_string(&mut self) -> Result<String> {
        self.read()
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        self.read()
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        self.read()
    }

    pub fn read_dist(&mut self) -> Result<Vec<f32>> {
        self.read()
    }

    /// Returns true when no bytes remain in the underlying stream.
    pub fn at_end(&mut self) -> Result<bool> {
        if self.peeked.is_some() {
            return Ok(false);
        }
        let mut byte = [0u8; 1];
        loop {
            match self.inner.read(&mut byte) {
                Ok(0) => return Ok(true),
                Ok(_) => {
                    self.peeked = Some(byte[0]);
                    return Ok(false);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// Hands a byte taken by [`StoreReader::at_end`] back to bincode before
/// the rest of the stream.
struct Source<'a, R: ?Sized> {
    peeked: &'a mut Option<u8>,
    inner: &'a mut R,
}

impl<R: Read + ?Sized> Read for Source<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if let Some(byte) = self.peeked.take() {
            buf[0] = byte;
            return Ok(1);
        }
        self.inner.read(buf)
    }
}
