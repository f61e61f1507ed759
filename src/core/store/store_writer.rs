use super::{options, store_error};
use crate::error::Result;
use bincode::Options;
use serde::Serialize;
use std::io::Write;

/// Writes the primitive values a persisted classifier is made of.
///
/// Integers are bincode varints, strings and distributions carry a varint
/// length prefix and floats are stored as little-endian IEEE values.
pub struct StoreWriter<W: ?Sized> {
    inner: W,
}

impl<W: Write> StoreWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write + ?Sized> StoreWriter<W> {
    fn write<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        options()
            .serialize_into(&mut self.inner, value)
            .map_err(store_error)
    }

    pub fn write_compact_size(&mut self, value: u64) -> Result<()> {
        self.write(&value)
    }

    pub fn write_string(&mut self, value: &str) -> Result<()> {
        self.write(value)
    }

    pub fn write_f32(&mut self, value: f32) -> Result<()> {
        self.write(&value)
    }

    pub fn write_f64(&mut self, value: f64) -> Result<()> {
        self.write(&value)
    }

    pub fn write_dist(&mut self, dist: &[f32]) -> Result<()> {
        self.write(dist)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}
