//! Append-only output sinks for encoded values

use crate::view::TaggedValue;
use smallvec::SmallVec;
use xqvalue_diagnostics::{Result, XqError};

/// Append-only, growable byte destination
///
/// The codec writers only ever append. An evaluator resets its sink before
/// producing each new result value.
pub trait ValueSink {
    /// Truncate the sink to empty, keeping its capacity
    fn reset(&mut self);

    /// Append raw bytes
    fn write_bytes(&mut self, bytes: &[u8]);

    /// Bytes written so far
    fn as_bytes(&self) -> &[u8];

    /// Overwrite bytes that were already written at `offset`
    fn patch(&mut self, offset: usize, bytes: &[u8]) -> Result<()>;

    /// Number of bytes written so far
    fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Check if nothing has been written
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn write_u8(&mut self, value: u8) {
        self.write_bytes(&[value]);
    }

    fn write_i8(&mut self, value: i8) {
        self.write_bytes(&value.to_be_bytes());
    }

    fn write_i16(&mut self, value: i16) {
        self.write_bytes(&value.to_be_bytes());
    }

    fn write_i32(&mut self, value: i32) {
        self.write_bytes(&value.to_be_bytes());
    }

    fn write_u32(&mut self, value: u32) {
        self.write_bytes(&value.to_be_bytes());
    }

    fn write_i64(&mut self, value: i64) {
        self.write_bytes(&value.to_be_bytes());
    }

    fn write_f32(&mut self, value: f32) {
        self.write_bytes(&value.to_be_bytes());
    }

    fn write_f64(&mut self, value: f64) {
        self.write_bytes(&value.to_be_bytes());
    }
}

fn patch_slice(target: &mut [u8], offset: usize, bytes: &[u8]) -> Result<()> {
    let end = offset
        .checked_add(bytes.len())
        .filter(|end| *end <= target.len())
        .ok_or_else(|| XqError::internal(format!("patch at {offset} past end of sink")))?;
    target[offset..end].copy_from_slice(bytes);
    Ok(())
}

impl ValueSink for Vec<u8> {
    fn reset(&mut self) {
        self.clear();
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }

    fn as_bytes(&self) -> &[u8] {
        self.as_slice()
    }

    fn patch(&mut self, offset: usize, bytes: &[u8]) -> Result<()> {
        patch_slice(self.as_mut_slice(), offset, bytes)
    }
}

/// Scratch buffer for one encoded value
///
/// Small atomic values (every fixed-width type) stay inline; strings and
/// binaries spill to the heap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueBuffer {
    bytes: SmallVec<[u8; 32]>,
}

impl ValueBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// View the buffer contents as one tagged value
    pub fn as_tagged(&self) -> Result<TaggedValue<'_>> {
        TaggedValue::new(&self.bytes)
    }

    /// Copy the contents out
    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }
}

impl ValueSink for ValueBuffer {
    fn reset(&mut self) {
        self.bytes.clear();
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn patch(&mut self, offset: usize, bytes: &[u8]) -> Result<()> {
        patch_slice(&mut self.bytes, offset, bytes)
    }
}

impl AsRef<[u8]> for ValueBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}
