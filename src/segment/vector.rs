//! Result container for scanned strings.

use crate::buffer::{BlockId, BufferHandle};
use bytes::Bytes;
use parking_lot::MappedRwLockReadGuard;
use std::fmt;
use std::sync::Arc;

/// A zero-copy view of a string stored in a pinned buffer.
///
/// The view owns a reference to the pinned buffer, so the pin is released
/// when the last view (or other holder) of that buffer goes away.
///
/// [`StringRef::bytes`] takes a read lock on the underlying buffer; do not
/// hold the returned guard across an append to the same segment.
#[derive(Clone)]
pub struct StringRef {
    buffer: Arc<BufferHandle>,
    offset: usize,
    len: usize,
}

impl StringRef {
    pub(crate) fn new(buffer: Arc<BufferHandle>, offset: usize, len: usize) -> Self {
        assert!(
            offset + len <= buffer.len(),
            "string view [{}, {}) exceeds buffer of {} bytes",
            offset,
            offset + len,
            buffer.len()
        );
        Self { buffer, offset, len }
    }

    /// Length of the string in bytes
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the string is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Block the view points into, `None` for decompressed scratch buffers
    pub fn block_id(&self) -> Option<BlockId> {
        self.buffer.block_id()
    }

    /// Borrow the string bytes
    pub fn bytes(&self) -> MappedRwLockReadGuard<'_, [u8]> {
        let range = self.offset..self.offset + self.len;
        MappedRwLockReadGuard::map(self.buffer.data(), move |data| &data[range])
    }

    /// Copy the string into a vector
    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes().to_vec()
    }

    /// Copy the string into a `Bytes`
    pub fn to_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(&self.bytes())
    }
}

impl PartialEq<[u8]> for StringRef {
    fn eq(&self, other: &[u8]) -> bool {
        *self.bytes() == *other
    }
}

impl fmt::Debug for StringRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringRef")
            .field("block_id", &self.block_id())
            .field("offset", &self.offset)
            .field("len", &self.len)
            .finish()
    }
}

/// A vector of nullable strings produced by scans and fetches.
#[derive(Debug, Clone, Default)]
pub struct StringVector {
    values: Vec<Option<StringRef>>,
}

impl StringVector {
    /// Create a vector of `len` NULLs
    pub fn with_len(len: usize) -> Self {
        Self { values: vec![None; len] }
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the vector has no entries
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Set the entry at `idx`, growing the vector with NULLs if needed
    pub fn set(&mut self, idx: usize, value: Option<StringRef>) {
        if idx >= self.values.len() {
            self.values.resize(idx + 1, None);
        }
        self.values[idx] = value;
    }

    /// Get the entry at `idx`; `None` for NULL or out of range
    pub fn get(&self, idx: usize) -> Option<&StringRef> {
        self.values.get(idx).and_then(Option::as_ref)
    }

    /// Check if the entry at `idx` is NULL
    pub fn is_null(&self, idx: usize) -> bool {
        self.get(idx).is_none()
    }

    /// Iterate over the entries
    pub fn iter(&self) -> impl Iterator<Item = Option<&StringRef>> {
        self.values.iter().map(Option::as_ref)
    }

    /// Copy every entry out of the vector
    pub fn to_vecs(&self) -> Vec<Option<Vec<u8>>> {
        self.iter().map(|v| v.map(StringRef::to_vec)).collect()
    }
}
