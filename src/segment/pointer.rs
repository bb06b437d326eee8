//! Descriptor of a persisted string segment.

use crate::buffer::BlockId;
use crate::error::Result;
use crate::segment::statistics::StringStatistics;
use serde::{Deserialize, Serialize};

/// Everything needed to reopen a persisted segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentPointer {
    /// Block holding the header, offset table and dictionary
    pub block_id: BlockId,
    /// First row of the segment within its column
    pub row_start: u64,
    /// Number of rows in the segment
    pub count: u64,
    /// Statistics collected while appending
    pub statistics: StringStatistics,
    /// Codec of the on-disk overflow strings, as `CompressionType as u8`
    pub overflow_compression: u8,
}

impl SegmentPointer {
    /// Encode the pointer with bincode
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode a pointer produced by [`SegmentPointer::encode`]
    pub fn decode(data: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(data)?)
    }
}
