//! Configuration options for string segments.

use crate::segment::dictionary::{DICTIONARY_HEADER_SIZE, OFFSET_ENTRY_SIZE};
use crate::segment::location::BIG_STRING_MARKER_SIZE;

/// Default block size (256KB).
pub const DEFAULT_BLOCK_SIZE: usize = 256 * 1024;

/// Default limit for inline strings (4KB).
pub const DEFAULT_STRING_BLOCK_LIMIT: usize = 4096;

/// Smallest block size accepted by [`SegmentOptions::validate`].
pub const MIN_BLOCK_SIZE: usize = 64;

/// Default upper bound for a single overflow string (1GB).
pub const DEFAULT_MAX_OVERFLOW_STRING_SIZE: usize = 1 << 30;

/// Configuration options for a string segment.
#[derive(Debug, Clone)]
pub struct SegmentOptions {
    /// Size of every block managed by the buffer manager (in bytes).
    /// Default: 256KB
    pub block_size: usize,

    /// Dictionary entries (length prefix included) at or above this size
    /// are moved to the overflow chain and replaced by a marker.
    /// Default: 4KB
    pub string_block_limit: usize,

    /// Once header, offsets and dictionary use at least this many bytes,
    /// finalize skips compaction and reports the whole block as used.
    /// Default: 4/5 of the block size
    pub compaction_flush_limit: usize,

    /// Codec applied to overflow strings written to disk.
    /// Default: CompressionType::Gzip
    pub overflow_compression: CompressionType,

    /// Largest value accepted into the overflow chain. Reads reject
    /// on-disk headers claiming more.
    /// Default: 1GB
    pub max_overflow_string_size: usize,
}

impl Default for SegmentOptions {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            string_block_limit: DEFAULT_STRING_BLOCK_LIMIT,
            compaction_flush_limit: DEFAULT_BLOCK_SIZE / 5 * 4,
            overflow_compression: CompressionType::default(),
            max_overflow_string_size: DEFAULT_MAX_OVERFLOW_STRING_SIZE,
        }
    }
}

/// Compression algorithms for on-disk overflow strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum CompressionType {
    /// Gzip (deflate) compression.
    #[default]
    Gzip = 0,

    /// Snappy compression (fast, moderate compression ratio).
    #[cfg(feature = "snappy")]
    Snappy = 1,

    /// LZ4 compression (very fast, lower compression ratio).
    #[cfg(feature = "lz4-compression")]
    Lz4 = 2,
}

impl CompressionType {
    /// Convert from u8
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(CompressionType::Gzip),
            #[cfg(feature = "snappy")]
            1 => Some(CompressionType::Snappy),
            #[cfg(feature = "lz4-compression")]
            2 => Some(CompressionType::Lz4),
            _ => None,
        }
    }
}

impl SegmentOptions {
    /// Creates a new SegmentOptions with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the block size.
    ///
    /// The compaction flush limit is re-derived from the new size, and the
    /// inline string limit is clamped to a quarter of a block.
    pub fn block_size(mut self, size: usize) -> Self {
        self.block_size = size;
        self.compaction_flush_limit = size / 5 * 4;
        self.string_block_limit = self.string_block_limit.min(size / 4);
        self
    }

    /// Sets the inline string limit.
    pub fn string_block_limit(mut self, limit: usize) -> Self {
        self.string_block_limit = limit;
        self
    }

    /// Sets the compaction flush limit.
    pub fn compaction_flush_limit(mut self, limit: usize) -> Self {
        self.compaction_flush_limit = limit;
        self
    }

    /// Sets the overflow compression algorithm.
    pub fn overflow_compression(mut self, compression: CompressionType) -> Self {
        self.overflow_compression = compression;
        self
    }

    /// Sets the largest accepted overflow string.
    pub fn max_overflow_string_size(mut self, size: usize) -> Self {
        self.max_overflow_string_size = size;
        self
    }

    /// Validates the options and returns an error if any are invalid.
    pub fn validate(&self) -> crate::Result<()> {
        if self.block_size < MIN_BLOCK_SIZE || self.block_size > i32::MAX as usize {
            return Err(crate::Error::invalid_argument(format!(
                "block_size must be between {} and {}",
                MIN_BLOCK_SIZE,
                i32::MAX
            )));
        }
        if self.string_block_limit <= BIG_STRING_MARKER_SIZE {
            return Err(crate::Error::invalid_argument(
                "string_block_limit must be larger than the overflow marker",
            ));
        }
        // The largest inline entry plus its offset slot must fit in an empty block.
        let max_limit =
            (self.block_size - DICTIONARY_HEADER_SIZE - OFFSET_ENTRY_SIZE).min(u16::MAX as usize);
        if self.string_block_limit > max_limit {
            return Err(crate::Error::invalid_argument(format!(
                "string_block_limit must be <= {}",
                max_limit
            )));
        }
        if self.compaction_flush_limit > self.block_size {
            return Err(crate::Error::invalid_argument(
                "compaction_flush_limit must not exceed block_size",
            ));
        }
        if self.max_overflow_string_size < self.string_block_limit
            || self.max_overflow_string_size > u32::MAX as usize
        {
            return Err(crate::Error::invalid_argument(format!(
                "max_overflow_string_size must be between string_block_limit and {}",
                u32::MAX
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = SegmentOptions::default();
        assert_eq!(opts.block_size, 256 * 1024);
        assert_eq!(opts.string_block_limit, 4096);
        assert_eq!(opts.compaction_flush_limit, 256 * 1024 / 5 * 4);
        assert_eq!(opts.overflow_compression, CompressionType::Gzip);
        assert_eq!(opts.max_overflow_string_size, 1 << 30);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn test_block_size_rederives_limits() {
        let opts = SegmentOptions::new().block_size(4096);
        assert_eq!(opts.block_size, 4096);
        assert_eq!(opts.compaction_flush_limit, 4096 / 5 * 4);
        assert_eq!(opts.string_block_limit, 1024);
        assert!(opts.validate().is_ok());

        // A smaller explicit limit survives the block size change.
        let opts = SegmentOptions::new().string_block_limit(100).block_size(4096);
        assert_eq!(opts.string_block_limit, 100);
    }

    #[test]
    fn test_options_validation() {
        let mut opts = SegmentOptions::default();
        assert!(opts.validate().is_ok());

        opts.block_size = 16;
        assert!(opts.validate().is_err());

        let mut opts = SegmentOptions::default();
        opts.string_block_limit = BIG_STRING_MARKER_SIZE;
        assert!(opts.validate().is_err());

        let mut opts = SegmentOptions::default();
        opts.string_block_limit = 70_000;
        assert!(opts.validate().is_err());

        let mut opts = SegmentOptions::default();
        opts.compaction_flush_limit = opts.block_size + 1;
        assert!(opts.validate().is_err());

        let opts = SegmentOptions::default().max_overflow_string_size(100);
        assert!(opts.validate().is_err());

        let opts = SegmentOptions::default().max_overflow_string_size(u32::MAX as usize + 1);
        assert!(opts.validate().is_err());
    }

    #[test]
    fn test_compression_type_from_u8() {
        assert_eq!(CompressionType::from_u8(0), Some(CompressionType::Gzip));
        assert_eq!(CompressionType::from_u8(9), None);
    }
}
