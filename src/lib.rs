//! # strseg - Uncompressed String Segments
//!
//! strseg stores variable-length strings for a columnar storage engine. A
//! column is split into segments; each segment owns one fixed-size block
//! managed by a [`BufferManager`].
//!
//! ## Architecture
//!
//! - **Dictionary block**: a header, an offset table growing forward and a
//!   dictionary of string entries growing backward from the block end
//! - **Overflow chain**: strings too large to inline are stored elsewhere and
//!   referenced by a marker; in memory before flush, compressed on disk after
//! - **Buffer manager**: pins blocks into memory; every returned string holds
//!   a reference to the pinned buffer it points into
//! - **Block manager**: the persistent store of blocks, in memory or in a
//!   checksummed file
//!
//! ## Example Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use strseg::{BufferManager, InMemoryBlockManager, SegmentOptions, StringSegment, StringVector};
//!
//! # fn main() -> Result<(), strseg::Error> {
//! let store = Arc::new(InMemoryBlockManager::new(4096));
//! let buffer_manager = Arc::new(BufferManager::new(store));
//! let options = SegmentOptions::new().block_size(4096);
//!
//! let mut segment = StringSegment::new(buffer_manager, options, 0)?;
//! let appended = segment.append(&[Some(&b"hello"[..]), None, Some(&b"world"[..])])?;
//! assert_eq!(appended, 3);
//! segment.finalize_append()?;
//!
//! let state = segment.init_scan()?;
//! let mut result = StringVector::with_len(3);
//! segment.scan(&state, 3, &mut result)?;
//! assert_eq!(result.get(0).map(|s| s.to_vec()), Some(b"hello".to_vec()));
//! assert!(result.is_null(1));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// Module declarations
pub mod buffer;
pub mod compression;
pub mod config;
pub mod error;
pub mod segment;

// Re-exports
pub use buffer::{
    BlockHandle, BlockId, BlockManager, BufferHandle, BufferManager, BufferStats, FileBlockManager,
    InMemoryBlockManager, INVALID_BLOCK, MAXIMUM_BLOCK,
};
pub use config::{CompressionType, SegmentOptions};
pub use error::{Error, Result};
pub use segment::{
    ColumnFetchState, ColumnScanState, DiskOverflowWriter, OverflowWriter, SegmentPhase, SegmentPointer,
    StringAnalyzeState, StringLocation, StringRef, StringSegment, StringStatistics, StringVector,
};
