//! Buffer management for segment blocks.
//!
//! This module provides the buffer-manager contract the string segment is
//! written against:
//!
//! - `BufferManager::pin` returns a reference-counted, memory-resident view
//!   of a block ([`BufferHandle`]); persisted blocks are evicted once the
//!   last pin is released
//! - `BufferManager::register_memory` creates a transient block that only
//!   lives in memory
//! - `BufferManager::register_block` refers to a block persisted in a
//!   [`BlockManager`]
//! - `BufferManager::allocate` hands out scratch memory not backed by disk
//!
//! ## Block Ids
//!
//! ```text
//! [0, MAXIMUM_BLOCK)        persisted blocks (owned by a BlockManager)
//! [MAXIMUM_BLOCK, i64::MAX] transient in-memory blocks
//! -1                        INVALID_BLOCK
//! ```

pub mod block_manager;
pub mod handle;
pub mod manager;

pub use block_manager::{BlockManager, FileBlockManager, InMemoryBlockManager};
pub use handle::{BlockHandle, BufferHandle, FileBuffer};
pub use manager::{BufferManager, BufferStats};

/// Identifier of a block.
pub type BlockId = i64;

/// Sentinel for "no block".
pub const INVALID_BLOCK: BlockId = -1;

/// Persisted block ids are strictly below this value; transient
/// in-memory block ids start at it.
pub const MAXIMUM_BLOCK: BlockId = 1 << 62;

/// Returns true if `id` refers to a block persisted by a block manager.
#[inline]
pub fn is_persistent_block(id: BlockId) -> bool {
    (0..MAXIMUM_BLOCK).contains(&id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_id_ranges() {
        assert!(is_persistent_block(0));
        assert!(is_persistent_block(MAXIMUM_BLOCK - 1));
        assert!(!is_persistent_block(MAXIMUM_BLOCK));
        assert!(!is_persistent_block(INVALID_BLOCK));
    }
}
