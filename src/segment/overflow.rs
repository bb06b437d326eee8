//! Overflow storage for strings too large to inline.
//!
//! Before a segment is flushed, overflow strings go to a chain of transient
//! in-memory blocks ([`OverflowChain`]). Each value is stored as
//! `[len: u32][bytes]` at the write cursor of the newest block; a new block
//! is only allocated when the newest one cannot hold the next value.

use crate::buffer::{BlockHandle, BlockId, BufferManager};
use crate::config::CompressionType;
use crate::error::{Error, Result};
use bytes::BufMut;
use std::collections::HashMap;
use std::sync::Arc;

/// Size of the length prefix of an overflow string.
pub const OVERFLOW_LENGTH_SIZE: usize = std::mem::size_of::<u32>();

/// Destination for strings that do not fit inline.
///
/// Returns the `(block_id, offset)` pair stored in the dictionary marker.
pub trait OverflowWriter: Send {
    /// Store `value` and return where it was written
    fn write_string(&mut self, value: &[u8]) -> Result<(BlockId, i32)>;

    /// Make every written string durable
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    /// Codec applied to stored strings; `None` if they are stored as-is
    fn compression(&self) -> Option<CompressionType> {
        None
    }
}

/// One block of the in-memory chain.
#[derive(Debug)]
struct StringBlock {
    block: Arc<BlockHandle>,
    /// Next free byte
    offset: usize,
    /// Capacity of the block
    size: usize,
}

/// Append-only chain of in-memory overflow blocks.
///
/// Blocks live in a vector, newest last, so tearing the chain down is a
/// single deallocation regardless of its length.
#[derive(Debug)]
pub struct OverflowChain {
    buffer_manager: Arc<BufferManager>,
    blocks: Vec<StringBlock>,
    lookup: HashMap<BlockId, usize>,
}

impl OverflowChain {
    /// Create an empty chain
    pub fn new(buffer_manager: Arc<BufferManager>) -> Self {
        Self { buffer_manager, blocks: Vec::new(), lookup: HashMap::new() }
    }

    /// Get the chain block with the given id
    pub fn block(&self, block_id: BlockId) -> Option<&Arc<BlockHandle>> {
        self.lookup.get(&block_id).map(|&idx| &self.blocks[idx].block)
    }

    /// Number of blocks in the chain
    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// Check if no overflow string has been written
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    fn allocate_block(&mut self, required: usize) {
        let size = required.max(self.buffer_manager.block_size());
        let block = self.buffer_manager.register_memory(size);
        log::debug!("Allocated overflow block {} ({} bytes)", block.block_id(), size);

        self.lookup.insert(block.block_id(), self.blocks.len());
        self.blocks.push(StringBlock { block, offset: 0, size });
    }
}

impl OverflowWriter for OverflowChain {
    fn write_string(&mut self, value: &[u8]) -> Result<(BlockId, i32)> {
        if value.len() > (u32::MAX as usize - OVERFLOW_LENGTH_SIZE) {
            return Err(Error::invalid_argument(format!(
                "Overflow string of {} bytes is too large",
                value.len()
            )));
        }
        let total = value.len() + OVERFLOW_LENGTH_SIZE;

        let fits = self.blocks.last().is_some_and(|head| head.offset + total <= head.size);
        if !fits {
            self.allocate_block(total);
        }

        let Some(head) = self.blocks.last_mut() else {
            return Err(Error::internal("Overflow chain has no head block"));
        };
        let handle = self.buffer_manager.pin(&head.block)?;
        {
            let mut data = handle.data_mut();
            let mut target = &mut data[head.offset..head.offset + total];
            target.put_u32_le(value.len() as u32);
            target.put_slice(value);
        }

        let result = (head.block.block_id(), head.offset as i32);
        head.offset += total;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{InMemoryBlockManager, MAXIMUM_BLOCK};
    use bytes::Buf;

    fn chain(block_size: usize) -> (Arc<BufferManager>, OverflowChain) {
        let bm = Arc::new(BufferManager::new(Arc::new(InMemoryBlockManager::new(block_size))));
        let chain = OverflowChain::new(bm.clone());
        (bm, chain)
    }

    fn read_back(bm: &BufferManager, chain: &OverflowChain, block_id: BlockId, offset: i32) -> Vec<u8> {
        let handle = bm.pin(chain.block(block_id).unwrap()).unwrap();
        let data = handle.data();
        let offset = offset as usize;
        let len = (&data[offset..offset + 4]).get_u32_le() as usize;
        data[offset + 4..offset + 4 + len].to_vec()
    }

    #[test]
    fn test_values_share_a_block() {
        let (bm, mut chain) = chain(256);
        assert!(chain.is_empty());

        let (b1, o1) = chain.write_string(b"first value").unwrap();
        let (b2, o2) = chain.write_string(b"second").unwrap();

        assert!(b1 >= MAXIMUM_BLOCK);
        assert_eq!(b1, b2);
        assert_eq!(o1, 0);
        assert_eq!(o2, 4 + 11);
        assert_eq!(chain.num_blocks(), 1);

        assert_eq!(read_back(&bm, &chain, b1, o1), b"first value");
        assert_eq!(read_back(&bm, &chain, b2, o2), b"second");
    }

    #[test]
    fn test_new_block_when_head_is_full() {
        let (bm, mut chain) = chain(128);
        let value = vec![7u8; 100];

        let (b1, _) = chain.write_string(&value).unwrap();
        let (b2, o2) = chain.write_string(&value).unwrap();
        assert_ne!(b1, b2);
        assert_eq!(o2, 0);
        assert_eq!(chain.num_blocks(), 2);

        // Old blocks remain readable through the lookup
        assert_eq!(read_back(&bm, &chain, b1, 0), value);
        assert_eq!(read_back(&bm, &chain, b2, 0), value);
    }

    #[test]
    fn test_oversized_value_gets_dedicated_block() {
        let (bm, mut chain) = chain(128);
        let value = vec![1u8; 1000];

        let (block_id, offset) = chain.write_string(&value).unwrap();
        assert_eq!(offset, 0);
        assert_eq!(chain.block(block_id).unwrap().size(), 1004);
        assert_eq!(read_back(&bm, &chain, block_id, offset), value);
    }

    #[test]
    fn test_writes_release_pins() {
        let (bm, mut chain) = chain(128);
        for i in 0..20u8 {
            chain.write_string(&[i; 30]).unwrap();
        }
        assert_eq!(bm.stats().outstanding(), 0);
        assert!(chain.num_blocks() > 1);
    }

    #[test]
    fn test_long_chain_teardown() {
        let (_bm, mut chain) = chain(64);
        for _ in 0..10_000 {
            chain.write_string(&[0u8; 60]).unwrap();
        }
        assert_eq!(chain.num_blocks(), 10_000);
        drop(chain);
    }
}
