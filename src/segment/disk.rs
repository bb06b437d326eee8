//! Writing overflow strings to persisted blocks.
//!
//! Each string is compressed and stored as
//! ```text
//! [compressed_size: u32][uncompressed_size: u32][compressed bytes...]
//! ```
//! at the write cursor of the current block. A payload that does not fit
//! continues at offset 0 of a new block; the last 8 bytes of the block it
//! leaves hold the id of the continuation block:
//! ```text
//! [... compressed bytes ...][next block_id: i64]
//! ```

use crate::buffer::{BlockId, BufferHandle, BufferManager, INVALID_BLOCK};
use crate::compression;
use crate::config::CompressionType;
use crate::error::{Error, Result};
use crate::segment::overflow::OverflowWriter;
use bytes::BufMut;
use std::sync::Arc;

/// Size of the `[compressed_size][uncompressed_size]` header.
pub const OVERFLOW_HEADER_SIZE: usize = 2 * std::mem::size_of::<u32>();

/// Size of the continuation link at the end of a block.
pub const BLOCK_LINK_SIZE: usize = std::mem::size_of::<BlockId>();

/// Overflow writer that compresses strings into blocks of the block manager.
///
/// The block being filled is kept in a scratch buffer and written out when
/// the writer moves to the next block, and on [`OverflowWriter::flush`].
pub struct DiskOverflowWriter {
    buffer_manager: Arc<BufferManager>,
    compression: CompressionType,
    handle: Option<BufferHandle>,
    block_id: BlockId,
    offset: usize,
    dirty: bool,
    blocks_written: usize,
}

impl DiskOverflowWriter {
    /// Create a writer that stores strings in the manager's block manager
    pub fn new(buffer_manager: Arc<BufferManager>, compression: CompressionType) -> Self {
        Self {
            buffer_manager,
            compression,
            handle: None,
            block_id: INVALID_BLOCK,
            offset: 0,
            dirty: false,
            blocks_written: 0,
        }
    }

    /// Number of block writes issued so far
    pub fn blocks_written(&self) -> usize {
        self.blocks_written
    }

    /// Bytes of a block available for headers and payload
    fn string_space(&self) -> usize {
        self.buffer_manager.block_size() - BLOCK_LINK_SIZE
    }

    fn write_current_block(&mut self) -> Result<()> {
        let Some(handle) = &self.handle else {
            return Ok(());
        };
        self.buffer_manager.block_manager().write_block(self.block_id, &handle.data())?;
        log::debug!("Wrote overflow block {} ({} bytes used)", self.block_id, self.offset);
        self.blocks_written += 1;
        self.dirty = false;
        Ok(())
    }

    fn allocate_new_block(&mut self, new_block_id: BlockId) -> Result<()> {
        if self.block_id != INVALID_BLOCK {
            self.write_current_block()?;
        }
        if let Some(handle) = &self.handle {
            handle.data_mut().fill(0);
        }
        self.offset = 0;
        self.block_id = new_block_id;
        Ok(())
    }
}

impl OverflowWriter for DiskOverflowWriter {
    fn write_string(&mut self, value: &[u8]) -> Result<(BlockId, i32)> {
        if value.len() > u32::MAX as usize {
            return Err(Error::invalid_argument(format!(
                "Overflow string of {} bytes is too large",
                value.len()
            )));
        }
        if self.handle.is_none() {
            self.handle = Some(self.buffer_manager.allocate(self.buffer_manager.block_size()));
        }

        let string_space = self.string_space();
        if self.block_id == INVALID_BLOCK || self.offset + OVERFLOW_HEADER_SIZE >= string_space {
            let new_block_id = self.buffer_manager.block_manager().free_block_id();
            self.allocate_new_block(new_block_id)?;
        }
        let result = (self.block_id, self.offset as i32);

        let compressed = compression::compress(self.compression, value)?;
        if compressed.len() > u32::MAX as usize {
            return Err(Error::internal("Compressed overflow string exceeds u32 range"));
        }

        {
            let Some(handle) = &self.handle else {
                return Err(Error::internal("Overflow writer has no block buffer"));
            };
            let mut data = handle.data_mut();
            let mut header = &mut data[self.offset..self.offset + OVERFLOW_HEADER_SIZE];
            header.put_u32_le(compressed.len() as u32);
            header.put_u32_le(value.len() as u32);
        }
        self.offset += OVERFLOW_HEADER_SIZE;
        self.dirty = true;

        let mut remaining = &compressed[..];
        while !remaining.is_empty() {
            let to_write = remaining.len().min(string_space - self.offset);
            if to_write > 0 {
                if let Some(handle) = &self.handle {
                    handle.data_mut()[self.offset..self.offset + to_write].copy_from_slice(&remaining[..to_write]);
                }
                remaining = &remaining[to_write..];
                self.offset += to_write;
            }
            if !remaining.is_empty() {
                // Link the continuation block from the end of this one
                let new_block_id = self.buffer_manager.block_manager().free_block_id();
                if let Some(handle) = &self.handle {
                    let mut data = handle.data_mut();
                    (&mut data[self.offset..self.offset + BLOCK_LINK_SIZE]).put_i64_le(new_block_id);
                }
                self.allocate_new_block(new_block_id)?;
                self.dirty = true;
            }
        }
        Ok(result)
    }

    fn flush(&mut self) -> Result<()> {
        if self.dirty && self.block_id != INVALID_BLOCK {
            self.write_current_block()?;
        }
        Ok(())
    }

    fn compression(&self) -> Option<CompressionType> {
        Some(self.compression)
    }
}

impl Drop for DiskOverflowWriter {
    fn drop(&mut self) {
        if self.dirty {
            if let Err(e) = self.flush() {
                log::warn!("Failed to flush overflow block {}: {}", self.block_id, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{BlockManager, InMemoryBlockManager};
    use bytes::Buf;

    fn writer(block_size: usize) -> (Arc<InMemoryBlockManager>, DiskOverflowWriter) {
        let store = Arc::new(InMemoryBlockManager::new(block_size));
        let bm = Arc::new(BufferManager::new(store.clone()));
        (store, DiskOverflowWriter::new(bm, CompressionType::Gzip))
    }

    #[test]
    fn test_nothing_written_until_flush() {
        let (store, mut writer) = writer(4096);
        let (block_id, offset) = writer.write_string(&[b'x'; 5000]).unwrap();
        assert_eq!((block_id, offset), (0, 0));
        assert_eq!(store.num_blocks(), 0);

        writer.flush().unwrap();
        assert_eq!(store.num_blocks(), 1);
        assert_eq!(writer.blocks_written(), 1);

        // Flushing again without new data is a no-op
        writer.flush().unwrap();
        assert_eq!(writer.blocks_written(), 1);
    }

    #[test]
    fn test_header_layout() {
        let (store, mut writer) = writer(4096);
        let value = b"compressible compressible compressible".repeat(20);
        writer.write_string(&value).unwrap();
        writer.flush().unwrap();

        let mut block = vec![0u8; 4096];
        store.read_block(0, &mut block).unwrap();
        let mut header = &block[..OVERFLOW_HEADER_SIZE];
        let compressed_size = header.get_u32_le() as usize;
        let uncompressed_size = header.get_u32_le() as usize;
        assert_eq!(uncompressed_size, value.len());
        assert!(compressed_size < value.len());

        let mut out = vec![0u8; uncompressed_size];
        compression::decompress_into(
            CompressionType::Gzip,
            &block[OVERFLOW_HEADER_SIZE..OVERFLOW_HEADER_SIZE + compressed_size],
            &mut out,
        )
        .unwrap();
        assert_eq!(out, value);
    }

    #[test]
    fn test_strings_share_block_then_move_on() {
        let (store, mut writer) = writer(256);
        let (b1, o1) = writer.write_string(b"aaaaaaaaaaaaaaaaaaaaaaaaaaaaaa").unwrap();
        let (b2, o2) = writer.write_string(b"bbbbbbbbbbbbbbbbbbbbbbbbbbbbbb").unwrap();
        assert_eq!(b1, b2);
        assert_eq!(o1, 0);
        assert!(o2 > 0);

        // Fill up until a new block is started
        let mut last = b2;
        for _ in 0..20 {
            let (b, _) = writer.write_string(b"cccccccccccccccccccccccccccccc").unwrap();
            last = b;
        }
        assert!(last > b1);
        writer.flush().unwrap();
        assert_eq!(store.num_blocks() as i64, last + 1);
    }

    #[test]
    fn test_link_written_at_block_end() {
        let (store, mut writer) = writer(256);
        // Random-looking bytes do not compress, forcing a multi-block payload
        let mut x = 0x9E37_79B9_7F4A_7C15u64;
        let value: Vec<u8> = (0..600)
            .map(|_| {
                x ^= x << 13;
                x ^= x >> 7;
                x ^= x << 17;
                x as u8
            })
            .collect();
        writer.write_string(&value).unwrap();
        writer.flush().unwrap();
        assert!(store.num_blocks() >= 3);

        let mut block = vec![0u8; 256];
        store.read_block(0, &mut block).unwrap();
        let link = (&block[256 - BLOCK_LINK_SIZE..]).get_i64_le();
        assert_eq!(link, 1);
    }

    #[test]
    fn test_reports_codec() {
        let (_store, writer) = writer(256);
        assert_eq!(writer.compression(), Some(CompressionType::Gzip));
    }

    #[test]
    fn test_drop_flushes() {
        let (store, mut writer) = writer(512);
        writer.write_string(&[b'z'; 600]).unwrap();
        drop(writer);
        assert_eq!(store.num_blocks(), 1);
    }
}
