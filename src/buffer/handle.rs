//! Block and buffer handles.

use crate::buffer::block_manager::BlockManager;
use crate::buffer::manager::PinCounters;
use crate::buffer::{BlockId, MAXIMUM_BLOCK};
use crate::error::Result;
use parking_lot::{MappedRwLockReadGuard, MappedRwLockWriteGuard, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::fmt;
use std::sync::Arc;

/// A fixed-length byte arena.
///
/// Every access goes through a lock guard over the whole arena; slicing out
/// of range panics instead of reading foreign memory.
#[derive(Debug)]
pub struct FileBuffer {
    len: usize,
    data: RwLock<Box<[u8]>>,
}

impl FileBuffer {
    /// Create a zero-filled buffer of `len` bytes
    pub fn zeroed(len: usize) -> Self {
        Self { len, data: RwLock::new(vec![0u8; len].into_boxed_slice()) }
    }

    /// Length of the buffer in bytes
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Shared access to the buffer contents
    pub fn read(&self) -> MappedRwLockReadGuard<'_, [u8]> {
        RwLockReadGuard::map(self.data.read(), |data| &data[..])
    }

    /// Exclusive access to the buffer contents
    pub fn write(&self) -> MappedRwLockWriteGuard<'_, [u8]> {
        RwLockWriteGuard::map(self.data.write(), |data| &mut data[..])
    }
}

enum BlockSource {
    /// Anonymous memory, lost when the handle is dropped
    Memory,
    /// Persisted in a block manager; reloaded on pin after eviction
    Persistent(Arc<dyn BlockManager>),
}

struct BlockState {
    buffer: Option<Arc<FileBuffer>>,
    readers: usize,
}

/// A block registered with the buffer manager.
///
/// The handle itself does not keep the block in memory; pinning it through
/// [`crate::buffer::BufferManager::pin`] does.
pub struct BlockHandle {
    id: BlockId,
    size: usize,
    source: BlockSource,
    state: Mutex<BlockState>,
}

impl BlockHandle {
    pub(crate) fn memory(id: BlockId, size: usize) -> Self {
        debug_assert!(id >= MAXIMUM_BLOCK);
        Self {
            id,
            size,
            source: BlockSource::Memory,
            state: Mutex::new(BlockState { buffer: None, readers: 0 }),
        }
    }

    pub(crate) fn persistent(id: BlockId, size: usize, store: Arc<dyn BlockManager>) -> Self {
        debug_assert!((0..MAXIMUM_BLOCK).contains(&id));
        Self {
            id,
            size,
            source: BlockSource::Persistent(store),
            state: Mutex::new(BlockState { buffer: None, readers: 0 }),
        }
    }

    /// Get the block id
    pub fn block_id(&self) -> BlockId {
        self.id
    }

    /// Get the size of the block in bytes
    pub fn size(&self) -> usize {
        self.size
    }

    /// Check if the block is backed by a block manager
    pub fn is_persistent(&self) -> bool {
        matches!(self.source, BlockSource::Persistent(_))
    }

    /// Number of outstanding pins
    pub fn readers(&self) -> usize {
        self.state.lock().readers
    }

    /// Check if the block is currently memory resident
    pub fn is_loaded(&self) -> bool {
        self.state.lock().buffer.is_some()
    }

    /// Make the block resident and register one more reader.
    pub(crate) fn load(&self) -> Result<(Arc<FileBuffer>, bool)> {
        let mut state = self.state.lock();
        let mut loaded = false;
        let buffer = match &state.buffer {
            Some(buffer) => buffer.clone(),
            None => {
                let buffer = FileBuffer::zeroed(self.size);
                if let BlockSource::Persistent(store) = &self.source {
                    store.read_block(self.id, &mut buffer.write())?;
                    loaded = true;
                }
                let buffer = Arc::new(buffer);
                state.buffer = Some(buffer.clone());
                buffer
            }
        };
        state.readers += 1;
        Ok((buffer, loaded))
    }

    /// Drop one reader; returns true if the block was evicted.
    pub(crate) fn unpin(&self) -> bool {
        let mut state = self.state.lock();
        assert!(state.readers > 0, "unpin of block {} without a matching pin", self.id);
        state.readers -= 1;
        if state.readers == 0 && self.is_persistent() {
            state.buffer = None;
            return true;
        }
        false
    }
}

impl fmt::Debug for BlockHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("BlockHandle")
            .field("id", &self.id)
            .field("size", &self.size)
            .field("persistent", &self.is_persistent())
            .field("readers", &state.readers)
            .field("loaded", &state.buffer.is_some())
            .finish()
    }
}

/// A pinned, memory-resident view of a block or a scratch allocation.
///
/// Dropping the handle releases the pin.
pub struct BufferHandle {
    block: Option<Arc<BlockHandle>>,
    buffer: Arc<FileBuffer>,
    counters: Arc<PinCounters>,
}

impl BufferHandle {
    pub(crate) fn pinned(block: Arc<BlockHandle>, buffer: Arc<FileBuffer>, counters: Arc<PinCounters>) -> Self {
        Self { block: Some(block), buffer, counters }
    }

    pub(crate) fn scratch(buffer: Arc<FileBuffer>, counters: Arc<PinCounters>) -> Self {
        Self { block: None, buffer, counters }
    }

    /// Id of the pinned block, `None` for scratch buffers
    pub fn block_id(&self) -> Option<BlockId> {
        self.block.as_ref().map(|b| b.block_id())
    }

    /// Length of the buffer in bytes
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Shared access to the buffer contents
    pub fn data(&self) -> MappedRwLockReadGuard<'_, [u8]> {
        self.buffer.read()
    }

    /// Exclusive access to the buffer contents
    pub fn data_mut(&self) -> MappedRwLockWriteGuard<'_, [u8]> {
        self.buffer.write()
    }
}

impl Drop for BufferHandle {
    fn drop(&mut self) {
        if let Some(block) = &self.block {
            let evicted = block.unpin();
            self.counters.record_release(evicted);
        }
    }
}

impl fmt::Debug for BufferHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferHandle")
            .field("block_id", &self.block_id())
            .field("len", &self.buffer.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_buffer_access() {
        let buffer = FileBuffer::zeroed(16);
        assert_eq!(buffer.len(), 16);
        assert!(buffer.read().iter().all(|&b| b == 0));

        buffer.write()[3] = 7;
        assert_eq!(buffer.read()[3], 7);
    }

    #[test]
    #[should_panic]
    fn test_file_buffer_out_of_range() {
        let buffer = FileBuffer::zeroed(8);
        let data = buffer.read();
        let _ = &data[4..12];
    }

    #[test]
    fn test_memory_block_stays_loaded() {
        let block = BlockHandle::memory(MAXIMUM_BLOCK, 32);
        let (buffer, loaded) = block.load().unwrap();
        assert!(!loaded);
        buffer.write()[0] = 1;
        assert_eq!(block.readers(), 1);

        assert!(!block.unpin());
        assert_eq!(block.readers(), 0);
        assert!(block.is_loaded());

        let (buffer, _) = block.load().unwrap();
        assert_eq!(buffer.read()[0], 1);
        block.unpin();
    }
}
