//! Buffer manager: pins blocks into memory and hands out scratch buffers.

use crate::buffer::block_manager::BlockManager;
use crate::buffer::handle::{BlockHandle, BufferHandle, FileBuffer};
use crate::buffer::{is_persistent_block, BlockId, MAXIMUM_BLOCK};
use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// Counters shared between the manager and its handles.
#[derive(Debug, Default)]
pub(crate) struct PinCounters {
    pins: AtomicU64,
    releases: AtomicU64,
    loads: AtomicU64,
    evictions: AtomicU64,
    allocations: AtomicU64,
}

impl PinCounters {
    pub(crate) fn record_release(&self, evicted: bool) {
        self.releases.fetch_add(1, Ordering::Relaxed);
        if evicted {
            self.evictions.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Snapshot of buffer manager activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BufferStats {
    /// Number of block pins issued
    pub pins: u64,
    /// Number of block pins released
    pub releases: u64,
    /// Number of persisted blocks read from the block manager
    pub loads: u64,
    /// Number of persisted blocks dropped from memory after their last unpin
    pub evictions: u64,
    /// Number of scratch buffers handed out
    pub allocations: u64,
}

impl BufferStats {
    /// Pins that have not been released yet
    pub fn outstanding(&self) -> u64 {
        self.pins - self.releases
    }
}

/// Buffer manager for segment blocks.
///
/// # Thread Safety
///
/// The manager is thread-safe and can be shared across threads using
/// `Arc<BufferManager>`.
#[derive(Debug)]
pub struct BufferManager {
    block_size: usize,
    block_manager: Arc<dyn BlockManager>,
    next_memory_id: AtomicI64,
    /// Registered persisted blocks, so repeated registrations share a handle
    persistent: Mutex<HashMap<BlockId, Weak<BlockHandle>>>,
    counters: Arc<PinCounters>,
}

impl BufferManager {
    /// Create a buffer manager on top of a block manager.
    ///
    /// The block size of the manager is the block size of the store.
    pub fn new(block_manager: Arc<dyn BlockManager>) -> Self {
        Self {
            block_size: block_manager.block_size(),
            block_manager,
            next_memory_id: AtomicI64::new(MAXIMUM_BLOCK),
            persistent: Mutex::new(HashMap::new()),
            counters: Arc::new(PinCounters::default()),
        }
    }

    /// Get the block size
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Get the underlying block manager
    pub fn block_manager(&self) -> &Arc<dyn BlockManager> {
        &self.block_manager
    }

    /// Register an anonymous in-memory block of `size` bytes.
    ///
    /// The block gets an id from the transient range and is never written
    /// to the block manager.
    pub fn register_memory(&self, size: usize) -> Arc<BlockHandle> {
        let id = self.next_memory_id.fetch_add(1, Ordering::Relaxed);
        Arc::new(BlockHandle::memory(id, size))
    }

    /// Register a block persisted in the block manager.
    pub fn register_block(&self, id: BlockId) -> Result<Arc<BlockHandle>> {
        if !is_persistent_block(id) {
            return Err(Error::invalid_argument(format!("Block {} is not a persisted block id", id)));
        }

        let mut persistent = self.persistent.lock();
        if let Some(handle) = persistent.get(&id).and_then(Weak::upgrade) {
            return Ok(handle);
        }

        persistent.retain(|_, weak| weak.strong_count() > 0);
        let handle = Arc::new(BlockHandle::persistent(id, self.block_size, self.block_manager.clone()));
        persistent.insert(id, Arc::downgrade(&handle));
        Ok(handle)
    }

    /// Pin a block, loading it from the block manager if it was evicted.
    pub fn pin(&self, block: &Arc<BlockHandle>) -> Result<BufferHandle> {
        let (buffer, loaded) = block.load()?;
        if loaded {
            self.counters.loads.fetch_add(1, Ordering::Relaxed);
        }
        self.counters.pins.fetch_add(1, Ordering::Relaxed);
        Ok(BufferHandle::pinned(block.clone(), buffer, self.counters.clone()))
    }

    /// Allocate a zeroed scratch buffer that is not backed by any block.
    pub fn allocate(&self, size: usize) -> BufferHandle {
        self.counters.allocations.fetch_add(1, Ordering::Relaxed);
        BufferHandle::scratch(Arc::new(FileBuffer::zeroed(size)), self.counters.clone())
    }

    /// Get a snapshot of the manager's counters
    pub fn stats(&self) -> BufferStats {
        BufferStats {
            pins: self.counters.pins.load(Ordering::Relaxed),
            releases: self.counters.releases.load(Ordering::Relaxed),
            loads: self.counters.loads.load(Ordering::Relaxed),
            evictions: self.counters.evictions.load(Ordering::Relaxed),
            allocations: self.counters.allocations.load(Ordering::Relaxed),
        }
    }
}
