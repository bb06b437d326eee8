//! Block stores for persisted blocks.
//!
//! The file store lays blocks out back to back, each followed by a CRC32 of
//! its contents:
//!
//! ```text
//! [Block 0: block_size bytes][crc32: u32]
//! [Block 1: block_size bytes][crc32: u32]
//! ...
//! ```

use crate::buffer::BlockId;
use crate::error::{Error, Result};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};

/// Size of the checksum trailer stored after each block in a file.
const CHECKSUM_SIZE: usize = 4;

/// Storage for fixed-size persisted blocks.
pub trait BlockManager: Send + Sync + fmt::Debug {
    /// Size of every block in bytes
    fn block_size(&self) -> usize;

    /// Reserve a block id that has never been handed out before
    fn free_block_id(&self) -> BlockId;

    /// Read the block `id` into `buf`, which must be `block_size` bytes
    fn read_block(&self, id: BlockId, buf: &mut [u8]) -> Result<()>;

    /// Write `data` (exactly `block_size` bytes) as block `id`
    fn write_block(&self, id: BlockId, data: &[u8]) -> Result<()>;
}

fn check_block_len(block_size: usize, len: usize) -> Result<()> {
    if len != block_size {
        return Err(Error::invalid_argument(format!(
            "Block buffer is {} bytes, expected {}",
            len, block_size
        )));
    }
    Ok(())
}

/// Block store that keeps every block in memory.
#[derive(Debug)]
pub struct InMemoryBlockManager {
    block_size: usize,
    next_id: AtomicI64,
    blocks: RwLock<HashMap<BlockId, Box<[u8]>>>,
}

impl InMemoryBlockManager {
    /// Create an empty store with the given block size
    pub fn new(block_size: usize) -> Self {
        Self { block_size, next_id: AtomicI64::new(0), blocks: RwLock::new(HashMap::new()) }
    }

    /// Number of blocks written so far
    pub fn num_blocks(&self) -> usize {
        self.blocks.read().len()
    }
}

impl BlockManager for InMemoryBlockManager {
    fn block_size(&self) -> usize {
        self.block_size
    }

    fn free_block_id(&self) -> BlockId {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn read_block(&self, id: BlockId, buf: &mut [u8]) -> Result<()> {
        check_block_len(self.block_size, buf.len())?;
        let blocks = self.blocks.read();
        let data = blocks.get(&id).ok_or_else(|| Error::not_found(format!("Block {}", id)))?;
        buf.copy_from_slice(data);
        Ok(())
    }

    fn write_block(&self, id: BlockId, data: &[u8]) -> Result<()> {
        check_block_len(self.block_size, data.len())?;
        self.blocks.write().insert(id, data.to_vec().into_boxed_slice());
        Ok(())
    }
}

/// Block store backed by a single file.
pub struct FileBlockManager {
    path: PathBuf,
    block_size: usize,
    next_id: AtomicI64,
    file: Mutex<File>,
}

impl FileBlockManager {
    /// Open (or create) a block file.
    ///
    /// New block ids continue after the last block present in the file.
    pub fn open<P: AsRef<Path>>(path: P, block_size: usize) -> Result<Self> {
        if block_size == 0 {
            return Err(Error::invalid_argument("block_size must be > 0"));
        }
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().read(true).write(true).create(true).truncate(false).open(&path)?;

        let stride = (block_size + CHECKSUM_SIZE) as u64;
        let file_size = file.metadata()?.len();
        let next_id = file_size.div_ceil(stride) as i64;

        Ok(Self { path, block_size, next_id: AtomicI64::new(next_id), file: Mutex::new(file) })
    }

    /// Path of the block file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sync all written blocks to disk
    pub fn sync(&self) -> Result<()> {
        self.file.lock().sync_all()?;
        Ok(())
    }

    fn block_offset(&self, id: BlockId) -> Result<u64> {
        if id < 0 {
            return Err(Error::invalid_argument(format!("Invalid block id {}", id)));
        }
        Ok(id as u64 * (self.block_size + CHECKSUM_SIZE) as u64)
    }
}

impl BlockManager for FileBlockManager {
    fn block_size(&self) -> usize {
        self.block_size
    }

    fn free_block_id(&self) -> BlockId {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn read_block(&self, id: BlockId, buf: &mut [u8]) -> Result<()> {
        check_block_len(self.block_size, buf.len())?;
        let offset = self.block_offset(id)?;

        let mut file = self.file.lock();
        let file_size = file.metadata()?.len();
        if offset + (self.block_size + CHECKSUM_SIZE) as u64 > file_size {
            return Err(Error::not_found(format!("Block {} in {:?}", id, self.path)));
        }

        file.seek(SeekFrom::Start(offset))?;
        file.read_exact(buf)?;
        let mut checksum_bytes = [0u8; CHECKSUM_SIZE];
        file.read_exact(&mut checksum_bytes)?;
        drop(file);

        let stored_checksum = u32::from_le_bytes(checksum_bytes);
        let computed_checksum = crc32fast::hash(buf);
        if computed_checksum != stored_checksum {
            return Err(Error::ChecksumMismatch { expected: stored_checksum, actual: computed_checksum });
        }
        Ok(())
    }

    fn write_block(&self, id: BlockId, data: &[u8]) -> Result<()> {
        check_block_len(self.block_size, data.len())?;
        let offset = self.block_offset(id)?;
        let checksum = crc32fast::hash(data);

        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(data)?;
        file.write_all(&checksum.to_le_bytes())?;
        file.flush()?;
        Ok(())
    }
}

impl fmt::Debug for FileBlockManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileBlockManager")
            .field("path", &self.path)
            .field("block_size", &self.block_size)
            .field("next_id", &self.next_id.load(Ordering::Relaxed))
            .finish()
    }
}
