//! Uncompressed string segments.
//!
//! A segment stores the strings of a run of rows in one block. The offset
//! table grows forward from the header, the dictionary grows backward from
//! the end of the block, and strings too large to inline are written to an
//! overflow writer with only a marker left in the dictionary.
//!
//! ## Block Format
//!
//! ```text
//! [dict size: u32][dict end: u32]
//! [offset 0: i32][offset 1: i32]...[offset N-1: i32]
//! ... free space ...
//! [entry N-1]...[entry 1][entry 0]    <- ends at dict end
//! ```
//!
//! Offset `i` is the distance from `dict end` back to the entry of row `i`;
//! 0 is a NULL. On finalize the dictionary is slid down to sit right after
//! the offset table unless the block is already nearly full.
//!
//! ## Lifecycle
//!
//! `Empty -> Appending -> Finalized`. Appends and finalize take `&mut self`,
//! reads take `&self`; appending to or finalizing a finalized segment
//! panics.

pub mod analyze;
pub mod dictionary;
pub mod disk;
pub mod location;
pub mod overflow;
pub mod pointer;
pub mod statistics;
pub mod vector;

pub use analyze::StringAnalyzeState;
pub use dictionary::DictionaryHeader;
pub use disk::DiskOverflowWriter;
pub use location::StringLocation;
pub use overflow::{OverflowChain, OverflowWriter};
pub use pointer::SegmentPointer;
pub use statistics::StringStatistics;
pub use vector::{StringRef, StringVector};

use crate::buffer::{is_persistent_block, BlockHandle, BlockId, BufferHandle, BufferManager, INVALID_BLOCK};
use crate::compression;
use crate::config::{CompressionType, SegmentOptions};
use crate::error::{Error, Result};
use bytes::{Buf, BufMut};
use dictionary::{offset_table_end, read_offset, write_offset, DICTIONARY_HEADER_SIZE, OFFSET_ENTRY_SIZE};
use disk::{BLOCK_LINK_SIZE, OVERFLOW_HEADER_SIZE};
use location::{BIG_STRING_MARKER_SIZE, STRING_LENGTH_SIZE};
use overflow::OVERFLOW_LENGTH_SIZE;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Lifecycle phase of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentPhase {
    /// Initialized, nothing appended yet
    Empty,
    /// Accepting appends
    Appending,
    /// Compacted; read-only
    Finalized,
}

/// Overflow storage owned by a segment.
struct SegmentState {
    /// In-memory chain used when no writer is injected
    chain: OverflowChain,
    /// Injected writer, e.g. a [`DiskOverflowWriter`] once the column is flushed
    overflow_writer: Option<Box<dyn OverflowWriter>>,
}

impl SegmentState {
    fn write_string(&mut self, value: &[u8]) -> Result<(BlockId, i32)> {
        match &mut self.overflow_writer {
            Some(writer) => writer.write_string(value),
            None => self.chain.write_string(value),
        }
    }
}

/// Scan state: keeps the segment block pinned for the duration of a scan.
#[derive(Debug)]
pub struct StringScanState {
    handle: Arc<BufferHandle>,
}

/// Column-level scan position.
///
/// The caller owns `row_index` and advances it after each scan, which is
/// why [`StringSegment::skip`] has nothing to do.
#[derive(Debug)]
pub struct ColumnScanState {
    /// Absolute row the next scan starts at
    pub row_index: u64,
    /// Segment-specific state
    pub scan_state: StringScanState,
}

/// State for row fetches: pinned blocks by id.
#[derive(Debug, Default)]
pub struct ColumnFetchState {
    handles: HashMap<BlockId, Arc<BufferHandle>>,
}

impl ColumnFetchState {
    /// Create an empty fetch state
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of blocks currently pinned by this state
    pub fn pinned_blocks(&self) -> usize {
        self.handles.len()
    }
}

/// A string column segment backed by a single block.
pub struct StringSegment {
    buffer_manager: Arc<BufferManager>,
    options: SegmentOptions,
    block: Arc<BlockHandle>,
    start: u64,
    count: usize,
    phase: SegmentPhase,
    state: SegmentState,
    statistics: StringStatistics,
}

impl StringSegment {
    /// Create an empty segment whose overflow strings go to the in-memory chain.
    pub fn new(buffer_manager: Arc<BufferManager>, options: SegmentOptions, start: u64) -> Result<Self> {
        Self::create(buffer_manager, options, start, None)
    }

    /// Create an empty segment whose overflow strings go to `overflow_writer`.
    pub fn with_overflow_writer(
        buffer_manager: Arc<BufferManager>,
        options: SegmentOptions,
        start: u64,
        overflow_writer: Box<dyn OverflowWriter>,
    ) -> Result<Self> {
        Self::create(buffer_manager, options, start, Some(overflow_writer))
    }

    fn create(
        buffer_manager: Arc<BufferManager>,
        options: SegmentOptions,
        start: u64,
        overflow_writer: Option<Box<dyn OverflowWriter>>,
    ) -> Result<Self> {
        Self::check_options(&buffer_manager, &options)?;
        if let Some(codec) = overflow_writer.as_ref().and_then(|writer| writer.compression()) {
            if codec != options.overflow_compression {
                return Err(Error::invalid_argument(format!(
                    "Overflow writer compresses with {:?} but the segment reads {:?}",
                    codec, options.overflow_compression
                )));
            }
        }
        let block = buffer_manager.register_memory(options.block_size);
        let segment = Self {
            state: SegmentState { chain: OverflowChain::new(buffer_manager.clone()), overflow_writer },
            buffer_manager,
            options,
            block,
            start,
            count: 0,
            phase: SegmentPhase::Empty,
            statistics: StringStatistics::new(),
        };
        segment.init_segment(INVALID_BLOCK)?;
        Ok(segment)
    }

    /// Reopen a persisted segment for reading.
    pub fn open(buffer_manager: Arc<BufferManager>, options: SegmentOptions, pointer: &SegmentPointer) -> Result<Self> {
        Self::check_options(&buffer_manager, &options)?;
        match CompressionType::from_u8(pointer.overflow_compression) {
            Some(codec) if codec == options.overflow_compression => {}
            Some(codec) => {
                return Err(Error::invalid_argument(format!(
                    "Segment was written with {:?} but options specify {:?}",
                    codec, options.overflow_compression
                )));
            }
            None => {
                return Err(Error::invalid_argument(format!(
                    "Unsupported overflow compression {}",
                    pointer.overflow_compression
                )));
            }
        }
        let block = buffer_manager.register_block(pointer.block_id)?;
        let segment = Self {
            state: SegmentState { chain: OverflowChain::new(buffer_manager.clone()), overflow_writer: None },
            buffer_manager,
            options,
            block,
            start: pointer.row_start,
            count: pointer.count as usize,
            phase: SegmentPhase::Finalized,
            statistics: pointer.statistics.clone(),
        };
        segment.init_segment(pointer.block_id)?;
        Ok(segment)
    }

    fn check_options(buffer_manager: &BufferManager, options: &SegmentOptions) -> Result<()> {
        options.validate()?;
        if options.block_size != buffer_manager.block_size() {
            return Err(Error::invalid_argument(format!(
                "Segment block size {} does not match buffer manager block size {}",
                options.block_size,
                buffer_manager.block_size()
            )));
        }
        Ok(())
    }

    /// Prepare the segment block.
    ///
    /// A fresh block (`INVALID_BLOCK`) gets an empty dictionary header; a
    /// persisted block is checked for a consistent header instead.
    fn init_segment(&self, block_id: BlockId) -> Result<()> {
        let handle = self.buffer_manager.pin(&self.block)?;
        if block_id == INVALID_BLOCK {
            DictionaryHeader::new(self.options.block_size).write(&mut handle.data_mut());
            return Ok(());
        }

        let dict = DictionaryHeader::read(&handle.data());
        let end = dict.end as usize;
        if end > self.options.block_size
            || dict.size > dict.end
            || offset_table_end(self.count) > dict.start()
        {
            return Err(Error::corruption(format!(
                "Inconsistent dictionary header in block {}: size {}, end {}, {} rows",
                block_id, dict.size, dict.end, self.count
            )));
        }
        Ok(())
    }

    /// First row of the segment
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Number of rows in the segment
    pub fn count(&self) -> usize {
        self.count
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> SegmentPhase {
        self.phase
    }

    /// Id of the segment block
    pub fn block_id(&self) -> BlockId {
        self.block.block_id()
    }

    /// Options the segment was created with
    pub fn options(&self) -> &SegmentOptions {
        &self.options
    }

    /// Statistics of the appended values
    pub fn statistics(&self) -> &StringStatistics {
        &self.statistics
    }

    /// Number of blocks in the in-memory overflow chain
    pub fn overflow_block_count(&self) -> usize {
        self.state.chain.num_blocks()
    }

    /// Read the dictionary header
    pub fn dictionary(&self) -> Result<DictionaryHeader> {
        let handle = self.buffer_manager.pin(&self.block)?;
        let dict = DictionaryHeader::read(&handle.data());
        Ok(dict)
    }

    /// Bytes left in the block for offsets and dictionary entries.
    ///
    /// Only meaningful before finalize.
    pub fn remaining_space(&self) -> Result<usize> {
        let dict = self.dictionary()?;
        Ok(self.remaining(&dict))
    }

    fn remaining(&self, dict: &DictionaryHeader) -> usize {
        assert_eq!(
            dict.end as usize, self.options.block_size,
            "remaining space requested on a compacted block"
        );
        let used_space = dict.size as usize + self.count * OFFSET_ENTRY_SIZE + DICTIONARY_HEADER_SIZE;
        assert!(
            used_space <= self.options.block_size,
            "block corruption: {} bytes used in a block of {}",
            used_space,
            self.options.block_size
        );
        self.options.block_size - used_space
    }

    /// Bytes a non-NULL value needs in the dictionary, and whether it goes
    /// to the overflow writer.
    fn dictionary_entry_size(&self, value: &[u8]) -> (usize, bool) {
        let entry_size = value.len() + STRING_LENGTH_SIZE;
        if entry_size >= self.options.string_block_limit {
            (BIG_STRING_MARKER_SIZE, true)
        } else {
            (entry_size, false)
        }
    }

    /// Append values, stopping at the first one that does not fit.
    ///
    /// Returns the number of values appended; a short count means the
    /// segment is full and the rest belongs in a new segment.
    pub fn append(&mut self, values: &[Option<&[u8]>]) -> Result<usize> {
        assert!(self.phase != SegmentPhase::Finalized, "append to a finalized segment");
        self.phase = SegmentPhase::Appending;

        let handle = self.buffer_manager.pin(&self.block)?;
        for (i, value) in values.iter().enumerate() {
            let mut dict = DictionaryHeader::read(&handle.data());
            let mut remaining = self.remaining(&dict);
            if remaining < OFFSET_ENTRY_SIZE {
                return Ok(i);
            }
            remaining -= OFFSET_ENTRY_SIZE;

            let Some(value) = value else {
                write_offset(&mut handle.data_mut(), self.count, 0);
                self.statistics.update_null();
                self.count += 1;
                continue;
            };

            let (required_space, use_overflow) = self.dictionary_entry_size(value);
            if required_space > remaining {
                return Ok(i);
            }

            if use_overflow {
                if value.len() > self.options.max_overflow_string_size {
                    return Err(Error::invalid_argument(format!(
                        "String of {} bytes exceeds the overflow limit of {}",
                        value.len(),
                        self.options.max_overflow_string_size
                    )));
                }
                let (block_id, offset) = self.state.write_string(value)?;
                self.statistics.mark_overflow();
                dict.size += BIG_STRING_MARKER_SIZE as u32;
                let pos = dict.start();
                location::write_marker(&mut handle.data_mut()[pos..], block_id, offset);
            } else {
                dict.size += required_space as u32;
                let pos = dict.start();
                location::write_inline(&mut handle.data_mut()[pos..], value);
            }

            let mut data = handle.data_mut();
            write_offset(&mut data, self.count, dict.size as i32);
            dict.write(&mut data);
            self.statistics.update(value);
            self.count += 1;
        }
        Ok(values.len())
    }

    /// Append a single value, failing if it does not fit.
    pub fn append_value(&mut self, value: Option<&[u8]>) -> Result<()> {
        if self.append(&[value])? == 1 {
            return Ok(());
        }
        let entry_size = value.map_or(0, |v| self.dictionary_entry_size(v).0);
        Err(Error::CapacityExhausted {
            required: OFFSET_ENTRY_SIZE + entry_size,
            remaining: self.remaining_space()?,
        })
    }

    /// Finish appending and compact the block.
    ///
    /// Returns the number of bytes of the block in use. If the block is
    /// already filled up to the compaction flush limit the dictionary stays
    /// where it is and the whole block is reported. The overflow writer is
    /// flushed so every string is readable once this returns.
    pub fn finalize_append(&mut self) -> Result<usize> {
        assert!(self.phase != SegmentPhase::Finalized, "segment finalized twice");
        self.flush_overflow()?;
        let block_size = self.options.block_size;

        let handle = self.buffer_manager.pin(&self.block)?;
        let mut data = handle.data_mut();
        let mut dict = DictionaryHeader::read(&data);
        assert_eq!(dict.end as usize, block_size, "dictionary moved before finalize");

        let offset_size = offset_table_end(self.count);
        let total_size = offset_size + dict.size as usize;
        self.phase = SegmentPhase::Finalized;
        if total_size >= self.options.compaction_flush_limit {
            log::debug!(
                "Segment at row {} uses {} of {} bytes, skipping compaction",
                self.start,
                total_size,
                block_size
            );
            return Ok(block_size);
        }

        // Slide the dictionary down so it lines up with the offsets
        let move_amount = block_size - total_size;
        data.copy_within(dict.start()..dict.end as usize, offset_size);
        dict.end -= move_amount as u32;
        assert_eq!(dict.end as usize, total_size);
        dict.write(&mut data);

        log::debug!("Compacted segment at row {}: reclaimed {} bytes", self.start, move_amount);
        Ok(total_size)
    }

    /// Flush the injected overflow writer, if any
    pub fn flush_overflow(&mut self) -> Result<()> {
        if let Some(writer) = &mut self.state.overflow_writer {
            writer.flush()?;
        }
        Ok(())
    }

    /// Write the finalized segment block to the block manager.
    ///
    /// Overflow strings must have gone through an injected writer; the
    /// in-memory chain does not survive the process.
    pub fn persist(&mut self) -> Result<SegmentPointer> {
        if self.phase != SegmentPhase::Finalized {
            return Err(Error::invalid_state("Only finalized segments can be persisted"));
        }
        if !self.state.chain.is_empty() {
            return Err(Error::invalid_state(format!(
                "Segment references {} in-memory overflow blocks",
                self.state.chain.num_blocks()
            )));
        }
        self.flush_overflow()?;

        let block_manager = self.buffer_manager.block_manager();
        let block_id = if self.block.is_persistent() {
            self.block.block_id()
        } else {
            let block_id = block_manager.free_block_id();
            let handle = self.buffer_manager.pin(&self.block)?;
            block_manager.write_block(block_id, &handle.data())?;
            block_id
        };

        log::info!("Persisted string segment at row {} ({} rows) to block {}", self.start, self.count, block_id);
        Ok(SegmentPointer {
            block_id,
            row_start: self.start,
            count: self.count as u64,
            statistics: self.statistics.clone(),
            overflow_compression: self.options.overflow_compression as u8,
        })
    }

    /// Start a scan at the first row of the segment.
    pub fn init_scan(&self) -> Result<ColumnScanState> {
        let handle = self.buffer_manager.pin(&self.block)?;
        Ok(ColumnScanState { row_index: self.start, scan_state: StringScanState { handle: Arc::new(handle) } })
    }

    /// Scan `scan_count` rows from `state.row_index` into `result[0..]`.
    pub fn scan(&self, state: &ColumnScanState, scan_count: usize, result: &mut StringVector) -> Result<()> {
        self.scan_partial(state, scan_count, result, 0)
    }

    /// Scan `scan_count` rows from `state.row_index` into `result[result_offset..]`.
    pub fn scan_partial(
        &self,
        state: &ColumnScanState,
        scan_count: usize,
        result: &mut StringVector,
        result_offset: usize,
    ) -> Result<()> {
        let start = self.relative_index(state.row_index);
        assert!(
            start + scan_count <= self.count,
            "scan of rows [{}, {}) past segment end {}",
            start,
            start + scan_count,
            self.count
        );

        let handle = &state.scan_state.handle;
        let data = handle.data();
        let dict = DictionaryHeader::read(&data);
        for i in 0..scan_count {
            let dict_offset = read_offset(&data, start + i);
            let value = self.fetch_string_from_dict(&dict, handle, &data, dict_offset)?;
            result.set(result_offset + i, value);
        }
        Ok(())
    }

    /// Skip rows. The scan position lives in the caller's `row_index`.
    pub fn skip(&self, _state: &mut ColumnScanState, _skip_count: usize) {}

    /// Fetch the single row `row_id` into `result[result_idx]`.
    pub fn fetch_row(
        &self,
        state: &mut ColumnFetchState,
        row_id: u64,
        result: &mut StringVector,
        result_idx: usize,
    ) -> Result<()> {
        let row = self.relative_index(row_id);
        assert!(row < self.count, "row {} past segment end {}", row, self.count);

        let handle = match state.handles.get(&self.block_id()) {
            Some(handle) => handle.clone(),
            None => {
                let handle = Arc::new(self.buffer_manager.pin(&self.block)?);
                state.handles.insert(self.block_id(), handle.clone());
                handle
            }
        };

        let data = handle.data();
        let dict = DictionaryHeader::read(&data);
        let dict_offset = read_offset(&data, row);
        let value = self.fetch_string_from_dict(&dict, &handle, &data, dict_offset)?;
        result.set(result_idx, value);
        Ok(())
    }

    /// Location of the value of row `row_id`.
    pub fn locate_row(&self, row_id: u64) -> Result<StringLocation> {
        let row = self.relative_index(row_id);
        assert!(row < self.count, "row {} past segment end {}", row, self.count);

        let handle = self.buffer_manager.pin(&self.block)?;
        let data = handle.data();
        let dict = DictionaryHeader::read(&data);
        Ok(location::locate(&dict, &data, read_offset(&data, row)))
    }

    fn relative_index(&self, row_id: u64) -> usize {
        assert!(row_id >= self.start, "row {} before segment start {}", row_id, self.start);
        (row_id - self.start) as usize
    }

    fn fetch_string_from_dict(
        &self,
        dict: &DictionaryHeader,
        handle: &Arc<BufferHandle>,
        data: &[u8],
        dict_offset: i32,
    ) -> Result<Option<StringRef>> {
        let location = location::locate(dict, data, dict_offset);
        self.fetch_string(dict, handle, data, location)
    }

    /// Resolve a location to a value; `None` is NULL.
    fn fetch_string(
        &self,
        dict: &DictionaryHeader,
        handle: &Arc<BufferHandle>,
        data: &[u8],
        location: StringLocation,
    ) -> Result<Option<StringRef>> {
        if location.is_overflow() {
            return self.read_overflow(location.block_id, location.offset).map(Some);
        }
        if location.offset == 0 {
            return Ok(None);
        }

        let pos = location::entry_position(dict, location.offset);
        let len = location::read_length(data, pos) as usize;
        Ok(Some(StringRef::new(handle.clone(), pos + STRING_LENGTH_SIZE, len)))
    }

    /// Read an overflow string.
    ///
    /// Persisted ids are read by walking the on-disk chain and decompressing;
    /// transient ids are looked up in the in-memory chain.
    pub fn read_overflow(&self, block_id: BlockId, offset: i32) -> Result<StringRef> {
        assert!(block_id != INVALID_BLOCK, "overflow read of INVALID_BLOCK");
        if offset < 0 {
            return Err(Error::corruption(format!("Negative overflow offset {}", offset)));
        }

        if is_persistent_block(block_id) {
            self.read_disk_overflow(block_id, offset as usize)
        } else {
            self.read_memory_overflow(block_id, offset as usize)
        }
    }

    fn pin_chain_block(&self, block_id: BlockId) -> Result<BufferHandle> {
        let block = self.buffer_manager.register_block(block_id)?;
        self.buffer_manager.pin(&block).map_err(|e| match e {
            Error::NotFound(msg) => Error::corruption(format!("Truncated overflow chain: {}", msg)),
            Error::ChecksumMismatch { expected, actual } => Error::corruption(format!(
                "Unreadable overflow block {}: checksum {:#x}, expected {:#x}",
                block_id, actual, expected
            )),
            e => e,
        })
    }

    fn read_disk_overflow(&self, block_id: BlockId, mut offset: usize) -> Result<StringRef> {
        let block_size = self.options.block_size;
        let string_space = block_size - BLOCK_LINK_SIZE;
        if offset + OVERFLOW_HEADER_SIZE > string_space {
            return Err(Error::corruption(format!("Overflow offset {} out of range", offset)));
        }

        let mut handle = self.pin_chain_block(block_id)?;
        let (compressed_size, uncompressed_size) = {
            let data = handle.data();
            let mut header = &data[offset..offset + OVERFLOW_HEADER_SIZE];
            (header.get_u32_le() as usize, header.get_u32_le() as usize)
        };
        offset += OVERFLOW_HEADER_SIZE;
        if uncompressed_size > self.options.max_overflow_string_size {
            return Err(Error::corruption(format!(
                "Overflow string at block {} claims {} bytes, limit is {}",
                block_id, uncompressed_size, self.options.max_overflow_string_size
            )));
        }

        // The whole chain is pinned before the payload buffer is allocated
        let mut pieces = Vec::new();
        let mut visited = HashSet::from([block_id]);
        let mut remaining = compressed_size;
        loop {
            let len = remaining.min(string_space - offset);
            remaining -= len;
            if remaining == 0 {
                pieces.push((handle, offset, len));
                break;
            }

            let next_block = (&handle.data()[string_space..string_space + BLOCK_LINK_SIZE]).get_i64_le();
            if !is_persistent_block(next_block) || !visited.insert(next_block) {
                return Err(Error::corruption(format!(
                    "Invalid overflow continuation block {} after block {}",
                    next_block,
                    handle.block_id().unwrap_or(INVALID_BLOCK)
                )));
            }
            pieces.push((handle, offset, len));
            handle = self.pin_chain_block(next_block)?;
            offset = 0;
        }

        let compressed = self.buffer_manager.allocate(compressed_size);
        {
            let mut target = compressed.data_mut();
            let mut written = 0;
            for (piece, start, len) in &pieces {
                target[written..written + len].copy_from_slice(&piece.data()[*start..*start + len]);
                written += len;
            }
        }
        drop(pieces);

        let decompressed = self.buffer_manager.allocate(uncompressed_size + OVERFLOW_LENGTH_SIZE);
        {
            let mut target = decompressed.data_mut();
            (&mut target[..OVERFLOW_LENGTH_SIZE]).put_u32_le(uncompressed_size as u32);
            compression::decompress_into(
                self.options.overflow_compression,
                &compressed.data(),
                &mut target[OVERFLOW_LENGTH_SIZE..],
            )?;
        }
        Ok(StringRef::new(Arc::new(decompressed), OVERFLOW_LENGTH_SIZE, uncompressed_size))
    }

    fn read_memory_overflow(&self, block_id: BlockId, offset: usize) -> Result<StringRef> {
        let block = self
            .state
            .chain
            .block(block_id)
            .ok_or_else(|| Error::corruption(format!("Unknown overflow block {}", block_id)))?;
        let handle = self.buffer_manager.pin(block)?;

        let len = {
            let data = handle.data();
            if offset + OVERFLOW_LENGTH_SIZE > data.len() {
                return Err(Error::corruption(format!("Overflow offset {} out of range", offset)));
            }
            (&data[offset..offset + OVERFLOW_LENGTH_SIZE]).get_u32_le() as usize
        };
        if offset + OVERFLOW_LENGTH_SIZE + len > handle.len() {
            return Err(Error::corruption(format!("Overflow string at {} overruns block {}", offset, block_id)));
        }
        Ok(StringRef::new(Arc::new(handle), offset + OVERFLOW_LENGTH_SIZE, len))
    }
}

impl std::fmt::Debug for StringSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StringSegment")
            .field("block_id", &self.block.block_id())
            .field("start", &self.start)
            .field("count", &self.count)
            .field("phase", &self.phase)
            .field("overflow_blocks", &self.state.chain.num_blocks())
            .field("injected_overflow_writer", &self.state.overflow_writer.is_some())
            .finish()
    }
}
