//! Dictionary header and offset table of a string block.
//!
//! Block layout:
//! ```text
//! [0..4)     dictionary size (u32)
//! [4..8)     dictionary end (u32)
//! [8..8+4N)  offset table: N x i32
//! ...        free space
//! [end - size .. end) dictionary entries, packed backward from `end`
//! ```

use bytes::{Buf, BufMut};

/// Size of the dictionary header at the start of a block.
pub const DICTIONARY_HEADER_SIZE: usize = 2 * std::mem::size_of::<u32>();

/// Size of one offset table entry.
pub const OFFSET_ENTRY_SIZE: usize = std::mem::size_of::<i32>();

/// The dictionary header of a string block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DictionaryHeader {
    /// Bytes currently used by dictionary entries
    pub size: u32,
    /// Offset from block start where the dictionary ends
    pub end: u32,
}

impl DictionaryHeader {
    /// Header of an empty dictionary in a block of `block_size` bytes
    pub fn new(block_size: usize) -> Self {
        Self { size: 0, end: block_size as u32 }
    }

    /// Read the header from the start of a block
    pub fn read(block: &[u8]) -> Self {
        let mut buf = &block[..DICTIONARY_HEADER_SIZE];
        let size = buf.get_u32_le();
        let end = buf.get_u32_le();
        Self { size, end }
    }

    /// Write the header to the start of a block
    pub fn write(&self, block: &mut [u8]) {
        let mut buf = &mut block[..DICTIONARY_HEADER_SIZE];
        buf.put_u32_le(self.size);
        buf.put_u32_le(self.end);
    }

    /// Position of the first (lowest) dictionary byte
    pub fn start(&self) -> usize {
        (self.end - self.size) as usize
    }
}

fn offset_position(row: usize) -> usize {
    DICTIONARY_HEADER_SIZE + row * OFFSET_ENTRY_SIZE
}

/// Read the dictionary offset stored for `row`
pub fn read_offset(block: &[u8], row: usize) -> i32 {
    let pos = offset_position(row);
    (&block[pos..pos + OFFSET_ENTRY_SIZE]).get_i32_le()
}

/// Store the dictionary offset for `row`
pub fn write_offset(block: &mut [u8], row: usize, dict_offset: i32) {
    let pos = offset_position(row);
    (&mut block[pos..pos + OFFSET_ENTRY_SIZE]).put_i32_le(dict_offset);
}

/// Bytes used by the header and an offset table of `count` rows
pub fn offset_table_end(count: usize) -> usize {
    offset_position(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_roundtrip() {
        let mut block = vec![0u8; 64];
        let header = DictionaryHeader { size: 12, end: 64 };
        header.write(&mut block);

        assert_eq!(&block[0..4], &12u32.to_le_bytes());
        assert_eq!(&block[4..8], &64u32.to_le_bytes());
        assert_eq!(DictionaryHeader::read(&block), header);
        assert_eq!(header.start(), 52);
    }

    #[test]
    fn test_new_header() {
        let header = DictionaryHeader::new(4096);
        assert_eq!(header.size, 0);
        assert_eq!(header.end, 4096);
    }

    #[test]
    fn test_offset_table() {
        let mut block = vec![0u8; 64];
        write_offset(&mut block, 0, 5);
        write_offset(&mut block, 2, 1000);

        assert_eq!(read_offset(&block, 0), 5);
        assert_eq!(read_offset(&block, 1), 0);
        assert_eq!(read_offset(&block, 2), 1000);
        assert_eq!(&block[8..12], &5i32.to_le_bytes());
        assert_eq!(offset_table_end(3), 20);
    }
}
