//! Resolving dictionary offsets to string locations.
//!
//! A dictionary entry is either an inline string or a marker pointing at
//! the overflow chain:
//! ```text
//! inline:   [len: u16][bytes: len]
//! overflow: [BIG_STRING_MARKER: u16][block_id: i64][offset: i32]
//! ```

use crate::buffer::{BlockId, INVALID_BLOCK};
use crate::segment::dictionary::DictionaryHeader;
use bytes::{Buf, BufMut};

/// Length prefix value that marks an overflow entry.
pub const BIG_STRING_MARKER: u16 = u16::MAX;

/// Size of an overflow marker entry.
pub const BIG_STRING_MARKER_SIZE: usize =
    std::mem::size_of::<u16>() + std::mem::size_of::<BlockId>() + std::mem::size_of::<i32>();

/// Size of the length prefix of an inline entry.
pub const STRING_LENGTH_SIZE: usize = std::mem::size_of::<u16>();

/// Where a string value lives.
///
/// `block_id == INVALID_BLOCK` means the value is inline and `offset` is its
/// dictionary offset (0 for NULL). Otherwise `(block_id, offset)` points into
/// the overflow chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringLocation {
    /// Overflow block, or INVALID_BLOCK for inline values
    pub block_id: BlockId,
    /// Overflow offset, or dictionary offset for inline values
    pub offset: i32,
}

impl StringLocation {
    /// Location of a NULL value
    pub const NULL: StringLocation = StringLocation { block_id: INVALID_BLOCK, offset: 0 };

    /// Location of an inline value
    pub fn inline(dict_offset: i32) -> Self {
        Self { block_id: INVALID_BLOCK, offset: dict_offset }
    }

    /// Check if the value lives in the overflow chain
    pub fn is_overflow(&self) -> bool {
        self.block_id != INVALID_BLOCK
    }

    /// Check if this is the NULL location
    pub fn is_null(&self) -> bool {
        *self == Self::NULL
    }
}

/// Write an overflow marker at the start of `target`
pub fn write_marker(target: &mut [u8], block_id: BlockId, offset: i32) {
    let mut buf = &mut target[..BIG_STRING_MARKER_SIZE];
    buf.put_u16_le(BIG_STRING_MARKER);
    buf.put_i64_le(block_id);
    buf.put_i32_le(offset);
}

/// Read the overflow marker at the start of `source`
pub fn read_marker(source: &[u8]) -> (BlockId, i32) {
    let mut buf = &source[STRING_LENGTH_SIZE..BIG_STRING_MARKER_SIZE];
    let block_id = buf.get_i64_le();
    let offset = buf.get_i32_le();
    (block_id, offset)
}

/// Write an inline entry (`[len: u16][bytes]`) at the start of `target`
pub fn write_inline(target: &mut [u8], value: &[u8]) {
    debug_assert!(value.len() < BIG_STRING_MARKER as usize);
    let mut buf = &mut target[..STRING_LENGTH_SIZE + value.len()];
    buf.put_u16_le(value.len() as u16);
    buf.put_slice(value);
}

/// Position of the entry for `dict_offset` within the block.
///
/// Panics if the offset does not fall inside the dictionary region; that
/// can only happen on a corrupted block.
pub fn entry_position(dict: &DictionaryHeader, dict_offset: i32) -> usize {
    assert!(
        dict_offset > 0 && dict_offset as u32 <= dict.end,
        "dictionary offset {} outside of dictionary ending at {}",
        dict_offset,
        dict.end
    );
    (dict.end - dict_offset as u32) as usize
}

/// Read the length prefix of the entry at `pos`
pub fn read_length(block: &[u8], pos: usize) -> u16 {
    (&block[pos..pos + STRING_LENGTH_SIZE]).get_u16_le()
}

/// Determine where the value for `dict_offset` lives.
pub fn locate(dict: &DictionaryHeader, block: &[u8], dict_offset: i32) -> StringLocation {
    if dict_offset == 0 {
        return StringLocation::NULL;
    }

    let pos = entry_position(dict, dict_offset);
    if read_length(block, pos) == BIG_STRING_MARKER {
        let (block_id, offset) = read_marker(&block[pos..]);
        StringLocation { block_id, offset }
    } else {
        StringLocation::inline(dict_offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_size() {
        assert_eq!(BIG_STRING_MARKER_SIZE, 14);
    }

    #[test]
    fn test_marker_roundtrip() {
        let mut buf = [0u8; BIG_STRING_MARKER_SIZE];
        write_marker(&mut buf, 1234, 56);
        assert_eq!(&buf[0..2], &[0xFF, 0xFF]);
        assert_eq!(read_marker(&buf), (1234, 56));
    }

    #[test]
    fn test_locate_null() {
        let dict = DictionaryHeader::new(64);
        let block = vec![0u8; 64];
        let location = locate(&dict, &block, 0);
        assert!(location.is_null());
        assert!(!location.is_overflow());
    }

    #[test]
    fn test_locate_inline_and_overflow() {
        let mut block = vec![0u8; 64];
        let mut dict = DictionaryHeader::new(64);

        dict.size += 5;
        let inline_offset = dict.size as i32;
        write_inline(&mut block[dict.start()..], b"abc");

        dict.size += BIG_STRING_MARKER_SIZE as u32;
        let marker_offset = dict.size as i32;
        write_marker(&mut block[dict.start()..], 7, 128);

        let location = locate(&dict, &block, inline_offset);
        assert_eq!(location, StringLocation::inline(inline_offset));
        assert_eq!(read_length(&block, entry_position(&dict, inline_offset)), 3);

        let location = locate(&dict, &block, marker_offset);
        assert!(location.is_overflow());
        assert_eq!(location, StringLocation { block_id: 7, offset: 128 });
    }

    #[test]
    #[should_panic(expected = "outside of dictionary")]
    fn test_locate_out_of_range() {
        let dict = DictionaryHeader::new(64);
        let block = vec![0u8; 64];
        locate(&dict, &block, 65);
    }
}
