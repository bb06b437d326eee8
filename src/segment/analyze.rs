//! Size estimation for the uncompressed string encoding.

use crate::config::SegmentOptions;
use crate::segment::dictionary::OFFSET_ENTRY_SIZE;
use crate::segment::location::{BIG_STRING_MARKER_SIZE, STRING_LENGTH_SIZE};

/// Running state of an analyze pass over a column.
#[derive(Debug, Clone)]
pub struct StringAnalyzeState {
    string_block_limit: usize,
    /// Rows seen, NULLs included
    pub count: usize,
    /// Bytes of all non-NULL values, overflow strings included
    pub total_string_size: usize,
    /// Number of values that would go to the overflow chain
    pub overflow_strings: usize,
}

impl StringAnalyzeState {
    /// Start an analyze pass
    pub fn new(options: &SegmentOptions) -> Self {
        Self { string_block_limit: options.string_block_limit, count: 0, total_string_size: 0, overflow_strings: 0 }
    }

    /// Account for a batch of values.
    ///
    /// Always returns true: every string can be stored by this encoding.
    pub fn analyze(&mut self, values: &[Option<&[u8]>]) -> bool {
        self.count += values.len();
        for value in values.iter().flatten() {
            self.total_string_size += value.len();
            if value.len() + STRING_LENGTH_SIZE >= self.string_block_limit {
                self.overflow_strings += 1;
            }
        }
        true
    }

    /// Estimated number of bytes needed to store everything analyzed.
    ///
    /// Every value is counted in full; overflow strings additionally pay for
    /// their dictionary marker.
    pub fn final_analyze(&self) -> usize {
        self.count * OFFSET_ENTRY_SIZE + self.total_string_size + self.overflow_strings * BIG_STRING_MARKER_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_estimate() {
        let state = StringAnalyzeState::new(&SegmentOptions::default());
        assert_eq!(state.final_analyze(), 0);
    }

    #[test]
    fn test_estimate_mixed_values() {
        let options = SegmentOptions::default().string_block_limit(100);
        let mut state = StringAnalyzeState::new(&options);

        let big = vec![b'x'; 500];
        let values: Vec<Option<&[u8]>> = vec![Some(&b"abc"[..]), None, Some(big.as_slice()), Some(&b""[..])];
        assert!(state.analyze(&values));

        assert_eq!(state.count, 4);
        assert_eq!(state.overflow_strings, 1);
        assert_eq!(state.total_string_size, 3 + 500);
        assert_eq!(state.final_analyze(), 4 * 4 + 503 + 14);
    }

    #[test]
    fn test_overflow_payload_counts() {
        let mut state = StringAnalyzeState::new(&SegmentOptions::default());
        let big = vec![b'y'; 100_000];
        let values: Vec<Option<&[u8]>> = vec![Some(big.as_slice()); 10];
        state.analyze(&values);

        assert_eq!(state.overflow_strings, 10);
        assert_eq!(state.final_analyze(), 10 * 4 + 1_000_000 + 10 * 14);
    }
}
