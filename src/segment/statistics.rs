//! Per-segment string statistics.

use serde::{Deserialize, Serialize};

/// Number of leading bytes kept for the min/max bounds.
pub const STATS_PREFIX_LEN: usize = 8;

/// Statistics maintained while appending to a string segment.
///
/// `min` and `max` are bounds over the first [`STATS_PREFIX_LEN`] bytes of
/// each value, so they only prune on prefixes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringStatistics {
    /// Smallest value prefix seen
    pub min: Option<Vec<u8>>,
    /// Largest value prefix seen
    pub max: Option<Vec<u8>>,
    /// Length of the longest value
    pub max_string_length: u32,
    /// Whether any NULL was appended
    pub has_null: bool,
    /// Whether any value was written to the overflow chain
    pub has_overflow: bool,
}

impl StringStatistics {
    /// Create empty statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a non-NULL value
    pub fn update(&mut self, value: &[u8]) {
        let prefix = &value[..value.len().min(STATS_PREFIX_LEN)];
        if self.min.as_deref().map_or(true, |min| prefix < min) {
            self.min = Some(prefix.to_vec());
        }
        if self.max.as_deref().map_or(true, |max| prefix > max) {
            self.max = Some(prefix.to_vec());
        }
        self.max_string_length = self.max_string_length.max(value.len().min(u32::MAX as usize) as u32);
    }

    /// Record a NULL value
    pub fn update_null(&mut self) {
        self.has_null = true;
    }

    /// Record that a value went to the overflow chain
    pub fn mark_overflow(&mut self) {
        self.has_overflow = true;
    }
}
