//! Byte range planning for parallel downloads.
//!
//! Splits a known content length into contiguous, inclusive byte ranges.
//! The effective chunk size is
//!
//! ```text
//! max(min_chunk_size, min(desired_chunk_size, total_size / max_parallelism))
//! ```
//!
//! which keeps small files from being cut into many tiny requests and caps
//! the number of ranges for large files.

use std::fmt;

/// An inclusive byte range `[start, end]` of a remote resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ByteRange {
    /// First byte offset.
    pub start: u64,
    /// Last byte offset (inclusive).
    pub end: u64,
}

impl ByteRange {
    /// Create a new range. `end` is inclusive.
    pub fn new(start: u64, end: u64) -> Self {
        debug_assert!(start <= end, "range start must not exceed end");
        Self { start, end }
    }

    /// Number of bytes covered by this range.
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Ranges always cover at least one byte.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Value for an HTTP `Range` request header.
    pub fn header_value(&self) -> String {
        format!("bytes={}-{}", self.start, self.end)
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Compute the chunk size actually used for a download.
///
/// A `max_parallelism` of zero is treated as one. The result is never zero.
pub fn effective_chunk_size(
    total_size: u64,
    desired_chunk_size: u64,
    max_parallelism: u32,
    min_chunk_size: u64,
) -> u64 {
    let per_worker = total_size / u64::from(max_parallelism.max(1));
    min_chunk_size.max(desired_chunk_size.min(per_worker)).max(1)
}

/// Partition `[0, total_size)` into ordered byte ranges.
///
/// Returns an empty list when `total_size` is zero; callers fall back to a
/// single streamed download in that case.
pub fn plan_ranges(
    total_size: u64,
    desired_chunk_size: u64,
    max_parallelism: u32,
    min_chunk_size: u64,
) -> Vec<ByteRange> {
    if total_size == 0 {
        return Vec::new();
    }

    let size = effective_chunk_size(
        total_size,
        desired_chunk_size,
        max_parallelism,
        min_chunk_size,
    );

    let mut ranges = Vec::with_capacity(total_size.div_ceil(size) as usize);
    let mut start = 0u64;
    while start < total_size {
        let end = start.saturating_add(size - 1).min(total_size - 1);
        ranges.push(ByteRange::new(start, end));
        start = end + 1;
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIB: u64 = 1024 * 1024;

    #[test]
    fn test_zero_size_yields_no_ranges() {
        assert!(plan_ranges(0, 4 * MIB, 16, MIB).is_empty());
    }

    #[test]
    fn test_small_file_clamps_to_min_chunk() {
        // 10MB / 16 workers = 625KB, clamped up to 1MB
        let ranges = plan_ranges(10_000_000, 6_000_000, 16, 1_000_000);

        assert_eq!(ranges.len(), 10);
        assert_eq!(ranges[0], ByteRange::new(0, 999_999));
        assert_eq!(ranges[9], ByteRange::new(9_000_000, 9_999_999));
        assert!(ranges.iter().all(|r| r.len() == 1_000_000));
    }

    #[test]
    fn test_large_file_uses_desired_chunk() {
        let total = 200 * MIB;
        let size = effective_chunk_size(total, 4 * MIB, 16, MIB);
        assert_eq!(size, 4 * MIB);
        assert_eq!(plan_ranges(total, 4 * MIB, 16, MIB).len(), 50);
    }

    #[test]
    fn test_file_smaller_than_min_chunk_is_one_range() {
        let ranges = plan_ranges(1234, 4 * MIB, 16, MIB);
        assert_eq!(ranges, vec![ByteRange::new(0, 1233)]);
    }

    #[test]
    fn test_last_range_may_be_shorter() {
        let ranges = plan_ranges(2_500_000, 1_000_000, 1, 1_000_000);
        assert_eq!(ranges.len(), 3);
        assert_eq!(ranges[2], ByteRange::new(2_000_000, 2_499_999));
        assert_eq!(ranges[2].len(), 500_000);
    }

    #[test]
    fn test_zero_parallelism_treated_as_one() {
        assert_eq!(effective_chunk_size(100, 1000, 0, 10), 100);
    }

    #[test]
    fn test_zero_sizes_never_loop_forever() {
        let ranges = plan_ranges(5, 0, 4, 0);
        assert_eq!(ranges.len(), 5);
    }

    #[test]
    fn test_header_value() {
        assert_eq!(ByteRange::new(10, 19).header_value(), "bytes=10-19");
        assert_eq!(ByteRange::new(10, 19).len(), 10);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_ranges_partition_the_file(
                total in 1u64..50_000_000,
                desired in 1_000u64..10_000_000,
                parallelism in 1u32..64,
                min_chunk in 1_000u64..2_000_000,
            ) {
                let ranges = plan_ranges(total, desired, parallelism, min_chunk);

                prop_assert!(!ranges.is_empty());
                prop_assert_eq!(ranges[0].start, 0);
                prop_assert_eq!(ranges[ranges.len() - 1].end, total - 1);

                for pair in ranges.windows(2) {
                    prop_assert_eq!(pair[0].end + 1, pair[1].start);
                }

                let covered: u64 = ranges.iter().map(ByteRange::len).sum();
                prop_assert_eq!(covered, total);

                for range in &ranges[..ranges.len() - 1] {
                    prop_assert!(
                        range.len() >= min_chunk,
                        "range {} shorter than min chunk {}",
                        range, min_chunk
                    );
                }
            }
        }
    }
}
