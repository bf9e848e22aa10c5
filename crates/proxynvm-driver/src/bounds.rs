//! Address range validation.
//!
//! The end index is not part of the range, so a zero-length range that
//! starts exactly at the capacity is still valid.

/// End of `offset..offset + length`, or `None` if it wraps.
pub fn range_end(offset: u64, length: u64) -> Option<u64> {
    offset.checked_add(length)
}

/// Whether `offset..offset + length` lies inside a device of `capacity` bytes.
pub fn range_fits(offset: u64, length: u64, capacity: u64) -> bool {
    matches!(range_end(offset, length), Some(end) if end <= capacity)
}
