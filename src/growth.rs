//! Bucket-count sequence for the hash backend.

/// Bucket counts the hash backend steps through, smallest first.
pub const BUCKET_COUNTS: [usize; 8] = [509, 1021, 2039, 4093, 8191, 16381, 32749, 65521];

/// Position of the starting bucket count in [`BUCKET_COUNTS`].
pub(crate) const INITIAL_CLASS: usize = 0;

/// Next position after `class`, or `None` once the sequence is exhausted.
#[inline]
pub(crate) fn next_class(class: usize) -> Option<usize> {
    let next = class + 1;
    (next < BUCKET_COUNTS.len()).then_some(next)
}

/// A table with `len` bindings over `bucket_count` buckets has outgrown them.
#[inline]
pub(crate) fn overloaded(len: usize, bucket_count: usize) -> bool {
    len > bucket_count
}
