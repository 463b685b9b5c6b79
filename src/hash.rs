//! Polynomial string hash used for bucket selection.

/// Multiplier applied to the accumulator before each byte is added.
pub const HASH_MULTIPLIER: u64 = 65599;

/// Hash `bytes` as `h = h * 65599 + b`, starting from zero and wrapping in
/// a `u64` accumulator. Bytes are taken as unsigned.
#[inline]
pub fn hash_bytes(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0u64, |h, &b| {
        h.wrapping_mul(HASH_MULTIPLIER).wrapping_add(u64::from(b))
    })
}

/// Index of the bucket `key` falls into when there are `bucket_count` buckets.
#[inline]
pub fn bucket_index(key: &str, bucket_count: usize) -> usize {
    debug_assert!(bucket_count > 0);
    (hash_bytes(key.as_bytes()) % bucket_count as u64) as usize
}
