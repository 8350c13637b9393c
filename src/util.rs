use xxhash_rust::xxh3::xxh3_64;

/// Single 64-bit key hash. Doubles as the sketch fingerprint.
pub(crate) fn hash64(bytes: &[u8]) -> u64 {
    xxh3_64(bytes)
}

/// Derives the bucket index for `row` from the single key hash.
///
/// A splitmix64-style remix keeps the per-row indices independent without
/// rehashing the key once per row.
pub(crate) fn bucket_index(hash: u64, row: u64, width: usize) -> usize {
    let mut mixed = hash ^ row.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    mixed ^= mixed >> 33;
    mixed = mixed.wrapping_mul(0xFF51_AFD7_ED55_8CCD);
    mixed ^= mixed >> 33;
    (mixed % width as u64) as usize
}
