//! Stable hashing for cache keys
//!
//! FNV-1a over UTF-8 bytes. Deterministic across processes, unlike
//! `DefaultHasher`, so cache keys survive worker restarts.

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Hash a string to a stable 64-bit value
#[must_use]
pub fn stable_hash(input: &str) -> u64 {
    let mut hash = FNV_OFFSET;
    for byte in input.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}
