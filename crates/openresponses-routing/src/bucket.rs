//! Stable canary bucketing.
//!
//! Uses 32-bit FNV-1a over the UTF-8 bytes of the key. The function has no
//! process-local seed, so a key lands in the same bucket on every host and
//! in every implementation of the algorithm.

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// Number of canary buckets; bucket values are `0..BUCKET_COUNT`
pub const BUCKET_COUNT: u32 = 100;

/// 32-bit FNV-1a hash of `key`
#[must_use]
pub fn stable_hash(key: &str) -> u32 {
    key.bytes().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u32::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Canary bucket of `key`, in `0..100`
#[must_use]
pub fn canary_bucket(key: &str) -> u8 {
    // Always below 100, fits in u8.
    #[allow(clippy::cast_possible_truncation)]
    let bucket = (stable_hash(key) % BUCKET_COUNT) as u8;
    bucket
}
