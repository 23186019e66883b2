//! Condition fingerprints.
//!
//! A fingerprint is a deterministic 32-bit hash of the facts that made a
//! nudge qualify — never of the notification text — so it stays stable
//! across cycles while the facts are unchanged, and changes when they
//! change. Fingerprints are persisted in the ledger across deployments,
//! so the hash must be stable across process restarts and Rust releases;
//! FNV-1a is used rather than the standard library's `DefaultHasher`,
//! which guarantees neither.

use chrono::{DateTime, Utc};

const FNV_OFFSET: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// FNV-1a over the given parts, with a unit separator folded in between
/// parts so that `["ab", "c"]` and `["a", "bc"]` hash differently.
pub fn fingerprint(parts: &[&str]) -> u32 {
    let mut hash = FNV_OFFSET;
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            hash ^= 0x1f;
            hash = hash.wrapping_mul(FNV_PRIME);
        }
        for byte in part.bytes() {
            hash ^= byte as u32;
            hash = hash.wrapping_mul(FNV_PRIME);
        }
    }
    hash
}

/// Canonical rendering of an instant for hashing: unix seconds.
pub fn canonical_instant(instant: DateTime<Utc>) -> String {
    instant.timestamp().to_string()
}

/// Canonical rendering of an hours threshold for hashing. Whole-number
/// thresholds render without a fraction (`336`, not `336.0`).
pub fn canonical_hours(hours: f64) -> String {
    if hours.fract() == 0.0 {
        format!("{}", hours as i64)
    } else {
        format!("{hours}")
    }
}
