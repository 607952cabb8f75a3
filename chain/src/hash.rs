//! # Hashing
//!
//! Canonical string construction and SHA-256 digests for the score ledger.
//!
//! A block's hash is SHA-256 over the UTF-8 bytes of one canonical string:
//! the decimal form of `level`, the canonical decimal form of `duration`,
//! the timestamp string, the previous block's hash, and the player name
//! (empty when absent) — concatenated in that order with no separators.
//! This exact recipe is a compatibility contract with stores already on
//! disk. Change it and every existing chain verifies as tampered, which is
//! indistinguishable from the thing we are trying to detect.
//!
//! ## Why SHA-256 and not something faster
//!
//! Because the wire format says 64 lowercase hex characters of SHA-256 and
//! existing files hold exactly that. Inputs are a few dozen bytes per run;
//! hash throughput is not a consideration here.
//!
//! ## Canonical duration formatting
//!
//! `duration` is hashed via its textual form, so the float-to-string rule
//! is part of the contract. We use Rust's shortest round-trip formatting
//! (`f64::to_string()`): deterministic, and stable across a JSON round
//! trip because JSON numbers deserialize back to the bit-identical `f64`.
//! Recomputing a stored block's hash therefore reproduces the stored
//! value, or the block was altered.

use sha2::{Digest, Sha256};

use crate::config::HASH_HEX_LEN;

/// Compute the SHA-256 hash of the input bytes, rendered as 64 lowercase
/// hex characters.
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Canonical decimal form of a duration: shortest string that round-trips
/// to the same `f64`. `41.27` → `"41.27"`, `12.0` → `"12"`.
pub fn canonical_duration(duration: f64) -> String {
    duration.to_string()
}

/// Compute a block hash from its constituent fields.
///
/// Covers, in order and with no separators: `level`, `duration` (canonical
/// form), `timestamp`, `prev_hash`, `player_name` (empty string when
/// absent). The `id` is NOT included — it is a per-player display ordinal,
/// not content.
///
/// Pure and deterministic: same inputs, same digest, no side effects.
pub fn compute_hash(
    level: u32,
    duration: f64,
    timestamp: &str,
    prev_hash: &str,
    player_name: Option<&str>,
) -> String {
    let preimage = format!(
        "{}{}{}{}{}",
        level,
        canonical_duration(duration),
        timestamp,
        prev_hash,
        player_name.unwrap_or_default(),
    );
    sha256_hex(preimage.as_bytes())
}

/// True if `s` looks like a digest this ledger produced: 64 lowercase hex
/// characters. Used by display layers to decide whether a loaded field is
/// worth rendering as a hash at all.
pub fn is_well_formed_hash(s: &str) -> bool {
    s.len() == HASH_HEX_LEN && s.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase())
}
