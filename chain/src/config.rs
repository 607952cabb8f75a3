//! # Ledger Configuration & Constants
//!
//! Every magic number in the score ledger lives here. Most of these are a
//! compatibility contract with stores already on players' machines:
//! changing them silently invalidates files that verified yesterday, which
//! is exactly the kind of tampering this crate exists to expose.

// ---------------------------------------------------------------------------
// Player Keys
// ---------------------------------------------------------------------------

/// Reserved player key for runs recorded without a signed-in identity.
///
/// The identity provider hands us `(playerKey, playerName)` for a session,
/// or nothing at all. Anonymous runs still deserve a chain, so they share
/// this sentinel. The double underscores keep it out of the way of any
/// plausible real key (keys are usually email addresses).
pub const GLOBAL_KEY: &str = "__global__";

// ---------------------------------------------------------------------------
// Retention
// ---------------------------------------------------------------------------

/// Maximum number of blocks retained per player.
///
/// Enforced on insertion only — loading an over-long chain from disk never
/// drops entries. Eviction removes the oldest blocks; their hashes remain
/// woven into the survivors, so the chain stays verifiable.
pub const MAX_BLOCKS_PER_PLAYER: usize = 50;

// ---------------------------------------------------------------------------
// Wire Parameters
// ---------------------------------------------------------------------------

/// Length of a hash in the wire format: SHA-256, lowercase hex. 64 chars.
pub const HASH_HEX_LEN: usize = 64;

/// Default filename for the persisted store, kept next to the game binary.
pub const STORE_FILE_NAME: &str = "records.json";

/// chrono format string for block timestamps: ISO-8601 local datetime with
/// microseconds (`2026-08-28T14:03:51.042117`). Only the resulting *string*
/// participates in hashing, so this shapes new blocks without being able to
/// invalidate old ones.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// The `prev_hash` of a player's first block: 64 zero characters.
pub fn zero_hash() -> String {
    "0".repeat(HASH_HEX_LEN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_hash_shape() {
        let z = zero_hash();
        assert_eq!(z.len(), HASH_HEX_LEN);
        assert!(z.chars().all(|c| c == '0'));
    }
}
