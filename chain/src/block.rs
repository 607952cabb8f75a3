//! # Block Structure
//!
//! A block is one completed game run, frozen at the moment it ended. Each
//! block carries the SHA-256 of the run recorded before it (for the same
//! player), forming a per-player chain in which editing any historical
//! entry breaks a visible link.
//!
//! ## Block Layout
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │  Block                                               │
//! │  ├── id: Option<u64>     (1-based, per player)       │
//! │  ├── level: u32          (level reached, ≥ 1)        │
//! │  ├── duration: f64       (run length in seconds)     │
//! │  ├── timestamp: String   (ISO-8601 local datetime)   │
//! │  ├── player_name: Option<String>                     │
//! │  ├── prev_hash: String   (64 hex; 64 zeros if first) │
//! │  └── hash: String        (SHA-256 of canonical form) │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! ## Hash Computation
//!
//! The hash covers `level || duration || timestamp || prev_hash ||
//! player_name` (see [`crate::hash`]). The `id` is NOT included — ids are
//! display ordinals that eviction renders non-contiguous, and two players'
//! chains may share them freely.
//!
//! ## Wire Names
//!
//! The serialized field spellings (`prev_hash`, `player_name`) are part of
//! the on-disk format shared with stores written by earlier versions of
//! the game. They are a contract, not a style choice.

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::config::{zero_hash, TIMESTAMP_FORMAT};
use crate::hash::compute_hash;

/// One completed run in a player's chain.
///
/// Blocks are immutable after construction: the store never rewrites a
/// persisted block, it only prepends new ones and evicts the oldest. A
/// block whose stored `hash` no longer matches its recomputed hash was
/// edited by something other than this crate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// 1-based sequence number within this player's chain, assigned at
    /// insertion as `chain length + 1`. Not globally unique, and not
    /// contiguous once eviction has dropped old blocks. `null` in files
    /// written by pre-release builds.
    #[serde(default)]
    pub id: Option<u64>,
    /// Level reached when the run ended. Always ≥ 1.
    pub level: u32,
    /// Run length in seconds. The canonical textual form of this value is
    /// what the hash covers — see [`crate::hash::canonical_duration`].
    pub duration: f64,
    /// ISO-8601 local datetime at which the block was created.
    pub timestamp: String,
    /// Display name supplied by the identity provider, if any. Omitted
    /// entirely from the wire format when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,
    /// Hash of the block that was this player's most recent at insertion
    /// time; 64 zero characters for the player's first block.
    pub prev_hash: String,
    /// SHA-256 of this block's canonical string, 64 lowercase hex chars.
    pub hash: String,
}

impl Block {
    /// Construct and seal a block with an explicit timestamp.
    ///
    /// The hash is computed over the supplied fields; `id` is left unset
    /// for the store to assign. Exposed (rather than folded into
    /// [`Block::seal`]) so tests and replay tooling can build
    /// deterministic chains.
    pub fn sealed_at(
        timestamp: String,
        level: u32,
        duration: f64,
        prev_hash: String,
        player_name: Option<String>,
    ) -> Self {
        let hash = compute_hash(
            level,
            duration,
            &timestamp,
            &prev_hash,
            player_name.as_deref(),
        );
        Block {
            id: None,
            level,
            duration,
            timestamp,
            player_name,
            prev_hash,
            hash,
        }
    }

    /// Construct and seal a block timestamped "now" (local time).
    pub fn seal(level: u32, duration: f64, prev_hash: String, player_name: Option<String>) -> Self {
        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        Self::sealed_at(timestamp, level, duration, prev_hash, player_name)
    }

    /// Recompute the hash from this block's stored fields.
    ///
    /// Use this to check that `hash` still describes the content. The
    /// computation is pure; it does not touch the stored `hash`.
    pub fn recompute_hash(&self) -> String {
        compute_hash(
            self.level,
            self.duration,
            &self.timestamp,
            &self.prev_hash,
            self.player_name.as_deref(),
        )
    }

    /// True if the stored `hash` matches the recomputed one — i.e. the
    /// block's content has not been edited since it was sealed.
    pub fn content_intact(&self) -> bool {
        self.hash == self.recompute_hash()
    }

    /// True if this is the first block of a chain (all-zero `prev_hash`).
    pub fn is_first(&self) -> bool {
        self.prev_hash == zero_hash()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sealed(level: u32, duration: f64, name: Option<&str>) -> Block {
        Block::sealed_at(
            "2026-08-28T14:03:51.042117".to_string(),
            level,
            duration,
            zero_hash(),
            name.map(str::to_string),
        )
    }

    #[test]
    fn sealed_block_is_intact() {
        let b = sealed(3, 41.27, Some("Ada"));
        assert!(b.content_intact());
        assert!(b.is_first());
        assert_eq!(b.id, None);
    }

    #[test]
    fn sealing_is_deterministic_given_timestamp() {
        let a = sealed(3, 41.27, Some("Ada"));
        let b = sealed(3, 41.27, Some("Ada"));
        assert_eq!(a.hash, b.hash);
    }

    #[test]
    fn editing_any_field_breaks_intactness() {
        let mut b = sealed(3, 41.27, Some("Ada"));
        b.level = 9;
        assert!(!b.content_intact());

        let mut b = sealed(3, 41.27, Some("Ada"));
        b.duration = 41.26;
        assert!(!b.content_intact());

        let mut b = sealed(3, 41.27, Some("Ada"));
        b.player_name = None;
        assert!(!b.content_intact());
    }

    #[test]
    fn id_is_not_content() {
        let mut b = sealed(3, 41.27, None);
        b.id = Some(42);
        assert!(b.content_intact());
    }

    #[test]
    fn seal_uses_a_plausible_local_timestamp() {
        let b = Block::seal(1, 2.5, zero_hash(), None);
        // ISO-8601 local datetime: date, 'T', time with fractional seconds.
        assert!(b.timestamp.contains('T'));
        assert!(b.timestamp.contains('.'));
        assert!(b.content_intact());
    }

    #[test]
    fn wire_format_spells_fields_correctly() {
        let named = sealed(3, 41.27, Some("Ada"));
        let json = serde_json::to_string(&named).expect("serialize");
        assert!(json.contains("\"prev_hash\""));
        assert!(json.contains("\"player_name\""));

        let anon = sealed(3, 41.27, None);
        let json = serde_json::to_string(&anon).expect("serialize");
        assert!(!json.contains("player_name"), "absent name must be omitted, not null");
    }

    #[test]
    fn wire_roundtrip_preserves_intactness() {
        let b = sealed(7, 12.0, Some("Grace"));
        let json = serde_json::to_string(&b).expect("serialize");
        let back: Block = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(b, back);
        assert!(back.content_intact());
    }

    #[test]
    fn legacy_block_without_id_deserializes() {
        // Pre-release stores wrote `id: null`; even older ones omitted it.
        let json = r#"{
            "level": 2,
            "duration": 10.5,
            "timestamp": "2026-01-01T00:00:00.000000",
            "prev_hash": "0000000000000000000000000000000000000000000000000000000000000000",
            "hash": "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff"
        }"#;
        let b: Block = serde_json::from_str(json).expect("deserialize");
        assert_eq!(b.id, None);
        assert_eq!(b.player_name, None);
        assert!(!b.content_intact());
    }
}
