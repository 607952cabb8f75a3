//! # ChainStore — Per-Player Score Chains
//!
//! The heart of the ledger: an in-memory mapping from player key to a
//! newest-first chain of [`Block`]s, write-through persisted via a
//! [`RecordStore`] backing.
//!
//! ## Data Flow
//!
//! ```text
//! run ends → append(player, level, duration, name)
//!              ├── prev_hash ← current head (or 64 zeros)
//!              ├── seal block, id ← chain length + 1
//!              ├── prepend, truncate to 50
//!              └── save whole store
//! viewer   → history() / verify() / player_summaries()
//! ```
//!
//! ## Ordering & Identity
//!
//! Chains are newest-first: index 0 is the most recent run. Ids are
//! 1-based *per player* — two players' chains share ids freely, and after
//! eviction the surviving ids are no longer contiguous. Both are long-
//! standing properties of files already in the wild.
//!
//! ## Concurrency
//!
//! Single process, single writer. Every append rewrites the whole file;
//! two processes sharing one store file will lose each other's updates.
//! Accepted limitation of a local, single-player-machine log.

use std::collections::BTreeSet;
use std::path::PathBuf;

use tracing::debug;

use crate::block::Block;
use crate::config::{zero_hash, GLOBAL_KEY, MAX_BLOCKS_PER_PLAYER};
use crate::error::{ChainError, ChainResult};
use crate::persist::{Chains, FileStore, MemoryStore, RecordStore};
use crate::verify::broken_links;

// ---------------------------------------------------------------------------
// PlayerSummary
// ---------------------------------------------------------------------------

/// Roster entry derived from a player's chain, shaped for the "players"
/// screen: who they are, how far they got, how many runs are retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerSummary {
    /// The player's storage key (usually an email address).
    pub key: String,
    /// Best available display name: the first stored block carrying a
    /// `player_name`, else the capitalized local part of an email-shaped
    /// key, else the key itself.
    pub name: String,
    /// Highest level reached across retained runs.
    pub max_level: u32,
    /// Number of retained runs (capped at 50).
    pub runs: usize,
}

// ---------------------------------------------------------------------------
// ChainStore
// ---------------------------------------------------------------------------

/// Per-player score chains with write-through persistence.
///
/// Generic over the [`RecordStore`] backing so the identical chain logic
/// serves both the on-disk JSON file and in-memory test stores.
#[derive(Debug)]
pub struct ChainStore<S: RecordStore = FileStore> {
    chains: Chains,
    backing: S,
}

impl ChainStore<FileStore> {
    /// Open (or create) a file-backed store at the given path.
    ///
    /// Loads existing state immediately, including the one-time migration
    /// of legacy bare-array files. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> ChainResult<Self> {
        Self::with_backing(FileStore::new(path))
    }
}

impl ChainStore<MemoryStore> {
    /// Create an empty store with no filesystem footprint. Ideal for
    /// tests and for the demo binary's dry-run mode.
    pub fn in_memory() -> Self {
        ChainStore {
            chains: Chains::new(),
            backing: MemoryStore::new(),
        }
    }
}

impl<S: RecordStore> ChainStore<S> {
    /// Build a store over an arbitrary backing, loading its current state.
    pub fn with_backing(backing: S) -> ChainResult<Self> {
        let chains = backing.load()?;
        Ok(ChainStore { chains, backing })
    }

    /// Resolve the storage key for an optional player identity. `None`
    /// and the empty string both land on the anonymous sentinel.
    fn storage_key(player: Option<&str>) -> &str {
        match player {
            Some(key) if !key.is_empty() => key,
            _ => GLOBAL_KEY,
        }
    }

    /// Record a completed run for a player (or anonymously).
    ///
    /// Validates input, links the new block to the player's current head,
    /// assigns the per-player id, prepends, evicts beyond the retention
    /// cap, and persists the whole store. Returns the sealed block.
    ///
    /// # Errors
    ///
    /// [`ChainError::InvalidLevel`] / [`ChainError::InvalidDuration`] on
    /// bad input, with no state change at all. Persistence failures
    /// surface as I/O or serialization errors *after* the in-memory
    /// append has been applied — a caller content with a best-effort log
    /// can log and move on without losing the returned block.
    pub fn append(
        &mut self,
        player: Option<&str>,
        level: u32,
        duration: f64,
        player_name: Option<&str>,
    ) -> ChainResult<Block> {
        if level < 1 {
            return Err(ChainError::InvalidLevel(level));
        }
        if !duration.is_finite() || duration < 0.0 {
            return Err(ChainError::InvalidDuration(duration));
        }

        let key = Self::storage_key(player);
        let chain = self.chains.entry(key.to_string()).or_default();

        let prev_hash = chain
            .first()
            .map(|head| head.hash.clone())
            .unwrap_or_else(zero_hash);

        // An empty display name is the same as no display name; it would
        // hash identically and only clutter the wire format.
        let name = player_name.filter(|n| !n.is_empty()).map(str::to_string);

        let mut block = Block::seal(level, duration, prev_hash, name);
        block.id = Some(chain.len() as u64 + 1);

        chain.insert(0, block.clone());
        chain.truncate(MAX_BLOCKS_PER_PLAYER);

        self.backing.save(&self.chains)?;
        debug!(
            player = key,
            level,
            duration,
            id = block.id,
            "recorded run"
        );
        Ok(block)
    }

    /// A player's chain, newest-first. Empty for unseen players.
    pub fn history(&self, player: Option<&str>) -> Vec<Block> {
        self.chains
            .get(Self::storage_key(player))
            .cloned()
            .unwrap_or_default()
    }

    /// The aggregate legacy view: the `__global__` chain alone if it
    /// exists, otherwise every player's chain concatenated in stable key
    /// order. Serves old all-runs screens; the cross-player ordering is
    /// not load-bearing.
    pub fn flattened(&self) -> Vec<Block> {
        if let Some(global) = self.chains.get(GLOBAL_KEY) {
            return global.clone();
        }
        self.chains.values().flatten().cloned().collect()
    }

    /// Link-check one player's chain. Returns the 1-based positions whose
    /// `prev_hash` does not match the next (older) block's `hash` — the
    /// designed tampering signal, returned as data, never as an error.
    pub fn verify(&self, player: Option<&str>) -> BTreeSet<usize> {
        self.chains
            .get(Self::storage_key(player))
            .map(|chain| broken_links(chain))
            .unwrap_or_default()
    }

    /// All stored player keys, including the anonymous sentinel if any
    /// anonymous runs exist.
    pub fn players(&self) -> BTreeSet<String> {
        self.chains.keys().cloned().collect()
    }

    /// Full store access for the verifier and display layers.
    pub fn chains(&self) -> &Chains {
        &self.chains
    }

    /// The level to resume at: the player's most recent recorded level,
    /// falling back to the anonymous chain when the player has none, and
    /// to level 1 when nobody has recorded anything.
    pub fn last_level(&self, player: Option<&str>) -> u32 {
        let own = self
            .chains
            .get(Self::storage_key(player))
            .filter(|chain| !chain.is_empty());
        let fallback = self
            .chains
            .get(GLOBAL_KEY)
            .filter(|chain| !chain.is_empty());

        own.or(fallback)
            .and_then(|chain| chain.first())
            .map(|head| head.level)
            .unwrap_or(1)
    }

    /// Roster of signed-in players with a non-empty chain: display name,
    /// best level, retained run count. The anonymous sentinel is a bucket,
    /// not a player, and is excluded.
    pub fn player_summaries(&self) -> Vec<PlayerSummary> {
        self.chains
            .iter()
            .filter(|(key, chain)| key.as_str() != GLOBAL_KEY && !chain.is_empty())
            .map(|(key, chain)| {
                let name = chain
                    .iter()
                    .find_map(|b| b.player_name.as_deref().filter(|n| !n.is_empty()))
                    .map(str::to_string)
                    .unwrap_or_else(|| display_name_from_key(key));
                let max_level = chain.iter().map(|b| b.level).max().unwrap_or(1);
                PlayerSummary {
                    key: key.clone(),
                    name,
                    max_level,
                    runs: chain.len(),
                }
            })
            .collect()
    }

    /// Delete the entire persisted store — every player, every run.
    /// Irreversible, and exactly as blunt as it sounds.
    pub fn clear_all(&mut self) -> ChainResult<()> {
        self.backing.clear()?;
        self.chains.clear();
        debug!("cleared score ledger");
        Ok(())
    }
}

/// Fallback display name for a key with no named blocks: the capitalized
/// local part of an email-shaped key, or the key itself.
fn display_name_from_key(key: &str) -> String {
    let local = key.split('@').next().unwrap_or(key);
    if local.is_empty() {
        return key.to_string();
    }
    let mut chars = local.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => key.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HASH_HEX_LEN;

    const ADA: Option<&str> = Some("ada@example.com");
    const GRACE: Option<&str> = Some("grace@example.com");

    #[test]
    fn first_block_links_to_zero_hash() {
        let mut store = ChainStore::in_memory();
        let block = store.append(ADA, 1, 12.5, Some("Ada")).expect("append");
        assert_eq!(block.prev_hash, zero_hash());
        assert_eq!(block.id, Some(1));
        assert!(block.is_first());
    }

    #[test]
    fn append_then_history_yields_new_head() {
        let mut store = ChainStore::in_memory();
        store.append(ADA, 1, 10.0, Some("Ada")).expect("append");
        let second = store.append(ADA, 2, 20.0, Some("Ada")).expect("append");

        let history = store.history(ADA);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].hash, second.hash);
        assert_eq!(history[0].id, Some(2));
        assert_eq!(history[0].prev_hash, history[1].hash);
    }

    #[test]
    fn ids_are_per_player_not_global() {
        let mut store = ChainStore::in_memory();
        store.append(ADA, 1, 1.0, None).expect("append");
        let grace_first = store.append(GRACE, 1, 1.0, None).expect("append");
        assert_eq!(grace_first.id, Some(1));
    }

    #[test]
    fn invalid_input_leaves_no_trace() {
        let mut store = ChainStore::in_memory();
        assert!(matches!(
            store.append(ADA, 0, 1.0, None),
            Err(ChainError::InvalidLevel(0))
        ));
        assert!(matches!(
            store.append(ADA, 1, -0.5, None),
            Err(ChainError::InvalidDuration(_))
        ));
        assert!(matches!(
            store.append(ADA, 1, f64::NAN, None),
            Err(ChainError::InvalidDuration(_))
        ));
        assert!(store.history(ADA).is_empty());
        assert!(store.players().is_empty());
    }

    #[test]
    fn anonymous_runs_land_on_the_sentinel() {
        let mut store = ChainStore::in_memory();
        store.append(None, 3, 30.0, None).expect("append");
        store.append(Some(""), 4, 40.0, None).expect("append");

        let global = store.history(None);
        assert_eq!(global.len(), 2);
        assert!(store.players().contains(GLOBAL_KEY));
    }

    #[test]
    fn empty_display_name_is_dropped() {
        let mut store = ChainStore::in_memory();
        let block = store.append(ADA, 1, 1.0, Some("")).expect("append");
        assert_eq!(block.player_name, None);
    }

    #[test]
    fn retention_cap_keeps_the_fifty_most_recent() {
        let mut store = ChainStore::in_memory();
        for i in 1..=55 {
            store.append(ADA, i, i as f64, None).expect("append");
        }
        let history = store.history(ADA);
        assert_eq!(history.len(), MAX_BLOCKS_PER_PLAYER);
        // Newest first: ids 55 down to 6 survive.
        assert_eq!(history[0].id, Some(55));
        assert_eq!(history.last().expect("tail").id, Some(6));
    }

    #[test]
    fn chain_stays_verifiable_across_eviction() {
        let mut store = ChainStore::in_memory();
        for i in 1..=55 {
            store.append(ADA, i, 1.0, None).expect("append");
        }
        assert!(store.verify(ADA).is_empty());
    }

    #[test]
    fn verify_reports_broken_link_position() {
        let mut store = ChainStore::in_memory();
        for i in 1..=4 {
            store.append(ADA, i, 1.0, None).expect("append");
        }
        assert!(store.verify(ADA).is_empty());

        // Tamper through the backing: rewrite block 3's stored hash.
        let mut chains = store.backing.load().expect("load");
        chains.get_mut("ada@example.com").expect("chain")[2].hash = "f".repeat(HASH_HEX_LEN);
        store.backing.save(&chains).expect("save");
        let store = ChainStore::with_backing(store.backing).expect("reopen");

        // Newest-first positions: block at index 2 was edited, so the link
        // from index 1 (1-based position 2) no longer matches.
        assert_eq!(store.verify(ADA), BTreeSet::from([2]));
    }

    #[test]
    fn flattened_prefers_the_global_chain() {
        let mut store = ChainStore::in_memory();
        store.append(ADA, 1, 1.0, None).expect("append");
        store.append(None, 9, 9.0, None).expect("append");

        let flat = store.flattened();
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].level, 9);
    }

    #[test]
    fn flattened_concatenates_in_key_order_without_global() {
        let mut store = ChainStore::in_memory();
        store.append(GRACE, 2, 1.0, None).expect("append");
        store.append(ADA, 1, 1.0, None).expect("append");

        let flat = store.flattened();
        assert_eq!(flat.len(), 2);
        // BTreeMap order: ada@… sorts before grace@….
        assert_eq!(flat[0].level, 1);
        assert_eq!(flat[1].level, 2);
    }

    #[test]
    fn last_level_resumes_and_falls_back() {
        let mut store = ChainStore::in_memory();
        assert_eq!(store.last_level(ADA), 1);

        store.append(None, 4, 1.0, None).expect("append");
        // Unseen player falls back to the anonymous chain.
        assert_eq!(store.last_level(ADA), 4);

        store.append(ADA, 7, 1.0, None).expect("append");
        assert_eq!(store.last_level(ADA), 7);
    }

    #[test]
    fn summaries_skip_sentinel_and_derive_names() {
        let mut store = ChainStore::in_memory();
        store.append(None, 9, 1.0, None).expect("append");
        store.append(ADA, 2, 1.0, None).expect("append");
        store.append(ADA, 5, 1.0, Some("Ada L.")).expect("append");
        store.append(GRACE, 3, 1.0, None).expect("append");

        let summaries = store.player_summaries();
        assert_eq!(summaries.len(), 2);

        let ada = &summaries[0];
        assert_eq!(ada.key, "ada@example.com");
        assert_eq!(ada.name, "Ada L.");
        assert_eq!(ada.max_level, 5);
        assert_eq!(ada.runs, 2);

        // No named block for grace: fall back to the email's local part.
        let grace = &summaries[1];
        assert_eq!(grace.name, "Grace");
        assert_eq!(grace.max_level, 3);
    }

    #[test]
    fn opening_seeded_state_continues_the_chain() {
        // A store opened over pre-existing state must link new blocks to
        // the head that was already there, not start a fresh chain.
        let mut chains = Chains::new();
        let head = Block::sealed_at(
            "2026-08-28T14:03:51.042117".to_string(),
            3,
            41.27,
            zero_hash(),
            Some("Ada".to_string()),
        );
        chains.insert("ada@example.com".to_string(), vec![head.clone()]);

        let mut store =
            ChainStore::with_backing(MemoryStore::seeded(chains)).expect("open seeded");
        assert_eq!(store.last_level(ADA), 3);

        let next = store.append(ADA, 4, 50.0, Some("Ada")).expect("append");
        assert_eq!(next.prev_hash, head.hash);
        assert_eq!(next.id, Some(2));
        assert!(store.verify(ADA).is_empty());
    }

    #[test]
    fn clear_all_empties_everything() {
        let mut store = ChainStore::in_memory();
        store.append(ADA, 1, 1.0, None).expect("append");
        store.append(None, 1, 1.0, None).expect("append");

        store.clear_all().expect("clear");
        assert!(store.players().is_empty());
        assert!(store.history(ADA).is_empty());

        // The store remains usable afterwards.
        let block = store.append(ADA, 1, 1.0, None).expect("append");
        assert_eq!(block.id, Some(1));
    }

    #[test]
    fn display_name_fallback_shapes() {
        assert_eq!(display_name_from_key("ada@example.com"), "Ada");
        assert_eq!(display_name_from_key("GRACE@example.com"), "Grace");
        assert_eq!(display_name_from_key("player-one"), "Player-one");
    }
}
