//! # Chain Verification
//!
//! Walks stored chains and reports the seams tampering leaves behind.
//! Two independent checks, two kinds of evidence:
//!
//! - **Link check** — for each adjacent pair in a newest-first chain,
//!   `blocks[i].prev_hash` must equal `blocks[i + 1].hash`. A mismatch is
//!   reported at 1-based position `i + 1`. This is the contract check:
//!   cheap, and the one the viewer's status column is built on.
//!
//! - **Content audit** — recompute every block's hash from its stored
//!   fields and compare against the stored `hash`. Catches the edit the
//!   link check can't see: the *newest* block of a chain has no newer
//!   neighbour holding its hash, so rewriting it breaks no link.
//!
//! Findings are data for the display layer, never errors. An altered
//! chain is the detector working, not the detector failing.

use std::collections::{BTreeMap, BTreeSet};

use crate::block::Block;
use crate::persist::RecordStore;
use crate::store::ChainStore;

// ---------------------------------------------------------------------------
// Single-Chain Checks
// ---------------------------------------------------------------------------

/// Link-check a newest-first chain.
///
/// Returns the 1-based positions where `prev_hash` disagrees with the
/// next (older) block's stored `hash`. Empty set = intact linkage.
pub fn broken_links(blocks: &[Block]) -> BTreeSet<usize> {
    let mut altered = BTreeSet::new();
    for i in 0..blocks.len().saturating_sub(1) {
        if blocks[i].prev_hash != blocks[i + 1].hash {
            altered.insert(i + 1);
        }
    }
    altered
}

/// Content-audit a chain: 1-based positions of blocks whose stored hash
/// no longer matches the hash recomputed from their fields.
pub fn hash_mismatches(blocks: &[Block]) -> BTreeSet<usize> {
    blocks
        .iter()
        .enumerate()
        .filter(|(_, block)| !block.content_intact())
        .map(|(i, _)| i + 1)
        .collect()
}

/// Combined result of both checks over one chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainAudit {
    /// Positions failing the adjacent-pair link check.
    pub broken_links: BTreeSet<usize>,
    /// Positions whose content no longer matches their stored hash.
    pub hash_mismatches: BTreeSet<usize>,
}

impl ChainAudit {
    /// True when neither check found anything.
    pub fn is_clean(&self) -> bool {
        self.broken_links.is_empty() && self.hash_mismatches.is_empty()
    }

    /// Every implicated position, both evidence kinds merged.
    pub fn all_positions(&self) -> BTreeSet<usize> {
        self.broken_links
            .union(&self.hash_mismatches)
            .copied()
            .collect()
    }
}

/// Run both checks over one chain.
pub fn audit(blocks: &[Block]) -> ChainAudit {
    ChainAudit {
        broken_links: broken_links(blocks),
        hash_mismatches: hash_mismatches(blocks),
    }
}

// ---------------------------------------------------------------------------
// Whole-Store Checks
// ---------------------------------------------------------------------------

/// Link-check every player's chain. Keys with an intact chain map to an
/// empty set, so the caller can render "verified" rows without a second
/// lookup.
pub fn verify_all<S: RecordStore>(store: &ChainStore<S>) -> BTreeMap<String, BTreeSet<usize>> {
    store
        .chains()
        .iter()
        .map(|(key, chain)| (key.clone(), broken_links(chain)))
        .collect()
}

/// Full audit (links + content) of every player's chain.
pub fn audit_all<S: RecordStore>(store: &ChainStore<S>) -> BTreeMap<String, ChainAudit> {
    store
        .chains()
        .iter()
        .map(|(key, chain)| (key.clone(), audit(chain)))
        .collect()
}

/// Link-check the flattened legacy view. Positions are relative to that
/// view, which is only meaningful for stores holding a single `__global__`
/// chain — exactly the stores the legacy screens were written for.
pub fn verify_flattened<S: RecordStore>(store: &ChainStore<S>) -> BTreeSet<usize> {
    broken_links(&store.flattened())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{zero_hash, HASH_HEX_LEN};

    /// Build an intact newest-first chain of `n` blocks.
    fn chain_of(n: usize) -> Vec<Block> {
        let mut oldest_first = Vec::with_capacity(n);
        let mut prev = zero_hash();
        for i in 0..n {
            let block = Block::sealed_at(
                format!("2026-08-28T14:00:{i:02}.000000"),
                (i + 1) as u32,
                1.5,
                prev.clone(),
                None,
            );
            prev = block.hash.clone();
            oldest_first.push(block);
        }
        oldest_first.reverse();
        oldest_first
    }

    #[test]
    fn empty_and_singleton_chains_are_clean() {
        assert!(broken_links(&[]).is_empty());
        assert!(audit(&chain_of(1)).is_clean());
    }

    #[test]
    fn intact_chain_passes_both_checks() {
        let chain = chain_of(10);
        assert!(audit(&chain).is_clean());
    }

    #[test]
    fn edited_hash_breaks_the_link_before_it() {
        let mut chain = chain_of(5);
        chain[3].hash = "a".repeat(HASH_HEX_LEN);

        // The pair (2, 3) no longer matches; report position 3.
        assert_eq!(broken_links(&chain), BTreeSet::from([3]));
        // The content audit independently fingers position 4 itself.
        assert_eq!(hash_mismatches(&chain), BTreeSet::from([4]));
    }

    #[test]
    fn edited_newest_block_is_invisible_to_links_but_not_audit() {
        let mut chain = chain_of(4);
        chain[0].level = 99;

        assert!(broken_links(&chain).is_empty());
        assert_eq!(hash_mismatches(&chain), BTreeSet::from([1]));
        assert!(!audit(&chain).is_clean());
    }

    #[test]
    fn audit_merges_positions() {
        let mut chain = chain_of(5);
        chain[0].level = 99;
        chain[3].hash = "b".repeat(HASH_HEX_LEN);

        let report = audit(&chain);
        assert_eq!(report.all_positions(), BTreeSet::from([1, 3, 4]));
    }

    #[test]
    fn verify_all_covers_every_player() {
        let mut store = ChainStore::in_memory();
        store.append(Some("ada@example.com"), 1, 1.0, None).expect("append");
        store.append(Some("ada@example.com"), 2, 2.0, None).expect("append");
        store.append(None, 1, 1.0, None).expect("append");

        let report = verify_all(&store);
        assert_eq!(report.len(), 2);
        assert!(report.values().all(BTreeSet::is_empty));
    }

    #[test]
    fn flattened_check_follows_the_global_chain() {
        let mut store = ChainStore::in_memory();
        store.append(None, 1, 1.0, None).expect("append");
        store.append(None, 2, 2.0, None).expect("append");
        assert!(verify_flattened(&store).is_empty());
    }
}
