//! # Persistence
//!
//! The durable representation of the ledger and the seam through which it
//! is read and written.
//!
//! ## On-Disk Layout
//!
//! One JSON object per store, pretty-printed, rewritten whole on every
//! save:
//!
//! ```text
//! {
//!   "__global__": [ {block}, {block}, ... ],   // anonymous runs
//!   "ada@example.com": [ {block}, ... ]        // newest first
//! }
//! ```
//!
//! Array order matches in-memory order: index 0 is the most recent run.
//!
//! ## Legacy Format
//!
//! The first shipped version of the game wrote a bare JSON array (one
//! global chain, no per-player keying). Such files are recognized on load
//! and migrated — once — into `{"__global__": [...]}`, and the migrated
//! form is written back immediately.
//!
//! ## Failure Posture
//!
//! A missing file is an empty store. An unreadable or structurally
//! malformed file is *also* an empty store (logged at WARN): the ledger is
//! a best-effort local log and a corrupt file must not brick the game.
//! Write failures, by contrast, surface as errors — swallowing them is the
//! caller's decision to make, not ours.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::block::Block;
use crate::config::GLOBAL_KEY;
use crate::error::ChainResult;

/// The full persisted state: player key → newest-first chain.
///
/// A `BTreeMap` keeps key order sorted and therefore stable across
/// save/load cycles, which is all the flattened aggregate view requires
/// of it.
pub type Chains = BTreeMap<String, Vec<Block>>;

// ---------------------------------------------------------------------------
// RecordStore Trait
// ---------------------------------------------------------------------------

/// Durability seam for the ledger.
///
/// [`ChainStore`](crate::store::ChainStore) is generic over this trait so
/// the same chain logic runs against the real file ([`FileStore`]) and
/// against throwaway in-memory state in tests ([`MemoryStore`]).
pub trait RecordStore {
    /// Load the entire persisted state. Missing or malformed stores load
    /// as empty; only genuine I/O failures (permissions, disk) error.
    fn load(&self) -> ChainResult<Chains>;

    /// Persist the entire state, replacing whatever was there before.
    fn save(&self, chains: &Chains) -> ChainResult<()>;

    /// Delete the persisted state entirely. Idempotent.
    fn clear(&self) -> ChainResult<()>;
}

// ---------------------------------------------------------------------------
// FileStore
// ---------------------------------------------------------------------------

/// JSON-file-backed store — the real thing.
///
/// Every save rewrites the whole file; there is no append-in-place and no
/// cross-process locking. Single writer, single machine, by design.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a store handle for the given file path. Nothing is touched
    /// on disk until the first load or save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStore { path: path.into() }
    }
}

impl RecordStore for FileStore {
    fn load(&self) -> ChainResult<Chains> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no store file; starting empty");
                return Ok(Chains::new());
            }
            Err(e) => return Err(e.into()),
        };

        let value: Value = match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "store file is not valid JSON; treating as empty");
                return Ok(Chains::new());
            }
        };

        match value {
            // Legacy format: a bare array holding one global chain.
            Value::Array(_) => {
                let blocks: Vec<Block> = match serde_json::from_value(value) {
                    Ok(blocks) => blocks,
                    Err(e) => {
                        warn!(path = %self.path.display(), error = %e, "legacy store array is malformed; treating as empty");
                        return Ok(Chains::new());
                    }
                };
                let mut chains = Chains::new();
                chains.insert(GLOBAL_KEY.to_string(), blocks);
                // Persist the migrated shape right away so the next load
                // takes the fast path. If the file is read-only we still
                // serve the migrated view from memory.
                match self.save(&chains) {
                    Ok(()) => info!(path = %self.path.display(), "migrated legacy array store to per-player mapping"),
                    Err(e) => warn!(path = %self.path.display(), error = %e, "could not persist legacy store migration"),
                }
                Ok(chains)
            }
            Value::Object(_) => match serde_json::from_value(value) {
                Ok(chains) => Ok(chains),
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "store mapping is malformed; treating as empty");
                    Ok(Chains::new())
                }
            },
            other => {
                warn!(path = %self.path.display(), found = %other, "store file holds neither array nor mapping; treating as empty");
                Ok(Chains::new())
            }
        }
    }

    fn save(&self, chains: &Chains) -> ChainResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(chains)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    fn clear(&self) -> ChainResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// In-memory store for tests and tooling: no filesystem side effects,
/// nothing to clean up afterwards.
#[derive(Debug, Default)]
pub struct MemoryStore {
    chains: Mutex<Chains>,
}

impl MemoryStore {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an in-memory store pre-seeded with state, for tests that
    /// need history to already exist.
    pub fn seeded(chains: Chains) -> Self {
        MemoryStore {
            chains: Mutex::new(chains),
        }
    }
}

impl RecordStore for MemoryStore {
    fn load(&self) -> ChainResult<Chains> {
        Ok(self.chains.lock().expect("memory store poisoned").clone())
    }

    fn save(&self, chains: &Chains) -> ChainResult<()> {
        *self.chains.lock().expect("memory store poisoned") = chains.clone();
        Ok(())
    }

    fn clear(&self) -> ChainResult<()> {
        self.chains.lock().expect("memory store poisoned").clear();
        Ok(())
    }
}
