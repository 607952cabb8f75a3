// Copyright (c) 2026 Tally Contributors. MIT License.
// See LICENSE for details.

//! # Tally Chain — Core Library
//!
//! The score ledger behind the Tally arcade shell: an append-only,
//! hash-chained record of completed runs, kept per player and persisted as
//! a single JSON file next to the game.
//!
//! This is deliberately *not* a blockchain. There is no consensus, no
//! replication, no mining — one writer, one machine, one file. What it
//! borrows from that world is the useful part: every record carries the
//! SHA-256 of the record before it, so anyone who edits the file after the
//! fact leaves a visible seam. The viewer doesn't prevent tampering; it
//! makes tampering embarrassing.
//!
//! ## Architecture
//!
//! The crate is split into modules that mirror the actual concerns of a
//! local integrity log:
//!
//! - **block** — The immutable record of one completed run.
//! - **hash** — Canonical string construction and SHA-256 digests.
//! - **store** — Per-player chains: append, history, retention, eviction.
//! - **verify** — Link checks and the deeper stored-vs-recomputed audit.
//! - **persist** — The JSON file on disk, including legacy-format migration.
//! - **config** — Constants: sentinel key, retention cap, wire parameters.
//!
//! ## Typical Use
//!
//! ```no_run
//! use tally_chain::store::ChainStore;
//!
//! let mut store = ChainStore::open("records.json")?;
//! let block = store.append(Some("ada@example.com"), 3, 41.27, Some("Ada"))?;
//! assert_eq!(store.history(Some("ada@example.com"))[0].hash, block.hash);
//! assert!(store.verify(Some("ada@example.com")).is_empty());
//! # Ok::<(), tally_chain::error::ChainError>(())
//! ```

pub mod block;
pub mod config;
pub mod error;
pub mod hash;
pub mod persist;
pub mod store;
pub mod verify;

pub use block::Block;
pub use error::{ChainError, ChainResult};
pub use persist::{FileStore, MemoryStore, RecordStore};
pub use store::{ChainStore, PlayerSummary};
pub use verify::ChainAudit;
