//! # CLI Interface
//!
//! Defines the command-line argument structure for `tally` using `clap`
//! derive. Five subcommands: `record`, `history`, `verify`, `players`,
//! and `clear`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use tally_chain::config::STORE_FILE_NAME;

/// Score ledger inspector for the Tally arcade shell.
///
/// Reads and maintains the hash-chained `records.json` the game writes:
/// list a player's runs, verify chain integrity, record runs by hand, or
/// wipe the ledger.
#[derive(Parser, Debug)]
#[command(
    name = "tally",
    about = "Tamper-evident score ledger inspector",
    version,
    propagate_version = true
)]
pub struct TallyCli {
    /// Path to the ledger file.
    #[arg(
        long,
        short = 's',
        env = "TALLY_STORE",
        default_value = STORE_FILE_NAME,
        global = true
    )]
    pub store: PathBuf,

    /// Log output format: "pretty" or "json".
    #[arg(long, env = "TALLY_LOG_FORMAT", default_value = "pretty", global = true)]
    pub log_format: String,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the `tally` binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record a completed run.
    Record(RecordArgs),
    /// Show a player's run history (or the flattened aggregate view).
    History(HistoryArgs),
    /// Verify chain integrity for every player and report altered rows.
    Verify(VerifyArgs),
    /// List known players with their best level and run count.
    Players,
    /// Delete the entire ledger. All players, all history, no undo.
    Clear(ClearArgs),
}

/// Arguments for the `record` subcommand.
#[derive(Parser, Debug)]
pub struct RecordArgs {
    /// Level reached when the run ended (≥ 1).
    pub level: u32,

    /// Run duration in seconds (≥ 0).
    pub duration: f64,

    /// Player key (usually an email). Omit to record anonymously.
    #[arg(long, short = 'p')]
    pub player: Option<String>,

    /// Display name to embed in the block.
    #[arg(long, short = 'n')]
    pub name: Option<String>,
}

/// Arguments for the `history` subcommand.
#[derive(Parser, Debug)]
pub struct HistoryArgs {
    /// Player key to show. Omit for the anonymous chain.
    #[arg(long, short = 'p')]
    pub player: Option<String>,

    /// Show the flattened aggregate view instead of a single player.
    #[arg(long, conflicts_with = "player")]
    pub all: bool,
}

/// Arguments for the `verify` subcommand.
#[derive(Parser, Debug)]
pub struct VerifyArgs {
    /// Restrict verification to one player key.
    #[arg(long, short = 'p')]
    pub player: Option<String>,

    /// Skip the deep content audit and run only the link check.
    #[arg(long)]
    pub links_only: bool,
}

/// Arguments for the `clear` subcommand.
#[derive(Parser, Debug)]
pub struct ClearArgs {
    /// Required confirmation; `clear` refuses to run without it.
    #[arg(long)]
    pub yes: bool,
}
