// Copyright (c) 2026 Tally Contributors. MIT License.
// See LICENSE for details.

//! # Tally Ledger Inspector
//!
//! Entry point for the `tally` binary. Parses CLI arguments, initializes
//! logging, opens the ledger file, and dispatches to the subcommand.
//!
//! The binary supports five subcommands:
//!
//! - `record`  — append a completed run to a player's chain
//! - `history` — print a player's chain (or the flattened view) as a table
//! - `verify`  — link-check and audit every chain, report altered rows
//! - `players` — roster with best level and run count
//! - `clear`   — delete the ledger file outright

mod cli;
mod logging;

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::collections::BTreeSet;
use std::path::Path;

use tally_chain::hash::is_well_formed_hash;
use tally_chain::store::ChainStore;
use tally_chain::verify::{broken_links, hash_mismatches, verify_flattened};
use tally_chain::Block;

use cli::{Commands, TallyCli};
use logging::LogFormat;

fn main() -> Result<()> {
    let cli = TallyCli::parse();
    logging::init_logging(
        "tally=info,tally_chain=info",
        LogFormat::from_str_lossy(&cli.log_format),
    );

    let store = ChainStore::open(&cli.store)
        .with_context(|| format!("failed to open ledger at {}", cli.store.display()))?;

    match cli.command {
        Commands::Record(args) => record_run(store, args),
        Commands::History(args) => show_history(&store, args),
        Commands::Verify(args) => verify_ledger(&store, args),
        Commands::Players => show_players(&store),
        Commands::Clear(args) => clear_ledger(store, &cli.store, args),
    }
}

/// Appends one run and echoes the sealed block.
fn record_run(mut store: ChainStore, args: cli::RecordArgs) -> Result<()> {
    let block = store
        .append(
            args.player.as_deref(),
            args.level,
            args.duration,
            args.name.as_deref(),
        )
        .context("failed to record run")?;

    tracing::info!(
        player = args.player.as_deref().unwrap_or("(anonymous)"),
        level = block.level,
        "run recorded"
    );
    println!(
        "recorded run #{} — level {}, {}s",
        block.id.unwrap_or(0),
        block.level,
        block.duration
    );
    println!("  hash      {}", block.hash);
    println!("  prev_hash {}", block.prev_hash);
    Ok(())
}

/// Prints a chain as the table the game's records screen shows: id,
/// player, level, duration, status, and truncated hashes. Rows implicated
/// by the link check are marked ALTERED.
fn show_history(store: &ChainStore, args: cli::HistoryArgs) -> Result<()> {
    let (blocks, altered) = if args.all {
        let blocks = store.flattened();
        let altered = verify_flattened(store);
        (blocks, altered)
    } else {
        let blocks = store.history(args.player.as_deref());
        let altered = store.verify(args.player.as_deref());
        (blocks, altered)
    };

    if blocks.is_empty() {
        println!("no runs recorded");
        return Ok(());
    }

    println!(
        "{:<4} {:<16} {:<5} {:>9}  {:<8} {:<14} {:<14}",
        "ID", "Player", "Level", "Duration", "Status", "Hash", "PrevHash"
    );
    for (i, block) in blocks.iter().enumerate() {
        let status = if altered.contains(&(i + 1)) {
            "ALTERED"
        } else {
            "ok"
        };
        println!(
            "{:<4} {:<16} {:<5} {:>8}s  {:<8} {:<14} {:<14}",
            block.id.map_or_else(|| "-".to_string(), |id| id.to_string()),
            block.player_name.as_deref().unwrap_or("-"),
            block.level,
            block.duration,
            status,
            short_hash(&block.hash),
            short_hash(&block.prev_hash),
        );
    }
    Ok(())
}

/// Verifies every chain (or one player's) and prints the findings.
/// Exits nonzero when anything is altered, so scripts can gate on it.
fn verify_ledger(store: &ChainStore, args: cli::VerifyArgs) -> Result<()> {
    let mut tampered = false;

    if let Some(player) = args.player.as_deref() {
        let blocks = store.history(Some(player));
        tampered |= report_player(player, &blocks, args.links_only);
    } else {
        for player in store.players() {
            let blocks = store.history(Some(&player));
            tampered |= report_player(&player, &blocks, args.links_only);
        }
    }

    if tampered {
        bail!("ledger verification failed: altered blocks detected");
    }
    println!("ledger verified: every chain intact");
    Ok(())
}

/// Prints one player's verification line; returns true if anything was
/// flagged.
fn report_player(player: &str, blocks: &[Block], links_only: bool) -> bool {
    let links = broken_links(blocks);
    let content = if links_only {
        BTreeSet::new()
    } else {
        hash_mismatches(blocks)
    };

    if links.is_empty() && content.is_empty() {
        println!("{player:<24} intact ({} runs)", blocks.len());
        return false;
    }
    if !links.is_empty() {
        println!("{player:<24} broken links at positions {links:?}");
    }
    if !content.is_empty() {
        println!("{player:<24} content mismatch at positions {content:?}");
    }
    true
}

/// Prints the roster the game's players screen derives.
fn show_players(store: &ChainStore) -> Result<()> {
    let summaries = store.player_summaries();
    if summaries.is_empty() {
        println!("no players recorded");
        return Ok(());
    }
    println!("{:<24} {:<20} {:<10} {:<5}", "Key", "Name", "Best level", "Runs");
    for p in summaries {
        println!("{:<24} {:<20} {:<10} {:<5}", p.key, p.name, p.max_level, p.runs);
    }
    Ok(())
}

/// Deletes the ledger file. Refuses without `--yes`.
fn clear_ledger(mut store: ChainStore, path: &Path, args: cli::ClearArgs) -> Result<()> {
    if !args.yes {
        bail!("refusing to delete the ledger without --yes");
    }
    store
        .clear_all()
        .with_context(|| format!("failed to delete ledger at {}", path.display()))?;
    tracing::info!(path = %path.display(), "ledger cleared");
    println!("ledger cleared: {}", path.display());
    Ok(())
}

/// First 12 hex chars of a hash, enough to eyeball a link. A field that
/// doesn't look like a ledger digest at all is called out instead of
/// being truncated into something hash-shaped.
fn short_hash(hash: &str) -> String {
    if !is_well_formed_hash(hash) {
        return "(not a hash)".to_string();
    }
    let head: String = hash.chars().take(12).collect();
    format!("{head}…")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_hash_truncates_digests() {
        let digest = "a".repeat(64);
        assert_eq!(short_hash(&digest), format!("{}…", "a".repeat(12)));
    }

    #[test]
    fn short_hash_flags_non_digests() {
        assert_eq!(short_hash("garbage"), "(not a hash)");
        assert_eq!(short_hash(&"A".repeat(64)), "(not a hash)");
    }
}
