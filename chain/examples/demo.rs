//! Terminal walkthrough of the score ledger lifecycle.
//!
//! Records a handful of runs for two players, shows their histories,
//! tampers with a block in memory, and lets the verifier catch it.
//! Storytelling output, no files touched — everything runs against the
//! in-memory store.
//!
//! Run with:
//!   cargo run --example demo

use std::collections::BTreeMap;

use tally_chain::store::ChainStore;
use tally_chain::verify::{audit, broken_links};

// ---------------------------------------------------------------------------
// ANSI color constants
// ---------------------------------------------------------------------------

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";

fn heading(text: &str) {
    println!();
    println!("{BOLD}{CYAN}== {text} =={RESET}");
}

fn main() -> Result<(), tally_chain::ChainError> {
    println!("{BOLD}TALLY — tamper-evident score ledger, guided tour{RESET}");

    // -- 1. Record some runs ------------------------------------------------
    heading("Recording runs");
    let mut store = ChainStore::in_memory();

    let runs = [
        (Some("ada@example.com"), 1, 18.4, Some("Ada")),
        (Some("ada@example.com"), 2, 33.9, Some("Ada")),
        (Some("ada@example.com"), 3, 51.02, Some("Ada")),
        (Some("grace@example.com"), 1, 22.7, Some("Grace")),
        (None, 1, 12.0, None), // anonymous run, lands on __global__
    ];
    for (player, level, duration, name) in runs {
        let block = store.append(player, level, duration, name)?;
        println!(
            "  {} level {} in {}s  {DIM}hash {}…{RESET}",
            player.unwrap_or("(anonymous)"),
            level,
            duration,
            &block.hash[..12],
        );
    }

    // -- 2. Histories -------------------------------------------------------
    heading("Ada's history (newest first)");
    for block in store.history(Some("ada@example.com")) {
        println!(
            "  #{:<2} level {:<2} {:>7}s  {DIM}prev {}…{RESET}",
            block.id.unwrap_or(0),
            block.level,
            block.duration,
            &block.prev_hash[..12],
        );
    }

    heading("Roster");
    for p in store.player_summaries() {
        println!("  {:<20} best level {:<2} ({} runs)", p.name, p.max_level, p.runs);
    }

    // -- 3. Verification on the honest store --------------------------------
    heading("Verifying the untampered store");
    let clean: BTreeMap<_, _> = tally_chain::verify::verify_all(&store);
    for (player, altered) in &clean {
        let verdict = if altered.is_empty() {
            format!("{GREEN}intact{RESET}")
        } else {
            format!("{RED}altered at {altered:?}{RESET}")
        };
        println!("  {player:<20} {verdict}");
    }

    // -- 4. Tamper and get caught -------------------------------------------
    heading("Tampering with Ada's middle run");
    let mut chain = store.history(Some("ada@example.com"));
    println!("  editing block #2: level 2 → level 9, rehashing to cover tracks");
    chain[1].level = 9;
    chain[1].hash = chain[1].recompute_hash();

    let altered = broken_links(&chain);
    println!(
        "  link check: {YELLOW}broken at positions {altered:?}{RESET} (1-based, newest first)"
    );

    println!("  editing block #1 without rehashing (the lazy cheat)");
    chain[0].duration = 0.1;
    let report = audit(&chain);
    println!(
        "  content audit: {YELLOW}stored hash mismatch at {:?}{RESET}",
        report.hash_mismatches
    );
    assert!(!report.is_clean());

    println!();
    println!("{BOLD}{GREEN}Every edit left a seam. That's the whole point.{RESET}");
    Ok(())
}
