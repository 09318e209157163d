//! Replay a stored game and print its derived views.
//!
//! Usage: `scorebook <game.json> [catalog.json]`
//!
//! Without a catalog file the standard result codes are used.

use std::fs;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use scorebook_engine::catalog::ResultCatalog;
use scorebook_engine::engine::Engine;
use scorebook_engine::factory::describe_event;
use scorebook_engine::hashing::canonical_hash;
use scorebook_engine::inning::{next_half, should_transition};
use scorebook_engine::scoresheet::{LineScoreRow, ScoreSheet};
use scorebook_engine::{Game, TableCatalog};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(game_path) = args.first() else {
        bail!("usage: scorebook <game.json> [catalog.json]");
    };

    let catalog = match args.get(1) {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("reading catalog {}", path))?;
            TableCatalog::from_json(&raw).with_context(|| format!("parsing catalog {}", path))?
        }
        None => TableCatalog::standard(),
    };

    let raw = fs::read_to_string(game_path).with_context(|| format!("reading game {}", game_path))?;
    let mut game: Game =
        serde_json::from_str(&raw).with_context(|| format!("parsing game {}", game_path))?;
    if game.normalize_legacy() {
        info!(game_id = %game.id, "filled legacy my-team fields");
    }
    if let Err(e) = game.validate_setup() {
        warn!(game_id = %game.id, "setup problem: {}", e);
    }

    run(&game, Engine::new(catalog));
    Ok(())
}

fn run<C: ResultCatalog>(game: &Game, engine: Engine<C>) {
    let projection = engine.project_with_diagnostics(game);
    let state = &projection.state;

    println!(
        "{} vs {} ({}, {}) [{:?}]",
        game.away_team.name, game.home_team.name, game.date, game.venue, game.status
    );
    println!();

    for (i, event) in game.events.iter().enumerate() {
        let h = event.header();
        println!(
            "{:>4}  {:>6} {:<2}  {}",
            i + 1,
            h.half_inning.label(),
            h.inning,
            describe_event(game, event)
        );
    }
    println!();

    let sheet = ScoreSheet::build(game, state, engine.catalog());
    print_row(&sheet.line_score.away);
    print_row(&sheet.line_score.home);
    println!();

    println!(
        "{} {} - {} {} (opponent, as entered)",
        sheet.summary.my_team_name,
        sheet.summary.my_runs,
        sheet.summary.opponent_runs,
        sheet.summary.opponent_name
    );
    println!(
        "now: {} {}, {} out",
        state.half_inning.label(),
        state.inning,
        state.outs
    );
    if should_transition(state) && next_half(state, game).is_none() {
        println!("final inning complete");
    }
    println!();

    println!(
        "{:<3} {:<20} {:>3} {:>3} {:>3} {:>3} {:>3} {:>3} {:>5} {:>5} {:>5}",
        "#", "batter", "PA", "AB", "H", "HR", "RBI", "R", "AVG", "OBP", "SLG"
    );
    for b in &sheet.batting {
        println!(
            "{:<3} {:<20} {:>3} {:>3} {:>3} {:>3} {:>3} {:>3} {:>5} {:>5} {:>5}",
            b.order,
            b.player_name,
            b.plate_appearances,
            b.at_bats,
            b.hits,
            b.home_runs,
            b.rbi,
            b.runs,
            b.batting_average.to_string(),
            b.on_base_percentage.to_string(),
            b.slugging_percentage.to_string()
        );
    }
    println!();

    println!("{:<24} {:>5} {:>3} {:>3} {:>3} {:>3}", "pitcher", "IP", "H", "BB", "K", "R");
    for p in &sheet.pitching {
        println!(
            "{:<24} {:>5} {:>3} {:>3} {:>3} {:>3}",
            p.player_name,
            p.innings_pitched.to_string(),
            p.hits,
            p.walks,
            p.strikeouts,
            p.runs
        );
    }
    println!();

    if !projection.anomalies.is_empty() {
        println!("anomalies:");
        for a in &projection.anomalies {
            println!("  {}", a);
        }
        println!();
    }

    println!("state hash: {}", canonical_hash(state));
}

fn print_row(row: &LineScoreRow) {
    let cells: Vec<String> = row
        .innings
        .iter()
        .map(|c| c.map(|r| r.to_string()).unwrap_or_else(|| "-".to_string()))
        .collect();
    println!("{:<16} {}  | {}", row.team_name, cells.join(" "), row.total);
}
