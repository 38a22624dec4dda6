use std::path::PathBuf;

use anyhow::{Context, Result};

use clubroster::{form_responses, merge, squad_sheet, store};

fn main() -> Result<()> {
    let squads_dir = parse_path_arg("--squads").context("missing --squads DIR argument")?;
    let responses_path =
        parse_path_arg("--responses").context("missing --responses FILE argument")?;
    let db_path = parse_path_arg("--db").unwrap_or_else(|| PathBuf::from("players.db"));

    // Both sources are read to completion before anything touches the db, so
    // a structural source failure can never leave a partial batch behind.
    let responses = form_responses::load_responses(&responses_path)?;
    let squads = squad_sheet::load_squads(&squads_dir)?;

    let persons = merge::build_player_map(&squads);
    let outcome = merge::assemble_players(persons, &responses);
    for name in &outcome.skipped {
        println!("  SKIP (no primary team): {name}");
    }

    let mut conn = store::open_db(&db_path)?;
    let summary = store::seed_players(&mut conn, &outcome)?;

    println!("Roster seed complete");
    println!("DB: {}", db_path.display());
    println!("Teams with sheets: {}", squads.len());
    println!("Form responses matched against: {}", responses.len());
    println!("Players inserted: {}", summary.players_inserted);
    println!("Appearances inserted: {}", summary.appearances_inserted);
    if !summary.skipped.is_empty() {
        println!("Skipped (no primary team): {}", summary.skipped.len());
    }

    Ok(())
}

fn parse_path_arg(flag: &str) -> Option<PathBuf> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(path) = arg.strip_prefix(&prefix) {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        if arg == flag
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(PathBuf::from(next));
        }
    }
    None
}
