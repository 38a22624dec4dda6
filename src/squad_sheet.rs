use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

use crate::teams::{ALL_TEAMS, TeamCode};

/// One data row of a team sheet. Consumed immediately by the merge step.
#[derive(Debug, Clone)]
pub struct RawSquadEntry {
    pub name: String,
    pub team: TeamCode,
    pub games: u32,
    pub is_primary: bool,
}

/// Reads every recognized team's sheet from `dir` (`<CODE>.csv` per team).
/// Teams without a sheet simply contribute no entries.
pub fn load_squads(dir: &Path) -> Result<BTreeMap<TeamCode, Vec<RawSquadEntry>>> {
    let mut out = BTreeMap::new();
    for team in ALL_TEAMS {
        let path = dir.join(format!("{}.csv", team.code()));
        if !path.exists() {
            continue;
        }
        let file =
            File::open(&path).with_context(|| format!("open squad sheet {}", path.display()))?;
        let entries = parse_sheet(team, file)
            .with_context(|| format!("parse squad sheet {}", path.display()))?;
        out.insert(team, entries);
    }
    Ok(out)
}

/// Scans a team sheet from row 3 onward, threading the active section
/// (primary squad vs fill-ins) through the rows as a fold. The sheet starts
/// in the primary section before any marker is seen.
///
/// Row shapes: col 1 ordinal/blank or a marker/legend label, col 2 player
/// name, col 3 games played (digits only honored, anything else counts 0).
pub fn parse_sheet<R: Read>(team: TeamCode, reader: R) -> Result<Vec<RawSquadEntry>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut entries = Vec::new();
    let mut is_primary = true;

    for (idx, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("read {} sheet row {}", team, idx + 1))?;
        // Rows 1-2 are header filler on every sheet.
        if idx < 2 {
            continue;
        }

        let first = record.get(0).unwrap_or("").trim();
        if !first.is_empty() {
            let upper = first.to_uppercase();
            if upper.contains("MAIN SQUAD") {
                is_primary = true;
                continue;
            }
            if upper.contains("FILL-IN") {
                is_primary = false;
                continue;
            }
            // Column-header and legend rows carry no player data.
            if first == "#" || first.contains("Green =") {
                continue;
            }
        }

        let name = record.get(1).unwrap_or("").trim();
        if name.is_empty() {
            continue;
        }

        entries.push(RawSquadEntry {
            name: name.to_string(),
            team,
            games: parse_games(record.get(2).unwrap_or("")),
            is_primary,
        });
    }
    Ok(entries)
}

fn parse_games(raw: &str) -> u32 {
    let trimmed = raw.trim();
    if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        trimmed.parse().unwrap_or(0)
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Vec<RawSquadEntry> {
        parse_sheet(TeamCode::PL, raw.as_bytes()).expect("sheet should parse")
    }

    const SHEET: &str = "Season status,,\n\
                         ,,\n\
                         MAIN SQUAD,,\n\
                         #,Player,2025 Games\n\
                         1,Jane Doe,10\n\
                         2,Amy Poe,n/a\n\
                         Green = confirmed,,\n\
                         FILL-INS,,\n\
                         1,Bob Roe,3\n";

    #[test]
    fn section_markers_toggle_primary_flag() {
        let entries = parse(SHEET);
        assert_eq!(entries.len(), 3);
        assert!(entries[0].is_primary);
        assert!(entries[1].is_primary);
        assert!(!entries[2].is_primary);
        assert_eq!(entries[2].name, "Bob Roe");
    }

    #[test]
    fn non_numeric_games_count_zero() {
        let entries = parse(SHEET);
        assert_eq!(entries[0].games, 10);
        assert_eq!(entries[1].games, 0);
    }

    #[test]
    fn sheet_without_markers_defaults_to_primary() {
        let entries = parse(",,\n,,\n1,Jane Doe,4\n2,Bob Roe,2\n");
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.is_primary));
    }

    #[test]
    fn header_rows_above_row_three_are_never_scanned() {
        // A name in row 2 is header filler, not a player.
        let entries = parse("x,Not A Player,9\n,,\n1,Jane Doe,1\n");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "Jane Doe");
    }

    #[test]
    fn load_squads_tolerates_missing_sheets() {
        let dir = std::env::temp_dir().join("clubroster_missing_sheets");
        std::fs::create_dir_all(&dir).expect("create temp dir");
        let squads = load_squads(&dir).expect("empty dir should load");
        assert!(squads.is_empty());
    }
}
