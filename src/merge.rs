use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::form_responses::FormResponse;
use crate::identity::normalize_name;
use crate::squad_sheet::RawSquadEntry;
use crate::teams::TeamCode;

/// A person's row on one team sheet, after grouping. `is_primary` is the
/// sheet's own section flag, before primary-team resolution.
#[derive(Debug, Clone, Copy)]
pub struct Appearance {
    pub team: TeamCode,
    pub games: u32,
    pub is_primary: bool,
}

/// One person unified across every team sheet they were listed on.
#[derive(Debug, Clone)]
pub struct MergedPerson {
    pub key: String,
    pub display_name: String,
    pub appearances: Vec<Appearance>,
}

/// Storage-facing appearance row. `is_main` tracks the resolved primary
/// team, not the sheet section the row came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AppearanceRecord {
    pub team: TeamCode,
    pub games: u32,
    pub is_main: bool,
}

/// The finished output unit handed to the store, never mutated afterwards.
#[derive(Debug, Clone)]
pub struct CanonicalPlayer {
    pub key: String,
    pub name: String,
    pub primary_team: TeamCode,
    pub response: Option<FormResponse>,
    pub appearances: Vec<AppearanceRecord>,
}

#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    pub players: Vec<CanonicalPlayer>,
    /// Display names of persons with no resolvable primary team, in input
    /// order. Reported, never fatal.
    pub skipped: Vec<String>,
}

/// Groups squad entries by normalized name across all teams. The first raw
/// spelling encountered becomes the display name; appearances accumulate in
/// team-then-row order. Persons come out in first-encounter order.
pub fn build_player_map(squads: &BTreeMap<TeamCode, Vec<RawSquadEntry>>) -> Vec<MergedPerson> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut persons: Vec<MergedPerson> = Vec::new();

    for entries in squads.values() {
        for entry in entries {
            let key = normalize_name(&entry.name);
            if key.is_empty() {
                continue;
            }
            let slot = *index.entry(key.clone()).or_insert_with(|| {
                persons.push(MergedPerson {
                    key,
                    display_name: entry.name.clone(),
                    appearances: Vec::new(),
                });
                persons.len() - 1
            });
            persons[slot].appearances.push(Appearance {
                team: entry.team,
                games: entry.games,
                is_primary: entry.is_primary,
            });
        }
    }
    persons
}

/// Picks the one team a player primarily belongs to: most games played wins,
/// games ties go to the higher grade. Only primary-squad appearances are
/// considered unless the player has none, in which case fill-in appearances
/// count too. `None` only when the player has no appearances at all.
pub fn resolve_primary_team(appearances: &[Appearance]) -> Option<TeamCode> {
    let primary: Vec<&Appearance> = appearances.iter().filter(|a| a.is_primary).collect();
    let pool: Vec<&Appearance> = if primary.is_empty() {
        appearances.iter().collect()
    } else {
        primary
    };
    pool.into_iter()
        .max_by_key(|a| (a.games, a.team.grade()))
        .map(|a| a.team)
}

/// Joins each resolved person with their form response (absence is fine) and
/// emits the canonical record. Exactly one appearance per player carries
/// `is_main = true`, the one on the resolved primary team, even when the
/// sheet listed that player under a fill-in section there.
pub fn assemble_players(
    persons: Vec<MergedPerson>,
    responses: &HashMap<String, FormResponse>,
) -> MergeOutcome {
    let mut outcome = MergeOutcome::default();
    for person in persons {
        let Some(primary_team) = resolve_primary_team(&person.appearances) else {
            outcome.skipped.push(person.display_name);
            continue;
        };

        let mut main_marked = false;
        let appearances = person
            .appearances
            .iter()
            .map(|a| {
                let is_main = !main_marked && a.team == primary_team;
                main_marked |= is_main;
                AppearanceRecord {
                    team: a.team,
                    games: a.games,
                    is_main,
                }
            })
            .collect();

        outcome.players.push(CanonicalPlayer {
            response: responses.get(&person.key).cloned(),
            key: person.key,
            name: person.display_name,
            primary_team,
            appearances,
        });
    }
    outcome
}
