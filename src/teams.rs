use std::fmt;

use serde::{Deserialize, Serialize};

/// Competitive squad tiers, highest grade first. The seeder only ever looks for
/// sheets named after these codes; anything else in the source directory is
/// ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TeamCode {
    PL,
    PLR,
    PB,
    PC,
    PE,
    Metro,
}

pub const ALL_TEAMS: [TeamCode; 6] = [
    TeamCode::PL,
    TeamCode::PLR,
    TeamCode::PB,
    TeamCode::PC,
    TeamCode::PE,
    TeamCode::Metro,
];

impl TeamCode {
    pub fn code(self) -> &'static str {
        match self {
            TeamCode::PL => "PL",
            TeamCode::PLR => "PLR",
            TeamCode::PB => "PB",
            TeamCode::PC => "PC",
            TeamCode::PE => "PE",
            TeamCode::Metro => "Metro",
        }
    }

    pub fn parse(raw: &str) -> Option<TeamCode> {
        ALL_TEAMS
            .into_iter()
            .find(|t| t.code().eq_ignore_ascii_case(raw.trim()))
    }

    /// Grade rank used only to break games-count ties when resolving a
    /// player's primary team. Higher is a higher grade.
    pub fn grade(self) -> u8 {
        match self {
            TeamCode::Metro => 0,
            TeamCode::PE => 1,
            TeamCode::PC => 2,
            TeamCode::PB => 3,
            TeamCode::PLR => 4,
            TeamCode::PL => 5,
        }
    }
}

impl fmt::Display for TeamCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
