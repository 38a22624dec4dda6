use std::path::Path;

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use rusqlite::{Connection, params};

use crate::merge::{AppearanceRecord, MergeOutcome};
use crate::teams::TeamCode;

/// Handoff boundary to the player store. The seeder writes one batch per run;
/// the CRUD layer that serves these rows lives elsewhere and reads them
/// unchanged.
#[derive(Debug, Clone)]
pub struct SeedSummary {
    pub players_inserted: usize,
    pub appearances_inserted: usize,
    pub skipped: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct StoredPlayer {
    pub id: i64,
    pub name: String,
    pub main_team: TeamCode,
    pub status: String,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub submitted_at: Option<String>,
    pub appearances: Vec<AppearanceRecord>,
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .context("enable foreign keys")?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS players (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            name          TEXT NOT NULL,
            main_team     TEXT NOT NULL,
            status        TEXT NOT NULL DEFAULT 'Not heard from',
            notes         TEXT NOT NULL DEFAULT '',
            email         TEXT NULL,
            mobile        TEXT NULL,
            submitted_at  TEXT NULL,
            answers_json  TEXT NULL,
            created_at    TEXT DEFAULT (datetime('now')),
            updated_at    TEXT DEFAULT (datetime('now'))
        );
        CREATE TABLE IF NOT EXISTS squad_appearances (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            player_id  INTEGER NOT NULL,
            team       TEXT NOT NULL,
            games      INTEGER NOT NULL DEFAULT 0,
            is_main    INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY (player_id) REFERENCES players(id) ON DELETE CASCADE,
            UNIQUE(player_id, team)
        );
        CREATE INDEX IF NOT EXISTS idx_appearances_team ON squad_appearances(team);

        CREATE TABLE IF NOT EXISTS seed_runs (
            run_id                INTEGER PRIMARY KEY AUTOINCREMENT,
            started_at            TEXT NOT NULL,
            finished_at           TEXT NOT NULL,
            players_inserted      INTEGER NOT NULL,
            appearances_inserted  INTEGER NOT NULL,
            skipped_json          TEXT NOT NULL
        );
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

/// Replaces the store's contents with one merge batch. Runs inside a single
/// transaction: either every player and appearance row lands together with
/// the run record, or nothing does.
pub fn seed_players(conn: &mut Connection, outcome: &MergeOutcome) -> Result<SeedSummary> {
    let started_at = Utc::now().to_rfc3339();
    let tx = conn.transaction().context("begin seed transaction")?;

    tx.execute("DELETE FROM squad_appearances", [])
        .context("wipe squad appearances")?;
    tx.execute("DELETE FROM players", [])
        .context("wipe players")?;

    let mut appearances_inserted = 0usize;
    for player in &outcome.players {
        let response = player.response.as_ref();
        let answers_json = response
            .map(|r| serde_json::to_string(&r.answers))
            .transpose()
            .with_context(|| format!("serialize answers for {}", player.name))?;
        tx.execute(
            "INSERT INTO players (name, main_team, email, mobile, submitted_at, answers_json)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                player.name,
                player.primary_team.code(),
                response.and_then(|r| r.email()),
                response.and_then(|r| r.mobile_digits()),
                response.map(|r| r.submitted_at.as_str()),
                answers_json,
            ],
        )
        .with_context(|| format!("insert player {}", player.name))?;
        let player_id = tx.last_insert_rowid();

        for app in &player.appearances {
            tx.execute(
                "INSERT INTO squad_appearances (player_id, team, games, is_main)
                 VALUES (?1, ?2, ?3, ?4)",
                params![player_id, app.team.code(), app.games, app.is_main as i64],
            )
            .with_context(|| format!("insert appearance {} / {}", player.name, app.team))?;
            appearances_inserted += 1;
        }
    }

    let skipped_json =
        serde_json::to_string(&outcome.skipped).unwrap_or_else(|_| "[]".to_string());
    let finished_at = Utc::now().to_rfc3339();
    tx.execute(
        "INSERT INTO seed_runs (started_at, finished_at, players_inserted, appearances_inserted, skipped_json)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            started_at,
            finished_at,
            outcome.players.len() as i64,
            appearances_inserted as i64,
            skipped_json,
        ],
    )
    .context("record seed run")?;

    tx.commit().context("commit seed transaction")?;
    Ok(SeedSummary {
        players_inserted: outcome.players.len(),
        appearances_inserted,
        skipped: outcome.skipped.clone(),
    })
}

/// Reads the store back, appearances ordered by games descending the way the
/// serving layer lists them.
pub fn load_players(conn: &Connection) -> Result<Vec<StoredPlayer>> {
    let mut stmt = stmt_players(conn)?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, Option<String>>(5)?,
                row.get::<_, Option<String>>(6)?,
            ))
        })
        .context("query players")?;

    let mut out = Vec::new();
    for row in rows {
        let (id, name, main_team, status, email, mobile, submitted_at) =
            row.context("decode player row")?;
        let main_team = TeamCode::parse(&main_team)
            .ok_or_else(|| anyhow!("unknown team code {main_team} stored for player {name}"))?;
        out.push(StoredPlayer {
            id,
            name,
            main_team,
            status,
            email,
            mobile,
            submitted_at,
            appearances: load_appearances(conn, id)?,
        });
    }
    Ok(out)
}

fn stmt_players(conn: &Connection) -> Result<rusqlite::Statement<'_>> {
    conn.prepare(
        "SELECT id, name, main_team, status, email, mobile, submitted_at
         FROM players ORDER BY name ASC",
    )
    .context("prepare player query")
}

fn load_appearances(conn: &Connection, player_id: i64) -> Result<Vec<AppearanceRecord>> {
    let mut stmt = conn
        .prepare(
            "SELECT team, games, is_main FROM squad_appearances
             WHERE player_id = ?1 ORDER BY games DESC",
        )
        .context("prepare appearance query")?;
    let rows = stmt
        .query_map(params![player_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, u32>(1)?,
                row.get::<_, i64>(2)? != 0,
            ))
        })
        .context("query appearances")?;

    let mut out = Vec::new();
    for row in rows {
        let (team, games, is_main) = row.context("decode appearance row")?;
        let team = TeamCode::parse(&team)
            .ok_or_else(|| anyhow!("unknown team code {team} in appearance row"))?;
        out.push(AppearanceRecord {
            team,
            games,
            is_main,
        });
    }
    Ok(out)
}
