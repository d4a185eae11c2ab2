use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::warn;
use rusqlite::types::Value;
use rusqlite::{Connection, params, params_from_iter};

use crate::model::{Fixture, MatchResult, Member, Outcome, Pick, Submission, UserId};
use crate::outcome::resolve_parts;

/// Read side of the relational store. Every query is a plain equality filter
/// on gameweek and/or user/league identifiers.
pub trait ScoringFeed {
    fn fixtures(&self, gameweek: u32) -> Result<Vec<Fixture>>;
    fn results(&self, gameweek: Option<u32>) -> Result<Vec<MatchResult>>;
    /// Highest gameweek holding a result for a known fixture that resolves to
    /// H/D/A.
    fn latest_result_gameweek(&self) -> Result<Option<u32>>;
    fn picks(&self, gameweek: u32, user_ids: Option<&[UserId]>) -> Result<Vec<Pick>>;
    fn submissions(&self, gameweek: u32) -> Result<Vec<Submission>>;
    fn league_members(&self, league_id: &str) -> Result<Vec<Member>>;
    fn users(&self) -> Result<Vec<Member>>;
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let conn =
            Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory sqlite db")?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn upsert_user(&self, member: &Member) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO users (user_id, name) VALUES (?1, ?2)
                 ON CONFLICT(user_id) DO UPDATE SET name = excluded.name",
                params![member.user_id, member.name],
            )
            .with_context(|| format!("upsert user {}", member.user_id))?;
        Ok(())
    }

    pub fn upsert_league(&self, league_id: &str, name: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO leagues (league_id, name) VALUES (?1, ?2)
                 ON CONFLICT(league_id) DO UPDATE SET name = excluded.name",
                params![league_id, name],
            )
            .with_context(|| format!("upsert league {league_id}"))?;
        Ok(())
    }

    pub fn add_league_member(&self, league_id: &str, user_id: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT OR IGNORE INTO league_members (league_id, user_id) VALUES (?1, ?2)",
                params![league_id, user_id],
            )
            .with_context(|| format!("add {user_id} to league {league_id}"))?;
        Ok(())
    }

    pub fn remove_league_member(&self, league_id: &str, user_id: &str) -> Result<()> {
        self.conn
            .execute(
                "DELETE FROM league_members WHERE league_id = ?1 AND user_id = ?2",
                params![league_id, user_id],
            )
            .with_context(|| format!("remove {user_id} from league {league_id}"))?;
        Ok(())
    }

    pub fn upsert_fixture(&self, fixture: &Fixture) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO fixtures (gameweek, fixture_index, home_team, away_team, kickoff)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(gameweek, fixture_index) DO UPDATE SET
                    home_team = excluded.home_team,
                    away_team = excluded.away_team,
                    kickoff = excluded.kickoff",
                params![
                    fixture.gameweek,
                    fixture.fixture_index,
                    fixture.home_team,
                    fixture.away_team,
                    fixture.kickoff.map(|t| t.to_rfc3339()),
                ],
            )
            .with_context(|| {
                format!(
                    "upsert fixture gw {} #{}",
                    fixture.gameweek, fixture.fixture_index
                )
            })?;
        Ok(())
    }

    pub fn upsert_pick(&self, pick: &Pick) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO picks (user_id, gameweek, fixture_index, choice)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(user_id, gameweek, fixture_index) DO UPDATE SET choice = excluded.choice",
                params![
                    pick.user_id,
                    pick.gameweek,
                    pick.fixture_index,
                    pick.choice.code()
                ],
            )
            .with_context(|| format!("upsert pick for {} gw {}", pick.user_id, pick.gameweek))?;
        Ok(())
    }

    pub fn upsert_result(&self, result: &MatchResult) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO results (gameweek, fixture_index, outcome, home_goals, away_goals)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(gameweek, fixture_index) DO UPDATE SET
                    outcome = excluded.outcome,
                    home_goals = excluded.home_goals,
                    away_goals = excluded.away_goals",
                params![
                    result.gameweek,
                    result.fixture_index,
                    result.outcome.map(Outcome::code),
                    result.home_goals,
                    result.away_goals,
                ],
            )
            .with_context(|| {
                format!(
                    "upsert result gw {} #{}",
                    result.gameweek, result.fixture_index
                )
            })?;
        Ok(())
    }

    pub fn upsert_submission(&self, submission: &Submission) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO submissions (user_id, gameweek, submitted_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(user_id, gameweek) DO UPDATE SET submitted_at = excluded.submitted_at",
                params![
                    submission.user_id,
                    submission.gameweek,
                    submission.submitted_at.map(|t| t.to_rfc3339()),
                ],
            )
            .with_context(|| {
                format!(
                    "upsert submission for {} gw {}",
                    submission.user_id, submission.gameweek
                )
            })?;
        Ok(())
    }

    /// Run `f` inside one transaction; used for bulk seeding.
    pub fn in_transaction<T>(&mut self, f: impl FnOnce(&SqliteStore) -> Result<T>) -> Result<T> {
        self.conn
            .execute_batch("BEGIN")
            .context("begin transaction")?;
        match f(self) {
            Ok(value) => {
                self.conn
                    .execute_batch("COMMIT")
                    .context("commit transaction")?;
                Ok(value)
            }
            Err(err) => {
                let _ = self.conn.execute_batch("ROLLBACK");
                Err(err)
            }
        }
    }
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            user_id TEXT PRIMARY KEY,
            name TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS leagues (
            league_id TEXT PRIMARY KEY,
            name TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS league_members (
            league_id TEXT NOT NULL,
            user_id TEXT NOT NULL,
            PRIMARY KEY (league_id, user_id)
        );
        CREATE TABLE IF NOT EXISTS fixtures (
            gameweek INTEGER NOT NULL,
            fixture_index INTEGER NOT NULL,
            home_team TEXT NOT NULL,
            away_team TEXT NOT NULL,
            kickoff TEXT NULL,
            PRIMARY KEY (gameweek, fixture_index)
        );
        CREATE TABLE IF NOT EXISTS picks (
            user_id TEXT NOT NULL,
            gameweek INTEGER NOT NULL,
            fixture_index INTEGER NOT NULL,
            choice TEXT NOT NULL,
            PRIMARY KEY (user_id, gameweek, fixture_index)
        );
        CREATE TABLE IF NOT EXISTS results (
            gameweek INTEGER NOT NULL,
            fixture_index INTEGER NOT NULL,
            outcome TEXT NULL,
            home_goals INTEGER NULL,
            away_goals INTEGER NULL,
            PRIMARY KEY (gameweek, fixture_index)
        );
        CREATE TABLE IF NOT EXISTS submissions (
            user_id TEXT NOT NULL,
            gameweek INTEGER NOT NULL,
            submitted_at TEXT NULL,
            PRIMARY KEY (user_id, gameweek)
        );
        CREATE INDEX IF NOT EXISTS idx_picks_gameweek ON picks(gameweek);
        CREATE INDEX IF NOT EXISTS idx_results_gameweek ON results(gameweek);
        CREATE INDEX IF NOT EXISTS idx_league_members_user ON league_members(user_id);
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

impl ScoringFeed for SqliteStore {
    fn fixtures(&self, gameweek: u32) -> Result<Vec<Fixture>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT gameweek, fixture_index, home_team, away_team, kickoff
                 FROM fixtures WHERE gameweek = ?1 ORDER BY fixture_index",
            )
            .context("prepare fixtures query")?;
        let rows = stmt
            .query_map(params![gameweek], |row| {
                let kickoff: Option<String> = row.get(4)?;
                Ok(Fixture {
                    gameweek: row.get(0)?,
                    fixture_index: row.get(1)?,
                    home_team: row.get(2)?,
                    away_team: row.get(3)?,
                    kickoff: kickoff.as_deref().and_then(parse_timestamp),
                })
            })
            .context("query fixtures")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("read fixture rows")?;
        Ok(rows)
    }

    fn results(&self, gameweek: Option<u32>) -> Result<Vec<MatchResult>> {
        let sql = match gameweek {
            Some(_) => {
                "SELECT gameweek, fixture_index, outcome, home_goals, away_goals
                 FROM results WHERE gameweek = ?1 ORDER BY fixture_index"
            }
            None => {
                "SELECT gameweek, fixture_index, outcome, home_goals, away_goals
                 FROM results ORDER BY gameweek, fixture_index"
            }
        };
        let mut stmt = self.conn.prepare(sql).context("prepare results query")?;
        let map_row = |row: &rusqlite::Row<'_>| -> rusqlite::Result<MatchResult> {
            let outcome: Option<String> = row.get(2)?;
            Ok(MatchResult {
                gameweek: row.get(0)?,
                fixture_index: row.get(1)?,
                outcome: outcome.as_deref().and_then(Outcome::from_code),
                home_goals: row.get(3)?,
                away_goals: row.get(4)?,
            })
        };
        let rows = match gameweek {
            Some(gw) => stmt.query_map(params![gw], map_row),
            None => stmt.query_map([], map_row),
        }
        .context("query results")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("read result rows")?;
        Ok(rows)
    }

    fn latest_result_gameweek(&self) -> Result<Option<u32>> {
        // Same rule as the scorer: the fixture must exist, then outcome first,
        // then a full pair of goals.
        let mut stmt = self
            .conn
            .prepare(
                "SELECT DISTINCT r.gameweek, r.outcome, r.home_goals, r.away_goals
                 FROM results r
                 JOIN fixtures f
                   ON f.gameweek = r.gameweek AND f.fixture_index = r.fixture_index
                 ORDER BY r.gameweek DESC",
            )
            .context("prepare latest gameweek query")?;
        let mut rows = stmt.query([]).context("query latest gameweek")?;
        while let Some(row) = rows.next().context("read latest gameweek row")? {
            let gameweek: u32 = row.get(0)?;
            let outcome: Option<String> = row.get(1)?;
            let home: Option<i32> = row.get(2)?;
            let away: Option<i32> = row.get(3)?;
            let outcome = outcome.as_deref().and_then(Outcome::from_code);
            if resolve_parts(outcome, home, away).is_some() {
                return Ok(Some(gameweek));
            }
        }
        Ok(None)
    }

    fn picks(&self, gameweek: u32, user_ids: Option<&[UserId]>) -> Result<Vec<Pick>> {
        let mut sql = String::from(
            "SELECT user_id, gameweek, fixture_index, choice FROM picks WHERE gameweek = ?",
        );
        let mut values = vec![Value::Integer(i64::from(gameweek))];
        if let Some(ids) = user_ids {
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            let placeholders = vec!["?"; ids.len()].join(", ");
            sql.push_str(&format!(" AND user_id IN ({placeholders})"));
            values.extend(ids.iter().map(|id| Value::Text(id.clone())));
        }
        sql.push_str(" ORDER BY user_id, fixture_index");

        let mut stmt = self.conn.prepare(&sql).context("prepare picks query")?;
        let raw = stmt
            .query_map(params_from_iter(values.iter()), |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, u32>(1)?,
                    row.get::<_, u32>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })
            .context("query picks")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("read pick rows")?;

        let mut out = Vec::with_capacity(raw.len());
        for (user_id, gameweek, fixture_index, choice) in raw {
            let Some(choice) = Outcome::from_code(&choice) else {
                warn!("skipping pick with unknown choice {choice:?} ({user_id}, gw {gameweek} #{fixture_index})");
                continue;
            };
            out.push(Pick {
                user_id,
                gameweek,
                fixture_index,
                choice,
            });
        }
        Ok(out)
    }

    fn submissions(&self, gameweek: u32) -> Result<Vec<Submission>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT user_id, gameweek, submitted_at FROM submissions
                 WHERE gameweek = ?1 ORDER BY user_id",
            )
            .context("prepare submissions query")?;
        let rows = stmt
            .query_map(params![gameweek], |row| {
                let submitted_at: Option<String> = row.get(2)?;
                Ok(Submission {
                    user_id: row.get(0)?,
                    gameweek: row.get(1)?,
                    submitted_at: submitted_at.as_deref().and_then(parse_timestamp),
                })
            })
            .context("query submissions")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("read submission rows")?;
        Ok(rows)
    }

    fn league_members(&self, league_id: &str) -> Result<Vec<Member>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT u.user_id, u.name FROM league_members m
                 JOIN users u ON u.user_id = m.user_id
                 WHERE m.league_id = ?1 ORDER BY u.name, u.user_id",
            )
            .context("prepare league members query")?;
        let rows = stmt
            .query_map(params![league_id], |row| {
                Ok(Member {
                    user_id: row.get(0)?,
                    name: row.get(1)?,
                })
            })
            .with_context(|| format!("query members of league {league_id}"))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("read league member rows")?;
        Ok(rows)
    }

    fn users(&self) -> Result<Vec<Member>> {
        let mut stmt = self
            .conn
            .prepare("SELECT user_id, name FROM users ORDER BY name, user_id")
            .context("prepare users query")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Member {
                    user_id: row.get(0)?,
                    name: row.get(1)?,
                })
            })
            .context("query users")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("read user rows")?;
        Ok(rows)
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|t| t.with_timezone(&Utc))
}
