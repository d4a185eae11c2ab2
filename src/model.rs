use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub type UserId = String;

/// Home / Draw / Away. Used both for a pick's choice and a fixture's outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Outcome {
    #[serde(rename = "H")]
    Home,
    #[serde(rename = "D")]
    Draw,
    #[serde(rename = "A")]
    Away,
}

impl Outcome {
    pub fn from_code(raw: &str) -> Option<Self> {
        match raw.trim() {
            "H" | "h" => Some(Outcome::Home),
            "D" | "d" => Some(Outcome::Draw),
            "A" | "a" => Some(Outcome::Away),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Outcome::Home => "H",
            Outcome::Draw => "D",
            Outcome::Away => "A",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    pub gameweek: u32,
    pub fixture_index: u32,
    pub home_team: String,
    pub away_team: String,
    #[serde(default)]
    pub kickoff: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pick {
    pub user_id: UserId,
    pub gameweek: u32,
    pub fixture_index: u32,
    pub choice: Outcome,
}

/// A published result row. Older rows only carry goals, newer ones carry the
/// outcome directly; `outcome::resolve_outcome` reconciles the two.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub gameweek: u32,
    pub fixture_index: u32,
    #[serde(default, deserialize_with = "lenient_outcome")]
    pub outcome: Option<Outcome>,
    #[serde(default)]
    pub home_goals: Option<i32>,
    #[serde(default)]
    pub away_goals: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub user_id: UserId,
    pub gameweek: u32,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueMembership {
    pub league_id: String,
    pub user_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub user_id: UserId,
    pub name: String,
}

impl Member {
    pub fn new(user_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GwScore {
    pub score: u32,
    pub unicorns: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserGwScore {
    pub user_id: UserId,
    pub gameweek: u32,
    pub score: u32,
    pub unicorns: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormSymbol {
    W,
    D,
    L,
}

impl fmt::Display for FormSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FormSymbol::W => "W",
            FormSymbol::D => "D",
            FormSymbol::L => "L",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingsRow {
    pub user_id: UserId,
    pub name: String,
    pub points: u32,
    pub ocp: u32,
    pub unicorns: u32,
    pub wins: u32,
    pub draws: u32,
    // Oldest gameweek first.
    pub form: Vec<FormSymbol>,
}

impl StandingsRow {
    pub fn recent_form(&self, n: usize) -> &[FormSymbol] {
        let start = self.form.len().saturating_sub(n);
        &self.form[start..]
    }

    pub fn form_string(&self) -> String {
        self.form.iter().map(|s| s.to_string()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankDelta {
    Up,
    Down,
    Same,
    New,
}

impl RankDelta {
    pub fn arrow(self) -> &'static str {
        match self {
            RankDelta::Up => "▲",
            RankDelta::Down => "▼",
            RankDelta::Same => "=",
            RankDelta::New => "new",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardRow {
    pub user_id: UserId,
    pub name: String,
    pub ocp: u32,
    pub rank: usize,
    pub delta: RankDelta,
    pub this_gw: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormRow {
    pub user_id: UserId,
    pub name: String,
    pub form_points: u32,
}

// Anything other than H/D/A (null, "", legacy junk) reads as "no outcome" so the
// resolver can fall back to goals.
fn lenient_outcome<'de, D>(deserializer: D) -> Result<Option<Outcome>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(Outcome::from_code))
}
