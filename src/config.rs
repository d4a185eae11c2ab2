use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::gameweek::PickGate;

const CACHE_DIR: &str = "gameweek_scoring";
const DB_FILE: &str = "scoring.sqlite";

pub const DEFAULT_UNICORN_MIN_MEMBERS: usize = 0;

/// Caller-side scoring policy. The core computations stay structural; these
/// knobs only decide what the aggregators credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    /// Leagues smaller than this get no unicorn credit. 0 (the default)
    /// disables the floor.
    pub unicorn_min_members: usize,
    pub pick_gate: PickGate,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self::structural()
    }
}

impl ScoringPolicy {
    /// Unicorns count exactly as the evaluator reports them.
    pub fn structural() -> Self {
        Self {
            unicorn_min_members: DEFAULT_UNICORN_MIN_MEMBERS,
            pick_gate: PickGate::AllPicks,
        }
    }

    /// Withhold unicorn credit from leagues with fewer than `min_members`.
    pub fn with_unicorn_floor(self, min_members: usize) -> Self {
        Self {
            unicorn_min_members: min_members,
            ..self
        }
    }

    pub fn unicorns_count_for(&self, league_size: usize) -> bool {
        league_size >= self.unicorn_min_members
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub db_path: Option<PathBuf>,
    pub policy: ScoringPolicy,
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Missing or unparseable values fall back to
    /// the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let db_path = lookup("SCORING_DB_PATH")
            .filter(|val| !val.trim().is_empty())
            .map(PathBuf::from)
            .or_else(default_db_path);
        let unicorn_min_members = lookup("UNICORN_MIN_MEMBERS")
            .and_then(|val| val.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_UNICORN_MIN_MEMBERS);
        let pick_gate = match lookup("PICKS_REQUIRE_SUBMISSION") {
            Some(val) if parse_flag(&val) => PickGate::SubmittedOnly,
            _ => PickGate::AllPicks,
        };
        Self {
            db_path,
            policy: ScoringPolicy {
                unicorn_min_members,
                pick_gate,
            },
        }
    }
}

pub fn default_db_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join(DB_FILE))
}

pub fn app_cache_dir() -> Option<PathBuf> {
    // Prefer XDG cache.
    if let Ok(base) = env::var("XDG_CACHE_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join(CACHE_DIR));
    }
    let home = env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
