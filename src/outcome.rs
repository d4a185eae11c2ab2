use crate::model::{MatchResult, Outcome};

/// The single authoritative outcome of a result row.
///
/// An explicit outcome wins; otherwise both goal counts must be present and are
/// compared. Anything else means the fixture is still undecided.
pub fn resolve_outcome(result: &MatchResult) -> Option<Outcome> {
    resolve_parts(result.outcome, result.home_goals, result.away_goals)
}

pub fn resolve_parts(
    outcome: Option<Outcome>,
    home_goals: Option<i32>,
    away_goals: Option<i32>,
) -> Option<Outcome> {
    if outcome.is_some() {
        return outcome;
    }
    let (Some(home), Some(away)) = (home_goals, away_goals) else {
        return None;
    };
    if home > away {
        Some(Outcome::Home)
    } else if home < away {
        Some(Outcome::Away)
    } else {
        Some(Outcome::Draw)
    }
}

impl MatchResult {
    pub fn resolved(&self) -> Option<Outcome> {
        resolve_outcome(self)
    }

    pub fn is_decided(&self) -> bool {
        self.resolved().is_some()
    }
}
