use std::collections::{BTreeMap, BTreeSet, HashMap};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::fixture_eval::evaluate_fixture;
use crate::model::{Fixture, GwScore, MatchResult, Outcome, Pick, UserGwScore, UserId};

/// Which picks count as live for scoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PickGate {
    #[default]
    AllPicks,
    /// Only picks from users who submitted the gameweek.
    SubmittedOnly,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameweekScorecard {
    pub gameweek: u32,
    /// Every population member, including those who picked nothing (0/0).
    pub scores: BTreeMap<UserId, GwScore>,
    /// Population members holding at least one pick on a known fixture.
    pub participants: BTreeSet<UserId>,
    pub resolved_fixtures: usize,
    /// Resolved fixtures that carry at least one pick from the population.
    pub contested_fixtures: usize,
}

impl GameweekScorecard {
    pub fn get(&self, user_id: &str) -> GwScore {
        self.scores.get(user_id).copied().unwrap_or_default()
    }

    pub fn has_entry(&self, user_id: &str) -> bool {
        self.resolved_fixtures > 0 && self.participants.contains(user_id)
    }

    pub fn user_scores(&self) -> Vec<UserGwScore> {
        self.scores
            .iter()
            .map(|(user_id, s)| UserGwScore {
                user_id: user_id.clone(),
                gameweek: self.gameweek,
                score: s.score,
                unicorns: s.unicorns,
            })
            .collect()
    }

    pub fn total_score(&self) -> u32 {
        self.scores.values().map(|s| s.score).sum()
    }
}

/// Decided fixtures of a gameweek keyed by fixture index. Results for unknown
/// fixtures are dropped; for repeated rows the last one wins, even when it no
/// longer resolves.
pub fn resolved_outcomes(
    gameweek: u32,
    fixtures: &[Fixture],
    results: &[MatchResult],
) -> BTreeMap<u32, Outcome> {
    let known: BTreeSet<u32> = fixtures
        .iter()
        .filter(|f| f.gameweek == gameweek)
        .map(|f| f.fixture_index)
        .collect();

    let mut latest = BTreeMap::new();
    for result in results {
        if result.gameweek == gameweek && known.contains(&result.fixture_index) {
            latest.insert(result.fixture_index, result.resolved());
        }
    }
    latest
        .into_iter()
        .filter_map(|(idx, outcome)| outcome.map(|o| (idx, o)))
        .collect()
}

/// Score one gameweek for an arbitrary population.
///
/// Rows belonging to other gameweeks are ignored, as are picks by users outside
/// the population and picks whose fixture does not exist. Fixtures without a
/// resolvable result contribute nothing. When a fixture has several result rows
/// the last one wins.
pub fn score_gameweek<'a, U, P>(
    gameweek: u32,
    population: U,
    fixtures: &[Fixture],
    results: &[MatchResult],
    picks: P,
) -> GameweekScorecard
where
    U: IntoIterator,
    U::Item: AsRef<str>,
    P: IntoIterator<Item = &'a Pick>,
{
    let mut scores: BTreeMap<UserId, GwScore> = population
        .into_iter()
        .map(|user| (user.as_ref().to_string(), GwScore::default()))
        .collect();

    let known: BTreeSet<u32> = fixtures
        .iter()
        .filter(|f| f.gameweek == gameweek)
        .map(|f| f.fixture_index)
        .collect();

    let outcomes = resolved_outcomes(gameweek, fixtures, results);

    let mut by_fixture: HashMap<u32, Vec<&'a Pick>> = HashMap::new();
    let mut participants = BTreeSet::new();
    let mut orphans = 0usize;
    for pick in picks {
        if pick.gameweek != gameweek {
            continue;
        }
        if !known.contains(&pick.fixture_index) {
            orphans += 1;
            continue;
        }
        if !scores.contains_key(&pick.user_id) {
            continue;
        }
        participants.insert(pick.user_id.clone());
        by_fixture.entry(pick.fixture_index).or_default().push(pick);
    }
    if orphans > 0 {
        debug!("gw {gameweek}: ignored {orphans} picks without a fixture");
    }

    let mut resolved_fixtures = 0usize;
    let mut contested_fixtures = 0usize;
    for (fixture_index, outcome) in outcomes {
        resolved_fixtures += 1;
        let fixture_picks = by_fixture.get(&fixture_index);
        if fixture_picks.is_some_and(|p| !p.is_empty()) {
            contested_fixtures += 1;
        }

        let verdict = evaluate_fixture(outcome, fixture_picks.into_iter().flatten().copied());
        for user in &verdict.correct {
            if let Some(entry) = scores.get_mut(user) {
                entry.score += 1;
            }
        }
        if let Some(owner) = verdict.unicorn_owner()
            && let Some(entry) = scores.get_mut(owner)
        {
            entry.unicorns += 1;
        }
    }

    debug!(
        "gw {gameweek}: {resolved_fixtures}/{} fixtures resolved, {} participants",
        known.len(),
        participants.len()
    );

    GameweekScorecard {
        gameweek,
        scores,
        participants,
        resolved_fixtures,
        contested_fixtures,
    }
}
