use std::collections::{BTreeMap, HashSet};

use anyhow::{Context, Result};
use log::info;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::gameweek::{GameweekScorecard, PickGate, resolved_outcomes, score_gameweek};
use crate::model::{Fixture, MatchResult, Pick, Submission, UserId};
use crate::store::ScoringFeed;

/// Everything needed to score one gameweek.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameweekData {
    pub gameweek: u32,
    #[serde(default)]
    pub fixtures: Vec<Fixture>,
    #[serde(default)]
    pub results: Vec<MatchResult>,
    #[serde(default)]
    pub picks: Vec<Pick>,
    #[serde(default)]
    pub submissions: Vec<Submission>,
}

impl GameweekData {
    pub fn new(gameweek: u32) -> Self {
        Self {
            gameweek,
            ..Self::default()
        }
    }

    pub fn has_resolved_result(&self) -> bool {
        !resolved_outcomes(self.gameweek, &self.fixtures, &self.results).is_empty()
    }

    pub fn live_picks(&self, gate: PickGate) -> Vec<&Pick> {
        match gate {
            PickGate::AllPicks => self.picks.iter().collect(),
            PickGate::SubmittedOnly => {
                let submitted: HashSet<&str> = self
                    .submissions
                    .iter()
                    .filter(|s| s.gameweek == self.gameweek)
                    .map(|s| s.user_id.as_str())
                    .collect();
                self.picks
                    .iter()
                    .filter(|p| submitted.contains(p.user_id.as_str()))
                    .collect()
            }
        }
    }

    pub fn score<U>(&self, population: U, gate: PickGate) -> GameweekScorecard
    where
        U: IntoIterator,
        U::Item: AsRef<str>,
    {
        score_gameweek(
            self.gameweek,
            population,
            &self.fixtures,
            &self.results,
            self.live_picks(gate),
        )
    }

    fn absorb(&mut self, other: GameweekData) {
        self.fixtures.extend(other.fixtures);
        self.results.extend(other.results);
        self.picks.extend(other.picks);
        self.submissions.extend(other.submissions);
    }
}

#[derive(Deserialize)]
struct SeasonDataSerde {
    #[serde(default)]
    gameweeks: Vec<GameweekData>,
}

/// All gameweeks of a season, kept sorted by gameweek number with one entry
/// per gameweek.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SeasonDataSerde")]
pub struct SeasonData {
    gameweeks: Vec<GameweekData>,
}

impl From<SeasonDataSerde> for SeasonData {
    fn from(raw: SeasonDataSerde) -> Self {
        SeasonData::new(raw.gameweeks)
    }
}

impl SeasonData {
    pub fn new(gameweeks: Vec<GameweekData>) -> Self {
        let mut merged: BTreeMap<u32, GameweekData> = BTreeMap::new();
        for gw in gameweeks {
            match merged.get_mut(&gw.gameweek) {
                Some(existing) => existing.absorb(gw),
                None => {
                    merged.insert(gw.gameweek, gw);
                }
            }
        }
        Self {
            gameweeks: merged.into_values().collect(),
        }
    }

    pub fn gameweeks(&self) -> &[GameweekData] {
        &self.gameweeks
    }

    /// Gameweeks with at least one decided fixture, ascending.
    pub fn resolved_gameweeks(&self) -> Vec<&GameweekData> {
        self.gameweeks
            .iter()
            .filter(|gw| gw.has_resolved_result())
            .collect()
    }

    /// Highest gameweek with a decided fixture.
    pub fn latest_gameweek(&self) -> Option<u32> {
        self.gameweeks
            .iter()
            .rev()
            .find(|gw| gw.has_resolved_result())
            .map(|gw| gw.gameweek)
    }
}

/// Per-gameweek scorecards for one population over every resolved gameweek.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeasonScores {
    pub gameweeks: BTreeMap<u32, GameweekScorecard>,
}

impl SeasonScores {
    pub fn latest(&self) -> Option<u32> {
        self.gameweeks.keys().next_back().copied()
    }

    pub fn get(&self, gameweek: u32) -> Option<&GameweekScorecard> {
        self.gameweeks.get(&gameweek)
    }

    pub fn has_entry(&self, user_id: &str, gameweek: u32) -> bool {
        self.get(gameweek).is_some_and(|card| card.has_entry(user_id))
    }

    /// Season OCP through `last` inclusive, for users with at least one entry
    /// in that range.
    pub fn ocp_through(&self, last: u32) -> BTreeMap<UserId, u32> {
        let mut out: BTreeMap<UserId, u32> = BTreeMap::new();
        for card in self.gameweeks.range(..=last).map(|(_, card)| card) {
            if card.resolved_fixtures == 0 {
                continue;
            }
            for user in &card.participants {
                *out.entry(user.clone()).or_insert(0) += card.get(user).score;
            }
        }
        out
    }
}

/// Score every resolved gameweek for `population`, one rayon task per gameweek.
pub fn score_season(season: &SeasonData, population: &[UserId], gate: PickGate) -> SeasonScores {
    let gameweeks = season
        .resolved_gameweeks()
        .par_iter()
        .map(|gw| (gw.gameweek, gw.score(population, gate)))
        .collect::<BTreeMap<_, _>>();
    SeasonScores { gameweeks }
}

/// Pull every gameweek up to the latest one with a published result.
/// `users` narrows the pick query to a population (e.g. one league).
pub fn load_season(feed: &dyn ScoringFeed, users: Option<&[UserId]>) -> Result<SeasonData> {
    let Some(latest) = feed
        .latest_result_gameweek()
        .context("discover latest gameweek")?
    else {
        info!("no results published yet");
        return Ok(SeasonData::default());
    };

    let mut gameweeks = Vec::new();
    for gw in 1..=latest {
        let fixtures = feed
            .fixtures(gw)
            .with_context(|| format!("load fixtures for gw {gw}"))?;
        if fixtures.is_empty() {
            continue;
        }
        let results = feed
            .results(Some(gw))
            .with_context(|| format!("load results for gw {gw}"))?;
        let picks = feed
            .picks(gw, users)
            .with_context(|| format!("load picks for gw {gw}"))?;
        let submissions = feed
            .submissions(gw)
            .with_context(|| format!("load submissions for gw {gw}"))?;
        gameweeks.push(GameweekData {
            gameweek: gw,
            fixtures,
            results,
            picks,
            submissions,
        });
    }

    let season = SeasonData::new(gameweeks);
    info!(
        "loaded {} gameweeks (latest with results: {latest})",
        season.gameweeks().len()
    );
    Ok(season)
}
