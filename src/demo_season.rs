use chrono::{Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::model::{Fixture, LeagueMembership, MatchResult, Member, Outcome, Pick, Submission};
use crate::outcome::resolve_parts;
use crate::season::{GameweekData, SeasonData};

const TEAMS: &[&str] = &[
    "ARS", "AVL", "BOU", "BRE", "BHA", "BUR", "CHE", "CRY", "EVE", "FUL", "LEE", "LIV", "MCI",
    "MUN", "NEW", "NFO", "SUN", "TOT", "WHU", "WOL",
];

const FIRST_NAMES: &[&str] = &[
    "Alex", "Sam", "Jordan", "Charlie", "Robin", "Jamie", "Morgan", "Casey", "Riley", "Taylor",
    "Avery", "Quinn", "Rowan", "Sasha", "Kai", "Noor",
];

#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub seed: u64,
    pub users: usize,
    /// Gameweeks with published results.
    pub gameweeks: u32,
    pub fixtures_per_gameweek: u32,
    pub leagues: usize,
    pub league_size: usize,
    /// Chance a user plays any given gameweek.
    pub participation: f64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            seed: 26,
            users: 40,
            gameweeks: 12,
            fixtures_per_gameweek: 10,
            leagues: 4,
            league_size: 8,
            participation: 0.85,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DemoLeague {
    pub league_id: String,
    pub name: String,
    pub members: Vec<Member>,
}

impl DemoLeague {
    pub fn memberships(&self) -> Vec<LeagueMembership> {
        self.members
            .iter()
            .map(|m| LeagueMembership {
                league_id: self.league_id.clone(),
                user_id: m.user_id.clone(),
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct DemoSeason {
    pub users: Vec<Member>,
    pub leagues: Vec<DemoLeague>,
    pub season: SeasonData,
}

/// Deterministic synthetic season. Odd gameweeks publish goals only (legacy
/// rows), even ones publish the outcome only; one extra gameweek is left
/// undecided.
pub fn generate(cfg: &DemoConfig) -> DemoSeason {
    let mut rng = StdRng::seed_from_u64(cfg.seed);

    let users: Vec<Member> = (0..cfg.users)
        .map(|idx| {
            let first = FIRST_NAMES[idx % FIRST_NAMES.len()];
            let round = idx / FIRST_NAMES.len() + 1;
            Member::new(format!("u{:03}", idx + 1), format!("{first} {round}"))
        })
        .collect();

    let leagues: Vec<DemoLeague> = (0..cfg.leagues)
        .map(|idx| {
            let mut members = Vec::new();
            for user in &users {
                if members.len() >= cfg.league_size {
                    break;
                }
                if rng.gen_bool(0.5) {
                    members.push(user.clone());
                }
            }
            DemoLeague {
                league_id: format!("L{}", idx + 1),
                name: format!("Mini League {}", idx + 1),
                members,
            }
        })
        .collect();

    let season_start = Utc
        .with_ymd_and_hms(2025, 8, 16, 14, 0, 0)
        .single()
        .unwrap_or_else(Utc::now);

    let mut gameweeks = Vec::new();
    for gw in 1..=cfg.gameweeks + 1 {
        let decided = gw <= cfg.gameweeks;
        let mut data = GameweekData::new(gw);
        let kickoff = season_start + Duration::days(7 * i64::from(gw - 1));

        for idx in 0..cfg.fixtures_per_gameweek {
            let home = TEAMS[rng.gen_range(0..TEAMS.len())];
            let mut away = TEAMS[rng.gen_range(0..TEAMS.len())];
            while away == home {
                away = TEAMS[rng.gen_range(0..TEAMS.len())];
            }
            data.fixtures.push(Fixture {
                gameweek: gw,
                fixture_index: idx,
                home_team: home.to_string(),
                away_team: away.to_string(),
                kickoff: Some(kickoff + Duration::hours(i64::from(idx % 4) * 2)),
            });

            if decided {
                let home_goals = Some(rng.gen_range(0..4));
                let away_goals = Some(rng.gen_range(0..3));
                let result = if gw % 2 == 0 {
                    MatchResult {
                        gameweek: gw,
                        fixture_index: idx,
                        outcome: resolve_parts(None, home_goals, away_goals),
                        home_goals: None,
                        away_goals: None,
                    }
                } else {
                    MatchResult {
                        gameweek: gw,
                        fixture_index: idx,
                        outcome: None,
                        home_goals,
                        away_goals,
                    }
                };
                data.results.push(result);
            }
        }

        for user in &users {
            if !rng.gen_bool(cfg.participation) {
                continue;
            }
            data.submissions.push(Submission {
                user_id: user.user_id.clone(),
                gameweek: gw,
                submitted_at: Some(kickoff - Duration::hours(2)),
            });
            for idx in 0..cfg.fixtures_per_gameweek {
                data.picks.push(Pick {
                    user_id: user.user_id.clone(),
                    gameweek: gw,
                    fixture_index: idx,
                    choice: random_choice(&mut rng),
                });
            }
        }
        gameweeks.push(data);
    }

    DemoSeason {
        users,
        leagues,
        season: SeasonData::new(gameweeks),
    }
}

fn random_choice(rng: &mut StdRng) -> Outcome {
    let roll: f64 = rng.gen_range(0.0..1.0);
    if roll < 0.45 {
        Outcome::Home
    } else if roll < 0.70 {
        Outcome::Draw
    } else {
        Outcome::Away
    }
}
