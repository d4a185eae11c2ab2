use std::cmp::Ordering;
use std::collections::BTreeMap;

use log::debug;

use crate::config::ScoringPolicy;
use crate::gameweek::GameweekScorecard;
use crate::model::{FormSymbol, GwScore, Member, StandingsRow, UserId};
use crate::season::SeasonData;

pub const WIN_POINTS: u32 = 3;
pub const DRAW_POINTS: u32 = 1;

/// How one gameweek was settled inside a league.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameweekSettlement {
    pub gameweek: u32,
    pub top: GwScore,
    pub co_top: Vec<UserId>,
}

impl GameweekSettlement {
    pub fn points_awarded(&self) -> u32 {
        match self.co_top.len() {
            0 => 0,
            1 => WIN_POINTS,
            n => DRAW_POINTS * n as u32,
        }
    }
}

/// Mini-league table over every resolved gameweek, using current membership.
///
/// Each gameweek is won outright (3 points) by the sole owner of the best
/// (score, unicorns) pair, or drawn (1 point each) by everyone sharing it.
/// A gameweek in which no member holds a pick on a decided fixture is skipped.
pub fn compute_league_standings(
    members: &[Member],
    season: &SeasonData,
    policy: &ScoringPolicy,
) -> Vec<StandingsRow> {
    if members.is_empty() {
        return Vec::new();
    }

    let population: Vec<&str> = members.iter().map(|m| m.user_id.as_str()).collect();
    let unicorns_count = policy.unicorns_count_for(members.len());

    let mut rows: BTreeMap<&str, StandingsRow> = members
        .iter()
        .map(|m| {
            (
                m.user_id.as_str(),
                StandingsRow {
                    user_id: m.user_id.clone(),
                    name: m.name.clone(),
                    points: 0,
                    ocp: 0,
                    unicorns: 0,
                    wins: 0,
                    draws: 0,
                    form: Vec::new(),
                },
            )
        })
        .collect();

    for gw in season.resolved_gameweeks() {
        let mut card = gw.score(&population, policy.pick_gate);
        if card.contested_fixtures == 0 {
            debug!("gw {}: no league picks on decided fixtures, skipped", gw.gameweek);
            continue;
        }
        if !unicorns_count {
            for score in card.scores.values_mut() {
                score.unicorns = 0;
            }
        }
        let settlement = settle_gameweek(&card);
        apply_settlement(&mut rows, &card, &settlement);
    }

    let mut out: Vec<StandingsRow> = rows.into_values().collect();
    out.sort_by(compare_rows);
    out
}

/// Find the best (score, unicorns) pair and everyone who shares it.
pub fn settle_gameweek(card: &GameweekScorecard) -> GameweekSettlement {
    let top = card
        .scores
        .values()
        .copied()
        .max_by(|a, b| compare_gw_scores(a, b))
        .unwrap_or_default();
    let co_top = card
        .scores
        .iter()
        .filter(|(_, score)| **score == top)
        .map(|(user, _)| user.clone())
        .collect();
    GameweekSettlement {
        gameweek: card.gameweek,
        top,
        co_top,
    }
}

fn apply_settlement(
    rows: &mut BTreeMap<&str, StandingsRow>,
    card: &GameweekScorecard,
    settlement: &GameweekSettlement,
) {
    let solo = settlement.co_top.len() == 1;
    for (user, row) in rows.iter_mut() {
        let score = card.get(user);
        row.ocp += score.score;
        row.unicorns += score.unicorns;

        if settlement.co_top.iter().any(|u| u == user) {
            if solo {
                row.points += WIN_POINTS;
                row.wins += 1;
                row.form.push(FormSymbol::W);
            } else {
                row.points += DRAW_POINTS;
                row.draws += 1;
                row.form.push(FormSymbol::D);
            }
        } else {
            row.form.push(FormSymbol::L);
        }
    }
}

fn compare_gw_scores(a: &GwScore, b: &GwScore) -> Ordering {
    a.score.cmp(&b.score).then(a.unicorns.cmp(&b.unicorns))
}

fn compare_rows(a: &StandingsRow, b: &StandingsRow) -> Ordering {
    b.points
        .cmp(&a.points)
        .then(b.unicorns.cmp(&a.unicorns))
        .then(b.ocp.cmp(&a.ocp))
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.user_id.cmp(&b.user_id))
}
