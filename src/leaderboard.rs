use std::collections::{BTreeMap, HashMap};

use log::debug;

use crate::config::ScoringPolicy;
use crate::model::{LeaderboardRow, Member, RankDelta, UserId};
use crate::season::{SeasonData, SeasonScores, score_season};

/// Season-wide OCP leaderboard over the whole user population.
pub fn compute_global_leaderboard(
    users: &[Member],
    season: &SeasonData,
    policy: &ScoringPolicy,
) -> Vec<LeaderboardRow> {
    let population: Vec<UserId> = users.iter().map(|u| u.user_id.clone()).collect();
    let scores = score_season(season, &population, policy.pick_gate);
    leaderboard_from_scores(users, &scores)
}

/// Rank users by OCP and compare against the table as it stood before the
/// latest gameweek. Users who never played a resolved gameweek are left out.
pub fn leaderboard_from_scores(users: &[Member], scores: &SeasonScores) -> Vec<LeaderboardRow> {
    let Some(latest) = scores.latest() else {
        return Vec::new();
    };
    let names: HashMap<&str, &str> = users
        .iter()
        .map(|u| (u.user_id.as_str(), u.name.as_str()))
        .collect();

    let current = scores.ocp_through(latest);
    let first_gameweek = scores.gameweeks.keys().next().copied().unwrap_or(latest);
    let previous = if first_gameweek < latest {
        Some(scores.ocp_through(latest - 1))
    } else {
        None
    };

    let curr_ranks = rank_by_ocp(&current, &names);
    let prev_ranks = previous.as_ref().map(|prev| rank_by_ocp(prev, &names));
    let this_gw = scores.get(latest);

    let mut rows: Vec<LeaderboardRow> = curr_ranks
        .iter()
        .map(|(user_id, rank)| {
            let delta = match prev_ranks.as_ref() {
                None => RankDelta::Same,
                Some(prev) => match prev.get(user_id) {
                    None => RankDelta::New,
                    Some(prev_rank) if rank < prev_rank => RankDelta::Up,
                    Some(prev_rank) if rank > prev_rank => RankDelta::Down,
                    Some(_) => RankDelta::Same,
                },
            };
            LeaderboardRow {
                user_id: user_id.clone(),
                name: display_name(&names, user_id).to_string(),
                ocp: current.get(user_id).copied().unwrap_or(0),
                rank: *rank,
                delta,
                this_gw: this_gw.map(|card| card.get(user_id).score).unwrap_or(0),
            }
        })
        .collect();
    rows.sort_by_key(|row| row.rank);

    debug!("leaderboard through gw {latest}: {} rows", rows.len());
    rows
}

/// 1-based positions: OCP descending, then name, then user id.
fn rank_by_ocp(ocp: &BTreeMap<UserId, u32>, names: &HashMap<&str, &str>) -> BTreeMap<UserId, usize> {
    let mut ordered: Vec<(&UserId, u32)> = ocp.iter().map(|(u, v)| (u, *v)).collect();
    ordered.sort_by(|(ua, a), (ub, b)| {
        b.cmp(a)
            .then_with(|| display_name(names, ua).cmp(display_name(names, ub)))
            .then_with(|| ua.cmp(ub))
    });
    ordered
        .into_iter()
        .enumerate()
        .map(|(idx, (user, _))| (user.clone(), idx + 1))
        .collect()
}

fn display_name<'a>(names: &HashMap<&str, &'a str>, user_id: &'a str) -> &'a str {
    names.get(user_id).copied().unwrap_or(user_id)
}
