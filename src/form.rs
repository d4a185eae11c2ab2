use serde::{Deserialize, Serialize};

use crate::config::ScoringPolicy;
use crate::model::{FormRow, Member, UserId};
use crate::season::{SeasonData, SeasonScores, score_season};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormWindow {
    Last5,
    Last10,
}

impl FormWindow {
    pub fn size(self) -> u32 {
        match self {
            FormWindow::Last5 => 5,
            FormWindow::Last10 => 10,
        }
    }

    /// Whether a window ending at `latest` fits inside the season so far.
    pub fn is_full(self, latest: u32) -> bool {
        latest >= self.size()
    }

    pub fn label(self) -> &'static str {
        match self {
            FormWindow::Last5 => "Form 5",
            FormWindow::Last10 => "Form 10",
        }
    }
}

/// Rolling form table ending at the season's latest resolved gameweek.
pub fn compute_form_table(
    window: FormWindow,
    users: &[Member],
    season: &SeasonData,
    policy: &ScoringPolicy,
) -> Vec<FormRow> {
    let Some(latest) = season.latest_gameweek() else {
        return Vec::new();
    };
    let population: Vec<UserId> = users.iter().map(|u| u.user_id.clone()).collect();
    let scores = score_season(season, &population, policy.pick_gate);
    form_table(window.size(), latest, &scores, users)
}

/// Sum each user's scores over `[latest - size + 1, latest]`.
///
/// Only users with an entry in every gameweek of the window qualify; a window
/// that reaches back before gameweek 1 yields an empty table.
pub fn form_table(size: u32, latest: u32, scores: &SeasonScores, users: &[Member]) -> Vec<FormRow> {
    if size == 0 || latest < size {
        return Vec::new();
    }
    let first = latest - size + 1;

    let mut rows: Vec<FormRow> = users
        .iter()
        .filter(|u| (first..=latest).all(|gw| scores.has_entry(&u.user_id, gw)))
        .map(|u| FormRow {
            user_id: u.user_id.clone(),
            name: u.name.clone(),
            form_points: (first..=latest)
                .filter_map(|gw| scores.get(gw))
                .map(|card| card.get(&u.user_id).score)
                .sum(),
        })
        .collect();

    rows.sort_by(|a, b| {
        b.form_points
            .cmp(&a.form_points)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
    rows
}

