use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use gameweek_scoring::config::ScoringPolicy;
use gameweek_scoring::demo_season::{self, DemoConfig, DemoSeason};
use gameweek_scoring::form::{FormWindow, compute_form_table, form_table};
use gameweek_scoring::gameweek::PickGate;
use gameweek_scoring::model::{Member, UserId};
use gameweek_scoring::season::{SeasonData, SeasonScores, score_season};

#[derive(serde::Deserialize)]
struct SeasonFixture {
    members: Vec<Member>,
    season: SeasonData,
}

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn small_season() -> SeasonFixture {
    serde_json::from_str(&read_fixture("season_small.json")).expect("season fixture should parse")
}

fn scores_for(users: &[Member], season: &SeasonData) -> SeasonScores {
    let population: Vec<UserId> = users.iter().map(|u| u.user_id.clone()).collect();
    score_season(season, &population, PickGate::AllPicks)
}

fn demo_scores(cfg: &DemoConfig) -> (DemoSeason, SeasonScores) {
    let demo = demo_season::generate(cfg);
    let scores = scores_for(&demo.users, &demo.season);
    (demo, scores)
}

#[test]
fn window_metadata() {
    assert_eq!(FormWindow::Last5.size(), 5);
    assert_eq!(FormWindow::Last10.size(), 10);
    assert!(!FormWindow::Last5.is_full(4));
    assert!(FormWindow::Last5.is_full(5));
    assert!(!FormWindow::Last10.is_full(9));
    assert_eq!(FormWindow::Last10.label(), "Form 10");
}

#[test]
fn form_five_before_gameweek_five_is_empty() {
    let fixture = small_season();
    let policy = ScoringPolicy::default();
    assert_eq!(fixture.season.latest_gameweek(), Some(4));
    assert!(compute_form_table(FormWindow::Last5, &fixture.members, &fixture.season, &policy).is_empty());
    assert!(compute_form_table(FormWindow::Last10, &fixture.members, &fixture.season, &policy).is_empty());
    assert!(compute_form_table(FormWindow::Last5, &fixture.members, &SeasonData::default(), &policy).is_empty());
}

#[test]
fn short_windows_over_the_fixture_season() {
    let fixture = small_season();
    let scores = scores_for(&fixture.members, &fixture.season);

    let summary = |size: u32, latest: u32| -> Vec<(String, u32)> {
        form_table(size, latest, &scores, &fixture.members)
            .into_iter()
            .map(|r| (r.name, r.form_points))
            .collect()
    };

    // Ben and Cat tie on points; name decides.
    assert_eq!(
        summary(2, 2),
        vec![("Ana".to_string(), 3), ("Ben".to_string(), 2), ("Cat".to_string(), 2)]
    );
    // Dan only played GW4, Cat skipped it.
    assert_eq!(
        summary(1, 4),
        vec![("Dan".to_string(), 4), ("Ana".to_string(), 3), ("Ben".to_string(), 2)]
    );
    // GW3 never resolved, so no one has an entry there.
    assert!(summary(2, 4).is_empty());
    assert!(summary(0, 4).is_empty());
}

#[test]
fn missing_one_gameweek_disqualifies() {
    let (demo, scores) = demo_scores(&DemoConfig::default());
    let latest = scores.latest().expect("demo season has results");
    let rows = form_table(5, latest, &scores, &demo.users);
    let listed: Vec<&str> = rows.iter().map(|r| r.user_id.as_str()).collect();

    for user in &demo.users {
        let played_all = (latest - 4..=latest).all(|gw| scores.has_entry(&user.user_id, gw));
        assert_eq!(listed.contains(&user.user_id.as_str()), played_all, "user {}", user.user_id);
    }
    assert!(listed.len() < demo.users.len(), "some demo users sit out a gameweek");
}

#[test]
fn ten_window_qualifiers_hold_both_five_windows() {
    let (demo, scores) = demo_scores(&DemoConfig::default());
    let latest = scores.latest().expect("demo season has results");
    assert_eq!(latest, 12);

    let ten = form_table(10, latest, &scores, &demo.users);
    let recent: BTreeMap<String, u32> = form_table(5, latest, &scores, &demo.users)
        .into_iter()
        .map(|r| (r.user_id, r.form_points))
        .collect();
    let earlier: BTreeMap<String, u32> = form_table(5, latest - 5, &scores, &demo.users)
        .into_iter()
        .map(|r| (r.user_id, r.form_points))
        .collect();

    for row in &ten {
        let (Some(a), Some(b)) = (earlier.get(&row.user_id), recent.get(&row.user_id)) else {
            panic!("{} qualifies for form 10 but not both halves", row.user_id);
        };
        assert_eq!(row.form_points, a + b);
    }
}

#[test]
fn full_participation_lists_everyone_in_order() {
    let cfg = DemoConfig {
        participation: 1.0,
        ..DemoConfig::default()
    };
    let (demo, _) = demo_scores(&cfg);
    let rows = compute_form_table(FormWindow::Last10, &demo.users, &demo.season, &ScoringPolicy::default());
    assert_eq!(rows.len(), demo.users.len());
    for pair in rows.windows(2) {
        let ordered = pair[0].form_points > pair[1].form_points
            || (pair[0].form_points == pair[1].form_points && pair[0].name <= pair[1].name);
        assert!(ordered, "{:?} before {:?}", pair[0], pair[1]);
    }
    assert_eq!(
        rows,
        compute_form_table(FormWindow::Last10, &demo.users, &demo.season, &ScoringPolicy::default())
    );
}
