use std::fs;
use std::path::PathBuf;

use gameweek_scoring::config::ScoringPolicy;
use gameweek_scoring::gameweek::PickGate;
use gameweek_scoring::model::{Fixture, FormSymbol, MatchResult, Member, Outcome, Pick};
use gameweek_scoring::season::{GameweekData, SeasonData};
use gameweek_scoring::standings::{WIN_POINTS, compute_league_standings, settle_gameweek};

#[derive(serde::Deserialize)]
struct SeasonFixture {
    members: Vec<Member>,
    league: Vec<String>,
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

fn league_members(fixture: &SeasonFixture) -> Vec<Member> {
    fixture
        .members
        .iter()
        .filter(|m| fixture.league.contains(&m.user_id))
        .cloned()
        .collect()
}

/// One gameweek in which every member picks every fixture; each entry of
/// `correct` lists who called that fixture right.
fn gameweek(gw: u32, members: &[&str], correct: &[&[&str]]) -> GameweekData {
    let mut data = GameweekData::new(gw);
    for (idx, winners) in correct.iter().enumerate() {
        let idx = idx as u32;
        data.fixtures.push(Fixture {
            gameweek: gw,
            fixture_index: idx,
            home_team: format!("H{idx}"),
            away_team: format!("A{idx}"),
            kickoff: None,
        });
        data.results.push(MatchResult {
            gameweek: gw,
            fixture_index: idx,
            outcome: Some(Outcome::Home),
            home_goals: None,
            away_goals: None,
        });
        for user in members {
            let choice = if winners.contains(user) {
                Outcome::Home
            } else {
                Outcome::Away
            };
            data.picks.push(Pick {
                user_id: user.to_string(),
                gameweek: gw,
                fixture_index: idx,
                choice,
            });
        }
    }
    data
}

fn two_members() -> Vec<Member> {
    vec![Member::new("user1", "Ana"), Member::new("user2", "Ben")]
}

#[test]
fn outright_winner_takes_three() {
    let season = SeasonData::new(vec![gameweek(
        1,
        &["user1", "user2"],
        &[&["user1", "user2"], &["user1"], &["user1"]],
    )]);
    let rows = compute_league_standings(&two_members(), &season, &ScoringPolicy::structural());

    assert_eq!(rows[0].user_id, "user1");
    assert_eq!(rows[0].points, 3);
    assert_eq!(rows[0].wins, 1);
    assert_eq!(rows[0].form, vec![FormSymbol::W]);
    assert_eq!(rows[1].points, 0);
    assert_eq!(rows[1].form, vec![FormSymbol::L]);
    assert_eq!(rows[0].ocp, 3);
    assert_eq!(rows[1].ocp, 1);
}

#[test]
fn exact_tie_on_score_and_unicorns_is_a_draw() {
    // One shared hit plus one unicorn each: score 2, unicorns 1 for both.
    let season = SeasonData::new(vec![gameweek(
        1,
        &["user1", "user2"],
        &[&["user1", "user2"], &["user1"], &["user2"]],
    )]);
    let rows = compute_league_standings(&two_members(), &season, &ScoringPolicy::structural());

    for row in &rows {
        assert_eq!(row.ocp, 2);
        assert_eq!(row.unicorns, 1);
        assert_eq!(row.points, 1);
        assert_eq!(row.draws, 1);
        assert_eq!(row.form, vec![FormSymbol::D]);
    }
    // Equal on everything else, so the name decides.
    assert_eq!(rows[0].name, "Ana");
}

fn three_members() -> Vec<Member> {
    vec![
        Member::new("user1", "Ana"),
        Member::new("user2", "Ben"),
        Member::new("user3", "Cat"),
    ]
}

// user1 and user2 both score 2; only user2 has a unicorn.
fn unicorn_tiebreak_season() -> SeasonData {
    SeasonData::new(vec![gameweek(
        1,
        &["user1", "user2", "user3"],
        &[&["user1", "user3"], &["user1", "user2"], &["user2"]],
    )])
}

#[test]
fn unicorns_break_a_weekly_score_tie() {
    let rows = compute_league_standings(&three_members(), &unicorn_tiebreak_season(), &ScoringPolicy::default());
    assert_eq!(rows[0].user_id, "user2");
    assert_eq!(rows[0].form, vec![FormSymbol::W]);
    assert_eq!(rows[0].unicorns, 1);
    assert_eq!(rows[1].user_id, "user1");
    assert_eq!(rows[1].form, vec![FormSymbol::L]);
}

#[test]
fn unicorn_floor_withholds_credit() {
    let policy = ScoringPolicy::default().with_unicorn_floor(4);
    let rows = compute_league_standings(&three_members(), &unicorn_tiebreak_season(), &policy);
    assert!(rows.iter().all(|r| r.unicorns == 0));
    let drawn: Vec<&str> = rows
        .iter()
        .filter(|r| r.form == vec![FormSymbol::D])
        .map(|r| r.user_id.as_str())
        .collect();
    assert_eq!(drawn, vec!["user1", "user2"]);

    // A floor of three catches two-member leagues.
    let season = SeasonData::new(vec![gameweek(1, &["user1", "user2"], &[&["user1"], &["user2"]])]);
    let floored = ScoringPolicy::default().with_unicorn_floor(3);
    let rows = compute_league_standings(&two_members(), &season, &floored);
    assert!(rows.iter().all(|r| r.unicorns == 0 && r.points == 1));
    let rows = compute_league_standings(&two_members(), &season, &ScoringPolicy::default());
    assert!(rows.iter().all(|r| r.unicorns == 1 && r.points == 1));
}

#[test]
fn default_policy_credits_unicorns_in_small_leagues() {
    // user1 alone on two fixtures, user2 alone on one.
    let season = SeasonData::new(vec![gameweek(
        1,
        &["user1", "user2"],
        &[&["user1"], &["user1"], &["user2"]],
    )]);
    let rows = compute_league_standings(&two_members(), &season, &ScoringPolicy::default());
    assert_eq!(rows[0].user_id, "user1");
    assert_eq!((rows[0].unicorns, rows[0].ocp, rows[0].points), (2, 2, 3));
    assert_eq!((rows[1].unicorns, rows[1].ocp, rows[1].points), (1, 1, 0));

    let solo = vec![Member::new("user1", "Ana")];
    let season = SeasonData::new(vec![gameweek(1, &["user1"], &[&["user1"], &[]])]);
    let rows = compute_league_standings(&solo, &season, &ScoringPolicy::default());
    assert_eq!((rows[0].unicorns, rows[0].wins), (1, 1));
}

#[test]
fn exact_tie_is_a_draw_under_the_default_policy() {
    let season = SeasonData::new(vec![gameweek(
        1,
        &["user1", "user2"],
        &[&["user1", "user2"], &["user1"], &["user2"]],
    )]);
    let rows = compute_league_standings(&two_members(), &season, &ScoringPolicy::default());
    for row in &rows {
        assert_eq!((row.ocp, row.unicorns, row.points, row.draws), (2, 1, 1, 1));
        assert_eq!(row.form, vec![FormSymbol::D]);
    }
}

#[test]
fn season_fixture_standings() {
    let fixture = small_season();
    let members = league_members(&fixture);
    let rows = compute_league_standings(&members, &fixture.season, &ScoringPolicy::default());

    let order: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(order, vec!["Ana", "Ben", "Cat"]);

    let ana = &rows[0];
    assert_eq!((ana.points, ana.wins, ana.draws), (4, 1, 1));
    assert_eq!((ana.ocp, ana.unicorns), (6, 2));
    assert_eq!(ana.form_string(), "LDW");

    let ben = &rows[1];
    assert_eq!((ben.points, ben.wins, ben.draws), (3, 1, 0));
    assert_eq!((ben.ocp, ben.unicorns), (4, 2));
    assert_eq!(ben.form_string(), "WLL");

    // Cat skipped GW4 entirely but still records the loss; GW3 (no results) leaves no mark.
    let cat = &rows[2];
    assert_eq!((cat.points, cat.draws, cat.ocp, cat.unicorns), (1, 1, 2, 0));
    assert_eq!(cat.form, vec![FormSymbol::L, FormSymbol::D, FormSymbol::L]);
    assert_eq!(cat.recent_form(2), &[FormSymbol::D, FormSymbol::L]);
}

#[test]
fn new_league_still_lists_every_member() {
    let fixture = small_season();
    let members = vec![Member::new("x1", "Zed"), Member::new("x2", "Amy")];
    let rows = compute_league_standings(&members, &fixture.season, &ScoringPolicy::default());
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].name, "Amy");
    for row in &rows {
        assert_eq!((row.points, row.ocp, row.unicorns, row.wins, row.draws), (0, 0, 0, 0, 0));
        assert!(row.form.is_empty());
    }

    let empty = compute_league_standings(&two_members(), &SeasonData::default(), &ScoringPolicy::default());
    assert_eq!(empty.len(), 2);
    assert!(compute_league_standings(&[], &fixture.season, &ScoringPolicy::default()).is_empty());
}

#[test]
fn final_order_uses_unicorns_then_ocp_then_name() {
    let members = vec![
        Member::new("a", "Dee"),
        Member::new("b", "Cy"),
        Member::new("c", "Bo"),
    ];
    // Each user wins one gameweek, so everyone finishes on 3 points.
    // a: 2 unicorns / 3 OCP, b: 1 unicorn / 3 OCP, c: 1 unicorn / 4 OCP.
    let ids = ["a", "b", "c"];
    let season = SeasonData::new(vec![
        gameweek(1, &ids, &[&["a"], &["a"]]),
        gameweek(2, &ids, &[&["b"], &["b", "c"], &["b", "c"]]),
        gameweek(3, &ids, &[&["c"], &["a", "c"]]),
    ]);
    let rows = compute_league_standings(&members, &season, &ScoringPolicy::default());
    let order: Vec<&str> = rows.iter().map(|r| r.user_id.as_str()).collect();
    assert!(rows.iter().all(|r| r.points == WIN_POINTS));
    assert_eq!(order, vec!["a", "c", "b"]);
}

#[test]
fn points_per_gameweek_follow_the_top_group() {
    let fixture = small_season();
    let members = league_members(&fixture);
    let ids: Vec<&str> = members.iter().map(|m| m.user_id.as_str()).collect();
    for gw in fixture.season.resolved_gameweeks() {
        let card = gw.score(&ids, PickGate::AllPicks);
        let settlement = settle_gameweek(&card);
        match settlement.co_top.len() {
            1 => assert_eq!(settlement.points_awarded(), 3),
            n => assert_eq!(settlement.points_awarded(), n as u32),
        }
        assert!(settlement.points_awarded() <= 3);
    }
}

#[test]
fn standings_are_idempotent() {
    let fixture = small_season();
    let members = league_members(&fixture);
    let policy = ScoringPolicy::default();
    let first = compute_league_standings(&members, &fixture.season, &policy);
    let second = compute_league_standings(&members, &fixture.season, &policy);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}
