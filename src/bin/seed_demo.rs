use std::path::PathBuf;

use anyhow::{Context, Result};
use env_logger::Env;
use log::info;

use gameweek_scoring::config::default_db_path;
use gameweek_scoring::demo_season::{self, DemoConfig};
use gameweek_scoring::store::SqliteStore;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let db_path = parse_arg("db")
        .map(PathBuf::from)
        .or_else(|| std::env::var("SCORING_DB_PATH").ok().map(PathBuf::from))
        .or_else(default_db_path)
        .context("unable to resolve sqlite path")?;

    let defaults = DemoConfig::default();
    let cfg = DemoConfig {
        seed: parse_num("seed").unwrap_or(defaults.seed),
        users: parse_num("users").unwrap_or(defaults.users),
        gameweeks: parse_num("gameweeks").unwrap_or(defaults.gameweeks),
        fixtures_per_gameweek: parse_num("fixtures").unwrap_or(defaults.fixtures_per_gameweek),
        leagues: parse_num("leagues").unwrap_or(defaults.leagues),
        ..defaults
    };

    let demo = demo_season::generate(&cfg);
    let mut store = SqliteStore::open(&db_path)?;

    let mut picks = 0usize;
    store.in_transaction(|store| {
        for user in &demo.users {
            store.upsert_user(user)?;
        }
        for league in &demo.leagues {
            store.upsert_league(&league.league_id, &league.name)?;
            for membership in league.memberships() {
                store.add_league_member(&membership.league_id, &membership.user_id)?;
            }
        }
        for gw in demo.season.gameweeks() {
            for fixture in &gw.fixtures {
                store.upsert_fixture(fixture)?;
            }
            for result in &gw.results {
                store.upsert_result(result)?;
            }
            for submission in &gw.submissions {
                store.upsert_submission(submission)?;
            }
            for pick in &gw.picks {
                store.upsert_pick(pick)?;
                picks += 1;
            }
        }
        Ok(())
    })?;

    info!("seeded demo season into {}", db_path.display());
    println!("Demo season written");
    println!("DB: {}", db_path.display());
    println!("Users: {}", demo.users.len());
    println!("Gameweeks: {} (+1 undecided)", cfg.gameweeks);
    println!("Picks: {picks}");
    for league in &demo.leagues {
        println!(
            "league {}: {} members ({})",
            league.league_id,
            league.members.len(),
            league.name
        );
    }
    Ok(())
}

fn parse_num<T: std::str::FromStr>(name: &str) -> Option<T> {
    parse_arg(name).and_then(|raw| raw.parse::<T>().ok())
}

fn parse_arg(name: &str) -> Option<String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let flag = format!("--{name}");
    let prefix = format!("--{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if *arg == flag
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}
