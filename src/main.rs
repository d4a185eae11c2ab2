use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use env_logger::Env;

use gameweek_scoring::config::EngineConfig;
use gameweek_scoring::export::{self, ExportTables};
use gameweek_scoring::form::{FormWindow, compute_form_table};
use gameweek_scoring::leaderboard::compute_global_leaderboard;
use gameweek_scoring::model::{FormRow, LeaderboardRow, StandingsRow};
use gameweek_scoring::season::load_season;
use gameweek_scoring::standings::compute_league_standings;
use gameweek_scoring::store::{ScoringFeed, SqliteStore};

const DEFAULT_TOP: usize = 20;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = EngineConfig::from_env();
    let db_path = parse_arg("db")
        .map(PathBuf::from)
        .or(config.db_path.clone())
        .context("unable to resolve sqlite path")?;
    if !db_path.exists() {
        return Err(anyhow!(
            "no database at {} (run seed_demo first or pass --db)",
            db_path.display()
        ));
    }
    let top = parse_arg("top")
        .and_then(|raw| raw.parse::<usize>().ok())
        .unwrap_or(DEFAULT_TOP);

    let store = SqliteStore::open(&db_path)?;
    let users = store.users()?;
    let season = load_season(&store, None)?;
    let latest = season.latest_gameweek();

    println!("DB: {}", db_path.display());
    match latest {
        Some(gw) => println!("Latest gameweek with results: GW{gw}"),
        None => println!("No results published yet"),
    }

    let leaderboard = compute_global_leaderboard(&users, &season, &config.policy);
    print_leaderboard(&leaderboard, top, latest);

    let form5 = compute_form_table(FormWindow::Last5, &users, &season, &config.policy);
    let form10 = compute_form_table(FormWindow::Last10, &users, &season, &config.policy);
    print_form(FormWindow::Last5, &form5, top, latest);
    print_form(FormWindow::Last10, &form10, top, latest);

    let mut standings = Vec::new();
    if let Some(league_id) = parse_arg("league") {
        let members = store.league_members(&league_id)?;
        if members.is_empty() {
            println!("\nLeague {league_id}: no members");
        } else {
            standings = compute_league_standings(&members, &season, &config.policy);
            print_standings(&league_id, &standings);
        }
    }

    if let Some(path) = parse_arg("export") {
        let path = PathBuf::from(path);
        let report = export::export_tables(
            &path,
            &ExportTables {
                latest_gameweek: latest,
                standings,
                leaderboard,
                form5,
                form10,
            },
        )?;
        println!(
            "\nExported {} (standings {}, leaderboard {}, form5 {}, form10 {})",
            path.display(),
            report.standings,
            report.leaderboard,
            report.form5,
            report.form10
        );
    }

    Ok(())
}

fn print_leaderboard(rows: &[LeaderboardRow], top: usize, latest: Option<u32>) {
    println!("\nGlobal leaderboard");
    if rows.is_empty() {
        println!("  (no scored gameweeks)");
        return;
    }
    let this_gw = latest.map(|gw| format!("GW{gw}")).unwrap_or_default();
    println!("  {:>4} {:>4}  {:<24} {:>5} {:>6}", "#", "", "Player", "OCP", this_gw);
    for row in rows.iter().take(top) {
        println!(
            "  {:>4} {:>4}  {:<24} {:>5} {:>6}",
            row.rank,
            row.delta.arrow(),
            row.name,
            row.ocp,
            row.this_gw
        );
    }
}

fn print_form(window: FormWindow, rows: &[FormRow], top: usize, latest: Option<u32>) {
    println!("\n{}", window.label());
    if !latest.is_some_and(|gw| window.is_full(gw)) {
        println!("  not enough gameweeks yet");
        return;
    }
    if rows.is_empty() {
        println!("  nobody played every gameweek in the window");
        return;
    }
    for (idx, row) in rows.iter().take(top).enumerate() {
        println!("  {:>4}  {:<24} {:>5}", idx + 1, row.name, row.form_points);
    }
}

fn print_standings(league_id: &str, rows: &[StandingsRow]) {
    println!("\nLeague {league_id}");
    println!(
        "  {:>4}  {:<24} {:>4} {:>3} {:>3} {:>4} {:>5}  {}",
        "#", "Player", "Pts", "W", "D", "U", "OCP", "Form"
    );
    for (idx, row) in rows.iter().enumerate() {
        let form: String = row.recent_form(5).iter().map(|s| s.to_string()).collect();
        println!(
            "  {:>4}  {:<24} {:>4} {:>3} {:>3} {:>4} {:>5}  {}",
            idx + 1,
            row.name,
            row.points,
            row.wins,
            row.draws,
            row.unicorns,
            row.ocp,
            form
        );
    }
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
