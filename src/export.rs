use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::form::FormWindow;
use crate::model::{FormRow, LeaderboardRow, StandingsRow};

#[derive(Debug, Clone, Default)]
pub struct ExportTables {
    pub latest_gameweek: Option<u32>,
    pub standings: Vec<StandingsRow>,
    pub leaderboard: Vec<LeaderboardRow>,
    pub form5: Vec<FormRow>,
    pub form10: Vec<FormRow>,
}

pub struct ExportReport {
    pub standings: usize,
    pub leaderboard: usize,
    pub form5: usize,
    pub form10: usize,
}

/// Write every table to its own sheet. Empty tables still get a header row.
pub fn export_tables(path: &Path, tables: &ExportTables) -> Result<ExportReport> {
    let mut standings_rows = vec![vec![
        "Pos".to_string(),
        "Player".to_string(),
        "Pts".to_string(),
        "W".to_string(),
        "D".to_string(),
        "Unicorns".to_string(),
        "OCP".to_string(),
        "Form".to_string(),
    ]];
    for (idx, row) in tables.standings.iter().enumerate() {
        standings_rows.push(vec![
            (idx + 1).to_string(),
            row.name.clone(),
            row.points.to_string(),
            row.wins.to_string(),
            row.draws.to_string(),
            row.unicorns.to_string(),
            row.ocp.to_string(),
            row.form_string(),
        ]);
    }

    let this_gw_header = tables
        .latest_gameweek
        .map(|gw| format!("GW{gw}"))
        .unwrap_or_else(|| "This GW".to_string());
    let mut leaderboard_rows = vec![vec![
        "Rank".to_string(),
        "Move".to_string(),
        "Player".to_string(),
        "OCP".to_string(),
        this_gw_header,
    ]];
    for row in &tables.leaderboard {
        leaderboard_rows.push(vec![
            row.rank.to_string(),
            row.delta.arrow().to_string(),
            row.name.clone(),
            row.ocp.to_string(),
            row.this_gw.to_string(),
        ]);
    }

    let form5_rows = form_rows(&tables.form5);
    let form10_rows = form_rows(&tables.form10);

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Standings")?;
        write_rows(sheet, &standings_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Leaderboard")?;
        write_rows(sheet, &leaderboard_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(FormWindow::Last5.label())?;
        write_rows(sheet, &form5_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(FormWindow::Last10.label())?;
        write_rows(sheet, &form10_rows)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;
    info!("exported tables to {}", path.display());

    Ok(ExportReport {
        standings: standings_rows.len().saturating_sub(1),
        leaderboard: leaderboard_rows.len().saturating_sub(1),
        form5: form5_rows.len().saturating_sub(1),
        form10: form10_rows.len().saturating_sub(1),
    })
}

fn form_rows(rows: &[FormRow]) -> Vec<Vec<String>> {
    let mut out = vec![vec![
        "Pos".to_string(),
        "Player".to_string(),
        "Points".to_string(),
    ]];
    for (idx, row) in rows.iter().enumerate() {
        out.push(vec![
            (idx + 1).to_string(),
            row.name.clone(),
            row.form_points.to_string(),
        ]);
    }
    out
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
