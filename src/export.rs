use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::aggregate::DataAggregate;
use crate::catalog::catalog;
use crate::opponent::{FeatureRow, Side, UpcomingGameRow};
use crate::rolling::FeatureVector;

pub struct ExportReport {
    pub training_rows: usize,
    pub prediction_rows: usize,
    pub columns: usize,
}

enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl From<Option<f64>> for Cell {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Cell::Empty, Cell::Number)
    }
}

fn flag(value: bool) -> Cell {
    Cell::Number(if value { 1.0 } else { 0.0 })
}

const TRAINING_LEADING: [&str; 12] = [
    "event_id",
    "season",
    "season_week_number",
    "date",
    "team_a",
    "team_b",
    "team_a_is_home",
    "team_b_is_home",
    "team_a_points_scored",
    "team_b_points_scored",
    "team_a_win",
    "team_a_point_differential",
];

const PREDICTION_LEADING: [&str; 6] = [
    "event_id",
    "season",
    "season_week_number",
    "date",
    "team_a",
    "team_b",
];

pub fn training_header() -> Vec<String> {
    header(&TRAINING_LEADING)
}

pub fn prediction_header() -> Vec<String> {
    header(&PREDICTION_LEADING)
}

fn header(leading: &[&str]) -> Vec<String> {
    let mut out: Vec<String> = leading.iter().map(|s| s.to_string()).collect();
    for side in [Side::A, Side::B] {
        out.extend(
            catalog()
                .names()
                .iter()
                .map(|name| format!("{}_{name}", side.prefix())),
        );
    }
    out
}

fn feature_cells(out: &mut Vec<Cell>, a: &FeatureVector, b: &FeatureVector) {
    out.extend(a.values().iter().map(|v| Cell::from(*v)));
    out.extend(b.values().iter().map(|v| Cell::from(*v)));
}

fn training_row(row: &FeatureRow) -> Vec<Cell> {
    let mut out = vec![
        Cell::Text(row.event_id.clone()),
        Cell::Number(f64::from(row.season)),
        Cell::Number(f64::from(row.week)),
        Cell::Text(row.date.format("%Y-%m-%d").to_string()),
        Cell::Text(row.team_a.code().to_string()),
        Cell::Text(row.team_b.code().to_string()),
        flag(row.team_a_is_home),
        flag(row.team_b_is_home),
        Cell::Number(row.team_a_points_scored),
        Cell::Number(row.team_b_points_scored),
        flag(row.team_a_win),
        Cell::Number(row.team_a_point_differential),
    ];
    feature_cells(&mut out, &row.team_a_features, &row.team_b_features);
    out
}

fn prediction_row(row: &UpcomingGameRow) -> Vec<Cell> {
    let mut out = vec![
        Cell::Text(row.event_id.clone()),
        Cell::Number(f64::from(row.season)),
        Cell::Number(f64::from(row.week)),
        Cell::Text(row.date.format("%Y-%m-%d").to_string()),
        Cell::Text(row.team_a.code().to_string()),
        Cell::Text(row.team_b.code().to_string()),
    ];
    feature_cells(&mut out, &row.team_a_features, &row.team_b_features);
    out
}

pub fn export_aggregate(aggregate: &DataAggregate, path: &Path) -> Result<ExportReport> {
    let training_header = training_header();
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("training")?;
        write_header(sheet, &training_header)?;
        let rows: Vec<Vec<Cell>> = aggregate.training().iter().map(training_row).collect();
        write_rows(sheet, &rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("prediction_set")?;
        write_header(sheet, &prediction_header())?;
        let rows: Vec<Vec<Cell>> = aggregate
            .prediction_set()
            .iter()
            .map(prediction_row)
            .collect();
        write_rows(sheet, &rows)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportReport {
        training_rows: aggregate.training().len(),
        prediction_rows: aggregate.prediction_set().len(),
        columns: training_header.len(),
    })
}

fn write_header(worksheet: &mut Worksheet, header: &[String]) -> Result<()> {
    for (col_idx, value) in header.iter().enumerate() {
        worksheet
            .write_string(0, col_idx as u16, value)
            .with_context(|| format!("write header cell {col_idx}"))?;
    }
    Ok(())
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<Cell>]) -> Result<()> {
    for (idx, row) in rows.iter().enumerate() {
        let row_idx = (idx + 1) as u32;
        for (col_idx, cell) in row.iter().enumerate() {
            let col = col_idx as u16;
            match cell {
                Cell::Text(value) => {
                    worksheet.write_string(row_idx, col, value)?;
                }
                Cell::Number(value) => {
                    worksheet.write_number(row_idx, col, *value)?;
                }
                Cell::Empty => {}
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FEATURE_COUNT;

    #[test]
    fn headers_cover_both_sides() {
        let header = training_header();
        assert_eq!(header.len(), TRAINING_LEADING.len() + 2 * FEATURE_COUNT);
        assert_eq!(header[12], "team_a_elo_rating");
        assert_eq!(header[12 + FEATURE_COUNT], "team_b_elo_rating");
        assert_eq!(prediction_header().len(), 6 + 2 * FEATURE_COUNT);
    }
}
