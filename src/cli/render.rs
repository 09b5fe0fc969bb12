//! Plain-text rendering of client state for the terminal

use std::fmt::Write as _;

use crate::domain::chart::ChartData;
use crate::domain::dataset::DatasetRef;
use crate::domain::equipment::EquipmentRow;
use crate::domain::summary::Summary;
use crate::domain::table::{Column, render_row, summary_cards};
use crate::state::auth_state::{AuthState, AuthView};
use crate::state::history_state::HistoryState;
use crate::state::log_state::LogState;
use crate::state::upload_state::UploadState;
use crate::utils::format::{format_bytes, format_datetime, format_time, truncate};

const BAR_WIDTH: usize = 30;
const FILE_NAME_WIDTH: usize = 40;

pub fn render_summary(summary: Option<&Summary>) -> String {
    let Some(summary) = summary else {
        return "No summary loaded".to_string();
    };
    let cards = summary_cards(summary);
    let width = cards.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    let mut out = String::new();
    for (label, value) in cards {
        let _ = writeln!(out, "{label:<width$}  {value}");
    }
    out
}

/// Equipment table with columns sized to their widest cell
pub fn render_table(rows: &[EquipmentRow]) -> String {
    if rows.is_empty() {
        return "No rows loaded".to_string();
    }

    let cells: Vec<Vec<String>> = rows.iter().map(render_row).collect();
    let widths: Vec<usize> = Column::ALL
        .iter()
        .enumerate()
        .map(|(i, column)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(column.label().len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    let header: Vec<String> = Column::ALL
        .iter()
        .zip(&widths)
        .map(|(column, w)| format!("{:<w$}", column.label()))
        .collect();
    let _ = writeln!(out, "{}", header.join(" | ").trim_end());
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let _ = writeln!(out, "{}", rule.join("-+-"));
    for row in &cells {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!("{cell:<w$}"))
            .collect();
        let _ = writeln!(out, "{}", line.join(" | ").trim_end());
    }
    out
}

/// Type counts as horizontal bars, plus averages when available
pub fn render_charts(chart: &ChartData) -> String {
    let Some(series) = chart.series() else {
        return "No data available".to_string();
    };

    let label_width = series.labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let max_count = series.counts.iter().copied().max().unwrap_or(0);
    let mut out = String::from("Equipment Type Distribution\n");

    for (i, label) in series.labels.iter().enumerate() {
        let count = series.counts[i];
        let bar_len = if max_count == 0 {
            0
        } else {
            (count as usize * BAR_WIDTH).div_ceil(max_count as usize)
        };
        let share = series
            .percentages
            .as_ref()
            .map(|p| format!(" ({}%)", p[i]))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "  {label:<label_width$}  {:<width$}  {count}{share}  [{}]",
            "#".repeat(bar_len),
            series.color(i),
            width = BAR_WIDTH
        );
    }

    if let (Some(temps), Some(pressures)) = (&series.avg_temperatures, &series.avg_pressures) {
        out.push_str("Averages by Type\n");
        for (i, label) in series.labels.iter().enumerate() {
            let _ = writeln!(
                out,
                "  {label:<label_width$}  temperature {:.2}  pressure {:.2}",
                temps[i], pressures[i]
            );
        }
    }
    out
}

pub fn render_history(state: &HistoryState) -> String {
    let mut out = String::new();
    if let Some(error) = &state.error {
        let _ = writeln!(out, "Error: {error}");
    }
    if state.datasets.is_empty() {
        out.push_str("No uploads yet\n");
        return out;
    }
    for dataset in &state.datasets {
        let _ = writeln!(out, "{}", history_line(dataset));
    }
    out
}

fn history_line(dataset: &DatasetRef) -> String {
    format!(
        "  #{:<6} {:<width$}  {}",
        dataset.id.as_str(),
        truncate(&dataset.file_name, FILE_NAME_WIDTH),
        format_datetime(&dataset.uploaded_at),
        width = FILE_NAME_WIDTH
    )
}

pub fn render_upload(state: &UploadState) -> String {
    let mut out = format!("Upload: {}", state.phase.label());
    if let Some(file) = &state.file {
        let _ = write!(out, " - {} ({})", file.file_name, format_bytes(file.len() as u64));
    }
    if let Some(error) = &state.error {
        let _ = write!(out, "\nError: {error}");
    }
    out
}

pub fn render_auth(state: &AuthState) -> String {
    let mut out = match state.view {
        AuthView::LoggedIn => format!(
            "Logged in as {}",
            state.username.as_deref().unwrap_or_default()
        ),
        AuthView::LoggedOut {
            showing_register: true,
        } => "Logged out (register)".to_string(),
        AuthView::LoggedOut {
            showing_register: false,
        } => "Logged out".to_string(),
    };
    if let Some(error) = &state.error {
        let _ = write!(out, "\nError: {error}");
    }
    out
}

pub fn render_logs(log: &LogState, last: usize) -> String {
    let mut out = String::new();
    for entry in log.tail(last) {
        let _ = writeln!(
            out,
            "{} {:<5} {}",
            format_time(&entry.timestamp),
            entry.level.label(),
            entry.message
        );
    }
    out
}
