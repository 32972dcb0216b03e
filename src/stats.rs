//! Presentation of a ledger snapshot: heading, progress bar and per-line
//! table, as terminal text, as the HTML panel the map page embeds, or as
//! JSON.

use serde::Serialize;

use crate::ledger::Line;
use crate::theme::Theme;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineStats {
    pub name: String,
    pub symbol: String,
    pub visited: u32,
    pub total: u32,
    /// Percent of the line visited, two decimals.
    pub percentage: f64,
    pub complete: bool,
}

impl LineStats {
    pub fn from_line(line: &Line) -> Self {
        Self {
            name: line.name.clone(),
            symbol: line.symbol.clone(),
            visited: line.visited,
            total: line.total,
            percentage: round2(line.fraction * 100.0),
            complete: line.is_complete(),
        }
    }
}

/// Read-only view of the ledger handed to renderers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub network: String,
    pub total_visited: usize,
    pub total_stations: u32,
    pub overall_percentage: f64,
    pub lines: Vec<LineStats>,
}

impl StatsSnapshot {
    pub fn new(network: &str, total_visited: usize, total_stations: u32, lines: Vec<LineStats>) -> Self {
        let overall = total_visited as f64 / f64::from(total_stations) * 100.0;
        Self {
            network: network.to_string(),
            total_visited,
            total_stations,
            overall_percentage: round2(overall),
            lines,
        }
    }
}

/// Receives a fresh snapshot after every ledger change.
pub trait StatsSink {
    fn refresh(&mut self, snapshot: &StatsSnapshot);
}

impl StatsSink for () {
    fn refresh(&mut self, _snapshot: &StatsSnapshot) {}
}

/// Keeps the most recent snapshot, for hosts that render on demand.
#[derive(Debug, Clone, Default)]
pub struct StatsPanel {
    latest: Option<StatsSnapshot>,
    refreshes: usize,
}

impl StatsPanel {
    pub fn latest(&self) -> Option<&StatsSnapshot> {
        self.latest.as_ref()
    }

    pub fn refreshes(&self) -> usize {
        self.refreshes
    }
}

impl StatsSink for StatsPanel {
    fn refresh(&mut self, snapshot: &StatsSnapshot) {
        self.latest = Some(snapshot.clone());
        self.refreshes += 1;
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn heading_text(snapshot: &StatsSnapshot, theme: &Theme) -> String {
    format!(
        "You have visited {} out of {} total {} stations ({:.2}%)!{}",
        snapshot.total_visited,
        snapshot.total_stations,
        snapshot.network,
        snapshot.overall_percentage,
        theme.heading_suffix
    )
}

fn line_label(line: &LineStats, theme: &Theme) -> String {
    if theme.show_symbols {
        format!("{} {}", line.symbol, line.name)
    } else {
        line.name.clone()
    }
}

fn line_percentage(line: &LineStats, theme: &Theme) -> String {
    let mut text = format!("{:.2}%", line.percentage);
    if line.complete {
        text.push_str(&theme.complete_suffix);
    }
    text
}

pub fn progress_bar_text(percentage: f64, theme: &Theme) -> String {
    let width = theme.progress_width;
    let filled = ((percentage.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    let mut bar = String::with_capacity(width + 12);
    bar.push('[');
    bar.extend(std::iter::repeat_n(theme.progress_fill, filled));
    bar.extend(std::iter::repeat_n(theme.progress_empty, width - filled));
    bar.push_str(&format!("] {percentage:.2}%"));
    bar
}

const COLUMNS: [&str; 3] = ["Line", "Number of stations visited", "Percentage"];

pub fn render_text(snapshot: &StatsSnapshot, theme: &Theme) -> String {
    let rows: Vec<[String; 3]> = snapshot
        .lines
        .iter()
        .map(|line| {
            [
                line_label(line, theme),
                line.visited.to_string(),
                line_percentage(line, theme),
            ]
        })
        .collect();

    let mut widths = COLUMNS.map(|title| title.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    out.push_str(&heading_text(snapshot, theme));
    out.push('\n');
    out.push_str(&progress_bar_text(snapshot.overall_percentage, theme));
    out.push_str("\n\n");
    push_row(&mut out, &COLUMNS.map(str::to_string), &widths);
    let rule = widths.map(|w| "-".repeat(w));
    push_row(&mut out, &rule, &widths);
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[String; 3], widths: &[usize; 3]) {
    out.push('|');
    for (cell, width) in cells.iter().zip(widths) {
        let pad = width - cell.chars().count();
        out.push(' ');
        out.push_str(cell);
        out.push_str(&" ".repeat(pad));
        out.push_str(" |");
    }
    out.push('\n');
}

/// The stats panel markup: heading, Bootstrap-style progress bar and table.
pub fn render_html(snapshot: &StatsSnapshot, theme: &Theme) -> String {
    let percentage = format!("{:.2}", snapshot.overall_percentage);
    let mut html = String::new();

    html.push_str(&format!(
        "<h3 id=\"statsHeading\">{}</h3>",
        escape_html(&heading_text(snapshot, theme))
    ));
    html.push_str(&format!(
        "<div class=\"progress\" id=\"statsProgress\" role=\"progressbar\" aria-label=\"Progress\" aria-valuenow=\"{percentage}\" aria-valuemin=\"0\" aria-valuemax=\"100\" style=\"height: 60px;\">"
    ));
    html.push_str(&format!(
        "<div class=\"progress-bar\" style=\"width: {percentage}%;\">{percentage}%</div></div>"
    ));

    html.push_str("<table class=\"table\" id=\"statsTable\"><thead><tr>");
    for title in COLUMNS {
        html.push_str(&format!("<th scope=\"col\">{title}</th>"));
    }
    html.push_str("</tr></thead><tbody>");
    for line in &snapshot.lines {
        html.push_str(&format!(
            "<tr><th scope=\"row\">{}</th><td>{}</td><td>{}</td></tr>",
            escape_html(&line_label(line, theme)),
            line.visited,
            escape_html(&line_percentage(line, theme))
        ));
    }
    html.push_str("</tbody></table>");
    html
}

pub fn render_json(snapshot: &StatsSnapshot) -> serde_json::Result<String> {
    serde_json::to_string_pretty(snapshot)
}

fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
