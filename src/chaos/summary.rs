//! Console rendering for experiment runs

use chrono::{DateTime, TimeZone};

use super::types::ExperimentResult;

const RULE_WIDTH: usize = 99;
const COLUMN_WIDTH: usize = 25;
const HEADERS: [&str; 4] = ["#", "Start Time", "Experiment", "Status"];

pub fn format_timestamp<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Three-line starred banner around `title`
pub fn banner(title: &str) -> String {
    let rule = "*".repeat(RULE_WIDTH);
    format!("{rule}\n* {title}\n{rule}")
}

/// Right-align each cell to the column width, after an empty leading column
fn row(cells: &[&str]) -> String {
    let mut line = format!("{:>width$}", "", width = COLUMN_WIDTH);
    for cell in cells {
        line.push_str(&format!("{:>width$}", cell, width = COLUMN_WIDTH));
    }
    line
}

/// Summary table printed once all experiments have run
pub fn render_summary(results: &[ExperimentResult]) -> String {
    let mut out = banner("Experiments Result Summary");
    out.push_str("\n\n");
    out.push_str(&row(&HEADERS));
    out.push('\n');

    for (i, result) in results.iter().enumerate() {
        let number = (i + 1).to_string();
        let started = format_timestamp(&result.start_time);
        out.push_str(&row(&[&number, &started, &result.name, &result.status]));
        out.push('\n');
    }

    out.push_str("\n\n");
    out
}
