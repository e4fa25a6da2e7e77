//! Tabular (CSV) rendering of the trial log and summary.
//!
//! Column order is fixed by [`TRIAL_COLUMNS`] and never depends on the data.

use crate::stats::Summary;
use chrono::{NaiveDate, SecondsFormat};
use cogex_core::{ParticipantInfo, TrialRecord};
use std::borrow::Cow;

/// Byte-order mark so spreadsheet tools decode the file as UTF-8
pub const BOM: char = '\u{feff}';

pub const TRIAL_COLUMNS: [&str; 17] = [
    "participantName",
    "participantAge",
    "participantGender",
    "trial",
    "totalTrial",
    "phase",
    "task",
    "stimulus",
    "stimulusShape",
    "stimulusColor",
    "congruent",
    "taskSwitch",
    "correctResponse",
    "actualResponse",
    "rt",
    "status",
    "timestamp",
];

pub const SUMMARY_HEADING: &str = "=== SUMMARY STATISTICS ===";

pub fn escape_cell(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

fn record_cells(r: &TrialRecord) -> [String; 17] {
    [
        r.participant_name.clone(),
        r.participant_age.clone(),
        r.participant_gender.clone(),
        r.trial.to_string(),
        r.total_trial.to_string(),
        r.phase.as_str().to_string(),
        r.task.as_str().to_string(),
        r.stimulus.clone(),
        r.stimulus_shape.as_str().to_string(),
        r.stimulus_color.as_str().to_string(),
        r.congruent.to_string(),
        r.task_switch.to_string(),
        r.correct_response.as_str().to_string(),
        r.actual_response
            .map(|k| k.as_str().to_string())
            .unwrap_or_default(),
        r.rt.map(|rt| rt.to_string()).unwrap_or_default(),
        r.status.as_str().to_string(),
        r.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
    ]
}

fn ms(value: f64) -> String {
    format!("{}ms", value.round() as i64)
}

/// Fixed-label summary rows
pub fn summary_rows(summary: &Summary) -> [(&'static str, String); 8] {
    [
        ("Accuracy", format!("{:.1}%", summary.accuracy_percent)),
        ("Average RT (all correct)", ms(summary.mean_rt_ms)),
        ("Repeat trial RT", ms(summary.repeat_rt_ms)),
        ("Switch trial RT", ms(summary.switch_rt_ms)),
        ("Switch cost", ms(summary.switch_cost_ms)),
        ("Congruent trial RT", ms(summary.congruent_rt_ms)),
        ("Incongruent trial RT", ms(summary.incongruent_rt_ms)),
        ("Interference effect", ms(summary.interference_ms)),
    ]
}

fn push_row<'a>(out: &mut String, cells: impl IntoIterator<Item = &'a str>) {
    let mut first = true;
    for cell in cells {
        if !first {
            out.push(',');
        }
        out.push_str(&escape_cell(cell));
        first = false;
    }
}

/// Label/value row padded to the full column count
fn push_labeled_row(out: &mut String, label: &str, value: &str) {
    let mut cells = [""; 17];
    cells[0] = label;
    cells[1] = value;
    push_row(out, cells);
}

pub fn to_csv(records: &[TrialRecord], summary: &Summary) -> String {
    let mut out = String::new();
    out.push(BOM);
    push_row(&mut out, TRIAL_COLUMNS);

    for record in records {
        out.push('\n');
        let cells = record_cells(record);
        push_row(&mut out, cells.iter().map(String::as_str));
    }

    out.push('\n');
    push_row(&mut out, [""; 17]);
    out.push('\n');
    push_labeled_row(&mut out, SUMMARY_HEADING, "");
    for (label, value) in summary_rows(summary) {
        out.push('\n');
        push_labeled_row(&mut out, label, &value);
    }
    out
}

/// Participant identifier reduced to a single portable path component.
/// The CSV cells keep the identifier as entered.
pub fn file_safe_id(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

pub fn export_file_name(participant: &ParticipantInfo, date: NaiveDate) -> String {
    format!(
        "task_switching_{}_{}.csv",
        file_safe_id(&participant.name),
        date.format("%Y-%m-%d")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_delimiters_quotes_and_newlines() {
        assert_eq!(escape_cell("plain"), "plain");
        assert_eq!(escape_cell("a,b"), "\"a,b\"");
        assert_eq!(escape_cell("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_cell("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn header_is_the_fixed_schema() {
        let summary = Summary {
            participant_name: "P1".into(),
            participant_age: "20".into(),
            participant_gender: "f".into(),
            main_trials: 0,
            correct_trials: 0,
            accuracy_percent: 0.0,
            mean_rt_ms: 0.0,
            repeat_rt_ms: 0.0,
            switch_rt_ms: 0.0,
            switch_cost_ms: 0.0,
            congruent_rt_ms: 0.0,
            incongruent_rt_ms: 0.0,
            interference_ms: 0.0,
        };
        let csv = to_csv(&[], &summary);
        let mut lines = csv.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with(BOM));
        assert_eq!(header.trim_start_matches(BOM), TRIAL_COLUMNS.join(","));
        assert_eq!(lines.next().unwrap(), ",".repeat(16));
        assert!(lines.next().unwrap().starts_with(SUMMARY_HEADING));
        assert!(lines.next().unwrap().starts_with("Accuracy,0.0%,"));
        assert_eq!(lines.count(), 7);
    }
}
