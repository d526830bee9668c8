use std::fmt::Write;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    schedule::{CalendarEntry, Schedule},
    task::{format_days, round_days},
};

#[derive(ValueEnum, Deserialize, Clone, Debug)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable table.
    Text,
    /// The full schedule as pretty-printed JSON.
    Json,
}

/// Everything printed for one project file.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub file: String,
    pub project: Option<&'a str>,
    pub target: Option<&'a str>,
    pub schedule: &'a Schedule,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar: Option<Vec<CalendarEntry>>,
}

impl Report<'_> {
    pub fn render(&self, format: &OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Text => Ok(self.render_text()),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(self)?),
        }
    }

    fn render_text(&self) -> String {
        let mut out = String::new();
        let schedule = self.schedule;

        let _ = match (self.project, self.target) {
            (Some(name), Some(target)) => writeln!(out, "{} ({}) -> {}", name, self.file, target),
            (Some(name), None) => writeln!(out, "{} ({})", name, self.file),
            (None, Some(target)) => writeln!(out, "{} -> {}", self.file, target),
            (None, None) => writeln!(out, "{}", self.file),
        };

        if schedule.tasks.is_empty() {
            let _ = writeln!(out, "  no tasks");
            return out;
        }

        let id_width = schedule
            .tasks
            .iter()
            .map(|t| t.id.len())
            .max()
            .unwrap_or(0)
            .max("TASK".len());

        let _ = write!(
            out,
            "  {:<id_width$}  {:>8}  {:>6}  {:>6}  {:>6}",
            "TASK", "EXPECTED", "START", "FINISH", "SLACK"
        );
        if self.calendar.is_some() {
            let _ = write!(out, "  {:<10}  {:<10}", "FROM", "UNTIL");
        }
        let _ = writeln!(out);

        for (idx, task) in schedule.tasks.iter().enumerate() {
            let marker = if task.on_critical_path { "*" } else { " " };
            let _ = write!(
                out,
                "{} {:<id_width$}  {:>8}  {:>6}  {:>6}  {:>6}",
                marker,
                task.id,
                format_days(task.expected_duration),
                round_days(task.start),
                round_days(task.finish),
                round_days(task.slack),
            );
            if let Some(entry) = self.calendar.as_ref().and_then(|c| c.get(idx)) {
                let _ = write!(out, "  {}  {}", entry.start_date, entry.finish_date);
                if entry.overdue {
                    if let Some(deadline) = entry.deadline {
                        let _ = write!(out, "  overdue (deadline {})", deadline);
                    }
                }
            }
            let _ = writeln!(out);
        }

        let _ = writeln!(
            out,
            "Critical path: {} ({} days, std dev {:.1})",
            schedule.critical_path.join(" -> "),
            round_days(schedule.total_duration),
            schedule.critical_std_dev()
        );

        out
    }
}
