pub mod config;
pub mod dependency;
pub mod estimate;

pub use config::{ProjectConfiguration, load_project, parse_project};
pub use dependency::{
    check_references, find_cycle, required_tasks, sort_topologically, validate_tasks,
};
pub use estimate::{Estimate, ThreePoint, expected_duration, format_days, round_days};

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::InvalidEstimate;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    #[default]
    #[serde(rename = "To Do", alias = "todo", alias = "to_do")]
    ToDo,
    #[serde(rename = "In Progress", alias = "in_progress")]
    InProgress,
    #[serde(rename = "Done", alias = "done")]
    Done,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::ToDo => write!(f, "To Do"),
            Status::InProgress => write!(f, "In Progress"),
            Status::Done => write!(f, "Done"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    #[serde(alias = "low")]
    Low,
    #[default]
    #[serde(alias = "medium")]
    Medium,
    #[serde(alias = "high")]
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Low => write!(f, "Low"),
            Priority::Medium => write!(f, "Medium"),
            Priority::High => write!(f, "High"),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct Task {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default, alias = "optimistic_duration")]
    pub optimistic: Option<f64>,
    #[serde(default, alias = "most_likely_duration")]
    pub most_likely: Option<f64>,
    #[serde(default, alias = "pessimistic_duration")]
    pub pessimistic: Option<f64>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
}

impl Task {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            title: id.to_string(),
            ..Default::default()
        }
    }

    pub fn with_dependencies(mut self, dependencies: &[&str]) -> Self {
        self.dependencies = dependencies.iter().map(|d| d.to_string()).collect();
        self
    }

    pub fn with_estimate(mut self, optimistic: f64, most_likely: f64, pessimistic: f64) -> Self {
        self.optimistic = Some(optimistic);
        self.most_likely = Some(most_likely);
        self.pessimistic = Some(pessimistic);
        self
    }

    pub fn estimate(&self) -> Estimate {
        Estimate {
            optimistic: self.optimistic,
            most_likely: self.most_likely,
            pessimistic: self.pessimistic,
        }
    }

    /// Validated three-point estimate; `Ok(None)` when the task is not
    /// estimated.
    pub fn resolve_estimate(&self) -> Result<Option<ThreePoint>, InvalidEstimate> {
        self.estimate()
            .resolve()
            .map_err(|err| InvalidEstimate::new(&self.id, err))
    }
}
