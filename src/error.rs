use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{task::estimate::MAX_ESTIMATE_DAYS, util::FileError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateField {
    Optimistic,
    MostLikely,
    Pessimistic,
}

impl fmt::Display for EstimateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EstimateField::Optimistic => write!(f, "optimistic"),
            EstimateField::MostLikely => write!(f, "most likely"),
            EstimateField::Pessimistic => write!(f, "pessimistic"),
        }
    }
}

/// A single three-point value outside the domain of durations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimateError {
    pub field: EstimateField,
    pub value: f64,
}

impl fmt::Display for EstimateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} duration must be between 0 and {} days, got {}",
            self.field, MAX_ESTIMATE_DAYS, self.value
        )
    }
}

impl std::error::Error for EstimateError {}

/// An [`EstimateError`] attributed to the task that carries it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvalidEstimate {
    pub task_id: String,
    pub field: EstimateField,
    pub value: f64,
}

impl InvalidEstimate {
    pub fn new(task_id: &str, err: EstimateError) -> Self {
        Self {
            task_id: task_id.to_string(),
            field: err.field,
            value: err.value,
        }
    }
}

impl fmt::Display for InvalidEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Task '{}': {} duration must be between 0 and {} days, got {}",
            self.task_id, self.field, MAX_ESTIMATE_DAYS, self.value
        )
    }
}

#[derive(Debug)]
pub enum CritpathError {
    TaskNotFound(String),
    DuplicateTask(String),
    UnknownDependency { task: String, dependency: String },
    CyclicDependency(Vec<String>),
    InvalidEstimate(InvalidEstimate),
    Io(std::io::Error),
    File(FileError),
    Parse(String),
}

impl fmt::Display for CritpathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CritpathError::TaskNotFound(id) => write!(f, "Task '{}' not found", id),
            CritpathError::DuplicateTask(id) => write!(f, "Task '{}' is defined more than once", id),
            CritpathError::UnknownDependency { task, dependency } => write!(
                f,
                "Task '{}' depends on '{}' which doesn't exist",
                task, dependency
            ),
            CritpathError::CyclicDependency(cycle) => {
                write!(f, "Circular dependency: {}", cycle.join(" -> "))?;
                if let Some(first) = cycle.first() {
                    write!(f, " -> {}", first)?;
                }
                Ok(())
            }
            CritpathError::InvalidEstimate(err) => write!(f, "Invalid estimate: {}", err),
            CritpathError::Io(err) => write!(f, "IO error: {}", err),
            CritpathError::File(err) => write!(f, "File error: {}", err),
            CritpathError::Parse(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for CritpathError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CritpathError::Io(err) => Some(err),
            CritpathError::File(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CritpathError {
    fn from(err: std::io::Error) -> Self {
        CritpathError::Io(err)
    }
}

impl From<FileError> for CritpathError {
    fn from(err: FileError) -> Self {
        CritpathError::File(err)
    }
}

impl From<InvalidEstimate> for CritpathError {
    fn from(err: InvalidEstimate) -> Self {
        CritpathError::InvalidEstimate(err)
    }
}

impl From<toml::de::Error> for CritpathError {
    fn from(err: toml::de::Error) -> Self {
        CritpathError::Parse(err.to_string())
    }
}

impl From<serde_json::Error> for CritpathError {
    fn from(err: serde_json::Error) -> Self {
        CritpathError::Parse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CritpathError>;
