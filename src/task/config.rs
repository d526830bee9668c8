use std::{fs, path::Path};

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

use super::{Task, dependency::validate_tasks};
use crate::{
    error::{CritpathError, Result},
    output::OutputFormat,
};

#[derive(Debug, Deserialize)]
struct ProjectFile {
    #[serde(rename = "task", default)]
    tasks: toml::Table,
    project: Option<ProjectSection>,
    config: Option<ConfigSection>,
}

#[derive(Debug, Deserialize)]
struct ProjectSection {
    name: Option<String>,
    start_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
struct ConfigSection {
    default: Option<String>,
    cache_dir: Option<String>,
    format: Option<OutputFormat>,
}

#[derive(Debug)]
pub struct ProjectConfiguration {
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub tasks: Vec<Task>,
    pub default_task: Option<String>,
    pub cache_dir: Option<String>,
    pub format: Option<OutputFormat>,
}

pub fn load_project(config_path: &Path) -> Result<ProjectConfiguration> {
    let contents = fs::read_to_string(config_path)?;
    debug!(path = %config_path.display(), bytes = contents.len(), "read project file");
    parse_project(&contents)
}

pub fn parse_project(contents: &str) -> Result<ProjectConfiguration> {
    let file: ProjectFile = toml::from_str(contents)?;
    process_project(file)
}

fn process_project(file: ProjectFile) -> Result<ProjectConfiguration> {
    let (name, start_date) = match file.project {
        Some(project) => (project.name, project.start_date),
        None => (None, None),
    };
    let default_task = file.config.as_ref().and_then(|c| c.default.clone());
    let cache_dir = file.config.as_ref().and_then(|c| c.cache_dir.clone());
    let format = file.config.as_ref().and_then(|c| c.format.clone());

    let tasks = file
        .tasks
        .into_iter()
        .map(|(name, value)| {
            let mut task: Task = value
                .try_into()
                .map_err(|e| CritpathError::Parse(format!("task '{}': {}", name, e)))?;
            if task.id.is_empty() {
                task.id = name;
            }
            if task.title.is_empty() {
                task.title = task.id.clone();
            }
            Ok(task)
        })
        .collect::<Result<Vec<Task>>>()?;

    validate_tasks(&tasks)?;

    Ok(ProjectConfiguration {
        name,
        start_date,
        tasks,
        default_task,
        cache_dir,
        format,
    })
}
