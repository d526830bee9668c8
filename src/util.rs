use glob::{GlobError, PatternError, glob};
use std::{collections::HashSet, fmt, path::PathBuf};

#[derive(Debug)]
pub enum FileError {
    GlobPattern(PatternError),
    GlobExpansion(GlobError),
    NoMatches(String),
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileError::GlobPattern(e) => write!(f, "Invalid glob pattern: {}", e),
            FileError::GlobExpansion(e) => write!(f, "Failed to expand glob: {}", e),
            FileError::NoMatches(pattern) => write!(f, "No project files match '{}'", pattern),
        }
    }
}

impl std::error::Error for FileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FileError::GlobPattern(e) => Some(e),
            FileError::GlobExpansion(e) => Some(e),
            FileError::NoMatches(_) => None,
        }
    }
}

impl From<PatternError> for FileError {
    fn from(err: PatternError) -> Self {
        FileError::GlobPattern(err)
    }
}

impl From<GlobError> for FileError {
    fn from(err: GlobError) -> Self {
        FileError::GlobExpansion(err)
    }
}

/// Resolves `--file` into the project files to analyse.
///
/// Plain paths are returned untouched so a missing file surfaces as an IO
/// error when it is read. Glob patterns expand to the matching regular files
/// in sorted order.
pub fn expand_project_files(pattern: &str) -> Result<Vec<PathBuf>, FileError> {
    if !is_glob_pattern(pattern) {
        return Ok(vec![PathBuf::from(pattern)]);
    }

    let mut seen = HashSet::new();
    let mut result: Vec<PathBuf> = glob(pattern)?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .filter(|path| path.is_file() && seen.insert(path.clone()))
        .collect();

    if result.is_empty() {
        return Err(FileError::NoMatches(pattern.to_string()));
    }

    result.sort();
    Ok(result)
}

fn is_glob_pattern(path: &str) -> bool {
    path.contains('*') || path.contains('?') || path.contains('[')
}
