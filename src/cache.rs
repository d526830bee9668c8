use std::{
    collections::HashMap,
    fs::{self, File},
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::schedule::Schedule;

const CACHE_FILENAME: &str = "critpath_cache.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedSchedule {
    pub digest: String,
    pub schedule: Schedule,
}

/// Schedules by project file and target, each tagged with the digest of the
/// input it was computed from.
pub type Cache = HashMap<String, CachedSchedule>;

pub fn cache_entry_key(config_path: &Path, target: Option<&str>) -> String {
    let name = config_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    format!("{}#{}", name, target.unwrap_or(""))
}

pub fn content_digest(contents: &str, target: Option<&str>) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(contents.as_bytes());
    hasher.update(b"\0");
    hasher.update(target.unwrap_or("").as_bytes());
    hasher.finalize().to_hex().to_string()
}

/// Cached schedule for `key` if it was computed from the same input.
pub fn lookup<'a>(cache: &'a Cache, key: &str, digest: &str) -> Option<&'a Schedule> {
    cache
        .get(key)
        .filter(|entry| entry.digest == digest)
        .map(|entry| &entry.schedule)
}

pub fn load_cache(cache_dir: Option<&str>, config_path: &Path) -> Cache {
    let cache_path = get_cache_path(cache_dir, config_path);

    let file = match File::open(&cache_path) {
        Ok(file) => file,
        Err(_) => return Cache::default(),
    };

    let reader = BufReader::new(file);
    serde_json::from_reader(reader).unwrap_or_else(|e| {
        debug!(path = %cache_path.display(), "ignoring unreadable cache: {}", e);
        Cache::default()
    })
}

pub fn save_cache(cache: &Cache, cache_dir: Option<&str>, config_path: &Path) {
    let cache_path = get_cache_path(cache_dir, config_path);

    if let Some(parent) = cache_path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create cache directory: {}", e);
            return;
        }
    }

    match File::create(&cache_path) {
        Ok(file) => {
            let writer = BufWriter::new(file);
            if let Err(e) = serde_json::to_writer_pretty(writer, cache) {
                warn!("Failed to write cache file: {}", e);
            }
        }
        Err(e) => {
            warn!("Failed to open cache file for writing: {}", e);
        }
    }
}

fn get_cache_path(cache_dir: Option<&str>, config_path: &Path) -> PathBuf {
    let config_parent = config_path.parent().unwrap_or_else(|| Path::new("."));

    let cache_dir_path = match cache_dir {
        Some(dir) if Path::new(dir).is_absolute() => PathBuf::from(dir),
        Some(dir) => config_parent.join(dir),
        None => config_parent.to_path_buf(),
    };

    cache_dir_path.join(CACHE_FILENAME)
}
