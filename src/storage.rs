//! Persistence for the behavior log and score history
//!
//! The engine never reaches for storage on its own; callers inject a
//! [`WellnessStore`] into [`WellnessProcessor`](crate::pipeline::WellnessProcessor).

use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::behavior::BehaviorLog;
use crate::error::WellnessError;
use crate::history::ScoreHistory;

/// File name of the persisted behavior log
pub const BEHAVIOR_LOG_FILE: &str = "behavior_log.json";

/// File name of the persisted score history
pub const SCORE_HISTORY_FILE: &str = "score_history.json";

/// Storage collaborator for engine state.
///
/// Loads return `Ok(None)` when nothing has been stored yet.
pub trait WellnessStore {
    fn load_log(&self) -> Result<Option<BehaviorLog>, WellnessError>;
    fn save_log(&mut self, log: &BehaviorLog) -> Result<(), WellnessError>;
    fn load_history(&self) -> Result<Option<ScoreHistory>, WellnessError>;
    fn save_history(&mut self, history: &ScoreHistory) -> Result<(), WellnessError>;
}

impl<S: WellnessStore + ?Sized> WellnessStore for Box<S> {
    fn load_log(&self) -> Result<Option<BehaviorLog>, WellnessError> {
        (**self).load_log()
    }

    fn save_log(&mut self, log: &BehaviorLog) -> Result<(), WellnessError> {
        (**self).save_log(log)
    }

    fn load_history(&self) -> Result<Option<ScoreHistory>, WellnessError> {
        (**self).load_history()
    }

    fn save_history(&mut self, history: &ScoreHistory) -> Result<(), WellnessError> {
        (**self).save_history(history)
    }
}

/// In-memory store holding serialized JSON, like browser local storage
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    log_json: Option<String>,
    history_json: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw serialized log, if any
    pub fn log_json(&self) -> Option<&str> {
        self.log_json.as_deref()
    }

    /// Raw serialized history, if any
    pub fn history_json(&self) -> Option<&str> {
        self.history_json.as_deref()
    }
}

impl WellnessStore for MemoryStore {
    fn load_log(&self) -> Result<Option<BehaviorLog>, WellnessError> {
        self.log_json
            .as_deref()
            .map(BehaviorLog::from_json)
            .transpose()
    }

    fn save_log(&mut self, log: &BehaviorLog) -> Result<(), WellnessError> {
        self.log_json = Some(log.to_json()?);
        Ok(())
    }

    fn load_history(&self) -> Result<Option<ScoreHistory>, WellnessError> {
        self.history_json
            .as_deref()
            .map(ScoreHistory::from_json)
            .transpose()
    }

    fn save_history(&mut self, history: &ScoreHistory) -> Result<(), WellnessError> {
        self.history_json = Some(history.to_json()?);
        Ok(())
    }
}

/// JSON files inside a data directory
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Platform data directory for mindwell
    pub fn default_location() -> Result<PathBuf, WellnessError> {
        ProjectDirs::from("", "", "mindwell")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| {
                WellnessError::StorageError("could not determine a home directory".to_string())
            })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn log_path(&self) -> PathBuf {
        self.dir.join(BEHAVIOR_LOG_FILE)
    }

    pub fn history_path(&self) -> PathBuf {
        self.dir.join(SCORE_HISTORY_FILE)
    }

    fn read(path: &Path) -> Result<Option<String>, WellnessError> {
        if !path.exists() {
            debug!(path = %path.display(), "no stored state");
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), WellnessError> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            WellnessError::StorageError(format!(
                "cannot create data directory {}: {e}",
                self.dir.display()
            ))
        })?;
        fs::write(path, contents)?;
        info!(path = %path.display(), bytes = contents.len(), "saved state");
        Ok(())
    }
}

impl WellnessStore for JsonFileStore {
    fn load_log(&self) -> Result<Option<BehaviorLog>, WellnessError> {
        Self::read(&self.log_path())?
            .as_deref()
            .map(BehaviorLog::from_json)
            .transpose()
    }

    fn save_log(&mut self, log: &BehaviorLog) -> Result<(), WellnessError> {
        let path = self.log_path();
        self.write(&path, &log.to_json()?)
    }

    fn load_history(&self) -> Result<Option<ScoreHistory>, WellnessError> {
        Self::read(&self.history_path())?
            .as_deref()
            .map(ScoreHistory::from_json)
            .transpose()
    }

    fn save_history(&mut self, history: &ScoreHistory) -> Result<(), WellnessError> {
        let path = self.history_path();
        self.write(&path, &history.to_json()?)
    }
}
