// Persisted record of a running fixture
// Lets one process start the fixture and another tear it down

use crate::errors::{FixtureError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const STATE_FILE: &str = "fixture-state.yaml";

/// Tracked values of a started fixture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureRecord {
    pub address: String,
    pub container: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scratch_dir: Option<PathBuf>,
    pub docker: String,
    pub image_ref: String,
    pub started_at: DateTime<Utc>,
    /// The runtime rejected `run`; there may be no container to stop
    #[serde(default)]
    pub launch_failed: bool,
}

pub struct StateManager {
    state_root: PathBuf,
}

impl StateManager {
    /// Create a StateManager rooted at `state_root`, creating it if needed
    pub fn new(state_root: &Path) -> Result<Self> {
        if !state_root.exists() {
            fs::create_dir_all(state_root)?;

            // Keep state out of version control
            let gitignore_path = state_root.join(".gitignore");
            let mut gitignore = fs::File::create(gitignore_path)?;
            writeln!(gitignore, "*")?;
        }

        Ok(Self {
            state_root: state_root.to_path_buf(),
        })
    }

    pub fn path(&self) -> PathBuf {
        self.state_root.join(STATE_FILE)
    }

    pub fn save(&self, record: &FixtureRecord) -> Result<()> {
        let yaml = serde_yml::to_string(record)
            .map_err(|e| FixtureError::State(format!("Failed to serialize record: {}", e)))?;
        fs::write(self.path(), yaml)?;
        Ok(())
    }

    /// Load the saved record, `None` when nothing is tracked
    pub fn load(&self) -> Result<Option<FixtureRecord>> {
        let path = self.path();
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)?;
        let record: FixtureRecord = serde_yml::from_str(&content).map_err(|e| {
            FixtureError::State(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        Ok(Some(record))
    }

    /// Forget the saved record. Idempotent.
    pub fn remove(&self) -> Result<()> {
        let path = self.path();
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}
