use crate::util::now_rfc3339;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Durable marker of the most recently completed item. Present only while a
/// run is in progress; removed once the loop reaches the end of the list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub last_index: usize,
    pub total_items: usize,
    pub last_updated: String,
}

pub struct CheckpointFile {
    path: PathBuf,
}

impl CheckpointFile {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Absent means not-started-or-finished; a corrupt file is downgraded to
    /// absent with a warning so a damaged checkpoint can't wedge the job.
    pub fn load(&self) -> Option<Checkpoint> {
        if !self.path.exists() {
            return None;
        }
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) => {
                warn!("ignoring unreadable checkpoint {}: {err}", self.path.display());
                return None;
            }
        };
        match serde_json::from_str::<Checkpoint>(&raw) {
            Ok(ckpt) => {
                info!(
                    "checkpoint found, last completed item {}/{}",
                    ckpt.last_index + 1,
                    ckpt.total_items
                );
                Some(ckpt)
            }
            Err(err) => {
                warn!("ignoring corrupt checkpoint {}: {err}", self.path.display());
                None
            }
        }
    }

    pub fn save(&self, index: usize, total: usize) -> Result<()> {
        let ckpt = Checkpoint {
            last_index: index,
            total_items: total,
            last_updated: now_rfc3339(),
        };
        std::fs::write(&self.path, serde_json::to_string_pretty(&ckpt)?)
            .with_context(|| format!("writing checkpoint: {}", self.path.display()))
    }

    /// Called only after the final snapshot write.
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)
                .with_context(|| format!("removing checkpoint: {}", self.path.display()))?;
            info!("checkpoint removed (run complete)");
        }
        Ok(())
    }
}

pub fn start_index(ckpt: Option<&Checkpoint>) -> usize {
    ckpt.map(|c| c.last_index + 1).unwrap_or(0)
}
