//! JSON file portfolio store.
//!
//! The whole portfolio is one JSON array rewritten on every change. A missing
//! file is an empty portfolio.

use crate::domain::error::ChartfolioError;
use crate::domain::portfolio::{EntryUpdate, NewEntry, PortfolioEntry};
use crate::ports::portfolio_port::PortfolioStore;
use chrono::Utc;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

pub struct JsonPortfolioAdapter {
    path: PathBuf,
}

impl JsonPortfolioAdapter {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<PortfolioEntry>, ChartfolioError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(ChartfolioError::Store {
                    reason: format!("failed to read {}: {}", self.path.display(), e),
                })
            }
        };

        if content.trim().is_empty() {
            warn!(file = %self.path.display(), "portfolio file is empty");
            return Ok(Vec::new());
        }

        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, entries: &[PortfolioEntry]) -> Result<(), ChartfolioError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(entries)?;
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, json)?;
        fs::rename(&staging, &self.path)?;

        debug!(file = %self.path.display(), entries = entries.len(), "saved portfolio");
        Ok(())
    }
}

impl PortfolioStore for JsonPortfolioAdapter {
    fn list(&self) -> Result<Vec<PortfolioEntry>, ChartfolioError> {
        self.load()
    }

    fn add(&self, entry: NewEntry) -> Result<PortfolioEntry, ChartfolioError> {
        let created = PortfolioEntry::create(Uuid::new_v4().to_string(), entry, Utc::now())?;
        let mut entries = self.load()?;
        entries.push(created.clone());
        self.save(&entries)?;
        Ok(created)
    }

    fn update(&self, id: &str, update: EntryUpdate) -> Result<PortfolioEntry, ChartfolioError> {
        let mut entries = self.load()?;
        let slot = entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| ChartfolioError::EntryNotFound { id: id.to_string() })?;

        let updated = update.apply_to(slot, Utc::now())?;
        *slot = updated.clone();
        self.save(&entries)?;
        Ok(updated)
    }

    fn delete(&self, id: &str) -> Result<bool, ChartfolioError> {
        let mut entries = self.load()?;
        let before = entries.len();
        entries.retain(|e| e.id != id);
        if entries.len() == before {
            return Ok(false);
        }
        self.save(&entries)?;
        Ok(true)
    }
}
