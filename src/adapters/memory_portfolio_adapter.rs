//! In-memory portfolio store with sequential ids.

use crate::domain::error::ChartfolioError;
use crate::domain::portfolio::{EntryUpdate, NewEntry, PortfolioEntry};
use crate::ports::portfolio_port::PortfolioStore;
use chrono::Utc;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
pub struct MemoryPortfolioAdapter {
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    entries: Vec<PortfolioEntry>,
    next_id: u64,
}

impl MemoryPortfolioAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with existing entries, keeping their ids. New ids
    /// continue after the highest seeded `entry-N`.
    pub fn with_entries(entries: Vec<PortfolioEntry>) -> Self {
        let next_id = entries
            .iter()
            .filter_map(|e| e.id.strip_prefix("entry-")?.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        Self {
            state: Mutex::new(State { entries, next_id }),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, ChartfolioError> {
        self.state.lock().map_err(|_| ChartfolioError::Store {
            reason: "portfolio lock poisoned".into(),
        })
    }
}

impl PortfolioStore for MemoryPortfolioAdapter {
    fn list(&self) -> Result<Vec<PortfolioEntry>, ChartfolioError> {
        Ok(self.lock()?.entries.clone())
    }

    fn add(&self, entry: NewEntry) -> Result<PortfolioEntry, ChartfolioError> {
        let mut state = self.lock()?;
        let mut next_id = state.next_id + 1;
        while state.entries.iter().any(|e| e.id == format!("entry-{next_id}")) {
            next_id += 1;
        }
        let created = PortfolioEntry::create(format!("entry-{next_id}"), entry, Utc::now())?;
        state.next_id = next_id;
        state.entries.push(created.clone());
        Ok(created)
    }

    fn update(&self, id: &str, update: EntryUpdate) -> Result<PortfolioEntry, ChartfolioError> {
        let mut state = self.lock()?;
        let slot = state
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| ChartfolioError::EntryNotFound { id: id.to_string() })?;
        *slot = update.apply_to(slot, Utc::now())?;
        Ok(slot.clone())
    }

    fn delete(&self, id: &str) -> Result<bool, ChartfolioError> {
        let mut state = self.lock()?;
        let before = state.entries.len();
        state.entries.retain(|e| e.id != id);
        Ok(state.entries.len() != before)
    }
}
