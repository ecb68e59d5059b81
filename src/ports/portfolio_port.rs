//! Portfolio storage port trait.

use crate::domain::error::ChartfolioError;
use crate::domain::portfolio::{EntryUpdate, NewEntry, PortfolioEntry};

/// Repository of portfolio entries keyed by id.
pub trait PortfolioStore {
    fn list(&self) -> Result<Vec<PortfolioEntry>, ChartfolioError>;

    fn get(&self, id: &str) -> Result<Option<PortfolioEntry>, ChartfolioError> {
        Ok(self.list()?.into_iter().find(|e| e.id == id))
    }

    fn add(&self, entry: NewEntry) -> Result<PortfolioEntry, ChartfolioError>;

    fn update(&self, id: &str, update: EntryUpdate) -> Result<PortfolioEntry, ChartfolioError>;

    /// Removes the entry; returns whether it existed.
    fn delete(&self, id: &str) -> Result<bool, ChartfolioError>;
}
