//! Portfolio entries (purchased lots) and per-entry analytics.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::domain::error::ChartfolioError;
use crate::domain::price_point::date_to_timestamp;

/// One lot of `quantity` shares of `symbol` bought on `purchase_date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioEntry {
    pub id: String,
    pub symbol: String,
    pub purchase_price: f64,
    pub purchase_date: NaiveDate,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl PortfolioEntry {
    /// Builds a stored entry from validated user input.
    pub fn create(id: String, entry: NewEntry, now: DateTime<Utc>) -> Result<Self, ChartfolioError> {
        entry.validate()?;
        Ok(Self {
            id,
            symbol: normalize_symbol(&entry.symbol),
            purchase_price: entry.purchase_price,
            purchase_date: entry.purchase_date,
            quantity: entry.quantity,
            created_at: now,
            updated_at: None,
        })
    }

    /// purchase_price * quantity
    pub fn cost_basis(&self) -> f64 {
        self.purchase_price * self.quantity as f64
    }

    /// Epoch seconds of the purchase date at UTC midnight.
    pub fn purchase_time(&self) -> i64 {
        date_to_timestamp(self.purchase_date)
    }

    pub fn market_value(&self, price: f64) -> f64 {
        price * self.quantity as f64
    }

    /// Dollar gain or loss at `current_price`; zero when the price is unknown.
    pub fn gain_loss(&self, current_price: Option<f64>) -> f64 {
        match current_price {
            Some(price) if price != 0.0 => self.market_value(price) - self.cost_basis(),
            _ => 0.0,
        }
    }

    pub fn gain_loss_percent(&self, current_price: Option<f64>) -> f64 {
        let cost_basis = self.cost_basis();
        if cost_basis == 0.0 {
            return 0.0;
        }
        self.gain_loss(current_price) / cost_basis * 100.0
    }

    /// This entry's share of `total_cost_basis`, in percent.
    pub fn portfolio_percent(&self, total_cost_basis: f64) -> f64 {
        if total_cost_basis == 0.0 {
            return 0.0;
        }
        self.cost_basis() / total_cost_basis * 100.0
    }
}

/// User-supplied fields for a new entry; the store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEntry {
    pub symbol: String,
    pub purchase_price: f64,
    pub purchase_date: NaiveDate,
    pub quantity: i64,
}

impl NewEntry {
    pub fn validate(&self) -> Result<(), ChartfolioError> {
        validate_fields(&self.symbol, self.purchase_price, self.quantity)
    }
}

/// Replacement values for an existing entry; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryUpdate {
    pub symbol: Option<String>,
    pub purchase_price: Option<f64>,
    pub purchase_date: Option<NaiveDate>,
    pub quantity: Option<i64>,
}

impl EntryUpdate {
    /// Returns `entry` with this update applied; id and created_at never change.
    pub fn apply_to(
        &self,
        entry: &PortfolioEntry,
        now: DateTime<Utc>,
    ) -> Result<PortfolioEntry, ChartfolioError> {
        let updated = PortfolioEntry {
            id: entry.id.clone(),
            symbol: self
                .symbol
                .as_deref()
                .map(normalize_symbol)
                .unwrap_or_else(|| entry.symbol.clone()),
            purchase_price: self.purchase_price.unwrap_or(entry.purchase_price),
            purchase_date: self.purchase_date.unwrap_or(entry.purchase_date),
            quantity: self.quantity.unwrap_or(entry.quantity),
            created_at: entry.created_at,
            updated_at: Some(now),
        };
        validate_fields(&updated.symbol, updated.purchase_price, updated.quantity)?;
        Ok(updated)
    }
}

pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

fn validate_fields(symbol: &str, purchase_price: f64, quantity: i64) -> Result<(), ChartfolioError> {
    if symbol.trim().is_empty() {
        return Err(ChartfolioError::InvalidEntry {
            reason: "symbol must not be empty".into(),
        });
    }
    if !purchase_price.is_finite() || purchase_price <= 0.0 {
        return Err(ChartfolioError::InvalidEntry {
            reason: format!("purchase price must be positive, got {}", purchase_price),
        });
    }
    if quantity <= 0 {
        return Err(ChartfolioError::InvalidEntry {
            reason: format!("quantity must be positive, got {}", quantity),
        });
    }
    Ok(())
}

/// Entries whose symbol matches `symbol`, ignoring case.
pub fn entries_by_symbol<'a>(entries: &'a [PortfolioEntry], symbol: &str) -> Vec<&'a PortfolioEntry> {
    entries
        .iter()
        .filter(|e| e.symbol.eq_ignore_ascii_case(symbol.trim()))
        .collect()
}

/// Distinct symbols in first-seen order.
pub fn distinct_symbols(entries: &[PortfolioEntry]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    entries
        .iter()
        .filter(|e| seen.insert(e.symbol.clone()))
        .map(|e| e.symbol.clone())
        .collect()
}

pub fn total_cost_basis(entries: &[PortfolioEntry]) -> f64 {
    entries.iter().map(PortfolioEntry::cost_basis).sum()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoldingRow {
    pub id: String,
    pub symbol: String,
    pub quantity: i64,
    pub purchase_price: f64,
    pub purchase_date: NaiveDate,
    pub cost_basis: f64,
    pub current_price: Option<f64>,
    pub gain_loss: f64,
    pub gain_loss_percent: f64,
    pub portfolio_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoldingsSummary {
    pub rows: Vec<HoldingRow>,
    pub total_cost_basis: f64,
    pub total_gain_loss: f64,
}

/// Per-entry holdings table against the given latest prices.
pub fn holdings_summary(
    entries: &[PortfolioEntry],
    prices: &HashMap<String, f64>,
) -> HoldingsSummary {
    let total = total_cost_basis(entries);
    let rows: Vec<HoldingRow> = entries
        .iter()
        .map(|entry| {
            let current_price = prices.get(&entry.symbol).copied();
            HoldingRow {
                id: entry.id.clone(),
                symbol: entry.symbol.clone(),
                quantity: entry.quantity,
                purchase_price: entry.purchase_price,
                purchase_date: entry.purchase_date,
                cost_basis: entry.cost_basis(),
                current_price,
                gain_loss: entry.gain_loss(current_price),
                gain_loss_percent: entry.gain_loss_percent(current_price),
                portfolio_percent: entry.portfolio_percent(total),
            }
        })
        .collect();
    let total_gain_loss = rows.iter().map(|r| r.gain_loss).sum();

    HoldingsSummary {
        rows,
        total_cost_basis: total,
        total_gain_loss,
    }
}
