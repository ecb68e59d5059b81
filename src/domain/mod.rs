//! Core domain types and logic.

pub mod config_validation;
pub mod date_range;
pub mod error;
pub mod indicator;
pub mod indicator_helpers;
pub mod performance_index;
pub mod portfolio;
pub mod price_lookup;
pub mod price_point;
