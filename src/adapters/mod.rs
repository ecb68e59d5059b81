//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod file_config_adapter;
pub mod json_portfolio_adapter;
pub mod memory_portfolio_adapter;
pub mod simulated_adapter;
