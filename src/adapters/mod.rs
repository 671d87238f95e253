//! Concrete port implementations.

pub mod clock_adapter;
pub mod csv_bar_adapter;
pub mod file_config_adapter;
pub mod paper_broker_adapter;
