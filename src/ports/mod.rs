//! Port traits for the collaborators around the core.

pub mod config_port;
pub mod market_port;
pub mod security_port;
pub mod strategy_store;
