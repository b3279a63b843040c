//! stockdesk: rule-based stock screening with reproducible signal simulation.
//!
//! Hexagonal architecture: deterministic core logic in [`domain`], port traits
//! in [`ports`], concrete implementations in [`adapters`], and the command-line
//! surface in [`cli`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
