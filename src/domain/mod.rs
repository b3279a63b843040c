//! Core domain types and logic.

pub mod prng;
pub mod seed;
pub mod security;
pub mod strategy;
pub mod nl_parser;
pub mod screen;
pub mod display;
pub mod market;
pub mod sentiment;
pub mod timeline;
pub mod analysis;
pub mod config_validation;
pub mod error;
