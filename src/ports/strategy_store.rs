//! Strategy persistence port.

use crate::domain::error::StockdeskError;
use crate::domain::strategy::StrategyDsl;
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

pub const MAX_RUNS_LIMIT: usize = 100;

/// One recorded simulation of a stored strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyRun {
    pub id: String,
    pub strategy_id: String,
    pub params: serde_json::Value,
    pub result: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

pub trait StrategyStore {
    /// Persist a named strategy, assigning its id and creation time.
    fn create(&self, strategy: &StrategyDsl) -> Result<StrategyDsl, StockdeskError>;

    /// Newest first.
    fn list(&self) -> Result<Vec<StrategyDsl>, StockdeskError>;

    fn get(&self, id: &str) -> Result<Option<StrategyDsl>, StockdeskError>;

    fn record_run(
        &self,
        strategy_id: &str,
        params: &serde_json::Value,
        result: &serde_json::Value,
    ) -> Result<StrategyRun, StockdeskError>;

    /// Runs of one strategy, newest first, at most `limit`.
    fn list_runs(&self, strategy_id: &str, limit: usize)
        -> Result<Vec<StrategyRun>, StockdeskError>;
}

/// `prefix_` followed by 16 random hex digits.
pub fn new_record_id(prefix: &str) -> String {
    format!("{}_{:016x}", prefix, rand::random::<u64>())
}

/// Timestamp at the precision stores keep.
pub fn record_time() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

pub fn clamp_run_limit(limit: usize) -> usize {
    limit.clamp(1, MAX_RUNS_LIMIT)
}

/// Validate and stamp a strategy about to be stored.
pub fn prepare_for_create(strategy: &StrategyDsl) -> Result<StrategyDsl, StockdeskError> {
    let name = strategy.name.trim();
    if name.is_empty() {
        return Err(StockdeskError::Invalid {
            reason: "strategy name is required".into(),
        });
    }
    let mut stored = strategy.clone();
    stored.id = Some(new_record_id("stg"));
    stored.name = name.to_string();
    stored.created_at = record_time();
    stored.refresh_tags();
    Ok(stored)
}
