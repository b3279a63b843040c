//! In-process security provider and strategy store.
//!
//! Holds a fixed universe and keeps strategies and runs in memory for the
//! life of the adapter. The CLI reads the sample universe from it when no
//! CSV universe is configured, while strategy storage there always goes
//! through SQLite.

use crate::domain::error::StockdeskError;
use crate::domain::security::{self, Security};
use crate::domain::strategy::StrategyDsl;
use crate::ports::security_port::SecurityPort;
use crate::ports::strategy_store::{
    clamp_run_limit, new_record_id, prepare_for_create, record_time, StrategyRun, StrategyStore,
};
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
pub struct MemoryAdapter {
    universe: Vec<Security>,
    strategies: Mutex<Vec<StrategyDsl>>,
    runs: Mutex<Vec<StrategyRun>>,
}

impl MemoryAdapter {
    /// Built-in eight-stock sample universe, empty store.
    pub fn sample() -> Self {
        Self::with_universe(security::sample_universe())
    }

    pub fn with_universe(universe: Vec<Security>) -> Self {
        Self {
            universe,
            ..Self::default()
        }
    }

    fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StockdeskError> {
        mutex.lock().map_err(|e| StockdeskError::Database {
            reason: format!("memory store poisoned: {e}"),
        })
    }
}

impl SecurityPort for MemoryAdapter {
    fn list_securities(&self) -> Result<Vec<Security>, StockdeskError> {
        Ok(self.universe.clone())
    }

    fn search(&self, query: &str) -> Result<Vec<Security>, StockdeskError> {
        Ok(security::search(&self.universe, query)
            .into_iter()
            .cloned()
            .collect())
    }

    fn get_security(&self, code: &str) -> Result<Option<Security>, StockdeskError> {
        Ok(security::find_by_code(&self.universe, code).cloned())
    }
}

impl StrategyStore for MemoryAdapter {
    fn create(&self, strategy: &StrategyDsl) -> Result<StrategyDsl, StockdeskError> {
        let stored = prepare_for_create(strategy)?;
        Self::lock(&self.strategies)?.push(stored.clone());
        Ok(stored)
    }

    fn list(&self) -> Result<Vec<StrategyDsl>, StockdeskError> {
        let strategies = Self::lock(&self.strategies)?;
        Ok(strategies.iter().rev().cloned().collect())
    }

    fn get(&self, id: &str) -> Result<Option<StrategyDsl>, StockdeskError> {
        let strategies = Self::lock(&self.strategies)?;
        Ok(strategies
            .iter()
            .find(|s| s.id.as_deref() == Some(id))
            .cloned())
    }

    fn record_run(
        &self,
        strategy_id: &str,
        params: &serde_json::Value,
        result: &serde_json::Value,
    ) -> Result<StrategyRun, StockdeskError> {
        if self.get(strategy_id)?.is_none() {
            return Err(StockdeskError::not_found("strategy", strategy_id));
        }
        let run = StrategyRun {
            id: new_record_id("run"),
            strategy_id: strategy_id.to_string(),
            params: params.clone(),
            result: result.clone(),
            created_at: record_time(),
        };
        Self::lock(&self.runs)?.push(run.clone());
        Ok(run)
    }

    fn list_runs(
        &self,
        strategy_id: &str,
        limit: usize,
    ) -> Result<Vec<StrategyRun>, StockdeskError> {
        let runs = Self::lock(&self.runs)?;
        Ok(runs
            .iter()
            .rev()
            .filter(|r| r.strategy_id == strategy_id)
            .take(clamp_run_limit(limit))
            .cloned()
            .collect())
    }
}
