//! SQLite strategy store.
//!
//! Strategies are stored as one JSON document per row alongside the
//! columns used for lookup and ordering. Timestamps are RFC 3339 text at
//! microsecond precision, so text order is time order.

use crate::domain::error::StockdeskError;
use crate::domain::strategy::StrategyDsl;
use crate::domain::config_validation::AppSettings;
use crate::ports::strategy_store::{
    clamp_run_limit, new_record_id, prepare_for_create, record_time, StrategyRun, StrategyStore,
};
use chrono::{DateTime, SecondsFormat, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};

pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
}

fn db_error(e: r2d2::Error) -> StockdeskError {
    StockdeskError::Database {
        reason: e.to_string(),
    }
}

fn query_error(e: rusqlite::Error) -> StockdeskError {
    StockdeskError::DatabaseQuery {
        reason: e.to_string(),
    }
}

fn format_time(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_time(raw: &str) -> Result<DateTime<Utc>, StockdeskError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e: chrono::ParseError| StockdeskError::Database {
            reason: format!("invalid timestamp {raw:?}: {e}"),
        })
}

impl SqliteAdapter {
    /// Open the configured database file and make sure the schema exists.
    pub fn from_settings(settings: &AppSettings) -> Result<Self, StockdeskError> {
        let db_path = settings
            .sqlite_path
            .as_ref()
            .ok_or_else(|| StockdeskError::ConfigMissing {
                section: "sqlite".into(),
                key: "path".into(),
            })?;

        let adapter = Self::open(&db_path.to_string_lossy(), settings.sqlite_pool_size.max(1))?;
        adapter.initialize_schema()?;
        Ok(adapter)
    }

    pub fn open(db_path: &str, pool_size: u32) -> Result<Self, StockdeskError> {
        let manager = SqliteConnectionManager::file(db_path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(db_error)?;

        Ok(Self { pool })
    }

    pub fn in_memory() -> Result<Self, StockdeskError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(db_error)?;

        Ok(Self { pool })
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, StockdeskError> {
        self.pool.get().map_err(db_error)
    }

    pub fn initialize_schema(&self) -> Result<(), StockdeskError> {
        self.conn()?
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS strategies (
                    id TEXT PRIMARY KEY,
                    name TEXT NOT NULL,
                    dsl TEXT NOT NULL,
                    created_at TEXT NOT NULL
                );
                CREATE TABLE IF NOT EXISTS strategy_runs (
                    id TEXT PRIMARY KEY,
                    strategy_id TEXT NOT NULL REFERENCES strategies(id),
                    params TEXT NOT NULL,
                    result TEXT NOT NULL,
                    created_at TEXT NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_strategies_created ON strategies(created_at);
                CREATE INDEX IF NOT EXISTS idx_runs_strategy ON strategy_runs(strategy_id, created_at);",
            )
            .map_err(query_error)
    }
}

impl StrategyStore for SqliteAdapter {
    fn create(&self, strategy: &StrategyDsl) -> Result<StrategyDsl, StockdeskError> {
        let stored = prepare_for_create(strategy)?;
        let id = stored.id.clone().unwrap_or_default();
        let dsl = serde_json::to_string(&stored)?;

        self.conn()?
            .execute(
                "INSERT INTO strategies (id, name, dsl, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![id, stored.name, dsl, format_time(&stored.created_at)],
            )
            .map_err(query_error)?;

        Ok(stored)
    }

    fn list(&self) -> Result<Vec<StrategyDsl>, StockdeskError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT dsl FROM strategies ORDER BY created_at DESC, rowid DESC")
            .map_err(query_error)?;

        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(query_error)?;

        let mut strategies = Vec::new();
        for row in rows {
            let dsl = row.map_err(query_error)?;
            strategies.push(serde_json::from_str(&dsl)?);
        }
        Ok(strategies)
    }

    fn get(&self, id: &str) -> Result<Option<StrategyDsl>, StockdeskError> {
        let dsl: Option<String> = self
            .conn()?
            .query_row(
                "SELECT dsl FROM strategies WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()
            .map_err(query_error)?;

        match dsl {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
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

        self.conn()?
            .execute(
                "INSERT INTO strategy_runs (id, strategy_id, params, result, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    run.id,
                    run.strategy_id,
                    serde_json::to_string(&run.params)?,
                    serde_json::to_string(&run.result)?,
                    format_time(&run.created_at)
                ],
            )
            .map_err(query_error)?;

        Ok(run)
    }

    fn list_runs(
        &self,
        strategy_id: &str,
        limit: usize,
    ) -> Result<Vec<StrategyRun>, StockdeskError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, strategy_id, params, result, created_at
                 FROM strategy_runs
                 WHERE strategy_id = ?1
                 ORDER BY created_at DESC, rowid DESC
                 LIMIT ?2",
            )
            .map_err(query_error)?;

        let rows = stmt
            .query_map(params![strategy_id, clamp_run_limit(limit) as i64], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })
            .map_err(query_error)?;

        let mut runs = Vec::new();
        for row in rows {
            let (id, strategy_id, params, result, created_at) = row.map_err(query_error)?;
            runs.push(StrategyRun {
                id,
                strategy_id,
                params: serde_json::from_str(&params)?,
                result: serde_json::from_str(&result)?,
                created_at: parse_time(&created_at)?,
            });
        }
        Ok(runs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::strategy::{ExitPattern, TechTrigger};
    use serde_json::json;

    fn store() -> SqliteAdapter {
        let adapter = SqliteAdapter::in_memory().unwrap();
        adapter.initialize_schema().unwrap();
        adapter
    }

    fn named(name: &str) -> StrategyDsl {
        let mut d = StrategyDsl::draft();
        d.name = name.into();
        d
    }

    #[test]
    fn from_settings_missing_path() {
        let result = SqliteAdapter::from_settings(&AppSettings::default());
        match result {
            Err(StockdeskError::ConfigMissing { section, key }) => {
                assert_eq!(section, "sqlite");
                assert_eq!(key, "path");
            }
            Err(other) => panic!("expected ConfigMissing, got: {other}"),
            Ok(_) => panic!("expected error, got Ok"),
        }
    }

    #[test]
    fn schema_is_idempotent() {
        let adapter = store();
        adapter.initialize_schema().unwrap();
    }

    #[test]
    fn create_and_get_round_trip() {
        let adapter = store();
        let mut d = named("趋势小盘策略");
        d.filters.mcap_max_yi = Some(300.0);
        d.filters.tech = Some(TechTrigger::MaUp5);
        d.exits.exit_pattern = Some(ExitPattern::CloseBelowMa10);
        d.nl = "市值低于300亿".into();

        let created = adapter.create(&d).unwrap();
        let id = created.id.clone().unwrap();
        let fetched = adapter.get(&id).unwrap().unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.filters.tech, Some(TechTrigger::MaUp5));
    }

    #[test]
    fn create_rejects_blank_name() {
        let adapter = store();
        let err = adapter.create(&StrategyDsl::draft()).unwrap_err();
        assert!(matches!(err, StockdeskError::Invalid { .. }));
        assert!(adapter.list().unwrap().is_empty());
    }

    #[test]
    fn get_missing_is_none() {
        assert!(store().get("stg_0000000000000000").unwrap().is_none());
    }

    #[test]
    fn list_is_newest_first() {
        let adapter = store();
        let a = adapter.create(&named("甲")).unwrap();
        let b = adapter.create(&named("乙")).unwrap();
        let c = adapter.create(&named("丙")).unwrap();
        let ids: Vec<_> = adapter.list().unwrap().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![c.id, b.id, a.id]);
    }

    #[test]
    fn runs_round_trip_newest_first() {
        let adapter = store();
        let id = adapter.create(&named("甲")).unwrap().id.unwrap();
        let first = adapter
            .record_run(&id, &json!({ "code": "600519", "days": 60 }), &json!({ "count": 8 }))
            .unwrap();
        let second = adapter
            .record_run(&id, &json!({ "code": "601318", "days": 90 }), &json!({ "count": 10 }))
            .unwrap();

        let runs = adapter.list_runs(&id, 20).unwrap();
        assert_eq!(runs, vec![second, first]);
        assert_eq!(adapter.list_runs(&id, 1).unwrap().len(), 1);
    }

    #[test]
    fn run_for_unknown_strategy_is_not_found() {
        let adapter = store();
        let err = adapter.record_run("stg_x", &json!({}), &json!({})).unwrap_err();
        assert!(matches!(err, StockdeskError::NotFound { .. }));
    }

    #[test]
    fn file_database_persists_between_adapters() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stockdesk.db");
        let path = path.to_str().unwrap();

        let id = {
            let adapter = SqliteAdapter::open(path, 2).unwrap();
            adapter.initialize_schema().unwrap();
            adapter.create(&named("持久")).unwrap().id.unwrap()
        };

        let reopened = SqliteAdapter::open(path, 2).unwrap();
        reopened.initialize_schema().unwrap();
        assert_eq!(reopened.get(&id).unwrap().unwrap().name, "持久");
    }
}
