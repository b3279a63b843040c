//! Market feed backed by a JSON snapshot file.
//!
//! The read runs on a worker thread and is abandoned after the timeout.

use crate::domain::error::StockdeskError;
use crate::domain::market::MarketSnapshot;
use crate::ports::market_port::MarketPort;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use tracing::debug;

pub struct JsonMarketAdapter {
    path: PathBuf,
}

impl JsonMarketAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn read(path: &PathBuf) -> Result<MarketSnapshot, StockdeskError> {
        let content = std::fs::read_to_string(path).map_err(|e| StockdeskError::Feed {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;
        let snapshot: MarketSnapshot =
            serde_json::from_str(&content).map_err(|e| StockdeskError::Feed {
                reason: format!("malformed snapshot {}: {}", path.display(), e),
            })?;
        if snapshot.indices.is_empty() {
            return Err(StockdeskError::Feed {
                reason: "snapshot has no indices".into(),
            });
        }
        Ok(snapshot)
    }
}

impl MarketPort for JsonMarketAdapter {
    fn fetch(&self, timeout: Duration) -> Result<MarketSnapshot, StockdeskError> {
        let (tx, rx) = mpsc::channel();
        let path = self.path.clone();
        thread::spawn(move || {
            // receiver may be gone after a timeout
            let _ = tx.send(Self::read(&path));
        });

        debug!(path = %self.path.display(), ?timeout, "fetching market snapshot");
        match rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => Err(StockdeskError::Feed {
                reason: format!("timed out after {}s", timeout.as_secs_f64()),
            }),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(StockdeskError::Feed {
                reason: "feed worker exited without a result".into(),
            }),
        }
    }
}
