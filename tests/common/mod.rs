#![allow(dead_code)]

use std::cell::Cell;
use std::io::Write;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use stockdesk::domain::error::StockdeskError;
use stockdesk::domain::market::{generate, MarketSnapshot};
use stockdesk::domain::security::{sample_universe, Security};
use stockdesk::domain::strategy::StrategyDsl;
use stockdesk::ports::market_port::MarketPort;

/// Market feed that answers with a fixed snapshot or a fixed failure and
/// counts how often it was asked.
pub struct MockMarketFeed {
    pub response: Result<MarketSnapshot, String>,
    pub calls: Cell<u32>,
}

impl MockMarketFeed {
    pub fn live(snapshot: MarketSnapshot) -> Self {
        Self {
            response: Ok(snapshot),
            calls: Cell::new(0),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            response: Err(reason.to_string()),
            calls: Cell::new(0),
        }
    }
}

impl MarketPort for MockMarketFeed {
    fn fetch(&self, _timeout: Duration) -> Result<MarketSnapshot, StockdeskError> {
        self.calls.set(self.calls.get() + 1);
        self.response.clone().map_err(|reason| StockdeskError::Feed { reason })
    }
}

/// A live-looking snapshot whose derived fields are deliberately stale.
pub fn stale_live_snapshot() -> MarketSnapshot {
    let mut snapshot = generate(42);
    snapshot.vol_intensity = 0;
    snapshot.sentiment_score = 0;
    snapshot
}

pub fn security(code: &str) -> Security {
    sample_universe()
        .into_iter()
        .find(|s| s.code == code)
        .unwrap()
}

pub fn fixed_draft() -> StrategyDsl {
    StrategyDsl::draft_at(Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap())
}

pub fn named(name: &str) -> StrategyDsl {
    let mut dsl = fixed_draft();
    dsl.name = name.to_string();
    dsl
}

pub fn write_temp(content: &str, suffix: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

pub const UNIVERSE_CSV: &str = "\
code,name,industry,mcap_yi,pe,turnover_pct,price,change_pct,ma5_up,break_20d,rsi_rebound,region,concepts
600000,浦发银行,银行,2300,4.9,0.6,8.12,0.25,false,false,true,上海,红利|金融
002594,比亚迪,汽车,6800,22.4,2.9,245.1,3.42,true,true,false,深圳,新能源|汽车
688111,金山办公,软件,1300,88.0,5.6,280.5,-2.15,false,true,false,北京,AI|办公
";
