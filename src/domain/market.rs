//! Synthetic market snapshot generation and the live-feed fallback.
//!
//! [`generate`] draws every input field from one xorshift stream in a fixed
//! order, so a seed always regenerates the identical snapshot. Derived
//! scores are then computed from the snapshot's own inputs.

use crate::domain::prng::Xorshift32;
use crate::domain::sentiment;
use crate::ports::market_port::MarketPort;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_MARKET_SEED: u32 = 1_234_567;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexQuote {
    pub name: String,
    pub value: f64,
    pub chg_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sector {
    pub name: String,
    pub gain_pct: f64,
    pub money_yi: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
    pub indices: Vec<IndexQuote>,
    pub turnover_yi: f64,
    #[serde(default)]
    pub turnover_delta_pct: Option<f64>,
    #[serde(default)]
    pub north_yi: Option<f64>,
    #[serde(default)]
    pub main_force_yi: Option<f64>,
    pub adv: u32,
    pub decl: u32,
    pub vol_change_pct: f64,
    pub up_limit: u32,
    pub down_limit: u32,
    pub sectors: Vec<Sector>,
    #[serde(default)]
    pub vol_intensity: u32,
    #[serde(default)]
    pub sentiment_score: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectorView {
    Gainers,
    Money,
}

impl SectorView {
    fn key(self, sector: &Sector) -> f64 {
        match self {
            SectorView::Gainers => sector.gain_pct,
            SectorView::Money => sector.money_yi,
        }
    }
}

impl MarketSnapshot {
    /// Recompute `vol_intensity` and `sentiment_score` from the inputs.
    /// Missing indices count as unchanged.
    pub fn refresh_derived(&mut self) {
        let chg = |i: usize| self.indices.get(i).map_or(0.0, |q| q.chg_pct);
        self.vol_intensity = sentiment::vol_intensity(chg(0), chg(2), self.vol_change_pct);
        self.sentiment_score = sentiment::sentiment_score(
            self.adv,
            self.decl,
            self.vol_change_pct,
            self.up_limit,
            self.down_limit,
        );
    }

    pub fn advance_decline_ratio(&self) -> f64 {
        f64::from(self.adv) / f64::from(self.decl.max(1))
    }

    /// Sectors sorted descending by the view's key. Ties keep snapshot order.
    pub fn ranked_sectors(&self, view: SectorView) -> Vec<&Sector> {
        let mut rows: Vec<&Sector> = self.sectors.iter().collect();
        rows.sort_by(|a, b| {
            view.key(b)
                .partial_cmp(&view.key(a))
                .unwrap_or(Ordering::Equal)
        });
        rows
    }

    /// First sector holding the maximum key.
    pub fn leading_sector(&self, view: SectorView) -> Option<&Sector> {
        self.ranked_sectors(view).into_iter().next()
    }

    pub fn sector(&self, name: &str) -> Option<&Sector> {
        self.sectors.iter().find(|s| s.name == name)
    }
}

/// `base + (draw - offset) * scale`
#[derive(Debug, Clone, Copy)]
struct Draw {
    base: f64,
    offset: f64,
    scale: f64,
}

const fn draw(base: f64, offset: f64, scale: f64) -> Draw {
    Draw {
        base,
        offset,
        scale,
    }
}

impl Draw {
    fn sample(self, rng: &mut Xorshift32) -> f64 {
        self.base + (rng.next_f64() - self.offset) * self.scale
    }

    fn sample_count(self, rng: &mut Xorshift32) -> u32 {
        self.sample(rng).round().max(0.0) as u32
    }
}

/// (name, value, change %)
const INDEX_DRAWS: [(&str, Draw, Draw); 3] = [
    ("上证", draw(3120.0, 0.5, 40.0), draw(0.0, 0.48, 1.2)),
    ("深成", draw(9820.0, 0.5, 120.0), draw(0.0, 0.5, 1.6)),
    ("创业板", draw(1980.0, 0.5, 60.0), draw(0.0, 0.5, 2.2)),
];

const TURNOVER: Draw = draw(8200.0, 0.5, 2200.0);
const TURNOVER_DELTA: Draw = draw(0.0, 0.4, 16.0);
const NORTH: Draw = draw(0.0, 0.5, 120.0);
const MAIN_FORCE: Draw = draw(0.0, 0.5, 180.0);
const ADVANCING: Draw = draw(900.0, 0.0, 2300.0);
const DECLINING: Draw = draw(700.0, 0.0, 2000.0);
const VOLUME_CHANGE: Draw = draw(0.0, 0.5, 24.0);
const UP_LIMIT: Draw = draw(20.0, 0.0, 90.0);
const DOWN_LIMIT: Draw = draw(3.0, 0.0, 28.0);

/// (name, gain %, money flow 亿)
const SECTOR_DRAWS: [(&str, Draw, Draw); 7] = [
    ("AI应用", draw(0.6, 0.0, 5.8), draw(0.0, 0.35, 90.0)),
    ("半导体", draw(0.0, 0.2, 5.0), draw(0.0, 0.3, 80.0)),
    ("医药", draw(0.0, 0.45, 4.0), draw(0.0, 0.5, 60.0)),
    ("新能源", draw(0.0, 0.55, 5.0), draw(0.0, 0.4, 85.0)),
    ("券商", draw(0.0, 0.2, 6.2), draw(0.0, 0.2, 110.0)),
    ("消费", draw(0.0, 0.55, 3.0), draw(0.0, 0.5, 55.0)),
    ("军工", draw(0.0, 0.35, 5.2), draw(0.0, 0.45, 70.0)),
];

/// Build the full synthetic snapshot for `seed`.
pub fn generate(seed: u32) -> MarketSnapshot {
    let mut rng = Xorshift32::new(seed);

    let indices = INDEX_DRAWS
        .iter()
        .map(|(name, value, chg)| {
            let value = value.sample(&mut rng);
            let chg_pct = chg.sample(&mut rng);
            IndexQuote {
                name: name.to_string(),
                value,
                chg_pct,
            }
        })
        .collect();

    let turnover_yi = TURNOVER.sample(&mut rng);
    let turnover_delta_pct = TURNOVER_DELTA.sample(&mut rng);
    let north_yi = NORTH.sample(&mut rng);
    let main_force_yi = MAIN_FORCE.sample(&mut rng);
    let adv = ADVANCING.sample_count(&mut rng);
    let decl = DECLINING.sample_count(&mut rng);
    let vol_change_pct = VOLUME_CHANGE.sample(&mut rng);
    let up_limit = UP_LIMIT.sample_count(&mut rng);
    let down_limit = DOWN_LIMIT.sample_count(&mut rng);

    let sectors = SECTOR_DRAWS
        .iter()
        .map(|(name, gain, money)| {
            let gain_pct = gain.sample(&mut rng);
            let money_yi = money.sample(&mut rng);
            Sector {
                name: name.to_string(),
                gain_pct,
                money_yi,
            }
        })
        .collect();

    let mut snapshot = MarketSnapshot {
        indices,
        turnover_yi,
        turnover_delta_pct: Some(turnover_delta_pct),
        north_yi: Some(north_yi),
        main_force_yi: Some(main_force_yi),
        adv,
        decl,
        vol_change_pct,
        up_limit,
        down_limit,
        sectors,
        vol_intensity: 0,
        sentiment_score: 0,
    };
    snapshot.refresh_derived();
    snapshot
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSource {
    Live,
    Generated { seed: u32 },
}

#[derive(Debug, Clone)]
pub struct ResolvedSnapshot {
    pub snapshot: MarketSnapshot,
    pub source: SnapshotSource,
    /// User-visible notice when a configured feed failed.
    pub notice: Option<String>,
}

/// Fetch from `feed` if present, otherwise or on failure generate locally.
///
/// A live payload is used whole with its derived scores recomputed. A
/// failed fetch never contributes fields to the generated snapshot.
pub fn resolve_snapshot(
    feed: Option<&dyn MarketPort>,
    seed: u32,
    timeout: Duration,
) -> ResolvedSnapshot {
    let Some(feed) = feed else {
        return generated(seed, None);
    };

    match feed.fetch(timeout) {
        Ok(mut snapshot) => {
            snapshot.refresh_derived();
            debug!(
                sectors = snapshot.sectors.len(),
                sentiment = snapshot.sentiment_score,
                "using live market snapshot"
            );
            ResolvedSnapshot {
                snapshot,
                source: SnapshotSource::Live,
                notice: None,
            }
        }
        Err(e) => {
            warn!(error = %e, seed, "market feed unavailable, generating locally");
            let notice = format!("实时行情获取失败（{e}），已切换为本地示例数据（seed {seed}）。");
            generated(seed, Some(notice))
        }
    }
}

fn generated(seed: u32, notice: Option<String>) -> ResolvedSnapshot {
    ResolvedSnapshot {
        snapshot: generate(seed),
        source: SnapshotSource::Generated { seed },
        notice,
    }
}
