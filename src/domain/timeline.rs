//! Deterministic event-timeline synthesis.
//!
//! A run is keyed on (security code, strategy name, day window, market
//! seed). The key is hashed into a seed and every draw of the run (event
//! count, day offsets, event scores, closing advice) comes from that one
//! stream, so identical inputs always reproduce the identical timeline.

use crate::domain::display::fmt_num;
use crate::domain::market::{MarketSnapshot, SectorView};
use crate::domain::prng::Xorshift32;
use crate::domain::screen;
use crate::domain::security::Security;
use crate::domain::seed::SeedKey;
use crate::domain::strategy::StrategyDsl;
use serde::Serialize;
use tracing::debug;

pub const MIN_DAY_WINDOW: u32 = 20;
pub const MAX_DAY_WINDOW: u32 = 120;
pub const DEFAULT_DAY_WINDOW: u32 = 60;
pub const MAX_EVENTS: usize = 10;

const MATCHED_BASELINE: f64 = 0.72;
const UNMATCHED_BASELINE: f64 = 0.38;
const BUY_ABOVE: f64 = 0.72;
const SELL_BELOW: f64 = 0.30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Buy,
    Sell,
    Note,
}

impl EventKind {
    fn classify(score: f64) -> Self {
        if score > BUY_ABOVE {
            EventKind::Buy
        } else if score < SELL_BELOW {
            EventKind::Sell
        } else {
            EventKind::Note
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            EventKind::Buy => "出现买点（示例）",
            EventKind::Sell => "触发退出（示例）",
            EventKind::Note => "观察提示（示例）",
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            EventKind::Buy => "BUY",
            EventKind::Sell => "SELL",
            EventKind::Note => "NOTE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
    /// Days before now, in `1..=window`.
    pub day_offset: u32,
    pub kind: EventKind,
    pub title: &'static str,
    pub tag: &'static str,
    pub explanation: String,
    pub sort_key: u32,
}

impl TimelineEvent {
    pub fn time_label(&self) -> String {
        format!("{}天前", self.day_offset)
    }
}

pub fn clamp_day_window(days: u32) -> u32 {
    days.clamp(MIN_DAY_WINDOW, MAX_DAY_WINDOW)
}

/// Synthesize up to ten explained events for `security` under `dsl`,
/// ordered by day offset (ties keep generation order).
///
/// `market` feeds the sector-leader hint in observation notes.
pub fn simulate(
    security: &Security,
    dsl: &StrategyDsl,
    day_window: u32,
    global_seed: u32,
    market: Option<&MarketSnapshot>,
) -> Vec<TimelineEvent> {
    let days = clamp_day_window(day_window);
    let key = SeedKey::new(&security.code, &dsl.name, days, global_seed);
    let seed = key.seed();
    let mut rng = Xorshift32::new(seed);

    let n = (4.0 + rng.next_f64() * 7.0).round().clamp(2.0, 12.0) as usize;
    let matched = screen::matches(security, dsl);
    let baseline = if matched {
        MATCHED_BASELINE
    } else {
        UNMATCHED_BASELINE
    };

    let hot_sector = market
        .and_then(|m| m.leading_sector(SectorView::Gainers))
        .map(|s| s.name.as_str());

    let mut events = Vec::with_capacity(n);
    for _ in 0..n {
        let day_offset = (rng.next_f64() * f64::from(days))
            .round()
            .clamp(1.0, f64::from(days)) as u32;
        let score = baseline + (rng.next_f64() - 0.5) * 0.45;
        let kind = EventKind::classify(score);
        let explanation = explain(security, dsl, kind, hot_sector, &mut rng);
        events.push(TimelineEvent {
            day_offset,
            kind,
            title: kind.title(),
            tag: kind.tag(),
            explanation,
            sort_key: day_offset,
        });
    }

    events.sort_by_key(|e| e.sort_key);
    events.truncate(MAX_EVENTS);

    debug!(
        key = %key.key_string(),
        seed,
        matched,
        generated = n,
        returned = events.len(),
        "simulated timeline"
    );
    events
}

/// Fragments for the event kind, then one closing sentence chosen by a draw.
fn explain(
    security: &Security,
    dsl: &StrategyDsl,
    kind: EventKind,
    hot_sector: Option<&str>,
    rng: &mut Xorshift32,
) -> String {
    let f = &dsl.filters;
    let e = &dsl.exits;
    let mut pieces: Vec<String> = Vec::new();

    match kind {
        EventKind::Buy => {
            if let Some(t) = f.tech {
                pieces.push(format!("技术触发：{}（示例匹配）。", t.label()));
            } else if security.tech.break_20d {
                pieces.push("结构偏强：疑似突破后回踩承接（示例）。".to_string());
            }
            if let Some(max) = f.pe_max {
                pieces.push(format!(
                    "估值过滤：PE {} ≤ {max}。",
                    fmt_num(Some(security.pe), 1)
                ));
            }
            if let Some(max) = f.mcap_max_yi {
                pieces.push(format!(
                    "市值过滤：{}亿 ≤ {max}亿。",
                    fmt_num(Some(security.mcap_yi), 0)
                ));
            }
            if let Some(min) = f.turn_min_pct {
                pieces.push(format!(
                    "活跃度：换手 {}% ≥ {min}%。",
                    fmt_num(Some(security.turnover_pct), 1)
                ));
            }
            if pieces.is_empty() {
                pieces.push("策略较宽：以盘面确认作为入场条件（示例）。".to_string());
            }
            pieces.push(
                if rng.next_f64() > 0.5 {
                    "建议：分批试错，止损线先设定再下单。"
                } else {
                    "建议：等二次确认，避免追涨。"
                }
                .to_string(),
            );
        }
        EventKind::Sell => {
            if let Some(sl) = e.stop_loss_pct {
                pieces.push(format!("风控触发：止损 {sl}%（示例）。"));
            } else if let Some(p) = e.exit_pattern {
                pieces.push(format!("形态触发：{}（示例）。", p.label()));
            } else {
                pieces.push("退出：情绪转弱或结构破坏（示例）。".to_string());
            }
            pieces.push(
                if rng.next_f64() > 0.5 {
                    "建议：先减仓，再看反抽。 "
                } else {
                    "建议：果断离场，等待下一次触发。"
                }
                .to_string(),
            );
        }
        EventKind::Note => {
            if let Some(hot) = hot_sector {
                pieces.push(format!("主线参考：{hot}（示例），关注板块共振。"));
            }
            pieces.push(
                if rng.next_f64() > 0.55 {
                    "注意：量能不足时少做突破。 "
                } else {
                    "注意：强势回踩更有性价比。 "
                }
                .to_string(),
            );
            if let Some(t) = f.tech {
                pieces.push(format!("你的策略偏向：{}。", t.label()));
            }
        }
    }

    pieces.join(" ")
}
