//! Sentiment and volatility scoring plus the advisory text built on them.
//!
//! Everything here is a pure, table-driven function of snapshot fields.

use crate::domain::display::{fmt_money_yi, fmt_pct};
use crate::domain::market::{MarketSnapshot, SectorView};

pub const VOL_INTENSITY_MIN: u32 = 6;
pub const VOL_INTENSITY_MAX: u32 = 99;

/// Volatility intensity in `[6, 99]` from the first and third index moves
/// and the volume change.
pub fn vol_intensity(idx0_chg_pct: f64, idx2_chg_pct: f64, vol_change_pct: f64) -> u32 {
    let raw = idx0_chg_pct.abs() * 18.0 + idx2_chg_pct.abs() * 14.0 + vol_change_pct.abs() * 1.2;
    raw.round()
        .clamp(f64::from(VOL_INTENSITY_MIN), f64::from(VOL_INTENSITY_MAX)) as u32
}

/// Sentiment score in `[0, 100]`.
///
/// Weighted blend of breadth (advance/decline ratio on a log-1.5 scale),
/// volume change and the up/down limit spread.
pub fn sentiment_score(
    adv: u32,
    decl: u32,
    vol_change_pct: f64,
    up_limit: u32,
    down_limit: u32,
) -> u32 {
    let ratio = f64::from(adv) / f64::from(decl.max(1));
    let ratio_score = (ratio.ln() / 1.5_f64.ln() * 40.0 + 50.0).clamp(0.0, 100.0);
    let vol_score = (50.0 + vol_change_pct * 1.3).clamp(0.0, 100.0);
    let spread = f64::from(up_limit) - f64::from(down_limit);
    let limit_score = (50.0 + spread * 0.35).clamp(0.0, 100.0);
    (ratio_score * 0.55 + vol_score * 0.25 + limit_score * 0.2)
        .round()
        .clamp(0.0, 100.0) as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentimentBand {
    Euphoric,
    Warm,
    Neutral,
    Cool,
    Frozen,
}

impl SentimentBand {
    pub fn from_score(score: u32) -> Self {
        match score {
            78.. => SentimentBand::Euphoric,
            60..=77 => SentimentBand::Warm,
            45..=59 => SentimentBand::Neutral,
            28..=44 => SentimentBand::Cool,
            _ => SentimentBand::Frozen,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SentimentBand::Euphoric => "高亢：追随主线，别逆势",
            SentimentBand::Warm => "偏暖：可择强而上",
            SentimentBand::Neutral => "中性：等确认再加仓",
            SentimentBand::Cool => "偏冷：控仓等机会",
            SentimentBand::Frozen => "冰点：以防守为主",
        }
    }

    /// Leading word of the label, e.g. `偏冷`.
    pub fn short_label(self) -> &'static str {
        self.label().split('：').next().unwrap_or_default()
    }
}

pub fn sentiment_label(score: u32) -> &'static str {
    SentimentBand::from_score(score).label()
}

/// Three-sentence market note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Narrative {
    pub bias: &'static str,
    pub risk: &'static str,
    pub liquidity: &'static str,
}

impl Narrative {
    pub fn lines(&self) -> [String; 3] {
        [
            format!("今日操作倾向：{}。", self.bias),
            format!("风险提示：{}。", self.risk),
            format!("量能判断：{}。", self.liquidity),
        ]
    }
}

pub fn narrative(snapshot: &MarketSnapshot) -> Narrative {
    let score = snapshot.sentiment_score;
    let bias = if score >= 66 {
        "倾向顺势做强势主线"
    } else if score <= 38 {
        "倾向防守与低风险试错"
    } else {
        "倾向观察与小仓试错"
    };

    let vol = snapshot.vol_intensity;
    let risk = if vol >= 70 {
        "波动较大：单笔仓位更小，止损更硬"
    } else if vol <= 35 {
        "波动较小：更适合趋势跟随"
    } else {
        "波动中等：控节奏"
    };

    // Unknown turnover delta reads as steady.
    let liquidity = match snapshot.turnover_delta_pct {
        Some(d) if d >= 4.0 => "量能上行：更容易走出合力",
        Some(d) if d <= -4.0 => "量能下行：谨慎追高",
        _ => "量能平稳：注意分化",
    };

    Narrative {
        bias,
        risk,
        liquidity,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PulseBullet {
    pub title: String,
    pub detail: String,
}

/// Leading gainer, leading money-flow sector and position advice.
/// Sector bullets are omitted when the snapshot has no sectors.
pub fn pulse(snapshot: &MarketSnapshot) -> Vec<PulseBullet> {
    let mut bullets = Vec::with_capacity(3);

    if let Some(best) = snapshot.leading_sector(SectorView::Gainers) {
        bullets.push(PulseBullet {
            title: format!("主线优先级：{}", best.name),
            detail: format!(
                "涨幅领先 {}，适合优先观察强势股的“回踩承接”。",
                fmt_pct(Some(best.gain_pct), 2)
            ),
        });
    }
    if let Some(money) = snapshot.leading_sector(SectorView::Money) {
        bullets.push(PulseBullet {
            title: format!("资金偏好：{}", money.name),
            detail: format!(
                "资金净流 {}，若情绪不差，可考虑“顺资金”而非猜题材。",
                fmt_money_yi(Some(money.money_yi))
            ),
        });
    }

    let score = snapshot.sentiment_score;
    let advice = if score >= 66 {
        "可以用“分批试错→确认加仓”的节奏，止损线更清晰。"
    } else if score <= 38 {
        "先保命：减少追涨，更多用“低位试错+快止损”。"
    } else {
        "等待分化后的确定性：把出手变成“规则触发”。"
    };
    bullets.push(PulseBullet {
        title: format!(
            "仓位建议：{}",
            SentimentBand::from_score(score).short_label()
        ),
        detail: advice.to_string(),
    });

    bullets
}
