//! Rule-template commentary for a single security.

use crate::domain::display::{fmt_money_yi, fmt_num, fmt_pct};
use crate::domain::market::{MarketSnapshot, SectorView};
use crate::domain::security::Security;

const MIN_BULLETS: usize = 3;

/// Ordered commentary bullets: price move, valuation, turnover, sector
/// context, technical state, and a footnote when fewer than three bullets
/// were produced.
pub fn auto_analysis(security: &Security, market: Option<&MarketSnapshot>) -> Vec<String> {
    let s = security;
    let mut bits = Vec::new();

    if s.change_pct >= 3.0 {
        bits.push(format!(
            "涨幅偏强（{}），注意是否来自板块共振而非单独脉冲。",
            fmt_pct(Some(s.change_pct), 2)
        ));
    }
    if s.change_pct <= -2.0 {
        bits.push(format!(
            "回撤明显（{}），若无基本面催化，优先看支撑与量能。",
            fmt_pct(Some(s.change_pct), 2)
        ));
    }
    if s.pe <= 12.0 {
        bits.push(format!(
            "估值偏低（PE {}），更适合做“低估值修复+趋势确认”。",
            fmt_num(Some(s.pe), 1)
        ));
    }
    if s.pe >= 60.0 {
        bits.push(format!(
            "估值偏高（PE {}），更适合做“强趋势/题材催化”，风控更硬。",
            fmt_num(Some(s.pe), 1)
        ));
    }
    if s.turnover_pct >= 5.0 {
        bits.push(format!(
            "换手活跃（{}%），更容易走出短线情绪波段。",
            fmt_num(Some(s.turnover_pct), 1)
        ));
    }
    if s.turnover_pct <= 1.2 {
        bits.push(format!(
            "换手偏低（{}%），更像中线资金博弈，信号需更确认。",
            fmt_num(Some(s.turnover_pct), 1)
        ));
    }

    if let Some(m) = market {
        if let Some(sector) = m.sector(&s.industry) {
            bits.push(format!(
                "板块参考：{} 涨跌 {}，资金 {}（示例）。",
                s.industry,
                fmt_pct(Some(sector.gain_pct), 2),
                fmt_money_yi(Some(sector.money_yi))
            ));
        } else if let Some(hot) = m.leading_sector(SectorView::Gainers) {
            bits.push(format!(
                "板块主线：当前领先的是 {}（示例）。如果你做主线，优先顺着它找结构更好的标的。",
                hot.name
            ));
        }
    }

    let tech = s.active_tech_labels();
    if tech.is_empty() {
        bits.push("技术状态：暂无明显触发（示例）。".to_string());
    } else {
        bits.push(format!("技术状态：{}。", tech.join("、")));
    }

    if bits.len() < MIN_BULLETS {
        bits.push("提示：这份解读来自规则模板；接入真实行情/财务/新闻后可更个性化。".to_string());
    }
    bits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::generate;
    use crate::domain::security::{find_by_code, sample_universe};

    fn stock(code: &str) -> Security {
        find_by_code(&sample_universe(), code).unwrap().clone()
    }

    #[test]
    fn hot_ai_stock() {
        let market = generate(1_234_567);
        let bits = auto_analysis(&stock("002230"), Some(&market));
        assert_eq!(
            bits,
            vec![
                "涨幅偏强（+5.88%），注意是否来自板块共振而非单独脉冲。",
                "估值偏高（PE 95.4），更适合做“强趋势/题材催化”，风控更硬。",
                "换手活跃（6.1%），更容易走出短线情绪波段。",
                "板块参考：AI应用 涨跌 +1.44%，资金 +18.2亿（示例）。",
                "技术状态：5日均线上行、突破20日高点。",
            ]
        );
    }

    #[test]
    fn unknown_sector_points_at_leader() {
        let market = generate(1_234_567);
        let bits = auto_analysis(&stock("600036"), Some(&market));
        assert_eq!(
            bits,
            vec![
                "估值偏低（PE 6.8），更适合做“低估值修复+趋势确认”。",
                "换手偏低（1.1%），更像中线资金博弈，信号需更确认。",
                "板块主线：当前领先的是 券商（示例）。如果你做主线，优先顺着它找结构更好的标的。",
                "技术状态：5日均线上行。",
            ]
        );
    }

    #[test]
    fn sparse_analysis_gets_footnote() {
        let bits = auto_analysis(&stock("300750"), None);
        assert_eq!(
            bits,
            vec![
                "技术状态：RSI超卖回升。",
                "提示：这份解读来自规则模板；接入真实行情/财务/新闻后可更个性化。",
            ]
        );
    }

    #[test]
    fn drawdown_is_reported() {
        let mut s = stock("000858");
        s.change_pct = -2.5;
        let bits = auto_analysis(&s, None);
        assert_eq!(bits[0], "回撤明显（-2.50%），若无基本面催化，优先看支撑与量能。");
        assert_eq!(bits[1], "换手偏低（1.2%），更像中线资金博弈，信号需更确认。");
    }
}
