//! Security reference data and the built-in sample universe.
//!
//! Security records are supplied by a provider and never mutated by the core.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Boolean technical states used by the technical filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechFlags {
    pub ma5_up: bool,
    pub break_20d: bool,
    pub rsi_rebound: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub region: String,
    #[serde(default)]
    pub concepts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Security {
    pub code: String,
    pub name: String,
    pub industry: String,
    /// Market capitalisation in 亿 (hundred million).
    pub mcap_yi: f64,
    pub pe: f64,
    pub turnover_pct: f64,
    pub price: f64,
    pub change_pct: f64,
    pub tech: TechFlags,
    pub profile: Profile,
}

impl Security {
    /// Lowercased text that free-text search runs against.
    fn search_blob(&self) -> String {
        format!(
            "{} {} {} {}",
            self.code,
            self.name,
            self.industry,
            self.profile.concepts.join(" ")
        )
        .to_lowercase()
    }

    /// Display labels of the technical flags that are set.
    pub fn active_tech_labels(&self) -> Vec<&'static str> {
        let mut labels = Vec::new();
        if self.tech.ma5_up {
            labels.push("5日均线上行");
        }
        if self.tech.break_20d {
            labels.push("突破20日高点");
        }
        if self.tech.rsi_rebound {
            labels.push("RSI超卖回升");
        }
        labels
    }
}

/// Case-insensitive substring search over code, name, industry and concepts.
/// A blank query returns the whole universe in its original order.
pub fn search<'a>(universe: &'a [Security], query: &str) -> Vec<&'a Security> {
    let q = query.trim().to_lowercase();
    universe
        .iter()
        .filter(|s| q.is_empty() || s.search_blob().contains(&q))
        .collect()
}

pub fn find_by_code<'a>(universe: &'a [Security], code: &str) -> Option<&'a Security> {
    let code = code.trim();
    universe.iter().find(|s| s.code == code)
}

/// Stable reorder that floats watchlisted codes to the front.
pub fn order_by_watchlist<'a>(rows: Vec<&'a Security>, watchlist: &[String]) -> Vec<&'a Security> {
    let watched: HashSet<&str> = watchlist.iter().map(String::as_str).collect();
    let mut rows = rows;
    rows.sort_by_key(|s| !watched.contains(s.code.as_str()));
    rows
}

#[allow(clippy::too_many_arguments)]
fn sample(
    code: &str,
    name: &str,
    industry: &str,
    mcap_yi: f64,
    pe: f64,
    turnover_pct: f64,
    price: f64,
    change_pct: f64,
    tech: (bool, bool, bool),
    region: &str,
    concepts: &[&str],
) -> Security {
    Security {
        code: code.to_string(),
        name: name.to_string(),
        industry: industry.to_string(),
        mcap_yi,
        pe,
        turnover_pct,
        price,
        change_pct,
        tech: TechFlags {
            ma5_up: tech.0,
            break_20d: tech.1,
            rsi_rebound: tech.2,
        },
        profile: Profile {
            region: region.to_string(),
            concepts: concepts.iter().map(|c| c.to_string()).collect(),
        },
    }
}

/// Eight A-share records used when no security provider is configured.
pub fn sample_universe() -> Vec<Security> {
    vec![
        sample("600519", "贵州茅台", "白酒", 22000.0, 30.5, 0.8, 1688.2, 1.12, (true, false, false), "贵州", &["消费", "高端"]),
        sample("300750", "宁德时代", "新能源", 7200.0, 21.8, 2.3, 178.6, -0.85, (false, false, true), "福建", &["电池", "储能"]),
        sample("688981", "中芯国际", "半导体", 5400.0, 42.2, 3.8, 48.32, 3.26, (true, true, false), "上海", &["芯片", "国产替代"]),
        sample("002230", "科大讯飞", "AI应用", 1600.0, 95.4, 6.1, 46.8, 5.88, (true, true, false), "安徽", &["AI", "教育"]),
        sample("601318", "中国平安", "保险", 7400.0, 8.6, 1.4, 41.22, 0.32, (false, false, false), "深圳", &["金融", "红利"]),
        sample("000858", "五粮液", "白酒", 5400.0, 24.2, 1.2, 132.6, -1.42, (false, false, true), "四川", &["消费"]),
        sample("600036", "招商银行", "银行", 9000.0, 6.8, 1.1, 33.48, 0.62, (true, false, false), "深圳", &["红利", "金融"]),
        sample("300059", "东方财富", "券商科技", 2300.0, 35.5, 4.9, 16.92, 2.04, (true, false, false), "上海", &["券商", "互联网金融"]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_universe_has_eight_unique_codes() {
        let universe = sample_universe();
        assert_eq!(universe.len(), 8);
        let codes: HashSet<_> = universe.iter().map(|s| s.code.as_str()).collect();
        assert_eq!(codes.len(), 8);
    }

    #[test]
    fn search_blank_returns_all() {
        let universe = sample_universe();
        assert_eq!(search(&universe, "   ").len(), 8);
    }

    #[test]
    fn search_matches_code_prefix() {
        let universe = sample_universe();
        let hits: Vec<_> = search(&universe, "3000").iter().map(|s| s.code.clone()).collect();
        assert_eq!(hits, vec!["300059"]);
    }

    #[test]
    fn search_matches_industry_and_concept() {
        let universe = sample_universe();
        assert_eq!(search(&universe, "白酒").len(), 2);
        let red: Vec<_> = search(&universe, "红利").iter().map(|s| s.code.clone()).collect();
        assert_eq!(red, vec!["601318", "600036"]);
    }

    #[test]
    fn search_is_case_insensitive() {
        let universe = sample_universe();
        let hits = search(&universe, "ai");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].code, "002230");
    }

    #[test]
    fn find_by_code_trims() {
        let universe = sample_universe();
        assert_eq!(find_by_code(&universe, " 601318 ").map(|s| s.name.as_str()), Some("中国平安"));
        assert!(find_by_code(&universe, "999999").is_none());
    }

    #[test]
    fn watchlist_floats_to_front_stably() {
        let universe = sample_universe();
        let rows = search(&universe, "");
        let ordered = order_by_watchlist(rows, &["000858".to_string(), "600519".to_string()]);
        let codes: Vec<_> = ordered.iter().take(3).map(|s| s.code.as_str()).collect();
        assert_eq!(codes, vec!["600519", "000858", "300750"]);
    }

    #[test]
    fn active_tech_labels_in_fixed_order() {
        let universe = sample_universe();
        let smic = find_by_code(&universe, "688981").unwrap();
        assert_eq!(smic.active_tech_labels(), vec!["5日均线上行", "突破20日高点"]);
    }
}
