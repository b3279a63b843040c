//! Strategy rule shape: screening filters, exit conditions and derived tags.
//!
//! Every numeric and enum field is independently optional and `None` means
//! "no constraint". Tags are never set by hand; [`StrategyDsl::refresh_tags`]
//! recomputes them from the filters and exits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TechTrigger {
    #[serde(rename = "ma_up_5")]
    MaUp5,
    #[serde(rename = "break_20d")]
    Break20d,
    #[serde(rename = "rsi_oversold")]
    RsiOversold,
}

impl TechTrigger {
    pub fn code(self) -> &'static str {
        match self {
            TechTrigger::MaUp5 => "ma_up_5",
            TechTrigger::Break20d => "break_20d",
            TechTrigger::RsiOversold => "rsi_oversold",
        }
    }

    /// Unknown or blank codes mean "no technical filter".
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "ma_up_5" => Some(TechTrigger::MaUp5),
            "break_20d" => Some(TechTrigger::Break20d),
            "rsi_oversold" => Some(TechTrigger::RsiOversold),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TechTrigger::MaUp5 => "5日均线上行",
            TechTrigger::Break20d => "突破20日高点",
            TechTrigger::RsiOversold => "RSI超卖回升",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExitPattern {
    #[serde(rename = "close_below_ma10")]
    CloseBelowMa10,
    #[serde(rename = "bearish_engulfing")]
    BearishEngulfing,
    #[serde(rename = "volume_breakdown")]
    VolumeBreakdown,
}

impl ExitPattern {
    pub fn code(self) -> &'static str {
        match self {
            ExitPattern::CloseBelowMa10 => "close_below_ma10",
            ExitPattern::BearishEngulfing => "bearish_engulfing",
            ExitPattern::VolumeBreakdown => "volume_breakdown",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "close_below_ma10" => Some(ExitPattern::CloseBelowMa10),
            "bearish_engulfing" => Some(ExitPattern::BearishEngulfing),
            "volume_breakdown" => Some(ExitPattern::VolumeBreakdown),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExitPattern::CloseBelowMa10 => "跌破10日线",
            ExitPattern::BearishEngulfing => "看跌吞没",
            ExitPattern::VolumeBreakdown => "放量下破",
        }
    }
}

/// Serde bridge storing an absent enum as the empty string.
mod blank_as_none {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<T: Serialize, S: Serializer>(
        value: &Option<T>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => v.serialize(serializer),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, T: DeserializeOwned, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<T>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(code) => serde_json::from_value(serde_json::Value::String(code.to_string()))
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filters {
    #[serde(default)]
    pub pe_max: Option<f64>,
    #[serde(default)]
    pub mcap_max_yi: Option<f64>,
    #[serde(default)]
    pub turn_min_pct: Option<f64>,
    #[serde(default, with = "blank_as_none")]
    pub tech: Option<TechTrigger>,
    #[serde(default)]
    pub note: String,
}

impl Filters {
    pub fn is_empty(&self) -> bool {
        self.pe_max.is_none()
            && self.mcap_max_yi.is_none()
            && self.turn_min_pct.is_none()
            && self.tech.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exits {
    #[serde(default)]
    pub take_profit_pct: Option<f64>,
    #[serde(default)]
    pub stop_loss_pct: Option<f64>,
    #[serde(default, with = "blank_as_none")]
    pub exit_pattern: Option<ExitPattern>,
}

impl Exits {
    pub fn is_empty(&self) -> bool {
        self.take_profit_pct.is_none() && self.stop_loss_pct.is_none() && self.exit_pattern.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    #[serde(rename = "估值")]
    Valuation,
    #[serde(rename = "技术")]
    Technical,
    #[serde(rename = "活跃")]
    Active,
    #[serde(rename = "风控")]
    RiskControl,
}

impl Tag {
    pub fn label(self) -> &'static str {
        match self {
            Tag::Valuation => "估值",
            Tag::Technical => "技术",
            Tag::Active => "活跃",
            Tag::RiskControl => "风控",
        }
    }
}

/// A screening and exit rule, either a draft or a persisted strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyDsl {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub filters: Filters,
    #[serde(default)]
    pub exits: Exits,
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// Free-text source, if the rule came from the NL parser.
    #[serde(default)]
    pub nl: String,
}

impl Default for StrategyDsl {
    fn default() -> Self {
        Self::draft()
    }
}

const EMPTY_SUMMARY: &str = "（空策略：仅用于手动观察/记录）";

impl StrategyDsl {
    /// An empty, unnamed draft stamped with the current time.
    pub fn draft() -> Self {
        Self::draft_at(Utc::now())
    }

    pub fn draft_at(created_at: DateTime<Utc>) -> Self {
        Self {
            id: None,
            name: String::new(),
            created_at,
            filters: Filters::default(),
            exits: Exits::default(),
            tags: Vec::new(),
            nl: String::new(),
        }
    }

    /// Build a draft from raw form fields. Blank or malformed numbers become
    /// "no constraint"; unknown enum codes become none.
    pub fn from_form(form: &FormInput) -> Self {
        let mut dsl = Self::draft();
        dsl.name = form.name.trim().to_string();
        dsl.filters = Filters {
            pe_max: parse_optional_number(&form.pe_max),
            mcap_max_yi: parse_optional_number(&form.mcap_max_yi),
            turn_min_pct: parse_optional_number(&form.turn_min_pct),
            tech: TechTrigger::from_code(&form.tech),
            note: form.note.trim().to_string(),
        };
        dsl.exits = Exits {
            take_profit_pct: parse_optional_number(&form.take_profit_pct),
            stop_loss_pct: parse_optional_number(&form.stop_loss_pct),
            exit_pattern: ExitPattern::from_code(&form.exit_pattern),
        };
        dsl.nl = form.nl.trim().to_string();
        dsl.refresh_tags();
        dsl
    }

    pub fn infer_tags(&self) -> Vec<Tag> {
        let mut tags = Vec::new();
        if self.filters.pe_max.is_some() {
            tags.push(Tag::Valuation);
        }
        if self.filters.tech.is_some() {
            tags.push(Tag::Technical);
        }
        if self.filters.turn_min_pct.is_some() {
            tags.push(Tag::Active);
        }
        if !self.exits.is_empty() {
            tags.push(Tag::RiskControl);
        }
        tags
    }

    pub fn refresh_tags(&mut self) {
        self.tags = self.infer_tags();
    }

    /// Name used when composing simulation seeds.
    pub fn seed_name(&self) -> &str {
        if self.name.is_empty() {
            crate::domain::seed::DRAFT_NAME
        } else {
            &self.name
        }
    }

    /// Key/value chips describing every populated constraint.
    pub fn active_filters(&self) -> Vec<(&'static str, String)> {
        let f = &self.filters;
        let e = &self.exits;
        let mut chips = Vec::new();
        if let Some(v) = f.pe_max {
            chips.push(("PE", format!("≤{v}")));
        }
        if let Some(v) = f.mcap_max_yi {
            chips.push(("市值", format!("≤{v}亿")));
        }
        if let Some(v) = f.turn_min_pct {
            chips.push(("换手", format!("≥{v}%")));
        }
        if let Some(t) = f.tech {
            chips.push(("技术", t.label().to_string()));
        }
        if let Some(v) = e.take_profit_pct {
            chips.push(("止盈", format!("{v}%")));
        }
        if let Some(v) = e.stop_loss_pct {
            chips.push(("止损", format!("{v}%")));
        }
        if let Some(p) = e.exit_pattern {
            chips.push(("形态", p.label().to_string()));
        }
        chips
    }

    /// One-line description, e.g. `PE≤25 · 止损-6%`.
    pub fn summary(&self) -> String {
        let f = &self.filters;
        let e = &self.exits;
        let mut parts = Vec::new();
        if let Some(v) = f.pe_max {
            parts.push(format!("PE≤{v}"));
        }
        if let Some(v) = f.mcap_max_yi {
            parts.push(format!("市值≤{v}亿"));
        }
        if let Some(v) = f.turn_min_pct {
            parts.push(format!("换手≥{v}%"));
        }
        if let Some(t) = f.tech {
            parts.push(format!("技术：{}", t.label()));
        }
        if let Some(v) = e.take_profit_pct {
            parts.push(format!("止盈{v}%"));
        }
        if let Some(v) = e.stop_loss_pct {
            parts.push(format!("止损{v}%"));
        }
        if let Some(p) = e.exit_pattern {
            parts.push(format!("形态：{}", p.label()));
        }
        if parts.is_empty() {
            return EMPTY_SUMMARY.to_string();
        }
        parts.join(" · ")
    }
}

/// Raw text fields of the strategy form.
#[derive(Debug, Clone, Default)]
pub struct FormInput {
    pub name: String,
    pub pe_max: String,
    pub mcap_max_yi: String,
    pub turn_min_pct: String,
    pub tech: String,
    pub note: String,
    pub take_profit_pct: String,
    pub stop_loss_pct: String,
    pub exit_pattern: String,
    pub nl: String,
}

/// Blank, unparseable or non-finite text yields `None`.
pub fn parse_optional_number(text: &str) -> Option<f64> {
    let s = text.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

const NAME_SUFFIX: &str = "策略";
const GENERIC_NAME: &str = "自定义策略";

/// Short name built from up to three traits of the rule.
pub fn suggest_name(dsl: &StrategyDsl) -> String {
    let f = &dsl.filters;
    let mut bits = Vec::new();
    if f.pe_max.is_some() {
        bits.push("低估值");
    }
    match f.tech {
        Some(TechTrigger::MaUp5) => bits.push("趋势"),
        Some(TechTrigger::Break20d) => bits.push("突破"),
        Some(TechTrigger::RsiOversold) => bits.push("反转"),
        None => {}
    }
    if f.mcap_max_yi.is_some_and(|v| v <= 300.0) {
        bits.push("小盘");
    }
    if dsl.exits.stop_loss_pct.is_some() {
        bits.push("硬止损");
    }
    if bits.is_empty() {
        return GENERIC_NAME.to_string();
    }
    format!("{}{}", bits[..bits.len().min(3)].concat(), NAME_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_strategy() -> StrategyDsl {
        let mut s = StrategyDsl::draft();
        s.name = "低估值硬止损策略".into();
        s.filters.pe_max = Some(25.0);
        s.exits.stop_loss_pct = Some(-6.0);
        s.refresh_tags();
        s
    }

    #[test]
    fn draft_is_empty() {
        let d = StrategyDsl::draft();
        assert!(d.filters.is_empty());
        assert!(d.exits.is_empty());
        assert!(d.tags.is_empty());
        assert_eq!(d.seed_name(), "draft");
    }

    #[test]
    fn tags_follow_fields() {
        let s = sample_strategy();
        assert_eq!(s.tags, vec![Tag::Valuation, Tag::RiskControl]);

        let mut t = StrategyDsl::draft();
        t.filters.tech = Some(TechTrigger::Break20d);
        t.filters.turn_min_pct = Some(3.0);
        t.filters.mcap_max_yi = Some(100.0);
        assert_eq!(t.infer_tags(), vec![Tag::Technical, Tag::Active]);
    }

    #[test]
    fn summary_formats_numbers_without_trailing_zeros() {
        let s = sample_strategy();
        assert_eq!(s.summary(), "PE≤25 · 止损-6%");
    }

    #[test]
    fn summary_of_empty_strategy() {
        assert_eq!(StrategyDsl::draft().summary(), EMPTY_SUMMARY);
    }

    #[test]
    fn active_filters_chips() {
        let mut s = sample_strategy();
        s.filters.tech = Some(TechTrigger::RsiOversold);
        s.exits.exit_pattern = Some(ExitPattern::VolumeBreakdown);
        let chips = s.active_filters();
        assert_eq!(chips[0], ("PE", "≤25".to_string()));
        assert_eq!(chips[1], ("技术", "RSI超卖回升".to_string()));
        assert_eq!(chips[2], ("止损", "-6%".to_string()));
        assert_eq!(chips[3], ("形态", "放量下破".to_string()));
    }

    #[test]
    fn parse_optional_number_cases() {
        assert_eq!(parse_optional_number(""), None);
        assert_eq!(parse_optional_number("   "), None);
        assert_eq!(parse_optional_number("abc"), None);
        assert_eq!(parse_optional_number("inf"), None);
        assert_eq!(parse_optional_number(" 12.5 "), Some(12.5));
        assert_eq!(parse_optional_number("-6"), Some(-6.0));
        assert_eq!(parse_optional_number("0"), Some(0.0));
    }

    #[test]
    fn from_form_treats_bad_input_as_no_constraint() {
        let form = FormInput {
            name: "  试验  ".into(),
            pe_max: "20".into(),
            mcap_max_yi: "lots".into(),
            turn_min_pct: "".into(),
            tech: "break_20d".into(),
            take_profit_pct: "12".into(),
            exit_pattern: "nonsense".into(),
            ..FormInput::default()
        };
        let d = StrategyDsl::from_form(&form);
        assert_eq!(d.name, "试验");
        assert_eq!(d.filters.pe_max, Some(20.0));
        assert_eq!(d.filters.mcap_max_yi, None);
        assert_eq!(d.filters.turn_min_pct, None);
        assert_eq!(d.filters.tech, Some(TechTrigger::Break20d));
        assert_eq!(d.exits.take_profit_pct, Some(12.0));
        assert_eq!(d.exits.exit_pattern, None);
        assert_eq!(d.tags, vec![Tag::Valuation, Tag::Technical, Tag::RiskControl]);
    }

    #[test]
    fn suggest_name_priority_and_cap() {
        let mut d = StrategyDsl::draft();
        assert_eq!(suggest_name(&d), "自定义策略");

        d.filters.pe_max = Some(20.0);
        d.filters.tech = Some(TechTrigger::MaUp5);
        d.filters.mcap_max_yi = Some(300.0);
        d.exits.stop_loss_pct = Some(-5.0);
        assert_eq!(suggest_name(&d), "低估值趋势小盘策略");

        d.filters.pe_max = None;
        assert_eq!(suggest_name(&d), "趋势小盘硬止损策略");
    }

    #[test]
    fn suggest_name_ignores_large_cap_ceiling() {
        let mut d = StrategyDsl::draft();
        d.filters.mcap_max_yi = Some(300.5);
        assert_eq!(suggest_name(&d), "自定义策略");
    }

    #[test]
    fn serializes_with_plain_keyed_shape() {
        let s = sample_strategy();
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["filters"]["peMax"], 25.0);
        assert_eq!(json["filters"]["mcapMaxYi"], serde_json::Value::Null);
        assert_eq!(json["filters"]["tech"], "");
        assert_eq!(json["exits"]["stopLossPct"], -6.0);
        assert_eq!(json["exits"]["exitPattern"], "");
        assert_eq!(json["tags"], serde_json::json!(["估值", "风控"]));
        assert_eq!(json["name"], "低估值硬止损策略");
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn serde_round_trip_preserves_enums() {
        let mut s = sample_strategy();
        s.filters.tech = Some(TechTrigger::MaUp5);
        s.exits.exit_pattern = Some(ExitPattern::CloseBelowMa10);
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains("\"tech\":\"ma_up_5\""));
        let back: StrategyDsl = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn deserializes_stored_document_shape() {
        let raw = r#"{
            "id": "stg_abc",
            "name": "趋势",
            "createdAt": "2024-05-01T08:00:00Z",
            "filters": {"peMax": null, "mcapMaxYi": 300, "turnMinPct": 3, "tech": "ma_up_5", "note": ""},
            "exits": {"takeProfitPct": 15, "stopLossPct": null, "exitPattern": ""},
            "tags": ["技术", "活跃", "风控"],
            "nl": ""
        }"#;
        let s: StrategyDsl = serde_json::from_str(raw).unwrap();
        assert_eq!(s.filters.mcap_max_yi, Some(300.0));
        assert_eq!(s.filters.tech, Some(TechTrigger::MaUp5));
        assert_eq!(s.exits.exit_pattern, None);
        assert_eq!(s.exits.take_profit_pct, Some(15.0));
    }

    #[test]
    fn enum_codes_round_trip() {
        for t in [TechTrigger::MaUp5, TechTrigger::Break20d, TechTrigger::RsiOversold] {
            assert_eq!(TechTrigger::from_code(t.code()), Some(t));
        }
        for p in [
            ExitPattern::CloseBelowMa10,
            ExitPattern::BearishEngulfing,
            ExitPattern::VolumeBreakdown,
        ] {
            assert_eq!(ExitPattern::from_code(p.code()), Some(p));
        }
        assert_eq!(TechTrigger::from_code(""), None);
    }
}
