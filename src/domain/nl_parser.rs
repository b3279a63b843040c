//! Lenient natural-language extractor for strategy rules.
//!
//! Free text is run through an ordered table of [`NlRule`]s. Each rule scans
//! the text independently and, on a hit, overwrites one field of a copy of
//! the base draft. Rules that do not match leave their field untouched, so
//! parsing merges into the draft rather than replacing it. Later rules win
//! when several rules write the same field (technical trigger, exit pattern).
//!
//! There is no failure mode: unmatched text is ignored.

use crate::domain::strategy::{suggest_name, ExitPattern, StrategyDsl, TechTrigger};
use tracing::debug;

const CEILING_WORDS: &[&str] = &["小于", "低于", "<=", "≤", "不超过", "<"];
const FLOOR_WORDS: &[&str] = &["大于", "高于", ">=", "≥", "不少于", ">"];

/// How a rule recognises its fragment.
#[derive(Debug, Clone, Copy)]
pub enum Pattern {
    /// `keyword`, optional spaces, comparator, optional spaces, unsigned number.
    Bounded {
        keywords: &'static [&'static str],
        comparators: &'static [&'static str],
        ignore_case: bool,
    },
    /// `keyword`, optional spaces, optionally signed number.
    Signed { keywords: &'static [&'static str] },
    /// One word from each group, in order, within a single line.
    Sequence {
        groups: &'static [&'static [&'static str]],
        ignore_case: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericField {
    PeMax,
    McapMaxYi,
    TurnMinPct,
    TakeProfitPct,
    StopLossPct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Set(NumericField),
    Tech(TechTrigger),
    Exit(ExitPattern),
}

#[derive(Debug, Clone, Copy)]
pub struct NlRule {
    pub name: &'static str,
    pub pattern: Pattern,
    pub action: Action,
}

pub const RULES: &[NlRule] = &[
    NlRule {
        name: "pe_max",
        pattern: Pattern::Bounded {
            keywords: &["pe", "市盈率"],
            comparators: CEILING_WORDS,
            ignore_case: true,
        },
        action: Action::Set(NumericField::PeMax),
    },
    NlRule {
        name: "mcap_max",
        pattern: Pattern::Bounded {
            keywords: &["市值"],
            comparators: CEILING_WORDS,
            ignore_case: false,
        },
        action: Action::Set(NumericField::McapMaxYi),
    },
    NlRule {
        name: "turn_min",
        pattern: Pattern::Bounded {
            keywords: &["换手"],
            comparators: FLOOR_WORDS,
            ignore_case: false,
        },
        action: Action::Set(NumericField::TurnMinPct),
    },
    NlRule {
        name: "tech_ma_up_5",
        pattern: Pattern::Sequence {
            groups: &[&["5日", "五日"], &["均线", "ma"], &["向上", "上行"]],
            ignore_case: false,
        },
        action: Action::Tech(TechTrigger::MaUp5),
    },
    NlRule {
        name: "tech_break_20d",
        pattern: Pattern::Sequence {
            groups: &[&["突破"], &["20日", "二十日"], &["高点", "新高"]],
            ignore_case: false,
        },
        action: Action::Tech(TechTrigger::Break20d),
    },
    NlRule {
        name: "tech_rsi_oversold",
        pattern: Pattern::Sequence {
            groups: &[&["rsi", "超卖"], &["回升", "反弹"]],
            ignore_case: true,
        },
        action: Action::Tech(TechTrigger::RsiOversold),
    },
    NlRule {
        name: "take_profit",
        pattern: Pattern::Signed { keywords: &["止盈"] },
        action: Action::Set(NumericField::TakeProfitPct),
    },
    NlRule {
        name: "stop_loss",
        pattern: Pattern::Signed { keywords: &["止损"] },
        action: Action::Set(NumericField::StopLossPct),
    },
    NlRule {
        name: "exit_close_below_ma10",
        pattern: Pattern::Sequence {
            groups: &[&["跌破"], &["10日", "十日"], &["线", "均线"]],
            ignore_case: false,
        },
        action: Action::Exit(ExitPattern::CloseBelowMa10),
    },
    NlRule {
        name: "exit_bearish_engulfing",
        pattern: Pattern::Sequence {
            groups: &[&["看跌吞没", "吞没形态"]],
            ignore_case: false,
        },
        action: Action::Exit(ExitPattern::BearishEngulfing),
    },
    NlRule {
        name: "exit_volume_breakdown",
        pattern: Pattern::Sequence {
            groups: &[&["放量"], &["下破", "破位"]],
            ignore_case: false,
        },
        action: Action::Exit(ExitPattern::VolumeBreakdown),
    },
];

/// Outcome of one rule against a text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Hit {
    Number(f64),
    Flag,
}

impl NlRule {
    pub fn scan(&self, text: &str) -> Option<Hit> {
        match self.pattern {
            Pattern::Bounded {
                keywords,
                comparators,
                ignore_case,
            } => {
                let haystack = fold_case(text, ignore_case);
                scan_bounded(&haystack, keywords, comparators).map(Hit::Number)
            }
            Pattern::Signed { keywords } => scan_signed(text, keywords).map(Hit::Number),
            Pattern::Sequence {
                groups,
                ignore_case,
            } => {
                let haystack = fold_case(text, ignore_case);
                haystack
                    .split(['\n', '\r', '\u{2028}', '\u{2029}'])
                    .any(|line| sequence_in_line(line, groups))
                    .then_some(Hit::Flag)
            }
        }
    }

    fn apply(&self, hit: Hit, dsl: &mut StrategyDsl) {
        match (self.action, hit) {
            (Action::Set(field), Hit::Number(v)) => {
                let slot = match field {
                    NumericField::PeMax => &mut dsl.filters.pe_max,
                    NumericField::McapMaxYi => &mut dsl.filters.mcap_max_yi,
                    NumericField::TurnMinPct => &mut dsl.filters.turn_min_pct,
                    NumericField::TakeProfitPct => &mut dsl.exits.take_profit_pct,
                    NumericField::StopLossPct => &mut dsl.exits.stop_loss_pct,
                };
                *slot = Some(v);
            }
            (Action::Tech(t), _) => dsl.filters.tech = Some(t),
            (Action::Exit(p), _) => dsl.exits.exit_pattern = Some(p),
            (Action::Set(_), Hit::Flag) => {}
        }
    }
}

/// Merge whatever `text` expresses into a copy of `base`.
///
/// Blank text returns the base unchanged apart from refreshed tags. A draft
/// that is still unnamed afterwards receives a suggested name.
pub fn parse(text: &str, base: &StrategyDsl) -> StrategyDsl {
    let mut dsl = base.clone();
    let t = text.trim();
    if t.is_empty() {
        dsl.refresh_tags();
        return dsl;
    }
    dsl.nl = t.to_string();

    for rule in RULES {
        if let Some(hit) = rule.scan(t) {
            debug!(rule = rule.name, ?hit, "nl rule matched");
            rule.apply(hit, &mut dsl);
        }
    }

    if dsl.name.is_empty() {
        dsl.name = suggest_name(&dsl);
    }
    dsl.refresh_tags();
    dsl
}

/// Names of the rules that fire on `text`, in table order.
pub fn matched_rules(text: &str) -> Vec<&'static str> {
    RULES
        .iter()
        .filter(|r| r.scan(text.trim()).is_some())
        .map(|r| r.name)
        .collect()
}

fn fold_case(text: &str, ignore_case: bool) -> String {
    if ignore_case {
        text.to_lowercase()
    } else {
        text.to_string()
    }
}

struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn at(input: &'a str, pos: usize) -> Self {
        Self { input, pos }
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Consume the first alternative that starts here.
    fn consume_any(&mut self, words: &[&str]) -> bool {
        for word in words {
            if self.remaining().starts_with(word) {
                self.pos += word.len();
                return true;
            }
        }
        false
    }

    fn consume_digits(&mut self) -> usize {
        let mut count = 0;
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                self.advance();
                count += 1;
            } else {
                break;
            }
        }
        count
    }

    /// `digits ('.' digits)?`, optionally preceded by a sign.
    fn number(&mut self, signed: bool) -> Option<f64> {
        let start = self.pos;
        if signed && matches!(self.peek(), Some('+') | Some('-')) {
            self.advance();
        }
        if self.consume_digits() == 0 {
            return None;
        }
        let before_dot = self.pos;
        if self.peek() == Some('.') {
            self.advance();
            if self.consume_digits() == 0 {
                self.pos = before_dot;
            }
        }
        self.input[start..self.pos].parse::<f64>().ok()
    }
}

fn scan_bounded(text: &str, keywords: &[&str], comparators: &[&str]) -> Option<f64> {
    text.char_indices().find_map(|(i, _)| {
        let mut sc = Scanner::at(text, i);
        if !sc.consume_any(keywords) {
            return None;
        }
        sc.skip_whitespace();
        if !sc.consume_any(comparators) {
            return None;
        }
        sc.skip_whitespace();
        sc.number(false)
    })
}

fn scan_signed(text: &str, keywords: &[&str]) -> Option<f64> {
    text.char_indices().find_map(|(i, _)| {
        let mut sc = Scanner::at(text, i);
        if !sc.consume_any(keywords) {
            return None;
        }
        sc.skip_whitespace();
        sc.number(true)
    })
}

fn sequence_in_line(line: &str, groups: &[&[&str]]) -> bool {
    let mut from = 0;
    for group in groups {
        match earliest_end(line, from, group) {
            Some(end) => from = end,
            None => return false,
        }
    }
    true
}

/// End offset of the earliest-finishing occurrence of any word at or after
/// `from`. Taking the earliest end leaves the most room for later groups.
fn earliest_end(line: &str, from: usize, words: &[&str]) -> Option<usize> {
    let rest = &line[from..];
    words
        .iter()
        .filter_map(|w| rest.find(w).map(|i| from + i + w.len()))
        .min()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::strategy::Tag;

    fn empty() -> StrategyDsl {
        StrategyDsl::draft()
    }

    #[test]
    fn pe_and_stop_loss_merge_into_empty_draft() {
        let base = empty();
        let d = parse("PE小于25，止损-6%", &base);
        assert_eq!(d.filters.pe_max, Some(25.0));
        assert_eq!(d.exits.stop_loss_pct, Some(-6.0));
        assert_eq!(d.filters.mcap_max_yi, None);
        assert_eq!(d.filters.turn_min_pct, None);
        assert_eq!(d.filters.tech, None);
        assert_eq!(d.exits.take_profit_pct, None);
        assert_eq!(d.exits.exit_pattern, None);
        assert_eq!(d.created_at, base.created_at);
        assert_eq!(d.name, "低估值硬止损策略");
        assert_eq!(d.tags, vec![Tag::Valuation, Tag::RiskControl]);
        assert_eq!(d.nl, "PE小于25，止损-6%");
    }

    #[test]
    fn full_sentence_extracts_every_field() {
        let d = parse(
            "市值低于300亿，换手大于3%，5日均线向上，止盈+15%，跌破10日均线离场",
            &empty(),
        );
        assert_eq!(d.filters.mcap_max_yi, Some(300.0));
        assert_eq!(d.filters.turn_min_pct, Some(3.0));
        assert_eq!(d.filters.tech, Some(TechTrigger::MaUp5));
        assert_eq!(d.exits.take_profit_pct, Some(15.0));
        assert_eq!(d.exits.exit_pattern, Some(ExitPattern::CloseBelowMa10));
        assert_eq!(d.name, "趋势小盘策略");
        assert_eq!(d.tags, vec![Tag::Technical, Tag::Active, Tag::RiskControl]);
    }

    #[test]
    fn unmatched_fields_keep_base_values() {
        let mut base = empty();
        base.name = "我的策略".into();
        base.filters.turn_min_pct = Some(2.0);
        base.exits.exit_pattern = Some(ExitPattern::BearishEngulfing);
        let d = parse("市盈率 <= 18.5", &base);
        assert_eq!(d.filters.pe_max, Some(18.5));
        assert_eq!(d.filters.turn_min_pct, Some(2.0));
        assert_eq!(d.exits.exit_pattern, Some(ExitPattern::BearishEngulfing));
        assert_eq!(d.name, "我的策略");
    }

    #[test]
    fn blank_text_returns_base() {
        let mut base = empty();
        base.filters.pe_max = Some(10.0);
        let d = parse("   ", &base);
        assert_eq!(d.filters, base.filters);
        assert_eq!(d.name, "");
        assert_eq!(d.nl, "");
    }

    #[test]
    fn gibberish_only_sets_source_and_name() {
        let d = parse("今天天气不错", &empty());
        assert!(d.filters.is_empty());
        assert!(d.exits.is_empty());
        assert_eq!(d.name, "自定义策略");
        assert!(d.tags.is_empty());
    }

    #[test]
    fn pe_keyword_is_case_insensitive() {
        assert_eq!(parse("pe < 12", &empty()).filters.pe_max, Some(12.0));
        assert_eq!(parse("Pe≤ 9.5", &empty()).filters.pe_max, Some(9.5));
    }

    #[test]
    fn comparator_is_required() {
        assert_eq!(parse("PE 25", &empty()).filters.pe_max, None);
        assert_eq!(parse("换手3%", &empty()).filters.turn_min_pct, None);
    }

    #[test]
    fn bounded_numbers_are_unsigned() {
        assert_eq!(parse("PE小于-5", &empty()).filters.pe_max, None);
    }

    #[test]
    fn later_keyword_occurrence_can_match() {
        let d = parse("pe高，pe低于20", &empty());
        assert_eq!(d.filters.pe_max, Some(20.0));
    }

    #[test]
    fn trailing_dot_is_not_part_of_number() {
        let d = parse("换手不少于2.", &empty());
        assert_eq!(d.filters.turn_min_pct, Some(2.0));
    }

    #[test]
    fn last_technical_rule_wins() {
        let d = parse("5日均线上行并且RSI超卖反弹", &empty());
        assert_eq!(d.filters.tech, Some(TechTrigger::RsiOversold));

        let d = parse("突破二十日新高，五日ma向上", &empty());
        assert_eq!(d.filters.tech, Some(TechTrigger::Break20d));
    }

    #[test]
    fn sequence_must_be_ordered() {
        assert_eq!(parse("新高突破20日", &empty()).filters.tech, None);
    }

    #[test]
    fn sequence_does_not_cross_lines() {
        assert_eq!(parse("突破\n20日新高", &empty()).filters.tech, None);
        assert_eq!(
            parse("说明\n突破20日新高", &empty()).filters.tech,
            Some(TechTrigger::Break20d)
        );
    }

    #[test]
    fn ma_keyword_is_case_sensitive() {
        assert_eq!(parse("5日MA向上", &empty()).filters.tech, None);
    }

    #[test]
    fn exit_patterns_last_wins() {
        let d = parse("看跌吞没或者放量破位就走", &empty());
        assert_eq!(d.exits.exit_pattern, Some(ExitPattern::VolumeBreakdown));
    }

    #[test]
    fn signed_take_profit_and_stop_loss() {
        let d = parse("止盈 20% 止损 -8.5%", &empty());
        assert_eq!(d.exits.take_profit_pct, Some(20.0));
        assert_eq!(d.exits.stop_loss_pct, Some(-8.5));
    }

    #[test]
    fn matched_rules_lists_hits_in_order() {
        assert_eq!(
            matched_rules("PE小于25，止损-6%，放量下破"),
            vec!["pe_max", "stop_loss", "exit_volume_breakdown"]
        );
        assert!(matched_rules("").is_empty());
    }

    #[test]
    fn earliest_end_prefers_shorter_finish() {
        assert_eq!(earliest_end("ab均线xx", 0, &["均线", "ab均"]), Some(5));
        assert_eq!(earliest_end("abc", 0, &["z"]), None);
    }
}
