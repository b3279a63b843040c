//! Screening predicate: does a security satisfy a strategy's filters?
//!
//! Exit conditions never take part in matching.

use crate::domain::security::Security;
use crate::domain::strategy::{Filters, StrategyDsl, TechTrigger};

/// Conjunction of the populated filters, checked in the order PE, market
/// cap, turnover, technical trigger. Absent filters always pass.
pub fn matches(security: &Security, dsl: &StrategyDsl) -> bool {
    matches_filters(security, &dsl.filters)
}

pub fn matches_filters(security: &Security, filters: &Filters) -> bool {
    // Each check asks the pass condition to hold, so NaN never passes.
    filters.pe_max.is_none_or(|max| security.pe <= max)
        && filters.mcap_max_yi.is_none_or(|max| security.mcap_yi <= max)
        && filters.turn_min_pct.is_none_or(|min| security.turnover_pct >= min)
        && filters
            .tech
            .is_none_or(|trigger| has_trigger(security, trigger))
}

fn has_trigger(security: &Security, trigger: TechTrigger) -> bool {
    match trigger {
        TechTrigger::MaUp5 => security.tech.ma5_up,
        TechTrigger::Break20d => security.tech.break_20d,
        TechTrigger::RsiOversold => security.tech.rsi_rebound,
    }
}

/// Securities that match, in universe order.
pub fn screen<'a>(universe: &'a [Security], dsl: &StrategyDsl) -> Vec<&'a Security> {
    universe.iter().filter(|s| matches(s, dsl)).collect()
}
