//! CLI definition and dispatch.
//!
//! The CLI is the rendering layer: it resolves settings and collaborators,
//! calls into the deterministic core, and prints plain-text tables to
//! stdout (or JSON with `--json`). Progress and warnings go to stderr.

use clap::{Parser, Subcommand};
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvSecurityAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_market_adapter::JsonMarketAdapter;
use crate::adapters::memory_adapter::MemoryAdapter;
use crate::domain::analysis::auto_analysis;
use crate::domain::config_validation::AppSettings;
use crate::domain::display::{fmt_money_yi, fmt_num, fmt_pct};
use crate::domain::error::StockdeskError;
use crate::domain::market::{resolve_snapshot, ResolvedSnapshot, SectorView, SnapshotSource};
use crate::domain::nl_parser;
use crate::domain::screen;
use crate::domain::security::{order_by_watchlist, Security};
use crate::domain::sentiment::{narrative, pulse, sentiment_label};
use crate::domain::strategy::{FormInput, StrategyDsl};
use crate::domain::timeline::{self, clamp_day_window, TimelineEvent};
use crate::ports::market_port::MarketPort;
use crate::ports::security_port::SecurityPort;
use crate::ports::strategy_store::{StrategyRun, StrategyStore};

#[derive(Parser, Debug)]
#[command(
    name = "stockdesk",
    about = "Rule-based stock screening with reproducible signal simulation"
)]
pub struct Cli {
    /// INI configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the market snapshot, sentiment and sector ranking
    Market {
        #[arg(long)]
        seed: Option<u32>,
        #[arg(long)]
        json: bool,
    },
    /// Extract a strategy draft from free text
    Parse {
        text: String,
        /// JSON strategy to merge into instead of an empty draft
        #[arg(long)]
        base: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// List securities matching a strategy
    Screen {
        #[arg(long, conflicts_with = "strategy")]
        text: Option<String>,
        /// Stored strategy id
        #[arg(long)]
        strategy: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Simulate a signal timeline for one security
    Simulate {
        #[arg(long)]
        code: String,
        #[arg(long, conflicts_with = "strategy")]
        text: Option<String>,
        /// Stored strategy id; the run is recorded against it
        #[arg(long)]
        strategy: Option<String>,
        #[arg(long)]
        days: Option<u32>,
        #[arg(long)]
        seed: Option<u32>,
        #[arg(long)]
        json: bool,
    },
    /// Search the security universe
    Stocks {
        query: Option<String>,
        /// Codes to float to the top
        #[arg(long = "watch", value_delimiter = ',')]
        watchlist: Vec<String>,
    },
    /// Show one security with rule-template commentary
    Stock {
        code: String,
        #[arg(long)]
        seed: Option<u32>,
    },
    /// Manage stored strategies
    Strategy {
        #[command(subcommand)]
        action: StrategyAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum StrategyAction {
    /// Parse text and store the result
    Save {
        text: String,
        #[arg(long)]
        name: Option<String>,
    },
    /// Store a strategy built from individual fields
    Create {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        pe_max: String,
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        mcap_max: String,
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        turn_min: String,
        /// ma_up_5, break_20d or rsi_oversold
        #[arg(long, default_value = "")]
        tech: String,
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        take_profit: String,
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        stop_loss: String,
        /// close_below_ma10, bearish_engulfing or volume_breakdown
        #[arg(long = "exit", default_value = "")]
        exit_pattern: String,
        #[arg(long, default_value = "")]
        note: String,
    },
    /// List stored strategies, newest first
    List,
    /// Show one stored strategy
    Show { id: String },
    /// List recorded simulation runs of a strategy
    Runs {
        id: String,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let settings = match load_settings(cli.config.as_ref()) {
        Ok(s) => s,
        Err(e) => return report(&e),
    };

    let result = match cli.command {
        Command::Market { seed, json } => run_market(&settings, seed, json),
        Command::Parse { text, base, json } => run_parse(&text, base.as_ref(), json),
        Command::Screen {
            text,
            strategy,
            json,
        } => run_screen(&settings, text.as_deref(), strategy.as_deref(), json),
        Command::Simulate {
            code,
            text,
            strategy,
            days,
            seed,
            json,
        } => run_simulate(
            &settings,
            &SimulateRequest {
                code,
                text,
                strategy_id: strategy,
                days,
                seed,
            },
            json,
        ),
        Command::Stocks { query, watchlist } => {
            run_stocks(&settings, query.as_deref().unwrap_or(""), &watchlist)
        }
        Command::Stock { code, seed } => run_stock(&settings, &code, seed),
        Command::Strategy { action } => run_strategy(&settings, action),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report(&e),
    }
}

fn report(err: &StockdeskError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

/// Settings from the config file, or defaults when none is given.
pub fn load_settings(path: Option<&PathBuf>) -> Result<AppSettings, StockdeskError> {
    match path {
        Some(path) => {
            eprintln!("Loading config from {}", path.display());
            let adapter = FileConfigAdapter::from_file(path)?;
            AppSettings::from_config(&adapter)
        }
        None => AppSettings::from_config(&FileConfigAdapter::empty()),
    }
}

/// CSV universe when configured, otherwise the built-in sample.
pub fn open_securities(settings: &AppSettings) -> Result<Box<dyn SecurityPort>, StockdeskError> {
    match &settings.universe_csv {
        Some(path) => {
            let adapter = CsvSecurityAdapter::from_file(path)?;
            eprintln!("Loaded {} securities from {}", adapter.len(), path.display());
            Ok(Box::new(adapter))
        }
        None => Ok(Box::new(MemoryAdapter::sample())),
    }
}

#[cfg(feature = "sqlite")]
pub fn open_store(settings: &AppSettings) -> Result<Box<dyn StrategyStore>, StockdeskError> {
    use crate::adapters::sqlite_adapter::SqliteAdapter;

    Ok(Box::new(SqliteAdapter::from_settings(settings)?))
}

#[cfg(not(feature = "sqlite"))]
pub fn open_store(_settings: &AppSettings) -> Result<Box<dyn StrategyStore>, StockdeskError> {
    Err(StockdeskError::ConfigInvalid {
        section: "sqlite".into(),
        key: "path".into(),
        reason: "stockdesk was built without the sqlite feature".into(),
    })
}

/// Live snapshot when a feed is configured and answers in time, otherwise
/// the locally generated one. Fallback notices are printed to stderr.
pub fn resolve_market(settings: &AppSettings, seed_override: Option<u32>) -> ResolvedSnapshot {
    let seed = seed_override.unwrap_or(settings.market_seed);
    let feed = settings.feed_path.clone().map(JsonMarketAdapter::new);
    let resolved = resolve_snapshot(
        feed.as_ref().map(|f| f as &dyn MarketPort),
        seed,
        settings.feed_timeout,
    );
    if let Some(notice) = &resolved.notice {
        eprintln!("{notice}");
    }
    resolved
}

/// Base draft for `--base`, or an empty one.
pub fn load_base(path: Option<&PathBuf>) -> Result<StrategyDsl, StockdeskError> {
    match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            Ok(serde_json::from_str(&content)?)
        }
        None => Ok(StrategyDsl::draft()),
    }
}

/// Strategy from free text, a stored id, or an empty draft.
pub fn resolve_strategy(
    settings: &AppSettings,
    text: Option<&str>,
    strategy_id: Option<&str>,
) -> Result<StrategyDsl, StockdeskError> {
    match (text, strategy_id) {
        (_, Some(id)) => open_store(settings)?
            .get(id)?
            .ok_or_else(|| StockdeskError::not_found("strategy", id)),
        (Some(text), None) => Ok(nl_parser::parse(text, &StrategyDsl::draft())),
        (None, None) => Ok(StrategyDsl::draft()),
    }
}

fn print_json(value: &serde_json::Value) -> Result<(), StockdeskError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run_market(settings: &AppSettings, seed: Option<u32>, json: bool) -> Result<(), StockdeskError> {
    let resolved = resolve_market(settings, seed);
    if json {
        return print_json(&market_json(&resolved));
    }
    print!("{}", render_market(&resolved));
    Ok(())
}

pub fn market_json(resolved: &ResolvedSnapshot) -> serde_json::Value {
    let m = &resolved.snapshot;
    let (source, seed) = match resolved.source {
        SnapshotSource::Live => ("live", None),
        SnapshotSource::Generated { seed } => ("generated", Some(seed)),
    };
    json!({
        "source": source,
        "seed": seed,
        "snapshot": m,
        "advDeclRatio": m.advance_decline_ratio(),
        "sentimentLabel": sentiment_label(m.sentiment_score),
        "narrative": narrative(m).lines(),
        "pulse": pulse(m)
            .into_iter()
            .map(|b| json!({ "title": b.title, "detail": b.detail }))
            .collect::<Vec<_>>(),
    })
}

pub fn render_market(resolved: &ResolvedSnapshot) -> String {
    let m = &resolved.snapshot;
    let mut out = String::new();

    match resolved.source {
        SnapshotSource::Live => out.push_str("行情来源：实时\n"),
        SnapshotSource::Generated { seed } => {
            out.push_str(&format!("行情来源：本地示例（seed {seed}）\n"))
        }
    }

    out.push_str("\n指数\n");
    for idx in &m.indices {
        out.push_str(&format!(
            "  {:<6} {:>10} {:>8}\n",
            idx.name,
            fmt_num(Some(idx.value), 2),
            fmt_pct(Some(idx.chg_pct), 2)
        ));
    }

    out.push_str(&format!(
        "\n成交额 {}（较昨日 {}）  北向 {}  主力净额 {}\n",
        fmt_money_yi(Some(m.turnover_yi)),
        fmt_pct(m.turnover_delta_pct, 1),
        fmt_money_yi(m.north_yi),
        fmt_money_yi(m.main_force_yi)
    ));
    out.push_str(&format!(
        "涨跌家数 {} / {}（比值 {}）  量能变化 {}  涨停/跌停 {} / {}\n",
        m.adv,
        m.decl,
        fmt_num(Some(m.advance_decline_ratio()), 2),
        fmt_pct(Some(m.vol_change_pct), 1),
        m.up_limit,
        m.down_limit
    ));
    out.push_str(&format!(
        "波动强度 {}/100  情绪 {}/100 {}\n",
        m.vol_intensity,
        m.sentiment_score,
        sentiment_label(m.sentiment_score)
    ));

    out.push('\n');
    for line in narrative(m).lines() {
        out.push_str(&line);
        out.push('\n');
    }

    out.push_str("\n脉冲\n");
    for bullet in pulse(m) {
        out.push_str(&format!("  {}\n    {}\n", bullet.title, bullet.detail));
    }

    out.push_str("\n板块（涨幅）\n");
    for s in m.ranked_sectors(SectorView::Gainers) {
        out.push_str(&format!(
            "  {:<6} 涨跌 {:>7}  资金 {:>8}\n",
            s.name,
            fmt_pct(Some(s.gain_pct), 2),
            fmt_money_yi(Some(s.money_yi))
        ));
    }
    out
}

fn run_parse(text: &str, base: Option<&PathBuf>, json: bool) -> Result<(), StockdeskError> {
    let base = load_base(base)?;
    let dsl = nl_parser::parse(text, &base);
    if json {
        return print_json(&serde_json::to_value(&dsl)?);
    }
    let hits = nl_parser::matched_rules(text);
    if hits.is_empty() {
        eprintln!("No rule fragments recognised; draft unchanged");
    } else {
        eprintln!("Recognised: {}", hits.join(", "));
    }
    print!("{}", render_strategy(&dsl));
    Ok(())
}

pub fn render_strategy(dsl: &StrategyDsl) -> String {
    let mut out = String::new();
    out.push_str(&format!("名称  {}\n", dsl.name));
    if let Some(id) = &dsl.id {
        out.push_str(&format!("编号  {id}\n"));
        out.push_str(&format!("创建  {}\n", dsl.created_at.format("%Y-%m-%d %H:%M")));
    }
    let chips = dsl.active_filters();
    if chips.is_empty() {
        out.push_str(&format!("规则  {}\n", dsl.summary()));
    } else {
        out.push_str("规则\n");
        for (key, value) in chips {
            out.push_str(&format!("  {key}  {value}\n"));
        }
    }
    if !dsl.tags.is_empty() {
        let tags: Vec<_> = dsl.tags.iter().map(|t| t.label()).collect();
        out.push_str(&format!("标签  {}\n", tags.join(" ")));
    }
    if !dsl.filters.note.is_empty() {
        out.push_str(&format!("备注  {}\n", dsl.filters.note));
    }
    if !dsl.nl.is_empty() {
        out.push_str(&format!("原文  {}\n", dsl.nl));
    }
    out
}

fn run_screen(
    settings: &AppSettings,
    text: Option<&str>,
    strategy_id: Option<&str>,
    json: bool,
) -> Result<(), StockdeskError> {
    let store = match strategy_id {
        Some(_) => Some(open_store(settings)?),
        None => None,
    };
    let dsl = match (strategy_id, &store) {
        (Some(id), Some(store)) => store
            .get(id)?
            .ok_or_else(|| StockdeskError::not_found("strategy", id))?,
        _ => resolve_strategy(settings, text, None)?,
    };
    let trade_date = chrono::Local::now().format("%Y%m%d").to_string();
    let outcome = screen_with(open_securities(settings)?.as_ref(), &dsl, trade_date)?;

    if let (Some(id), Some(store)) = (strategy_id, &store) {
        let run = store.record_run(id, &outcome.params_json(), &outcome.result_json())?;
        eprintln!("Recorded run {}", run.id);
    }

    if json {
        return print_json(&json!({
            "strategy": dsl,
            "total": outcome.total,
            "matches": outcome.matches,
        }));
    }

    eprintln!("Strategy: {}", dsl.summary());
    println!("命中 {} / {}", outcome.matches.len(), outcome.total);
    let rows: Vec<&Security> = outcome.matches.iter().collect();
    print!("{}", render_securities(&rows));
    Ok(())
}

/// Matches kept in a recorded screen run.
pub const SCREEN_RUN_ITEMS: usize = 100;

/// One screen of the universe on a given trade date.
#[derive(Debug, Clone)]
pub struct ScreenOutcome {
    pub trade_date: String,
    pub total: usize,
    pub matches: Vec<Security>,
}

impl ScreenOutcome {
    pub fn params_json(&self) -> serde_json::Value {
        json!({
            "kind": "screen",
            "trade_date": self.trade_date,
        })
    }

    pub fn result_json(&self) -> serde_json::Value {
        let items = &self.matches[..self.matches.len().min(SCREEN_RUN_ITEMS)];
        json!({
            "trade_date": self.trade_date,
            "count": items.len(),
            "total": self.total,
            "items": items,
        })
    }
}

pub fn screen_with(
    securities: &dyn SecurityPort,
    strategy: &StrategyDsl,
    trade_date: String,
) -> Result<ScreenOutcome, StockdeskError> {
    let universe = securities.list_securities()?;
    let matches = screen::screen(&universe, strategy)
        .into_iter()
        .cloned()
        .collect();
    Ok(ScreenOutcome {
        trade_date,
        total: universe.len(),
        matches,
    })
}

pub fn render_securities(rows: &[&Security]) -> String {
    let mut out = String::new();
    for s in rows {
        out.push_str(&format!(
            "{}  {:<6} {:<6} PE {:>6}  市值 {:>7}亿  换手 {:>5}%  {:>9}  {:>7}\n",
            s.code,
            s.name,
            s.industry,
            fmt_num(Some(s.pe), 1),
            fmt_num(Some(s.mcap_yi), 0),
            fmt_num(Some(s.turnover_pct), 1),
            fmt_num(Some(s.price), 2),
            fmt_pct(Some(s.change_pct), 2)
        ));
    }
    out
}

/// Inputs of one `simulate` invocation.
#[derive(Debug, Clone, Default)]
pub struct SimulateRequest {
    pub code: String,
    pub text: Option<String>,
    pub strategy_id: Option<String>,
    pub days: Option<u32>,
    pub seed: Option<u32>,
}

/// Resolved inputs and the resulting events.
#[derive(Debug, Clone)]
pub struct SimulationOutcome {
    pub security: Security,
    pub strategy: StrategyDsl,
    pub days: u32,
    pub seed: u32,
    pub events: Vec<TimelineEvent>,
}

impl SimulationOutcome {
    pub fn params_json(&self) -> serde_json::Value {
        json!({
            "kind": "simulate",
            "code": self.security.code,
            "days": self.days,
            "seed": self.seed,
        })
    }

    pub fn result_json(&self) -> serde_json::Value {
        json!({
            "count": self.events.len(),
            "events": self.events,
        })
    }
}

/// Run the simulator against collaborators already opened by the caller.
pub fn simulate_with(
    securities: &dyn SecurityPort,
    strategy: StrategyDsl,
    market: &ResolvedSnapshot,
    request: &SimulateRequest,
    settings: &AppSettings,
) -> Result<SimulationOutcome, StockdeskError> {
    let security = securities
        .get_security(&request.code)?
        .ok_or_else(|| StockdeskError::not_found("security", &request.code))?;
    let days = clamp_day_window(request.days.unwrap_or(settings.day_window));
    let seed = request.seed.unwrap_or(settings.market_seed);
    let events = timeline::simulate(&security, &strategy, days, seed, Some(&market.snapshot));
    Ok(SimulationOutcome {
        security,
        strategy,
        days,
        seed,
        events,
    })
}

fn run_simulate(
    settings: &AppSettings,
    request: &SimulateRequest,
    json: bool,
) -> Result<(), StockdeskError> {
    let securities = open_securities(settings)?;
    let store = match &request.strategy_id {
        Some(_) => Some(open_store(settings)?),
        None => None,
    };
    let strategy = match (&request.strategy_id, &store) {
        (Some(id), Some(store)) => store
            .get(id)?
            .ok_or_else(|| StockdeskError::not_found("strategy", id))?,
        _ => resolve_strategy(settings, request.text.as_deref(), None)?,
    };

    let market = resolve_market(settings, request.seed);
    let outcome = simulate_with(
        securities.as_ref(),
        strategy,
        &market,
        request,
        settings,
    )?;

    if let (Some(id), Some(store)) = (&request.strategy_id, &store) {
        let run = store.record_run(id, &outcome.params_json(), &outcome.result_json())?;
        eprintln!("Recorded run {}", run.id);
    }

    if json {
        return print_json(&json!({
            "strategy": outcome.strategy,
            "params": outcome.params_json(),
            "events": outcome.events,
        }));
    }

    eprintln!(
        "Simulating {} {} over {} days with {}",
        outcome.security.code,
        outcome.security.name,
        outcome.days,
        outcome.strategy.seed_name()
    );
    print!("{}", render_timeline(&outcome.events));
    Ok(())
}

pub fn render_timeline(events: &[TimelineEvent]) -> String {
    if events.is_empty() {
        return "这段时间没有触发事件（示例）。你可以换策略或调时间范围。\n".to_string();
    }
    let mut out = String::new();
    for e in events {
        out.push_str(&format!(
            "{:>6}  [{}] {}\n        {}\n",
            e.time_label(),
            e.tag,
            e.title,
            e.explanation
        ));
    }
    out
}

fn run_stocks(
    settings: &AppSettings,
    query: &str,
    watchlist: &[String],
) -> Result<(), StockdeskError> {
    let rows = open_securities(settings)?.search(query)?;
    let ordered = order_by_watchlist(rows.iter().collect(), watchlist);
    if ordered.is_empty() {
        eprintln!("No securities match {query:?}");
        return Ok(());
    }
    print!("{}", render_securities(&ordered));
    Ok(())
}

fn run_stock(settings: &AppSettings, code: &str, seed: Option<u32>) -> Result<(), StockdeskError> {
    let security = open_securities(settings)?
        .get_security(code)?
        .ok_or_else(|| StockdeskError::not_found("security", code))?;
    let market = resolve_market(settings, seed);
    print!("{}", render_stock(&security, &market));
    Ok(())
}

pub fn render_stock(security: &Security, market: &ResolvedSnapshot) -> String {
    let s = security;
    let mut out = format!("{} {}  {}\n", s.code, s.name, s.industry);
    out.push_str(&format!(
        "价格 {}  涨跌 {}  PE {}  市值 {}亿  换手 {}%\n",
        fmt_num(Some(s.price), 2),
        fmt_pct(Some(s.change_pct), 2),
        fmt_num(Some(s.pe), 1),
        fmt_num(Some(s.mcap_yi), 0),
        fmt_num(Some(s.turnover_pct), 1)
    ));
    out.push_str(&format!(
        "地区 {}  概念 {}\n",
        s.profile.region,
        s.profile.concepts.join("、")
    ));
    out.push_str("\n解读\n");
    for bit in auto_analysis(s, Some(&market.snapshot)) {
        out.push_str(&format!("- {bit}\n"));
    }
    out
}

fn run_strategy(settings: &AppSettings, action: StrategyAction) -> Result<(), StockdeskError> {
    let store = open_store(settings)?;
    match action {
        StrategyAction::Save { text, name } => {
            let stored = save_strategy(store.as_ref(), &text, name.as_deref())?;
            eprintln!("Saved strategy {}", stored.id.as_deref().unwrap_or_default());
            print!("{}", render_strategy(&stored));
        }
        StrategyAction::Create {
            name,
            pe_max,
            mcap_max,
            turn_min,
            tech,
            take_profit,
            stop_loss,
            exit_pattern,
            note,
        } => {
            let form = FormInput {
                name,
                pe_max,
                mcap_max_yi: mcap_max,
                turn_min_pct: turn_min,
                tech,
                note,
                take_profit_pct: take_profit,
                stop_loss_pct: stop_loss,
                exit_pattern,
                nl: String::new(),
            };
            let stored = store.create(&StrategyDsl::from_form(&form))?;
            eprintln!("Saved strategy {}", stored.id.as_deref().unwrap_or_default());
            print!("{}", render_strategy(&stored));
        }
        StrategyAction::List => {
            let strategies = store.list()?;
            if strategies.is_empty() {
                eprintln!("No strategies stored");
            }
            for s in strategies {
                println!(
                    "{}  {}  {}",
                    s.id.as_deref().unwrap_or_default(),
                    s.name,
                    s.summary()
                );
            }
        }
        StrategyAction::Show { id } => {
            let s = store
                .get(&id)?
                .ok_or_else(|| StockdeskError::not_found("strategy", &id))?;
            print!("{}", render_strategy(&s));
        }
        StrategyAction::Runs { id, limit } => {
            if store.get(&id)?.is_none() {
                return Err(StockdeskError::not_found("strategy", &id));
            }
            print!("{}", render_runs(&store.list_runs(&id, limit)?));
        }
    }
    Ok(())
}

/// Parse `text` (under `name`, if given) and persist it.
pub fn save_strategy(
    store: &dyn StrategyStore,
    text: &str,
    name: Option<&str>,
) -> Result<StrategyDsl, StockdeskError> {
    let mut base = StrategyDsl::draft();
    if let Some(name) = name {
        base.name = name.trim().to_string();
    }
    let dsl = nl_parser::parse(text, &base);
    store.create(&dsl)
}

pub fn render_runs(runs: &[StrategyRun]) -> String {
    let mut out = String::new();
    for r in runs {
        let detail = match r.params["kind"].as_str() {
            Some("screen") => format!(
                "screen trade_date={} hits={}",
                r.params["trade_date"].as_str().unwrap_or("-"),
                r.result["count"]
            ),
            _ => format!(
                "code={} days={} events={}",
                r.params["code"].as_str().unwrap_or("-"),
                r.params["days"],
                r.result["count"]
            ),
        };
        out.push_str(&format!(
            "{}  {}  {}\n",
            r.id,
            r.created_at.format("%Y-%m-%d %H:%M:%S"),
            detail
        ));
    }
    out
}
