//! Number formatting shared by the narrative builders and the CLI.

/// Fixed-point with `digits` decimals, `--` for unknown values.
pub fn fmt_num(value: Option<f64>, digits: usize) -> String {
    match value {
        Some(v) if !v.is_nan() => fixed(v, digits),
        _ => "--".to_string(),
    }
}

/// Signed percentage, e.g. `+1.25%` or `-0.80%`.
pub fn fmt_pct(value: Option<f64>, digits: usize) -> String {
    match value {
        Some(v) if !v.is_nan() => format!("{}{}%", sign(v), fixed(v, digits)),
        _ => "--".to_string(),
    }
}

/// Signed amount in 亿 with one decimal, e.g. `+68.5亿`.
pub fn fmt_money_yi(value: Option<f64>) -> String {
    match value {
        Some(v) if !v.is_nan() => format!("{}{}亿", sign(v), fixed(v, 1)),
        _ => "--".to_string(),
    }
}

/// Fixed-point text where an exact decimal tie rounds away from zero, and
/// negative zero prints without a sign.
fn fixed(v: f64, digits: usize) -> String {
    let magnitude = v.abs();
    let exact = format!("{magnitude:.1074}");
    let tail = exact
        .split_once('.')
        .and_then(|(_, frac)| frac.get(digits..))
        .unwrap_or("");
    let tie = tail.starts_with('5') && tail[1..].bytes().all(|b| b == b'0');
    let magnitude = if tie {
        f64::from_bits(magnitude.to_bits() + 1)
    } else {
        magnitude
    };
    let body = format!("{magnitude:.digits$}");
    if v < 0.0 { format!("-{body}") } else { body }
}

fn sign(v: f64) -> &'static str {
    if v > 0.0 { "+" } else { "" }
}
