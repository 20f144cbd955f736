//! Text rendering of panels. Values are rounded to cents here and nowhere else.

use std::fmt::Write as _;

use crate::{
    metrics::Change,
    pipeline::{PanelState, SymbolPanel},
};

/// Points listed at the bottom of a rendered panel.
pub const RECENT_POINTS: usize = 5;

/// Rounds to two decimals, never yielding `-0.00`.
pub fn round_cents(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// `$1,234.50`
pub fn format_price(price: f64) -> String {
    let cents = format!("{:.2}", round_cents(price).abs());
    let (whole, frac) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let sign = if round_cents(price) < 0.0 { "-" } else { "" };
    format!("{sign}${grouped}.{frac}")
}

/// `+3.00 (+3.03%)`
pub fn format_change(change: &Change) -> String {
    format!(
        "{:+.2} ({:+.2}%)",
        round_cents(change.delta),
        round_cents(change.percent)
    )
}

/// Like [`format_change`], but `n/a` for a metric that was skipped.
pub fn format_optional(change: Option<&Change>) -> String {
    change.map_or_else(|| "n/a".to_string(), format_change)
}

/// Renders one panel as a plain-text block.
pub fn render_panel(panel: &SymbolPanel) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({}) | {}", panel.company_name, panel.symbol, panel.window);

    match &panel.state {
        PanelState::Ready(data) => {
            let m = &data.metrics;
            let _ = writeln!(
                out,
                "  Price: {}  {:+.2}",
                format_price(m.latest_price),
                round_cents(m.instant_delta)
            );
            let _ = writeln!(out, "  Since Previous Close: {}", format_optional(m.previous_close.as_ref()));
            let _ = writeln!(out, "  Since Open: {}", format_optional(m.session.as_ref()));
            let _ = writeln!(out, "  {}: {}", panel.window, format_change(&m.window));

            let skip = data.points.len().saturating_sub(RECENT_POINTS);
            for point in &data.points[skip..] {
                let _ = writeln!(
                    out,
                    "    {:>13}  {:>12}  MA {:>12}",
                    point.label,
                    format_price(point.price),
                    format_price(point.moving_average)
                );
            }
        }
        PanelState::NoData(err) => {
            let _ = writeln!(out, "  no data available ({err})");
        }
        PanelState::Failed(err) => {
            let _ = writeln!(out, "  unavailable: {err}");
        }
    }
    out
}
