//! Sampling interval selection
//!
//! Widgets plot on a small area, so the interval is widened when the selected
//! window would otherwise produce too many bins.

use super::{DateTimeSelection, DisplayType, Widget};
use crate::consts::cli_consts::widgets::{BAR_CHART_INTERVAL, DEFAULT_INTERVAL, MAX_BIN_COUNT};

const ONE_HOUR: f64 = 60.0;
const TWENTY_FOUR_HOURS: f64 = 24.0 * ONE_HOUR;
const THIRTY_DAYS: f64 = 30.0 * TWENTY_FOUR_HOURS;
const SIXTY_DAYS: f64 = 60.0 * TWENTY_FOUR_HOURS;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Fidelity {
    High,
    Medium,
    Low,
}

/// Parses a period such as `30m`, `24h`, `14d` or `2w` into minutes.
pub fn parse_period_to_minutes(period: &str) -> Option<f64> {
    let period = period.trim();
    let unit = period.chars().last()?;
    let amount: f64 = period[..period.len() - unit.len_utf8()].parse().ok()?;
    if amount < 0.0 {
        return None;
    }
    let minutes_per_unit = match unit {
        's' => 1.0 / 60.0,
        'm' => 1.0,
        'h' => ONE_HOUR,
        'd' => TWENTY_FOUR_HOURS,
        'w' => 7.0 * TWENTY_FOUR_HOURS,
        _ => return None,
    };
    Some(amount * minutes_per_unit)
}

/// Length of the selected window in minutes. Unparsable periods count as empty.
pub fn diff_in_minutes(datetime: &DateTimeSelection) -> f64 {
    match datetime {
        DateTimeSelection::Absolute { start, end } => (*end - *start).num_seconds() as f64 / 60.0,
        DateTimeSelection::Relative { period } => parse_period_to_minutes(period).unwrap_or(0.0),
    }
}

pub fn get_interval(datetime: &DateTimeSelection, fidelity: Fidelity) -> &'static str {
    let diff = diff_in_minutes(datetime);
    let (high, medium, low) = if diff >= SIXTY_DAYS {
        ("4h", "1d", "2d")
    } else if diff >= THIRTY_DAYS {
        ("1h", "4h", "1d")
    } else if diff > TWENTY_FOUR_HOURS {
        ("30m", "1h", "2h")
    } else if diff <= ONE_HOUR {
        ("1m", "5m", "10m")
    } else {
        ("5m", "15m", "1h")
    };

    match fidelity {
        Fidelity::High => high,
        Fidelity::Medium => medium,
        Fidelity::Low => low,
    }
}

/// Picks the interval requested for a widget over the given window.
pub fn get_widget_interval(widget: &Widget, datetime: &DateTimeSelection) -> String {
    let desired = match widget.display_type {
        DisplayType::Bar => BAR_CHART_INTERVAL,
        _ => widget
            .interval
            .as_deref()
            .filter(|i| parse_period_to_minutes(i).is_some_and(|m| m > 0.0))
            .unwrap_or(DEFAULT_INTERVAL),
    };
    let desired_minutes = parse_period_to_minutes(desired).unwrap_or(5.0);

    if diff_in_minutes(datetime) / desired_minutes > MAX_BIN_COUNT {
        let high = get_interval(datetime, Fidelity::High);
        // Only widen; never go finer than the widget asked for.
        if parse_period_to_minutes(high).is_some_and(|m| desired_minutes < m) {
            return high.to_string();
        }
    }
    desired.to_string()
}
