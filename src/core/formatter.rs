use chrono::{DateTime, Local};

/// Marker shown on a metric tile that has no usable data.
pub const UNAVAILABLE: &str = "N/A";

/// Returns "$12.50". Negative amounts (credits, refunds) keep their sign: "-$3.00".
pub fn format_money(amount: f64) -> String {
    if amount < 0.0 {
        format!("-${:.2}", amount.abs())
    } else {
        format!("${:.2}", amount)
    }
}

/// Money tile text, or the unavailable marker.
pub fn format_money_tile(amount: Option<f64>) -> String {
    amount.map(format_money).unwrap_or_else(|| UNAVAILABLE.to_string())
}

/// Returns "87.5%" with one decimal place.
pub fn format_percent(percent: f64) -> String {
    format!("{:.1}%", percent)
}

/// Percent tile text, or the unavailable marker.
pub fn format_percent_tile(percent: Option<f64>) -> String {
    percent.map(format_percent).unwrap_or_else(|| UNAVAILABLE.to_string())
}

/// Returns "[████████░░░░]" where █ is the share of `value` in `max`.
/// Width is the number of block characters inside the brackets.
pub fn format_share_bar(value: f64, max: f64, width: usize) -> String {
    let ratio = if max > 0.0 {
        (value / max).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let filled_blocks = (ratio * width as f64).round() as usize;
    let empty_blocks = width.saturating_sub(filled_blocks);

    format!("[{}{}]", "█".repeat(filled_blocks), "░".repeat(empty_blocks))
}

/// Returns "Updated 14:05:09".
pub fn format_refreshed_at(at: &DateTime<Local>) -> String {
    format!("Updated {}", at.format("%H:%M:%S"))
}
