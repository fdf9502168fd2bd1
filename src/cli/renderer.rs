use colored::{control, Colorize};

use crate::cli::files_cmd::ReportFile;
use crate::core::dashboard::{ChartKind, ChartPanel, Dashboard, Notice};
use crate::core::formatter::{format_money, format_refreshed_at, format_share_bar, UNAVAILABLE};

const BAR_WIDTH: usize = 20;
const MAX_BREAKDOWN_ROWS: usize = 10;

/// Render the whole dashboard as a colored (or plain) string.
///
/// Layout:
/// ```text
///  Cloud costs (account1)  Updated 14:05:09
///   Total      $412.80
///   Forecast   $980.00
///   RI Util    87.5%
///   SP Util    N/A
///
///  Daily Cost Trend
///   Jul 15     $12.10  [███████████████████░]
///   Jul 16     $12.50  [████████████████████]
/// ```
pub fn render_dashboard(dashboard: &Dashboard, account: &str, use_color: bool) -> String {
    control::set_override(use_color);

    let mut lines: Vec<String> = Vec::new();

    let mut header = format!(" {}", format!("Cloud costs ({})", account).bold());
    if let Some(at) = &dashboard.refreshed_at {
        header.push_str(&format!("  {}", format_refreshed_at(at).dimmed()));
    }
    lines.push(header);

    let tiles = [
        ("Total", &dashboard.tiles.total_cost),
        ("Forecast", &dashboard.tiles.forecasted_cost),
        ("RI Util", &dashboard.tiles.ri_utilization),
        ("SP Util", &dashboard.tiles.sp_utilization),
    ];
    for (label, value) in tiles {
        let padded_label = format!("{:<9}", label);
        let value = if value == UNAVAILABLE {
            value.dimmed().to_string()
        } else {
            value.green().to_string()
        };
        lines.push(format!("  {}  {}", padded_label.cyan(), value));
    }

    for chart in dashboard.charts() {
        lines.push(String::new());
        render_chart(&mut lines, chart);
    }

    lines.join("\n")
}

fn render_chart(lines: &mut Vec<String>, chart: &ChartPanel) {
    lines.push(format!(" {}", chart.title.bold()));
    if chart.is_empty() {
        lines.push(format!("  {}", "No data".dimmed()));
        return;
    }

    let mut points: Vec<(&str, f64)> = chart
        .labels
        .iter()
        .map(String::as_str)
        .zip(chart.values.iter().copied())
        .collect();
    let mut hidden = 0;
    if chart.kind != ChartKind::Line {
        points.sort_by(|a, b| b.1.total_cmp(&a.1));
        hidden = points.len().saturating_sub(MAX_BREAKDOWN_ROWS);
        points.truncate(MAX_BREAKDOWN_ROWS);
    }

    let max = points.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
    let label_width = points
        .iter()
        .map(|(l, _)| l.chars().count())
        .max()
        .unwrap_or(0)
        .min(32);
    let value_width = points
        .iter()
        .map(|(_, v)| format_money(*v).len())
        .max()
        .unwrap_or(0);

    for (label, value) in points {
        let label: String = label.chars().take(label_width).collect();
        lines.push(format!(
            "  {:<lw$}  {:>vw$}  {}",
            label,
            format_money(value),
            format_share_bar(value, max, BAR_WIDTH).magenta(),
            lw = label_width,
            vw = value_width,
        ));
    }
    if hidden > 0 {
        lines.push(format!("  {}", format!("(+{} more)", hidden).dimmed()));
    }
}

/// Render notices as a banner, one line each.
pub fn render_notices(notices: &[Notice], use_color: bool) -> String {
    control::set_override(use_color);
    notices
        .iter()
        .map(|n| format!(" {} {}", "!".red().bold(), n.message.red()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render the report-file listing, newest first.
pub fn render_files(files: &[ReportFile], account: &str, use_color: bool) -> String {
    control::set_override(use_color);

    let mut lines = vec![format!(" {}", format!("Report files ({})", account).bold())];
    if files.is_empty() {
        lines.push(format!("  {}", "No report files found".dimmed()));
        return lines.join("\n");
    }

    let name_width = files.iter().map(|f| f.name.chars().count()).max().unwrap_or(0);
    for file in files {
        let category = file.category.unwrap_or("unknown");
        let mut line = format!(
            "  {:<nw$}  {}",
            file.name,
            category.cyan(),
            nw = name_width
        );
        if file.latest {
            line.push_str(&format!("  {}", "latest".green()));
        }
        lines.push(line);
    }
    lines.join("\n")
}
