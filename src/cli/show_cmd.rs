use anyhow::{Context, Result};

use crate::cli::output::{OutputFormat, OutputOptions};
use crate::cli::renderer;
use crate::core::config::AppConfig;
use crate::core::dashboard::Dashboard;
use crate::core::fetch::Fetcher;
use crate::core::pipeline::refresh;

/// Print the dashboard for the current state of a `Dashboard`.
///
/// Pending notices are shown once and dismissed.
pub fn print_dashboard(dashboard: &mut Dashboard, account: &str, opts: &OutputOptions) -> Result<()> {
    match opts.format {
        OutputFormat::Text => {
            let notices = dashboard.take_notices();
            if !notices.is_empty() {
                eprintln!("{}\n", renderer::render_notices(&notices, opts.use_color));
            }
            println!("{}", renderer::render_dashboard(dashboard, account, opts.use_color));
        }
        OutputFormat::Json => {
            let json = if opts.pretty {
                serde_json::to_string_pretty(dashboard)?
            } else {
                serde_json::to_string(dashboard)?
            };
            println!("{}", json);
            dashboard.take_notices();
        }
    }
    Ok(())
}

pub async fn run(config: &AppConfig, opts: &OutputOptions) -> Result<()> {
    let fetcher = Fetcher::new(&config.source).context("Failed to set up cost report fetcher")?;
    let mut dashboard = Dashboard::new();

    refresh(&fetcher, &mut dashboard, &config.settings.metric).await;
    print_dashboard(&mut dashboard, &config.source.account, opts)
}
