use anyhow::{Context, Result};
use std::io::IsTerminal;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;

use crate::cli::output::{OutputFormat, OutputOptions};
use crate::cli::show_cmd::print_dashboard;
use crate::core::config::AppConfig;
use crate::core::dashboard::Dashboard;
use crate::core::fetch::Fetcher;
use crate::core::pipeline::{refresh, RefreshOutcome};

/// What woke the refresh loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Timer,
    Manual,
}

/// Refresh at startup, every `interval_secs`, and whenever a line arrives on
/// stdin. Refreshes run inside this loop, so they never overlap.
pub async fn run(config: &AppConfig, interval_secs: u64, opts: &OutputOptions) -> Result<()> {
    let fetcher = Fetcher::new(&config.source).context("Failed to set up cost report fetcher")?;
    let mut dashboard = Dashboard::new();
    let metric = config.settings.metric.as_str();
    let account = config.source.account.as_str();

    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        let trigger = tokio::select! {
            _ = ticker.tick() => Trigger::Timer,
            line = stdin.next_line(), if stdin_open => match line {
                Ok(Some(_)) => {
                    ticker.reset();
                    Trigger::Manual
                }
                _ => {
                    stdin_open = false;
                    continue;
                }
            },
            _ = tokio::signal::ctrl_c() => break,
        };

        tracing::debug!(?trigger, "refreshing dashboard");
        let outcome = refresh(&fetcher, &mut dashboard, metric).await;
        if outcome == RefreshOutcome::NoData {
            tracing::info!("will retry on the next refresh");
        }

        if opts.format == OutputFormat::Text && std::io::stdout().is_terminal() {
            clear_screen()?;
        }
        print_dashboard(&mut dashboard, account, opts)?;
        if opts.format == OutputFormat::Text {
            eprintln!(
                "\nRefreshing every {}s. Press Enter to refresh now, Ctrl-C to quit.",
                interval_secs
            );
        }
    }

    Ok(())
}

fn clear_screen() -> Result<()> {
    use crossterm::{cursor::MoveTo, execute, terminal::Clear, terminal::ClearType};
    execute!(std::io::stdout(), Clear(ClearType::All), MoveTo(0, 0))?;
    Ok(())
}
