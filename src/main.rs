mod cli;
mod core;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::core::config::{AppConfig, FallbackConfig};

#[derive(Parser)]
#[command(name = "costdash", about = "Terminal dashboard for cloud cost reports", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Output format (text|json)
    #[arg(short, long, global = true)]
    format: Option<String>,

    /// Shorthand for --format json
    #[arg(short = 'j', long = "json", global = true)]
    json: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    /// Increase log verbosity on stderr (-v: info, -vv: debug, -vvv: trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Account whose reports are shown
    #[arg(long, global = true)]
    account: Option<String>,

    /// Primary cost API endpoint
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Read fallback report files from this directory instead of over HTTP
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Cost metric to aggregate (e.g. BlendedCost, UnblendedCost)
    #[arg(long, global = true)]
    metric: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch cost reports once and print the dashboard
    Show,
    /// Keep the dashboard on screen and refresh it periodically
    Watch {
        /// Seconds between refreshes (default: from config)
        #[arg(short, long)]
        interval: Option<u64>,
    },
    /// List the report files available to the fallback source
    Files,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Generate default config file
    Init,
    /// Validate config file
    Check,
    /// Print the config file path
    Path,
}

/// Initialize logging with the specified verbosity level
fn init_logging(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter =
        EnvFilter::from_default_env().add_directive(format!("costdash={}", level).parse()?);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose >= 2)
        .init();

    Ok(())
}

impl Cli {
    fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(account) = &self.account {
            config.source.account = account.clone();
        }
        if let Some(url) = &self.api_url {
            config.source.primary_url = url.clone();
        }
        if let Some(dir) = &self.data_dir {
            config.source.fallback = FallbackConfig::Dir { path: dir.clone() };
        }
        if let Some(metric) = &self.metric {
            config.settings.metric = metric.clone();
        }
    }

    fn output_options(&self, config: &AppConfig) -> cli::output::OutputOptions {
        let format = if self.json {
            cli::output::OutputFormat::Json
        } else {
            let name = self
                .format
                .as_deref()
                .unwrap_or(&config.settings.default_format);
            cli::output::OutputFormat::from_name(name).unwrap_or(cli::output::OutputFormat::Text)
        };
        cli::output::OutputOptions {
            format,
            pretty: self.pretty,
            use_color: cli::output::detect_color(!self.no_color, &config.settings.color),
        }
    }
}

/// Load the config file, apply command-line overrides and reject invalid settings.
fn prepare(args: &Cli) -> (AppConfig, cli::output::OutputOptions) {
    let mut config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "using default config");
        AppConfig::default()
    });
    args.apply_overrides(&mut config);

    let issues = config.validate();
    if !issues.is_empty() {
        for issue in &issues {
            eprintln!("Config issue: {}", issue);
        }
        std::process::exit(1);
    }

    let output_opts = args.output_options(&config);
    (config, output_opts)
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut args = Cli::parse();
    init_logging(args.verbose)?;

    match args.command.take().unwrap_or(Commands::Show) {
        Commands::Config { action } => match action {
            ConfigAction::Init => cli::config_cmd::init()?,
            ConfigAction::Check => cli::config_cmd::check()?,
            ConfigAction::Path => cli::config_cmd::path()?,
        },
        Commands::Show => {
            let (config, output_opts) = prepare(&args);
            cli::show_cmd::run(&config, &output_opts).await?;
        }
        Commands::Files => {
            let (config, output_opts) = prepare(&args);
            cli::files_cmd::run(&config, &output_opts).await?;
        }
        Commands::Watch { interval } => {
            let (config, output_opts) = prepare(&args);
            let interval = interval.unwrap_or(config.settings.refresh_secs);
            cli::watch_cmd::run(&config, interval, &output_opts).await?;
        }
    }

    Ok(())
}
