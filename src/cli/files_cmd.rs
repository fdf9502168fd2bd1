use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::output::{OutputFormat, OutputOptions};
use crate::cli::renderer;
use crate::core::config::AppConfig;
use crate::core::fetch::fallback::{select_most_recent, ReportCategory};
use crate::core::fetch::Fetcher;

/// One report file offered by the fallback source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportFile {
    pub name: String,
    pub category: Option<&'static str>,
    /// The file the fallback would load for its category.
    pub latest: bool,
}

/// Newest names first, each tagged with its category.
pub fn describe_files(mut files: Vec<String>) -> Vec<ReportFile> {
    let latest: Vec<String> = ReportCategory::all()
        .iter()
        .filter_map(|category| select_most_recent(&files, category.prefix()))
        .map(str::to_string)
        .collect();
    files.sort_by(|a, b| b.cmp(a));
    files.dedup();

    files
        .into_iter()
        .map(|name| ReportFile {
            category: ReportCategory::for_file(&name).map(|c| c.label()),
            latest: latest.contains(&name),
            name,
        })
        .collect()
}

pub async fn run(config: &AppConfig, opts: &OutputOptions) -> Result<()> {
    let fetcher = Fetcher::new(&config.source).context("Failed to set up cost report fetcher")?;
    let files = fetcher
        .list_files()
        .await
        .context("Failed to list report files")?;
    let files = describe_files(files);

    match opts.format {
        OutputFormat::Text => {
            println!(
                "{}",
                renderer::render_files(&files, &config.source.account, opts.use_color)
            );
        }
        OutputFormat::Json => {
            let json = if opts.pretty {
                serde_json::to_string_pretty(&files)?
            } else {
                serde_json::to_string(&files)?
            };
            println!("{}", json);
        }
    }
    Ok(())
}
