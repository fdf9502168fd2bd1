use anyhow::Result;

use crate::core::config::{AppConfig, FallbackConfig};

pub fn init() -> Result<()> {
    let path = AppConfig::config_path();
    if path.exists() {
        eprintln!("Config file already exists at {}", path.display());
        eprintln!("Remove it first if you want to regenerate.");
        return Ok(());
    }

    match AppConfig::default().save() {
        Ok(path) => {
            println!("Generated config at {}", path.display());
            println!("  Edit [source] to point at your cost API and report files.");
        }
        Err(e) => {
            eprintln!("Failed to generate config: {}", e);
            std::process::exit(1);
        }
    }
    Ok(())
}

pub fn check() -> Result<()> {
    let path = AppConfig::config_path();
    if !path.exists() {
        eprintln!("No config file found at {}", path.display());
        eprintln!("Run `costdash config init` to create one.");
        return Ok(());
    }

    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    let issues = config.validate();
    if issues.is_empty() {
        println!("Config is valid: {}", path.display());
        println!("  Primary:  {}", config.source.primary_url);
        println!("  Fallback: {}", describe_fallback(&config.source.fallback));
        println!("  Account:  {}", config.source.account);
        println!("  Metric:   {}", config.settings.metric);
    } else {
        eprintln!("Config issues found in {}:", path.display());
        for issue in &issues {
            eprintln!("  - {}", issue);
        }
        std::process::exit(1);
    }
    Ok(())
}

pub fn path() -> Result<()> {
    println!("{}", AppConfig::config_path().display());
    Ok(())
}

fn describe_fallback(fallback: &FallbackConfig) -> String {
    match fallback {
        FallbackConfig::Http { base_url } => format!("report files via {}", base_url),
        FallbackConfig::Dir { path } => format!("report files in {}", path.display()),
        FallbackConfig::Disabled => "disabled".to_string(),
    }
}
