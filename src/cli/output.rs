use std::io::IsTerminal;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub format: OutputFormat,
    pub pretty: bool,
    pub use_color: bool,
}

/// Resolve color from the `--no-color` flag and the config `color` setting.
pub fn detect_color(color_flag: bool, setting: &str) -> bool {
    if !color_flag {
        return false;
    }
    match setting {
        "always" => true,
        "never" => false,
        _ => std::env::var("NO_COLOR").is_err() && std::io::stdout().is_terminal(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_names() {
        assert_eq!(OutputFormat::from_name("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_name("text"), Some(OutputFormat::Text));
        assert_eq!(OutputFormat::from_name("xml"), None);
    }

    #[test]
    fn no_color_flag_wins() {
        assert!(!detect_color(false, "always"));
        assert!(detect_color(true, "always"));
        assert!(!detect_color(true, "never"));
    }
}
