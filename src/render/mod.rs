//! Outline rendering: JSON and plain text.

mod json;
mod text;

pub use json::{from_json, to_json, write_json, JsonFormat};
pub use text::to_text;

use std::str::FromStr;

use crate::error::{Error, Result};
use crate::model::Outline;

/// Output format for a rendered outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Pretty JSON
    #[default]
    Json,
    /// Single-line JSON
    Compact,
    /// Indented heading list
    Text,
}

impl OutputFormat {
    /// File extension for artifacts in this format.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json | OutputFormat::Compact => "json",
            OutputFormat::Text => "txt",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" | "pretty" => Ok(OutputFormat::Json),
            "compact" => Ok(OutputFormat::Compact),
            "text" | "txt" => Ok(OutputFormat::Text),
            other => Err(Error::Other(format!("Unknown output format: {}", other))),
        }
    }
}

/// Render an outline in the given format.
pub fn render(outline: &Outline, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(outline, JsonFormat::Pretty),
        OutputFormat::Compact => to_json(outline, JsonFormat::Compact),
        OutputFormat::Text => Ok(to_text(outline)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parse() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("compact".parse::<OutputFormat>().unwrap(), OutputFormat::Compact);
        assert_eq!("txt".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_render_dispatch() {
        let outline = Outline::default();
        assert_eq!(render(&outline, OutputFormat::Compact).unwrap(), r#"{"title":"","outline":[]}"#);
        assert_eq!(render(&outline, OutputFormat::Text).unwrap(), "");
        assert_eq!(OutputFormat::Text.extension(), "txt");
    }
}
