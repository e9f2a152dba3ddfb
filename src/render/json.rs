//! JSON rendering for outlines.

use std::io::Write;

use crate::error::Result;
use crate::model::Outline;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert an outline to JSON.
pub fn to_json(outline: &Outline, format: JsonFormat) -> Result<String> {
    let json = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(outline)?,
        JsonFormat::Compact => serde_json::to_string(outline)?,
    };
    Ok(json)
}

/// Write an outline as JSON followed by a newline.
pub fn write_json<W: Write>(outline: &Outline, mut writer: W, format: JsonFormat) -> Result<()> {
    match format {
        JsonFormat::Pretty => serde_json::to_writer_pretty(&mut writer, outline)?,
        JsonFormat::Compact => serde_json::to_writer(&mut writer, outline)?,
    }
    writer.write_all(b"\n")?;
    Ok(())
}

/// Parse an outline back from JSON.
pub fn from_json(json: &str) -> Result<Outline> {
    Ok(serde_json::from_str(json)?)
}
