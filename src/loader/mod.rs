// JSON/YAML document loading
//
// Reads input documents into `serde_json::Value` trees for the converter. YAML input
// goes through the same value model, so only JSON-shaped YAML converts cleanly.

use std::io::Read;
use std::path::Path;

use crate::errors::{ConvertError, ConvertResult};

/// Format of an input document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    Yaml,
}

impl InputFormat {
    /// Parse from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(InputFormat::Json),
            "yaml" | "yml" => Some(InputFormat::Yaml),
            _ => None,
        }
    }

    /// Pick a format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::parse)
    }

    /// Guess the format from content: JSON documents start with `{` or `[`
    pub fn detect(content: &str) -> Self {
        let trimmed = content.trim_start();
        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            InputFormat::Json
        } else {
            InputFormat::Yaml
        }
    }
}

/// Parse JSON text
pub fn parse_json(content: &str) -> ConvertResult<serde_json::Value> {
    serde_json::from_str(content).map_err(|e| ConvertError::parse_error("JSON", e.to_string()))
}

/// Parse YAML text into the JSON value model
pub fn parse_yaml(content: &str) -> ConvertResult<serde_json::Value> {
    serde_yaml::from_str(content).map_err(|e| ConvertError::parse_error("YAML", e.to_string()))
}

/// Parse content in the given format, detecting it when `None`
pub fn parse_content(
    content: &str,
    format: Option<InputFormat>,
) -> ConvertResult<serde_json::Value> {
    match format.unwrap_or_else(|| InputFormat::detect(content)) {
        InputFormat::Json => parse_json(content),
        InputFormat::Yaml => parse_yaml(content),
    }
}

/// Load a document from a file. The format comes from `format`, then the file
/// extension, then the content.
pub fn load_file(path: &Path, format: Option<InputFormat>) -> ConvertResult<serde_json::Value> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConvertError::io_error(format!("failed to read {}: {}", path.display(), e)))?;

    parse_content(&content, format.or_else(|| InputFormat::from_path(path)))
}

/// Load a document from a reader (e.g. stdin)
pub fn load_reader<R: Read>(
    mut reader: R,
    format: Option<InputFormat>,
) -> ConvertResult<serde_json::Value> {
    let mut content = String::new();
    reader
        .read_to_string(&mut content)
        .map_err(|e| ConvertError::io_error(format!("failed to read input: {}", e)))?;
    parse_content(&content, format)
}
