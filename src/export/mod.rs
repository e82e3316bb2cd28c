pub mod json;
pub mod markdown;

use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::api::Insight;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExportFormat {
    Markdown,
    Json,
}

impl FromStr for ExportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            "json" => Ok(ExportFormat::Json),
            _ => Err(anyhow!("Unknown format: {s}. Use: markdown, json")),
        }
    }
}

impl ExportFormat {
    fn suffix(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "-minutes.md",
            ExportFormat::Json => "-data.json",
        }
    }
}

/// Render an insight in the requested format.
pub fn render(insight: &Insight, format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Markdown => Ok(markdown::render_minutes(insight)),
        ExportFormat::Json => json::render(insight),
    }
}

/// Download file name for an insight: whitespace runs become a single `-`,
/// lower-cased, plus a per-format suffix.
pub fn file_name(title: &str, format: ExportFormat) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut in_space = false;
    for ch in title.chars() {
        if ch.is_whitespace() {
            if !in_space {
                slug.push('-');
            }
            in_space = true;
        } else {
            slug.extend(ch.to_lowercase());
            in_space = false;
        }
    }
    slug.push_str(format.suffix());
    slug
}

/// Write the rendered export into `dir` under its default file name.
/// Returns the written path.
pub fn write_to_dir(insight: &Insight, format: ExportFormat, dir: &Path) -> Result<PathBuf> {
    let content = render(insight, format)?;
    let path = dir.join(file_name(&insight.title, format));
    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write export: {}", path.display()))?;
    Ok(path)
}
