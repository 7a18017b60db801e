use crate::error::RenameError;
use crate::pattern::{build_pattern, MatchPattern};
use crate::plan::RenumberMode;
use crate::preview::Preview;
use crate::template::Template;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Pattern file read from the working directory when no pattern is given.
pub const DEFAULT_PATTERN_FILE: &str = "renamer.regex";

/// Template file read from the working directory when no template is given.
pub const DEFAULT_TEMPLATE_FILE: &str = "renamer.format";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DefaultsConfig {
    /// Pattern used when none is given on the command line
    #[serde(default)]
    pub pattern: Option<String>,

    /// Output template used when none is given on the command line
    #[serde(default)]
    pub template: Option<String>,

    /// Frame renumbering: "none", "offset" or "sequential"
    #[serde(default)]
    pub renumber: RenumberMode,

    /// Report non-matching names
    #[serde(default)]
    pub strict: bool,

    /// Create missing destination directories
    #[serde(default)]
    pub mkdir: bool,

    /// Default preview format: "pairs" or "table"
    #[serde(default)]
    pub preview: Option<Preview>,
}

impl Config {
    /// Load config from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }
}

/// Compile the explicit pattern, or fall back to `renamer.regex` in `dir`.
///
/// Pattern files are compiled in extended mode so they can be laid out over several
/// lines with `#` comments.
pub fn load_pattern(explicit: Option<&str>, dir: &Path) -> Result<MatchPattern> {
    if let Some(pattern) = explicit {
        return Ok(build_pattern(pattern, false)?);
    }

    let path = dir.join(DEFAULT_PATTERN_FILE);
    if !path.is_file() {
        return Err(RenameError::MissingPattern.into());
    }
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(build_pattern(&content, true)?)
}

/// Parse the explicit template, or the first meaningful line of `renamer.format` in `dir`.
pub fn load_template(explicit: Option<&str>, dir: &Path) -> Result<Template> {
    if let Some(template) = explicit {
        return Ok(Template::parse(template).map_err(RenameError::from)?);
    }

    let path = dir.join(DEFAULT_TEMPLATE_FILE);
    if !path.is_file() {
        return Err(RenameError::MissingTemplate.into());
    }
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let line = first_template_line(&content).ok_or(RenameError::MissingTemplate)?;
    Ok(Template::parse(line).map_err(RenameError::from)?)
}

/// First line that is neither blank nor a `#` comment, without surrounding whitespace.
fn first_template_line(content: &str) -> Option<&str> {
    content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))
}
