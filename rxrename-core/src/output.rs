use crate::apply::ApplyReport;
use crate::error::RenameError;
use crate::plan::{PlanWarning, RenamePair, RenamePlan};
use crate::preview::{render_plan, Preview};
use nu_ansi_term::Color;
use serde::Serialize;
use serde_json::json;
use std::fmt::Write;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Summary,
    Json,
}

/// Result of planning a rename batch
#[derive(Debug, Clone, Serialize)]
pub struct PlanResult {
    pub dry_run: bool,
    pub plan: RenamePlan,
    pub warnings: Vec<PlanWarning>,
    #[serde(skip)]
    pub preview: Preview,
    #[serde(skip)]
    pub use_color: bool,
}

/// Result of executing a rename batch
#[derive(Debug, Clone, Serialize)]
pub struct ApplyResult {
    pub report: ApplyReport,
}

/// A batch that stopped partway, with what is needed to finish it by hand
#[derive(Debug, Clone, Serialize)]
pub struct ApplyFailure {
    pub error: String,
    pub applied: usize,
    /// (staging name, destination) pairs still waiting for their final rename
    pub stranded: Vec<RenamePair>,
}

impl ApplyFailure {
    /// `None` unless `error` is a rename that failed mid-batch.
    pub fn from_error(error: &RenameError) -> Option<Self> {
        match error {
            RenameError::RenameFailed {
                applied,
                stranded,
                error: cause,
                ..
            } => Some(Self {
                error: format!("{}: {}", error, cause),
                applied: *applied,
                stranded: stranded.clone(),
            }),
            _ => None,
        }
    }
}

/// Trait for formatting output in different formats
pub trait OutputFormatter {
    fn format(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => self.format_json(),
            OutputFormat::Summary => self.format_summary(),
        }
    }

    fn format_json(&self) -> String;
    fn format_summary(&self) -> String;
}

impl OutputFormatter for PlanResult {
    fn format_json(&self) -> String {
        serde_json::to_string(&json!({
            "success": true,
            "operation": "plan",
            "dry_run": self.dry_run,
            "summary": {
                "renames": self.plan.len(),
                "directories": self.plan.directories().len(),
                "requires_staging": self.plan.requires_staging(),
                "warnings": self.warnings.len(),
            },
            "pairs": self.plan.pairs(),
            "directories": self.plan.directories(),
            "warnings": self.warnings,
        }))
        .unwrap_or_default()
    }

    fn format_summary(&self) -> String {
        render_plan(&self.plan, self.preview, self.use_color)
    }
}

impl OutputFormatter for ApplyResult {
    fn format_json(&self) -> String {
        serde_json::to_string(&json!({
            "success": true,
            "operation": "apply",
            "summary": {
                "renames": self.report.renamed.len(),
                "directories_created": self.report.directories_created.len(),
                "staged": self.report.staged,
            },
            "renamed": self.report.renamed,
            "directories_created": self.report.directories_created,
        }))
        .unwrap_or_default()
    }

    fn format_summary(&self) -> String {
        let mut output = String::new();

        let created = self.report.directories_created.len();
        if created > 0 {
            writeln!(output, "✓ Created {} {}", created, plural(created, "directory", "directories"))
                .unwrap();
        }

        let renamed = self.report.renamed.len();
        writeln!(output, "✓ Renamed {} {}", renamed, plural(renamed, "file", "files")).unwrap();

        output
    }
}

impl OutputFormatter for ApplyFailure {
    fn format_json(&self) -> String {
        serde_json::to_string(&json!({
            "success": false,
            "operation": "apply",
            "error": self.error,
            "summary": {
                "renames": self.applied,
                "stranded": self.stranded.len(),
            },
            "stranded": self.stranded,
        }))
        .unwrap_or_default()
    }

    /// One `"staging" => "destination"` line per stranded file, empty if none.
    fn format_summary(&self) -> String {
        let mut output = String::new();
        if self.stranded.is_empty() {
            return output;
        }

        writeln!(output, "files left under staging names:").unwrap();
        for pair in &self.stranded {
            writeln!(output, "  \"{}\" => \"{}\"", pair.source, pair.destination).unwrap();
        }
        output
    }
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 {
        one
    } else {
        many
    }
}

/// One warning line for stderr.
pub fn format_warning(warning: &PlanWarning, use_color: bool) -> String {
    if use_color {
        format!("{} {}", Color::Yellow.paint("warning:"), warning)
    } else {
        format!("warning: {}", warning)
    }
}
