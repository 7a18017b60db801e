use crate::config::{load_pattern, load_template};
use crate::fs::LocalFs;
use crate::pattern::collect_candidates;
use crate::plan::{plan_renames, PlanOptions, PlanWarning, RenamePlan, RenumberMode};
use crate::template::Environment;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Everything needed to plan one rename batch.
#[derive(Debug, Clone, Default)]
pub struct RenameRequest {
    /// Pattern text; `renamer.regex` in the working directory when absent
    pub pattern: Option<String>,
    /// Output template; `renamer.format` in the working directory when absent
    pub template: Option<String>,
    /// Names to consider; every visible entry of the working directory when empty
    pub files: Vec<String>,
    pub strict: bool,
    pub renumber: RenumberMode,
    pub make_dirs: bool,
    pub env: Environment,
}

pub(crate) fn resolve_working_dir(working_dir: Option<&Path>) -> Result<PathBuf> {
    match working_dir {
        Some(dir) => Ok(dir.to_path_buf()),
        None => std::env::current_dir().context("Failed to get current directory"),
    }
}

/// Plan operation - builds the rename plan without touching the filesystem.
///
/// Skipped names are pushed onto `warnings` as they are found, so they are available
/// to the caller even when planning fails.
pub fn plan_operation(
    request: &RenameRequest,
    working_dir: Option<&Path>,
    warnings: &mut Vec<PlanWarning>,
) -> Result<RenamePlan> {
    let current_dir = resolve_working_dir(working_dir)?;
    let fs = LocalFs::new(&current_dir);

    let pattern = load_pattern(request.pattern.as_deref(), &current_dir)?;
    let template = load_template(request.template.as_deref(), &current_dir)?;
    debug!(pattern = pattern.as_str(), template = template.as_str(), "loaded");

    if request.renumber != RenumberMode::None && !pattern.has_frame() {
        warn!("frame renumbering requested but the pattern has no (?P<frame>...) group");
    }

    let names = if request.files.is_empty() {
        fs.list_entries()
            .with_context(|| format!("Failed to list {}", current_dir.display()))?
    } else {
        request.files.clone()
    };

    let candidates = collect_candidates(&pattern, &names, request.strict, warnings)?;

    let options = PlanOptions {
        renumber: request.renumber,
        make_dirs: request.make_dirs,
    };
    let plan = plan_renames(candidates, &template, &request.env, &options, &fs, warnings)?;

    Ok(plan)
}
