use crate::apply::{apply_plan, ApplyOptions, ApplyReport};
use crate::fs::LocalFs;
use crate::operations::plan::{plan_operation, resolve_working_dir, RenameRequest};
use crate::plan::{PlanWarning, RenamePlan};
use anyhow::Result;
use std::path::Path;

/// Rename operation - plans the batch and, if planning succeeds, executes it.
pub fn rename_operation(
    request: &RenameRequest,
    working_dir: Option<&Path>,
    apply_options: &ApplyOptions,
    warnings: &mut Vec<PlanWarning>,
) -> Result<(RenamePlan, ApplyReport)> {
    let current_dir = resolve_working_dir(working_dir)?;
    let plan = plan_operation(request, Some(&current_dir), warnings)?;

    let fs = LocalFs::new(&current_dir);
    let report = apply_plan(&plan, &fs, apply_options)?;

    Ok((plan, report))
}
