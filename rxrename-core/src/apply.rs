use crate::error::RenameError;
use crate::fs::Filesystem;
use crate::plan::{RenamePair, RenamePlan};
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Options for executing a rename plan
#[derive(Debug, Clone, Default)]
pub struct ApplyOptions {
    /// Append every performed action to this file
    pub log_file: Option<PathBuf>,
}

/// What an executed plan did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    pub directories_created: Vec<PathBuf>,
    pub renamed: Vec<RenamePair>,
    pub staged: bool,
}

struct ApplyState {
    log_file: Option<File>,
    applied: usize,
}

impl ApplyState {
    fn new(log_file: Option<&Path>) -> io::Result<Self> {
        let log_file = if let Some(path) = log_file {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            Some(OpenOptions::new().create(true).append(true).open(path)?)
        } else {
            None
        };

        Ok(Self {
            log_file,
            applied: 0,
        })
    }

    fn log(&mut self, message: &str) {
        info!("{}", message);
        if let Some(ref mut file) = self.log_file {
            let written = writeln!(
                file,
                "[{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                message
            )
            .and_then(|()| file.flush());
            if let Err(e) = written {
                warn!("failed to write apply log: {}", e);
            }
        }
    }

    fn rename(
        &mut self,
        fs: &dyn Filesystem,
        from: &str,
        to: &str,
        stranded: &[RenamePair],
    ) -> Result<(), RenameError> {
        fs.rename(Path::new(from), Path::new(to))
            .map_err(|error| RenameError::RenameFailed {
                from: from.to_string(),
                to: to.to_string(),
                applied: self.applied,
                stranded: stranded.to_vec(),
                error,
            })?;
        self.log(&format!("rename {:?} => {:?}", from, to));
        Ok(())
    }
}

/// Execute `plan` through `fs`.
///
/// Directories are created first, then renames run one at a time in plan order. A
/// failure stops execution and leaves earlier renames in place; the error says how
/// many completed and which files were left under staging names.
pub fn apply_plan(
    plan: &RenamePlan,
    fs: &dyn Filesystem,
    options: &ApplyOptions,
) -> Result<ApplyReport, RenameError> {
    let mut state =
        ApplyState::new(options.log_file.as_deref()).map_err(|error| RenameError::LogFile {
            path: options.log_file.clone().unwrap_or_default(),
            error,
        })?;
    let mut report = ApplyReport {
        staged: plan.requires_staging(),
        ..ApplyReport::default()
    };

    for directory in plan.directories() {
        fs.make_dirs(directory)
            .map_err(|error| RenameError::CreateDirectory {
                directory: directory.clone(),
                error,
            })?;
        state.log(&format!("mkdir {:?}", directory));
        report.directories_created.push(directory.clone());
    }

    if plan.requires_staging() {
        let staged = stage(plan, fs, &mut state)?;
        for (i, pair) in staged.iter().enumerate() {
            state.rename(fs, &pair.source, &pair.destination, &staged[i..])?;
            state.applied += 1;
            report.renamed.push(plan.pairs()[i].clone());
        }
    } else {
        for pair in plan.pairs() {
            state.rename(fs, &pair.source, &pair.destination, &[])?;
            state.applied += 1;
            report.renamed.push(pair.clone());
        }
    }

    Ok(report)
}

/// Move every source to a free temporary name next to it. Returns the
/// (staging name, destination) pairs in plan order.
fn stage(
    plan: &RenamePlan,
    fs: &dyn Filesystem,
    state: &mut ApplyState,
) -> Result<Vec<RenamePair>, RenameError> {
    let mut staged: Vec<RenamePair> = Vec::with_capacity(plan.len());
    for (i, pair) in plan.pairs().iter().enumerate() {
        let staging = staging_name(&pair.source, i, fs);
        state.rename(fs, &pair.source, &staging, &staged)?;
        staged.push(RenamePair::new(staging, pair.destination.clone()));
    }
    Ok(staged)
}

fn staging_name(source: &str, index: usize, fs: &dyn Filesystem) -> String {
    let path = Path::new(source);
    let file_name = path
        .file_name()
        .map_or_else(|| source.to_string(), |n| n.to_string_lossy().into_owned());

    let mut attempt = 0_usize;
    loop {
        let candidate = if attempt == 0 {
            format!(".rxrename-{}-{}", index, file_name)
        } else {
            format!(".rxrename-{}-{}-{}", index, attempt, file_name)
        };
        let candidate = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                parent.join(candidate).to_string_lossy().into_owned()
            },
            _ => candidate,
        };
        if !fs.exists(Path::new(&candidate)) {
            return candidate;
        }
        attempt += 1;
    }
}
