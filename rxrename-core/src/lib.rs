#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod apply;
pub mod config;
pub mod error;
pub mod fs;
pub mod operations;
pub mod output;
pub mod pattern;
pub mod plan;
pub mod preview;
pub mod template;

pub use apply::{apply_plan, ApplyOptions, ApplyReport};
pub use config::{load_pattern, load_template, Config, DEFAULT_PATTERN_FILE, DEFAULT_TEMPLATE_FILE};
pub use error::{RenameError, TemplateError};
pub use fs::{Filesystem, LocalFs, MemoryFs};
pub use operations::{plan_operation, rename_operation, RenameRequest};
pub use output::{format_warning, ApplyFailure, ApplyResult, OutputFormat, OutputFormatter, PlanResult};
pub use pattern::{build_pattern, collect_candidates, Candidate, FieldMapping, MatchPattern, FRAME_FIELD};
pub use plan::{plan_renames, PlanOptions, PlanWarning, RenamePair, RenamePlan, RenumberMode};
pub use preview::{render_plan, should_use_color, Preview};
pub use template::{Environment, Template};
