use crate::plan::RenamePair;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal conditions raised while planning or executing a rename batch.
///
/// Everything up to and including [`RenameError::LogFile`] is raised before any
/// filesystem mutation. [`RenameError::CreateDirectory`] and
/// [`RenameError::RenameFailed`] happen mid-execution and report how far the batch got.
#[derive(Debug, Error)]
pub enum RenameError {
    #[error("no pattern given: pass --regex or create renamer.regex")]
    MissingPattern,

    #[error("no output template given: pass --out or create renamer.format")]
    MissingTemplate,

    #[error("invalid pattern")]
    InvalidPattern(#[from] regex::Error),

    #[error("invalid template")]
    Template(#[from] TemplateError),

    #[error("invalid frame number {value:?} in {source_name:?}")]
    InvalidFrameNumber { source_name: String, value: String },

    #[error("frames {min}..={max} cannot be offset to start at 1 without overflowing")]
    FrameRange { min: i64, max: i64 },

    #[error("destination collision: {first:?} and {second:?} both map to {destination:?}")]
    DestinationCollision {
        first: String,
        second: String,
        destination: String,
    },

    #[error("destination already exists: {source_name:?} => {destination:?}")]
    DestinationExists {
        source_name: String,
        destination: String,
    },

    #[error("destination directory does not exist for {source_name:?}: {directory:?}")]
    MissingDirectory {
        source_name: String,
        directory: PathBuf,
    },

    #[error("no files matched")]
    NothingToDo,

    #[error("failed to open apply log {path:?}")]
    LogFile {
        path: PathBuf,
        #[source]
        error: io::Error,
    },

    #[error("failed to create directory {directory:?}")]
    CreateDirectory {
        directory: PathBuf,
        #[source]
        error: io::Error,
    },

    #[error(
        "failed to rename {from:?} => {to:?} after {applied} completed renames ({} left under staging names)",
        .stranded.len()
    )]
    RenameFailed {
        from: String,
        to: String,
        applied: usize,
        /// Files moved to a staging name that never reached their destination,
        /// as (staging name, destination) pairs.
        stranded: Vec<RenamePair>,
        #[source]
        error: io::Error,
    },
}

impl RenameError {
    /// True for the conflicts detected while building a plan.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::DestinationCollision { .. }
                | Self::DestinationExists { .. }
                | Self::MissingDirectory { .. }
                | Self::NothingToDo
        )
    }

    /// True once the filesystem may already have been modified.
    pub fn is_partial(&self) -> bool {
        matches!(self, Self::CreateDirectory { .. } | Self::RenameFailed { .. })
    }
}

/// Problems with an output template or with expanding it for one candidate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unmatched '{brace}' at offset {offset}")]
    UnbalancedBrace { brace: char, offset: usize },

    #[error("empty field name at offset {offset}")]
    EmptyField { offset: usize },

    #[error("invalid format spec {spec:?} for field {field:?}")]
    InvalidSpec { field: String, spec: String },

    #[error("unknown field {field:?} for {source_name:?}")]
    UnknownField { field: String, source_name: String },

    #[error("environment variable {name:?} is not set")]
    UnknownEnv { name: String },

    #[error("field {field:?} needs an integer for format 'd', got {value:?}")]
    NotANumber { field: String, value: String },
}
