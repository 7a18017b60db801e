use crate::error::RenameError;
use crate::fs::Filesystem;
use crate::pattern::Candidate;
use crate::template::{Environment, Template};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// How frame numbers are rewritten before template expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenumberMode {
    /// Keep frames as captured.
    #[default]
    None,
    /// Shift frames so the smallest becomes 1, keeping gaps.
    Offset,
    /// Replace each frame by the rank of its value among the distinct frames.
    Sequential,
}

impl RenumberMode {
    /// Renumber `frames`, returning new values in the same order.
    ///
    /// Returns `None` when offset frames span more than `i64` can hold.
    pub fn renumber(self, frames: &[i64]) -> Option<Vec<i64>> {
        match self {
            Self::None => Some(frames.to_vec()),
            Self::Offset => {
                let Some(&min) = frames.iter().min() else {
                    return Some(Vec::new());
                };
                frames
                    .iter()
                    .map(|&f| f.checked_sub(min)?.checked_add(1))
                    .collect()
            },
            Self::Sequential => {
                let distinct: BTreeSet<i64> = frames.iter().copied().collect();
                let mut ranks = HashMap::with_capacity(distinct.len());
                let mut rank = 0_i64;
                for value in distinct {
                    rank += 1;
                    ranks.insert(value, rank);
                }
                frames.iter().map(|f| ranks.get(f).copied()).collect()
            },
        }
    }
}

/// A skipped name. None of these stop planning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanWarning {
    /// The name did not match the pattern (only reported in strict mode).
    NoMatch { name: String },
    /// The name was already seen earlier in the input.
    DuplicateSource { name: String },
    /// The name matched but nothing exists under it.
    SourceMissing { name: String },
    /// The template maps the name onto itself.
    Unchanged { name: String },
}

impl fmt::Display for PlanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoMatch { name } => write!(f, "non-matching filename: {:?}", name),
            Self::DuplicateSource { name } => write!(f, "duplicate source filename: {:?}", name),
            Self::SourceMissing { name } => write!(f, "source file does not exist: {:?}", name),
            Self::Unchanged { name } => write!(f, "name is unchanged: {:?}", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenamePair {
    pub source: String,
    pub destination: String,
}

impl RenamePair {
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }
}

/// A conflict-free, ordered list of renames.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenamePlan {
    pairs: Vec<RenamePair>,
    /// Destination directories to create before renaming, in first-use order.
    directories: Vec<PathBuf>,
    /// Some destination names a source that is renamed later, so renames must go
    /// through temporary names.
    requires_staging: bool,
}

impl RenamePlan {
    pub fn pairs(&self) -> &[RenamePair] {
        &self.pairs
    }

    pub fn directories(&self) -> &[PathBuf] {
        &self.directories
    }

    pub fn requires_staging(&self) -> bool {
        self.requires_staging
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PlanOptions {
    pub renumber: RenumberMode,
    /// Record missing destination directories for creation instead of failing.
    pub make_dirs: bool,
}

/// Turn matched candidates into a rename plan.
///
/// Candidates are processed in order: missing sources are skipped, frames are
/// renumbered, the template is expanded, and each destination is checked against
/// earlier destinations and against the filesystem. The first conflict aborts the
/// whole plan. Skipped names are appended to `warnings` even when planning fails.
pub fn plan_renames(
    candidates: Vec<Candidate>,
    template: &Template,
    env: &Environment,
    options: &PlanOptions,
    fs: &dyn Filesystem,
    warnings: &mut Vec<PlanWarning>,
) -> Result<RenamePlan, RenameError> {
    let mut present = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if fs.exists(Path::new(&candidate.source)) {
            present.push(candidate);
        } else {
            debug!(name = %candidate.source, "source missing");
            warnings.push(PlanWarning::SourceMissing {
                name: candidate.source,
            });
        }
    }

    let present = renumber_frames(present, options.renumber)?;
    let sources: HashSet<&str> = present.iter().map(|c| c.source.as_str()).collect();

    let mut pairs: Vec<RenamePair> = Vec::new();
    let mut claimed: HashMap<String, &str> = HashMap::new();

    for candidate in &present {
        let destination = template.expand(&candidate.source, &candidate.fields, env)?;

        if let Some(first) = claimed.get(&destination) {
            return Err(RenameError::DestinationCollision {
                first: (*first).to_string(),
                second: candidate.source.clone(),
                destination,
            });
        }
        claimed.insert(destination.clone(), &candidate.source);

        if destination == candidate.source {
            warnings.push(PlanWarning::Unchanged {
                name: candidate.source.clone(),
            });
            continue;
        }

        if !sources.contains(destination.as_str()) && fs.exists(Path::new(&destination)) {
            return Err(RenameError::DestinationExists {
                source_name: candidate.source.clone(),
                destination,
            });
        }

        debug!(source = %candidate.source, %destination, "planned");
        pairs.push(RenamePair::new(candidate.source.clone(), destination));
    }

    if pairs.is_empty() {
        return Err(RenameError::NothingToDo);
    }

    let directories = missing_directories(&pairs, options.make_dirs, fs)?;

    let position: HashMap<&str, usize> = pairs
        .iter()
        .enumerate()
        .map(|(i, pair)| (pair.source.as_str(), i))
        .collect();
    let requires_staging = pairs.iter().enumerate().any(|(i, pair)| {
        position
            .get(pair.destination.as_str())
            .is_some_and(|&later| later > i)
    });

    Ok(RenamePlan {
        pairs,
        directories,
        requires_staging,
    })
}

fn renumber_frames(
    candidates: Vec<Candidate>,
    mode: RenumberMode,
) -> Result<Vec<Candidate>, RenameError> {
    let frames: Vec<i64> = candidates.iter().filter_map(|c| c.frame).collect();
    if mode == RenumberMode::None || frames.is_empty() {
        return Ok(candidates);
    }

    let renumbered = mode.renumber(&frames).ok_or_else(|| RenameError::FrameRange {
        min: frames.iter().copied().min().unwrap_or_default(),
        max: frames.iter().copied().max().unwrap_or_default(),
    })?;
    let mut renumbered = renumbered.into_iter();
    Ok(candidates
        .into_iter()
        .map(|candidate| match candidate.frame {
            Some(_) => match renumbered.next() {
                Some(frame) => candidate.with_frame(frame),
                None => candidate,
            },
            None => candidate,
        })
        .collect())
}

fn missing_directories(
    pairs: &[RenamePair],
    make_dirs: bool,
    fs: &dyn Filesystem,
) -> Result<Vec<PathBuf>, RenameError> {
    let mut directories: Vec<PathBuf> = Vec::new();
    for pair in pairs {
        let Some(parent) = Path::new(&pair.destination).parent() else {
            continue;
        };
        if parent.as_os_str().is_empty() || fs.is_dir(parent) {
            continue;
        }
        if !make_dirs {
            return Err(RenameError::MissingDirectory {
                source_name: pair.source.clone(),
                directory: parent.to_path_buf(),
            });
        }
        if !directories.iter().any(|d| d == parent) {
            directories.push(parent.to_path_buf());
        }
    }
    Ok(directories)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MemoryFs;
    use crate::pattern::FieldMapping;

    fn candidate(source: &str, fields: &[(&str, &str)]) -> Candidate {
        Candidate::new(source, fields.iter().copied().collect::<FieldMapping>()).unwrap()
    }

    #[derive(Debug)]
    struct PlanOutcome {
        plan: RenamePlan,
        warnings: Vec<PlanWarning>,
    }

    fn plan(
        candidates: Vec<Candidate>,
        template: &str,
        options: PlanOptions,
        fs: &MemoryFs,
    ) -> Result<PlanOutcome, RenameError> {
        let template = Template::parse(template).unwrap();
        let mut warnings = Vec::new();
        let plan = plan_renames(
            candidates,
            &template,
            &Environment::new(),
            &options,
            fs,
            &mut warnings,
        )?;
        Ok(PlanOutcome { plan, warnings })
    }

    #[test]
    fn test_offset_renumbering() {
        assert_eq!(RenumberMode::Offset.renumber(&[5, 10, 20]), Some(vec![1, 6, 16]));
        assert_eq!(RenumberMode::Offset.renumber(&[1, 6, 16]), Some(vec![1, 6, 16]));
        assert_eq!(RenumberMode::Offset.renumber(&[]), Some(vec![]));
    }

    #[test]
    fn test_sequential_renumbering() {
        assert_eq!(
            RenumberMode::Sequential.renumber(&[5, 5, 10, 20]),
            Some(vec![1, 1, 2, 3])
        );
        assert_eq!(RenumberMode::Sequential.renumber(&[20, 5, 10]), Some(vec![3, 1, 2]));
        assert_eq!(RenumberMode::None.renumber(&[20, 5]), Some(vec![20, 5]));
        assert_eq!(
            RenumberMode::Sequential.renumber(&[i64::MIN, i64::MAX]),
            Some(vec![1, 2])
        );
    }

    #[test]
    fn test_offset_overflow_is_rejected() {
        assert_eq!(RenumberMode::Offset.renumber(&[i64::MIN, -1, 0]), None);
        assert_eq!(RenumberMode::Offset.renumber(&[i64::MIN + 1, -1]), Some(vec![1, i64::MAX]));

        let fs = MemoryFs::with_files(["lo", "hi"]);
        let err = plan(
            vec![
                candidate("lo", &[("frame", &i64::MIN.to_string())]),
                candidate("hi", &[("frame", "0")]),
            ],
            "f{frame}",
            PlanOptions {
                renumber: RenumberMode::Offset,
                make_dirs: false,
            },
            &fs,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            RenameError::FrameRange { min: i64::MIN, max: 0 }
        ));
    }

    #[test]
    fn test_basic_plan() {
        let fs = MemoryFs::with_files(["a1.txt", "a2.txt"]);
        let outcome = plan(
            vec![candidate("a1.txt", &[("id", "1")]), candidate("a2.txt", &[("id", "2")])],
            "out_{id}.txt",
            PlanOptions::default(),
            &fs,
        )
        .unwrap();

        assert_eq!(
            outcome.plan.pairs(),
            [
                RenamePair::new("a1.txt", "out_1.txt"),
                RenamePair::new("a2.txt", "out_2.txt"),
            ]
        );
        assert!(outcome.warnings.is_empty());
        assert!(!outcome.plan.requires_staging());
    }

    #[test]
    fn test_missing_source_is_skipped() {
        let fs = MemoryFs::with_files(["a1.txt"]);
        let outcome = plan(
            vec![candidate("gone.txt", &[("id", "9")]), candidate("a1.txt", &[("id", "1")])],
            "out_{id}.txt",
            PlanOptions::default(),
            &fs,
        )
        .unwrap();
        assert_eq!(outcome.plan.len(), 1);
        assert_eq!(
            outcome.warnings,
            [PlanWarning::SourceMissing {
                name: "gone.txt".to_string()
            }]
        );
    }

    #[test]
    fn test_destination_collision_names_both_sources() {
        let fs = MemoryFs::with_files(["a1.txt", "b1.txt"]);
        let err = plan(
            vec![candidate("a1.txt", &[("id", "1")]), candidate("b1.txt", &[("id", "1")])],
            "out_{id}.txt",
            PlanOptions::default(),
            &fs,
        )
        .unwrap_err();
        match err {
            RenameError::DestinationCollision {
                first,
                second,
                destination,
            } => {
                assert_eq!(first, "a1.txt");
                assert_eq!(second, "b1.txt");
                assert_eq!(destination, "out_1.txt");
            },
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_destination_exists() {
        let fs = MemoryFs::with_files(["a1.txt", "out_1.txt"]);
        let err = plan(
            vec![candidate("a1.txt", &[("id", "1")])],
            "out_{id}.txt",
            PlanOptions::default(),
            &fs,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            RenameError::DestinationExists { ref source_name, ref destination }
                if source_name == "a1.txt" && destination == "out_1.txt"
        ));
    }

    #[test]
    fn test_nothing_to_do() {
        let fs = MemoryFs::new();
        let err = plan(vec![], "{id}", PlanOptions::default(), &fs).unwrap_err();
        assert!(matches!(err, RenameError::NothingToDo));
    }

    #[test]
    fn test_unchanged_names_are_skipped() {
        let fs = MemoryFs::with_files(["keep.txt"]);
        let err = plan(
            vec![candidate("keep.txt", &[("base", "keep")])],
            "{base}.txt",
            PlanOptions::default(),
            &fs,
        )
        .unwrap_err();
        assert!(matches!(err, RenameError::NothingToDo));
    }

    #[test]
    fn test_rename_onto_later_source_requires_staging() {
        let fs = MemoryFs::with_files(["1", "2"]);
        let outcome = plan(
            vec![candidate("1", &[("n", "2")]), candidate("2", &[("n", "3")])],
            "{n}",
            PlanOptions::default(),
            &fs,
        )
        .unwrap();
        assert!(outcome.plan.requires_staging());

        // Vacated first, so no staging needed.
        let outcome = plan(
            vec![candidate("2", &[("n", "3")]), candidate("1", &[("n", "2")])],
            "{n}",
            PlanOptions::default(),
            &fs,
        )
        .unwrap();
        assert!(!outcome.plan.requires_staging());
    }

    #[test]
    fn test_frames_renumbered_before_expansion() {
        let fs = MemoryFs::with_files(["s_5", "s_10", "s_20"]);
        let candidates = || {
            vec![
                candidate("s_5", &[("frame", "5")]),
                candidate("s_10", &[("frame", "10")]),
                candidate("s_20", &[("frame", "20")]),
            ]
        };
        let destinations = |mode| {
            let options = PlanOptions {
                renumber: mode,
                make_dirs: false,
            };
            plan(candidates(), "f{frame:03}", options, &fs)
                .unwrap()
                .plan
                .pairs()
                .iter()
                .map(|p| p.destination.clone())
                .collect::<Vec<_>>()
        };

        assert_eq!(destinations(RenumberMode::None), ["f005", "f010", "f020"]);
        assert_eq!(destinations(RenumberMode::Offset), ["f001", "f006", "f016"]);
        assert_eq!(destinations(RenumberMode::Sequential), ["f001", "f002", "f003"]);
    }

    #[test]
    fn test_missing_frames_ignore_missing_sources() {
        let fs = MemoryFs::with_files(["s_10", "s_20"]);
        let options = PlanOptions {
            renumber: RenumberMode::Offset,
            make_dirs: false,
        };
        let outcome = plan(
            vec![
                candidate("s_5", &[("frame", "5")]),
                candidate("s_10", &[("frame", "10")]),
                candidate("s_20", &[("frame", "20")]),
            ],
            "f{frame}",
            options,
            &fs,
        )
        .unwrap();
        let destinations: Vec<_> = outcome
            .plan
            .pairs()
            .iter()
            .map(|p| p.destination.as_str())
            .collect();
        assert_eq!(destinations, ["f1", "f11"]);
    }

    #[test]
    fn test_missing_directory() {
        let fs = MemoryFs::with_files(["a1.txt", "a2.txt"]);
        let candidates = || {
            vec![
                candidate("a1.txt", &[("id", "1")]),
                candidate("a2.txt", &[("id", "2")]),
            ]
        };

        let err = plan(candidates(), "out/{id}.txt", PlanOptions::default(), &fs).unwrap_err();
        assert!(matches!(
            err,
            RenameError::MissingDirectory { ref directory, .. } if directory == Path::new("out")
        ));

        let options = PlanOptions {
            renumber: RenumberMode::None,
            make_dirs: true,
        };
        let outcome = plan(candidates(), "out/{id}.txt", options, &fs).unwrap();
        assert_eq!(outcome.plan.directories(), [PathBuf::from("out")]);

        fs.add_dir("out");
        let outcome = plan(candidates(), "out/{id}.txt", PlanOptions::default(), &fs).unwrap();
        assert!(outcome.plan.directories().is_empty());
    }

    #[test]
    fn test_template_error_aborts() {
        let fs = MemoryFs::with_files(["a1.txt"]);
        let err = plan(
            vec![candidate("a1.txt", &[("id", "1")])],
            "{missing}",
            PlanOptions::default(),
            &fs,
        )
        .unwrap_err();
        assert!(matches!(err, RenameError::Template(_)));
    }
}
