use crate::error::RenameError;
use crate::plan::PlanWarning;
use regex::{Captures, Regex, RegexBuilder};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Reserved capture group carrying a frame number.
pub const FRAME_FIELD: &str = "frame";

/// Named captures extracted from one source name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldMapping(BTreeMap<String, String>);

impl FieldMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldMapping {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A source name that matched the pattern, with its captured fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub source: String,
    pub fields: FieldMapping,
    /// Parsed value of the `frame` field, when the group took part in the match.
    pub frame: Option<i64>,
}

impl Candidate {
    /// Build a candidate, parsing the `frame` field if present.
    pub fn new(source: impl Into<String>, fields: FieldMapping) -> Result<Self, RenameError> {
        let source = source.into();
        let frame = match fields.get(FRAME_FIELD) {
            Some(value) => Some(parse_frame(&source, value)?),
            None => None,
        };
        Ok(Self {
            source,
            fields,
            frame,
        })
    }

    /// Replace the frame number, keeping the `frame` field text in sync.
    pub fn with_frame(mut self, frame: i64) -> Self {
        self.fields.insert(FRAME_FIELD, frame.to_string());
        self.frame = Some(frame);
        self
    }
}

fn parse_frame(source: &str, value: &str) -> Result<i64, RenameError> {
    value
        .parse::<i64>()
        .map_err(|_| RenameError::InvalidFrameNumber {
            source_name: source.to_string(),
            value: value.to_string(),
        })
}

/// Compiled filename pattern. Matching uses search semantics: the pattern may hit
/// anywhere in the name unless it anchors itself.
#[derive(Debug, Clone)]
pub struct MatchPattern {
    regex: Regex,
}

/// Compile `pattern`. In extended mode whitespace is ignored and `#` starts a comment,
/// which lets pattern files span several lines.
pub fn build_pattern(pattern: &str, extended: bool) -> Result<MatchPattern, RenameError> {
    let regex = RegexBuilder::new(pattern)
        .ignore_whitespace(extended)
        .build()?;
    Ok(MatchPattern { regex })
}

impl MatchPattern {
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Names of all named capture groups, in pattern order.
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.regex.capture_names().flatten()
    }

    pub fn has_frame(&self) -> bool {
        self.group_names().any(|name| name == FRAME_FIELD)
    }

    /// Apply the pattern to `name`, returning every named group. Groups that did not
    /// take part in the match map to the empty string.
    pub fn match_name(&self, name: &str) -> Option<FieldMapping> {
        let caps = self.regex.captures(name)?;
        Some(self.fields(&caps))
    }

    fn fields(&self, caps: &Captures<'_>) -> FieldMapping {
        self.group_names()
            .map(|group| (group, caps.name(group).map_or("", |m| m.as_str())))
            .collect()
    }

    /// Apply the pattern and build a [`Candidate`]. A `frame` group that took part in
    /// the match must hold a base-10 integer.
    pub fn candidate(&self, name: &str) -> Result<Option<Candidate>, RenameError> {
        let Some(caps) = self.regex.captures(name) else {
            return Ok(None);
        };

        let fields = self.fields(&caps);
        let frame = match caps.name(FRAME_FIELD) {
            Some(m) => Some(parse_frame(name, m.as_str())?),
            None => None,
        };

        Ok(Some(Candidate {
            source: name.to_string(),
            fields,
            frame,
        }))
    }
}

/// Run the pattern over `names` in order, returning the matching candidates.
///
/// Non-matching names are skipped; in strict mode each one is reported as
/// [`PlanWarning::NoMatch`]. Repeated names keep only their first occurrence.
pub fn collect_candidates<I, S>(
    pattern: &MatchPattern,
    names: I,
    strict: bool,
    warnings: &mut Vec<PlanWarning>,
) -> Result<Vec<Candidate>, RenameError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut candidates = Vec::new();
    let mut seen = HashSet::new();

    for name in names {
        let name = name.as_ref();
        let Some(candidate) = pattern.candidate(name)? else {
            debug!(name, "no match");
            if strict {
                warnings.push(PlanWarning::NoMatch {
                    name: name.to_string(),
                });
            }
            continue;
        };

        if !seen.insert(candidate.source.clone()) {
            debug!(name, "duplicate source dropped");
            warnings.push(PlanWarning::DuplicateSource {
                name: name.to_string(),
            });
            continue;
        }

        debug!(name, fields = candidate.fields.len(), "matched");
        candidates.push(candidate);
    }

    Ok(candidates)
}
