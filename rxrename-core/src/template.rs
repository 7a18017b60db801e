//! Output name templates.
//!
//! `{name}` inserts a captured field, `{env[NAME]}` inserts an environment variable
//! from an explicit [`Environment`], and `{{` / `}}` are literal braces. A field may
//! carry a format spec after `:` of the form `[[fill]align][0][width][type]`, with
//! align one of `<`, `>`, `^` and type `s` or `d`.
//!
//! Captures that read as integers are treated as numbers unless the spec says `s`:
//! they align right and `0` pads after the sign, so `{id:5}` on `42` gives `"   42"` and
//! `{id:04}` on `7` gives `"0007"`. Existing `renamer.format` files written for
//! text-only formatting expect `"42   "` and `"7000"` there; write `{id:5s}` or
//! `{id:0<4}` to keep that layout.

use crate::error::TemplateError;
use crate::pattern::FieldMapping;
use std::collections::BTreeMap;

/// Environment variables visible to `{env[NAME]}` placeholders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment(BTreeMap<String, String>);

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current process environment. Variables that are not valid
    /// unicode are left out.
    pub fn from_process() -> Self {
        std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Environment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
    Center,
}

impl Align {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '<' => Some(Self::Left),
            '>' => Some(Self::Right),
            '^' => Some(Self::Center),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Auto,
    Text,
    Integer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FormatSpec {
    fill: Option<char>,
    align: Option<Align>,
    zero: bool,
    width: usize,
    kind: Kind,
}

impl Default for FormatSpec {
    fn default() -> Self {
        Self {
            fill: None,
            align: None,
            zero: false,
            width: 0,
            kind: Kind::Auto,
        }
    }
}

impl FormatSpec {
    fn parse(field: &str, spec: &str) -> Result<Self, TemplateError> {
        let invalid = || TemplateError::InvalidSpec {
            field: field.to_string(),
            spec: spec.to_string(),
        };

        let chars: Vec<char> = spec.chars().collect();
        let mut parsed = Self::default();
        let mut i = 0;

        if chars.len() >= 2 {
            if let Some(align) = Align::from_char(chars[1]) {
                parsed.fill = Some(chars[0]);
                parsed.align = Some(align);
                i = 2;
            }
        }
        if i == 0 {
            if let Some(align) = chars.first().copied().and_then(Align::from_char) {
                parsed.align = Some(align);
                i = 1;
            }
        }

        if chars.get(i) == Some(&'0') {
            parsed.zero = true;
            i += 1;
        }

        let digits_start = i;
        while chars.get(i).is_some_and(char::is_ascii_digit) {
            i += 1;
        }
        if i > digits_start {
            let digits: String = chars[digits_start..i].iter().collect();
            parsed.width = digits.parse().map_err(|_| invalid())?;
        }

        match chars.get(i) {
            Some('s') => {
                parsed.kind = Kind::Text;
                i += 1;
            },
            Some('d') => {
                parsed.kind = Kind::Integer;
                i += 1;
            },
            _ => {},
        }

        if i != chars.len() {
            return Err(invalid());
        }
        Ok(parsed)
    }

    fn apply(&self, field: &str, value: &str) -> Result<String, TemplateError> {
        let number = match self.kind {
            Kind::Text => None,
            Kind::Integer => Some(value.parse::<i64>().map_err(|_| TemplateError::NotANumber {
                field: field.to_string(),
                value: value.to_string(),
            })?),
            Kind::Auto => value.parse::<i64>().ok(),
        };

        let text = match (self.kind, number) {
            (Kind::Integer, Some(n)) => n.to_string(),
            _ => value.to_string(),
        };

        let len = text.chars().count();
        if len >= self.width {
            return Ok(text);
        }
        let pad = self.width - len;

        // Zero padding without an explicit alignment goes between sign and digits.
        if self.zero && self.align.is_none() && self.fill.is_none() {
            let zeros = "0".repeat(pad);
            return Ok(match text.chars().next() {
                Some(sign @ ('-' | '+')) if number.is_some() => {
                    format!("{sign}{zeros}{}", &text[1..])
                },
                _ => format!("{zeros}{text}"),
            });
        }

        let fill = self.fill.unwrap_or(if self.zero { '0' } else { ' ' });
        let align = self.align.unwrap_or(if number.is_some() || self.zero {
            Align::Right
        } else {
            Align::Left
        });
        let padding = |n: usize| std::iter::repeat(fill).take(n).collect::<String>();

        Ok(match align {
            Align::Left => format!("{}{}", text, padding(pad)),
            Align::Right => format!("{}{}", padding(pad), text),
            Align::Center => {
                let left = pad / 2;
                format!("{}{}{}", padding(left), text, padding(pad - left))
            },
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum FieldRef {
    Capture(String),
    Env(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field { field: FieldRef, spec: FormatSpec },
}

/// A parsed output template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.char_indices().peekable();

        while let Some((offset, c)) = chars.next() {
            match c {
                '{' if chars.peek().map(|&(_, n)| n) == Some('{') => {
                    chars.next();
                    literal.push('{');
                },
                '}' if chars.peek().map(|&(_, n)| n) == Some('}') => {
                    chars.next();
                    literal.push('}');
                },
                '}' => return Err(TemplateError::UnbalancedBrace { brace: '}', offset }),
                '{' => {
                    let mut body = String::new();
                    let mut closed = false;
                    for (_, inner) in chars.by_ref() {
                        if inner == '}' {
                            closed = true;
                            break;
                        }
                        if inner == '{' {
                            return Err(TemplateError::UnbalancedBrace { brace: '{', offset });
                        }
                        body.push(inner);
                    }
                    if !closed {
                        return Err(TemplateError::UnbalancedBrace { brace: '{', offset });
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(parse_field(&body, offset)?);
                },
                _ => literal.push(c),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Substitute `fields` (captured from `source_name`) and `env` into the template.
    pub fn expand(
        &self,
        source_name: &str,
        fields: &FieldMapping,
        env: &Environment,
    ) -> Result<String, TemplateError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field { field, spec } => {
                    let (label, value) = match field {
                        FieldRef::Capture(name) => {
                            let value =
                                fields
                                    .get(name)
                                    .ok_or_else(|| TemplateError::UnknownField {
                                        field: name.clone(),
                                        source_name: source_name.to_string(),
                                    })?;
                            (name.as_str(), value)
                        },
                        FieldRef::Env(name) => {
                            let value = env.get(name).ok_or_else(|| TemplateError::UnknownEnv {
                                name: name.clone(),
                            })?;
                            (name.as_str(), value)
                        },
                    };
                    out.push_str(&spec.apply(label, value)?);
                },
            }
        }
        Ok(out)
    }
}

fn parse_field(body: &str, offset: usize) -> Result<Segment, TemplateError> {
    // Format options start after the first ':' outside an index expression.
    let split = body
        .char_indices()
        .scan(false, |in_index, (i, c)| {
            match c {
                '[' => *in_index = true,
                ']' => *in_index = false,
                _ => {},
            }
            Some((i, c, *in_index))
        })
        .find(|&(_, c, in_index)| c == ':' && !in_index)
        .map(|(i, _, _)| i);

    let (name, spec) = match split {
        Some(i) => (&body[..i], &body[i + 1..]),
        None => (body, ""),
    };

    if name.is_empty() {
        return Err(TemplateError::EmptyField { offset });
    }

    let field = match name.strip_prefix("env[").and_then(|rest| rest.strip_suffix(']')) {
        Some(var) if !var.is_empty() => FieldRef::Env(var.to_string()),
        Some(_) => return Err(TemplateError::EmptyField { offset }),
        None => FieldRef::Capture(name.to_string()),
    };

    Ok(Segment::Field {
        field,
        spec: FormatSpec::parse(name, spec)?,
    })
}
