//! # Annotation Grammar
//!
//! Lexes the per-field annotation strings:
//!
//! - parameter: `name[,option]*` where an option is `key=value` or a bare
//!   flag, or the sentinel `-`
//! - body: `kind[,required][,omitempty]`
//!
//! Values are kept as text here; validation happens in the builder.

use regex::Regex;
use std::sync::OnceLock;

/// Sentinel excluding a field entirely.
pub const SKIP_SENTINEL: &str = "-";

/// Lexed parameter annotation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParamAnnotation {
    /// Wire name, `None` when the primary token is empty.
    pub name: Option<String>,
    /// Raw `location=` value.
    pub location: Option<String>,
    /// Raw `style=` value.
    pub style: Option<String>,
    /// Raw `explode` value (`"true"` for the bare flag).
    pub explode: Option<String>,
    /// Raw `required` value (`"true"` for the bare flag).
    pub required: Option<String>,
    /// `embed` flag.
    pub embed: bool,
    /// `omitempty` flag.
    pub omit_default: bool,
    /// Options that were not recognized (ignored by the builder).
    pub unknown: Vec<String>,
}

/// Lexed body annotation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BodyAnnotation {
    /// Raw kind token, `None` when empty.
    pub kind: Option<String>,
    /// Raw `required` value (`"true"` for the bare flag).
    pub required: Option<String>,
    /// `omitempty` flag.
    pub omit_default: bool,
    /// Options that were not recognized.
    pub unknown: Vec<String>,
}

/// Result of lexing a parameter annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lexed {
    /// The field is excluded.
    Skip,
    /// A parameter annotation.
    Param(ParamAnnotation),
}

fn option_regex() -> &'static Regex {
    static OPTION_RE: OnceLock<Regex> = OnceLock::new();
    OPTION_RE.get_or_init(|| {
        Regex::new(r"^(?P<key>[A-Za-z_][A-Za-z0-9_]*)\s*(?:=\s*(?P<value>\S*))?$")
            .expect("Invalid regex")
    })
}

/// Splits an option token into `(key, value)`. A bare flag has value `true`.
fn split_option(token: &str) -> Option<(String, String)> {
    let caps = option_regex().captures(token)?;
    let key = caps.name("key")?.as_str().to_ascii_lowercase();
    let value = caps
        .name("value")
        .map(|v| v.as_str().to_string())
        .unwrap_or_else(|| "true".to_string());
    Some((key, value))
}

/// Lexes a parameter annotation.
///
/// Returns `Err` with a reason when the sentinel is combined with options.
pub fn lex_param(annotation: &str) -> Result<Lexed, String> {
    let mut tokens = annotation.split(',').map(str::trim);
    let primary = tokens.next().unwrap_or_default();
    let rest: Vec<&str> = tokens.filter(|t| !t.is_empty()).collect();

    if primary == SKIP_SENTINEL {
        if rest.is_empty() {
            return Ok(Lexed::Skip);
        }
        return Err("the '-' sentinel must be the whole annotation".into());
    }

    let mut out = ParamAnnotation {
        name: (!primary.is_empty()).then(|| primary.to_string()),
        ..ParamAnnotation::default()
    };

    for token in rest {
        match split_option(token) {
            Some((key, value)) => match key.as_str() {
                "location" | "in" => out.location = Some(value),
                "style" => out.style = Some(value),
                "explode" => out.explode = Some(value),
                "required" => out.required = Some(value),
                "embed" => out.embed = true,
                "omitempty" => out.omit_default = true,
                _ => out.unknown.push(token.to_string()),
            },
            None => out.unknown.push(token.to_string()),
        }
    }
    Ok(Lexed::Param(out))
}

/// Lexes a body annotation.
pub fn lex_body(annotation: &str) -> BodyAnnotation {
    let mut out = BodyAnnotation::default();
    for (i, token) in annotation.split(',').map(str::trim).enumerate() {
        if token.is_empty() {
            continue;
        }
        match split_option(token) {
            Some((key, value)) if key == "required" => out.required = Some(value),
            Some((key, _)) if key == "omitempty" => out.omit_default = true,
            _ if i == 0 => out.kind = Some(token.to_string()),
            _ => out.unknown.push(token.to_string()),
        }
    }
    out
}

/// Parses a `true|false` option value.
pub fn parse_flag(option: &str, value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(format!("{} must be true or false, got '{}'", option, other)),
    }
}
