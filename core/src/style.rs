#![deny(missing_docs)]

//! # Style Rules
//!
//! Parameter locations, serialization styles and body kinds, plus the static
//! table of which styles are legal per location and which defaults apply.

use crate::error::CodecError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The location of a parameter on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    /// URL query string (e.g. `/users?page=1`).
    Query,
    /// URL path segment (e.g. `/users/{id}`).
    Path,
    /// Request header.
    Header,
    /// Cookie carried in the `Cookie` header.
    Cookie,
}

impl ParameterLocation {
    /// All locations, in declaration order.
    pub const ALL: [ParameterLocation; 4] = [
        ParameterLocation::Query,
        ParameterLocation::Path,
        ParameterLocation::Header,
        ParameterLocation::Cookie,
    ];

    /// The annotation token for this location.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterLocation::Query => "query",
            ParameterLocation::Path => "path",
            ParameterLocation::Header => "header",
            ParameterLocation::Cookie => "cookie",
        }
    }
}

impl fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParameterLocation {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ParameterLocation::ALL
            .into_iter()
            .find(|loc| loc.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CodecError::UnsupportedLocation(s.to_string()))
    }
}

/// Parameter serialization style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Style {
    /// `form`
    Form,
    /// `simple`
    Simple,
    /// `matrix`
    Matrix,
    /// `label`
    Label,
    /// `spaceDelimited`
    SpaceDelimited,
    /// `pipeDelimited`
    PipeDelimited,
    /// `deepObject`
    DeepObject,
}

impl Style {
    /// All styles, in declaration order.
    pub const ALL: [Style; 7] = [
        Style::Form,
        Style::Simple,
        Style::Matrix,
        Style::Label,
        Style::SpaceDelimited,
        Style::PipeDelimited,
        Style::DeepObject,
    ];

    /// The annotation token for this style.
    pub fn as_str(&self) -> &'static str {
        match self {
            Style::Form => "form",
            Style::Simple => "simple",
            Style::Matrix => "matrix",
            Style::Label => "label",
            Style::SpaceDelimited => "spaceDelimited",
            Style::PipeDelimited => "pipeDelimited",
            Style::DeepObject => "deepObject",
        }
    }

    /// The prefix written before each value (`;` matrix, `.` label).
    pub fn prefix(&self) -> Option<char> {
        match self {
            Style::Matrix => Some(';'),
            Style::Label => Some('.'),
            _ => None,
        }
    }

    /// The separator joining non-exploded list elements.
    pub fn separator(&self) -> char {
        match self {
            Style::SpaceDelimited => ' ',
            Style::PipeDelimited => '|',
            _ => ',',
        }
    }

    /// Whether the decoded representation is keyed by parameter name.
    ///
    /// `simple` and `label` carry only the value; every other style carries
    /// `name=value` pairs.
    pub fn is_keyed(&self) -> bool {
        !matches!(self, Style::Simple | Style::Label)
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Style {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Style::ALL
            .into_iter()
            .find(|style| style.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CodecError::InvalidStyle(s.to_string()))
    }
}

/// How a body field is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyKind {
    /// Parsed by a format collaborator (JSON, XML, url-encoded form).
    #[default]
    Structured,
    /// Raw bytes.
    File,
    /// `multipart/form-data` with named parts.
    Multipart,
}

impl BodyKind {
    /// The annotation token for this body kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            BodyKind::Structured => "structured",
            BodyKind::File => "file",
            BodyKind::Multipart => "multipart",
        }
    }
}

impl fmt::Display for BodyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BodyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "structured" => Ok(BodyKind::Structured),
            "file" => Ok(BodyKind::File),
            "multipart" => Ok(BodyKind::Multipart),
            other => Err(format!("unknown body kind '{}'", other)),
        }
    }
}

/// Styles legal for a location.
pub fn allowed_styles(location: ParameterLocation) -> &'static [Style] {
    match location {
        ParameterLocation::Query => &[
            Style::Form,
            Style::SpaceDelimited,
            Style::PipeDelimited,
            Style::DeepObject,
        ],
        ParameterLocation::Path => &[Style::Simple, Style::Label, Style::Matrix],
        ParameterLocation::Header => &[Style::Simple],
        ParameterLocation::Cookie => &[Style::Form],
    }
}

/// The style used when a field does not declare one.
pub fn default_style(location: ParameterLocation) -> Style {
    match location {
        ParameterLocation::Query | ParameterLocation::Cookie => Style::Form,
        ParameterLocation::Path | ParameterLocation::Header => Style::Simple,
    }
}

/// The explode value used when a field does not declare one.
pub fn default_explode(style: Style) -> bool {
    matches!(style, Style::Form | Style::DeepObject)
}

/// Whether `style` may be used at `location`.
pub fn is_style_allowed(location: ParameterLocation, style: Style) -> bool {
    allowed_styles(location).contains(&style)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_per_location() {
        assert_eq!(default_style(ParameterLocation::Query), Style::Form);
        assert_eq!(default_style(ParameterLocation::Path), Style::Simple);
        assert_eq!(default_style(ParameterLocation::Header), Style::Simple);
        assert_eq!(default_style(ParameterLocation::Cookie), Style::Form);
    }

    #[test]
    fn test_default_explode() {
        for style in Style::ALL {
            let expected = matches!(style, Style::Form | Style::DeepObject);
            assert_eq!(default_explode(style), expected, "{}", style);
        }
    }

    #[test]
    fn test_default_style_is_always_allowed() {
        for loc in ParameterLocation::ALL {
            assert!(is_style_allowed(loc, default_style(loc)));
        }
    }

    #[test]
    fn test_allowed_table() {
        assert!(is_style_allowed(ParameterLocation::Query, Style::DeepObject));
        assert!(is_style_allowed(ParameterLocation::Path, Style::Matrix));
        assert!(!is_style_allowed(ParameterLocation::Header, Style::Form));
        assert!(!is_style_allowed(ParameterLocation::Cookie, Style::Simple));
        assert!(!is_style_allowed(ParameterLocation::Query, Style::Label));
        assert_eq!(allowed_styles(ParameterLocation::Header), &[Style::Simple]);
    }

    #[test]
    fn test_parse_tokens() {
        assert_eq!("spaceDelimited".parse::<Style>().unwrap(), Style::SpaceDelimited);
        assert_eq!("DEEPOBJECT".parse::<Style>().unwrap(), Style::DeepObject);
        assert!(matches!(
            "wavy".parse::<Style>(),
            Err(CodecError::InvalidStyle(_))
        ));
        assert_eq!(
            "Header".parse::<ParameterLocation>().unwrap(),
            ParameterLocation::Header
        );
        assert!(matches!(
            "body".parse::<ParameterLocation>(),
            Err(CodecError::UnsupportedLocation(_))
        ));
        assert_eq!("multipart".parse::<BodyKind>().unwrap(), BodyKind::Multipart);
    }

    #[test]
    fn test_serde_tokens_match_display() {
        let json = serde_json::to_string(&Style::PipeDelimited).unwrap();
        assert_eq!(json, "\"pipeDelimited\"");
        let loc: ParameterLocation = serde_json::from_str("\"cookie\"").unwrap();
        assert_eq!(loc, ParameterLocation::Cookie);
    }
}
