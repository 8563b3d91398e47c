#![deny(missing_docs)]

//! # Options
//!
//! A validated `(location, style, explode)` triple driving a single
//! decode/encode call outside the full-record path.

use crate::error::{CodecError, CodecResult};
use crate::style::{default_explode, default_style, is_style_allowed, ParameterLocation, Style};

/// Validated serialization options for one decode/encode call.
///
/// The fields are private so an `Options` value always holds a style that is
/// legal for its location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Options {
    location: ParameterLocation,
    style: Style,
    explode: bool,
}

impl Options {
    /// Creates options, rejecting styles that are not legal for `location`.
    ///
    /// When `explode` is `None` the style's default is used.
    ///
    /// # Examples
    /// ```
    /// use oas_params_core::{Options, ParameterLocation, Style};
    ///
    /// let opts = Options::new(ParameterLocation::Query, Style::DeepObject, None).unwrap();
    /// assert!(opts.explode());
    /// assert!(Options::new(ParameterLocation::Header, Style::Form, None).is_err());
    /// ```
    pub fn new(
        location: ParameterLocation,
        style: Style,
        explode: Option<bool>,
    ) -> CodecResult<Self> {
        if !is_style_allowed(location, style) {
            return Err(CodecError::InvalidOptions {
                location,
                style,
                reason: format!("style '{}' is not allowed in {}", style, location),
            });
        }
        Ok(Self {
            location,
            style,
            explode: explode.unwrap_or_else(|| default_explode(style)),
        })
    }

    /// Options with the location's default style and that style's default explode.
    pub fn for_location(location: ParameterLocation) -> Self {
        let style = default_style(location);
        Self {
            location,
            style,
            explode: default_explode(style),
        }
    }

    /// Parses options from annotation-style tokens (as the CLI receives them).
    pub fn parse(location: &str, style: Option<&str>, explode: Option<bool>) -> CodecResult<Self> {
        let location: ParameterLocation = location.parse()?;
        let style = match style {
            Some(token) => token.parse()?,
            None => default_style(location),
        };
        Self::new(location, style, explode)
    }

    /// Returns a copy with a different explode flag.
    pub fn with_explode(mut self, explode: bool) -> Self {
        self.explode = explode;
        self
    }

    /// The parameter location.
    pub fn location(&self) -> ParameterLocation {
        self.location
    }

    /// The serialization style.
    pub fn style(&self) -> Style {
        self.style
    }

    /// The explode flag.
    pub fn explode(&self) -> bool {
        self.explode
    }
}

/// Query, form style, exploded.
impl Default for Options {
    fn default() -> Self {
        Self::for_location(ParameterLocation::Query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_default_is_query_form_exploded() {
        let opts = Options::default();
        assert_eq!(opts.location(), ParameterLocation::Query);
        assert_eq!(opts.style(), Style::Form);
        assert!(opts.explode());
    }

    #[test]
    fn test_for_location_fills_defaults() {
        let opts = Options::for_location(ParameterLocation::Path);
        assert_eq!(opts.style(), Style::Simple);
        assert!(!opts.explode());
    }

    #[test]
    fn test_rejects_illegal_combination() {
        let err = Options::new(ParameterLocation::Cookie, Style::DeepObject, Some(true))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOptions);
    }

    #[test]
    fn test_explicit_explode_wins() {
        let opts = Options::new(ParameterLocation::Query, Style::Form, Some(false)).unwrap();
        assert!(!opts.explode());
    }

    #[test]
    fn test_parse_tokens() {
        let opts = Options::parse("path", Some("matrix"), Some(true)).unwrap();
        assert_eq!(opts.style(), Style::Matrix);
        assert!(opts.explode());
        let opts = Options::parse("header", None, None).unwrap();
        assert_eq!(opts.style(), Style::Simple);
        assert_eq!(
            Options::parse("body", None, None).unwrap_err().kind(),
            ErrorKind::UnsupportedLocation
        );
    }
}
