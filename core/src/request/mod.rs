//! # Transport Requests
//!
//! The view of an HTTP request the codec consumes, the client-side
//! [`EncodedParts`] it produces, and body decoding.

pub mod body;
pub(crate) mod demux;
pub mod multipart;
pub(crate) mod normalize;

use crate::error::{CodecError, CodecResult};
use std::borrow::Cow;
use std::collections::HashMap;
use url::Url;

pub use body::{BodyDecoder, JsonBodyDecoder};

/// Raw (still percent-encoded) path parameter values by name.
pub type PathParams = HashMap<String, String>;

/// What the codec needs from a transport request.
pub trait TransportRequest {
    /// The raw query string, without the leading `?`.
    fn query_string(&self) -> &str;

    /// A header value by case-insensitive name.
    fn header(&self, name: &str) -> Option<Cow<'_, str>>;

    /// The raw `Cookie` header.
    fn cookie_header(&self) -> Option<Cow<'_, str>> {
        self.header("cookie")
    }

    /// The declared body content type.
    fn content_type(&self) -> Option<Cow<'_, str>> {
        self.header("content-type")
    }

    /// The body bytes, empty when there is no body.
    fn body(&self) -> &[u8];
}

/// An owned request, built up field by field.
///
/// # Examples
/// ```
/// use oas_params_core::{RawRequest, TransportRequest};
///
/// let request = RawRequest::new()
///     .with_query("page=2")
///     .with_header("X-Trace", "abc")
///     .with_cookie("session", "s1")
///     .with_cookie("theme", "dark");
/// assert_eq!(request.query_string(), "page=2");
/// assert_eq!(request.header("x-trace").as_deref(), Some("abc"));
/// assert_eq!(request.cookie_header().as_deref(), Some("session=s1; theme=dark"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRequest {
    query: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl RawRequest {
    /// An empty request.
    pub fn new() -> Self {
        Self::default()
    }

    /// A request carrying the query of an absolute URL.
    pub fn from_url(url: &str) -> CodecResult<Self> {
        let parsed = Url::parse(url).map_err(|e| CodecError::format(url, e.to_string()))?;
        Ok(Self::new().with_query(parsed.query().unwrap_or_default()))
    }

    /// A request carrying the query, headers and cookies of encoded parts.
    pub fn from_parts(parts: &EncodedParts) -> Self {
        let mut request = Self::new().with_query(parts.query.as_str());
        for (name, value) in &parts.headers {
            request = request.with_header(name.as_str(), value.as_str());
        }
        if let Some(cookie) = parts.cookie_header() {
            request = request.with_header("Cookie", cookie);
        }
        request
    }

    /// Sets the query string (a leading `?` is dropped).
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        let query: String = query.into();
        self.query = query.strip_prefix('?').unwrap_or(&query).to_string();
        self
    }

    /// Adds a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Appends a `name=value` pair to the `Cookie` header.
    pub fn with_cookie(mut self, name: &str, value: &str) -> Self {
        let pair = format!("{}={}", name, value);
        match self
            .headers
            .iter_mut()
            .find(|(header, _)| header.eq_ignore_ascii_case("cookie"))
        {
            Some((_, existing)) => {
                existing.push_str("; ");
                existing.push_str(&pair);
            }
            None => self.headers.push(("Cookie".into(), pair)),
        }
        self
    }

    /// Sets the body and its content type.
    pub fn with_body(mut self, content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        self.headers
            .retain(|(header, _)| !header.eq_ignore_ascii_case("content-type"));
        self.headers.push(("Content-Type".into(), content_type.into()));
        self.body = body.into();
        self
    }
}

impl TransportRequest for RawRequest {
    fn query_string(&self) -> &str {
        &self.query
    }

    /// Repeated headers are joined with `,`.
    fn header(&self, name: &str) -> Option<Cow<'_, str>> {
        let mut values = self
            .headers
            .iter()
            .filter(|(header, _)| header.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str());
        let first = values.next()?;
        match values.next() {
            None => Some(Cow::Borrowed(first)),
            Some(second) => {
                let mut joined = format!("{},{}", first, second);
                for value in values {
                    joined.push(',');
                    joined.push_str(value);
                }
                Some(Cow::Owned(joined))
            }
        }
    }

    fn body(&self) -> &[u8] {
        &self.body
    }
}

/// A record encoded for sending: the client-side inverse of `decode_request`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodedParts {
    /// Query string without the leading `?`.
    pub query: String,
    /// Encoded path parameter values by name.
    pub path: PathParams,
    /// Header values in field order.
    pub headers: Vec<(String, String)>,
    /// `name=value` cookie pairs in field order.
    pub cookies: Vec<String>,
}

impl EncodedParts {
    /// The `Cookie` header value, `None` without cookies.
    pub fn cookie_header(&self) -> Option<String> {
        (!self.cookies.is_empty()).then(|| self.cookies.join("; "))
    }

    /// Replaces `{name}` placeholders in a path template.
    pub fn expand_path(&self, template: &str) -> String {
        self.path.iter().fold(template.to_string(), |path, (name, value)| {
            path.replace(&format!("{{{}}}", name), value)
        })
    }

    /// Appends the query to a URL's existing query.
    pub fn apply_to_url(&self, url: &mut Url) {
        if self.query.is_empty() {
            return;
        }
        let query = match url.query() {
            Some(existing) if !existing.is_empty() => format!("{}&{}", existing, self.query),
            _ => self.query.clone(),
        };
        url.set_query(Some(&query));
    }
}
