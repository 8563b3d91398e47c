//! Pair splitting and percent-decoding shared by the keyed decoders.

use crate::error::{CodecError, CodecResult};
use percent_encoding::percent_decode_str;
use std::borrow::Cow;

/// Splits `raw` into `(key, value)` pairs on `separator`.
///
/// Empty segments are skipped and a segment without `=` has an empty value.
/// Keys and values are returned still percent-encoded.
pub(crate) fn split_pairs(raw: &str, separator: char) -> impl Iterator<Item = (&str, &str)> {
    raw.split(separator)
        .map(str::trim_start)
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.split_once('=').unwrap_or((segment, "")))
}

/// Strips a leading `?` from a query string.
pub(crate) fn strip_query_prefix(raw: &str) -> &str {
    raw.strip_prefix('?').unwrap_or(raw)
}

/// Keeps the segments of a query string whose root name (the decoded key up
/// to the first `.` or `[`) satisfies `keep`. Segments whose key does not
/// decode are dropped.
pub(crate) fn retain_query_roots(raw: &str, keep: impl Fn(&str) -> bool) -> String {
    strip_query_prefix(raw)
        .split('&')
        .filter(|segment| {
            let key = segment.split_once('=').map_or(*segment, |(key, _)| key);
            unescape(key, true).is_ok_and(|key| keep(key.split(['.', '[']).next().unwrap_or_default()))
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Percent-decodes one token. With `plus_as_space`, `+` decodes to a space
/// (form-urlencoded query input).
pub(crate) fn unescape(token: &str, plus_as_space: bool) -> CodecResult<String> {
    let token: Cow<'_, str> = if plus_as_space && token.contains('+') {
        Cow::Owned(token.replace('+', " "))
    } else {
        Cow::Borrowed(token)
    };
    percent_decode_str(&token)
        .decode_utf8()
        .map(Cow::into_owned)
        .map_err(|_| CodecError::format(token.as_ref(), "percent-decoded text is not valid UTF-8"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_pairs() {
        let pairs: Vec<_> = split_pairs("a=1&&b&c=x=y", '&').collect();
        assert_eq!(pairs, vec![("a", "1"), ("b", ""), ("c", "x=y")]);
    }

    #[test]
    fn test_cookie_pairs_trim_leading_space() {
        let pairs: Vec<_> = split_pairs("a=1; b=2;c=3", ';').collect();
        assert_eq!(pairs, vec![("a", "1"), ("b", "2"), ("c", "3")]);
    }

    #[test]
    fn test_retain_query_roots() {
        let kept = retain_query_roots("?page=2&utm=a&utm.source=b&f%5Bx%5D=1&g[y]=2", |root| {
            root == "page" || root == "f"
        });
        assert_eq!(kept, "page=2&f%5Bx%5D=1");
        assert_eq!(retain_query_roots("a=1&%FF=2", |_| true), "a=1");
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape("a%20b+c", true).unwrap(), "a b c");
        assert_eq!(unescape("a+b", false).unwrap(), "a+b");
        assert_eq!(unescape("%5B%5D", false).unwrap(), "[]");
        assert!(unescape("%FF", false).is_err());
    }
}
