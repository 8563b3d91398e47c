//! Percent-encode sets.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// The WHATWG component percent-encode set (`encodeURIComponent`).
const COMPONENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'^')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b':')
    .add(b';')
    .add(b'=')
    .add(b'@')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'|')
    .add(b'$')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b',');

/// Label values are separated by `.`.
const LABEL: &AsciiSet = &COMPONENT.add(b'.');

/// `allowReserved`: RFC 3986 reserved characters pass through.
const RESERVED: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'^')
    .add(b'{')
    .add(b'}')
    .add(b'\\')
    .add(b'|')
    .add(b'%');

/// Which characters get percent-encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EscapeSet {
    Component,
    Label,
    Reserved,
}

impl EscapeSet {
    fn ascii_set(self) -> &'static AsciiSet {
        match self {
            EscapeSet::Component => COMPONENT,
            EscapeSet::Label => LABEL,
            EscapeSet::Reserved => RESERVED,
        }
    }

    pub(crate) fn escape(self, text: &str) -> String {
        utf8_percent_encode(text, self.ascii_set()).to_string()
    }
}
