//! Keyed styles: form, spaceDelimited, pipeDelimited, deepObject, matrix.

use super::{child, Writer};
use crate::error::{CodecError, CodecResult};
use crate::style::{ParameterLocation, Style};
use crate::value::{ParamMap, ParamValue};

/// Form keys nest on `.`, so a name containing one cannot be read back.
fn undotted(name: &str, path: &str) -> CodecResult<()> {
    if name.contains('.') {
        return Err(CodecError::UnsupportedType {
            path: path.to_string(),
            reason: format!("form key '{}' contains '.', which reads back as nesting", name),
        });
    }
    Ok(())
}

impl Writer {
    fn pair_separator(&self) -> &'static str {
        match self.location {
            ParameterLocation::Cookie => "; ",
            _ => "&",
        }
    }

    pub(super) fn form(&self, params: &ParamMap) -> CodecResult<String> {
        let mut pairs = Vec::new();
        for (name, value) in params {
            undotted(name, name)?;
            if self.explode {
                self.form_exploded(&mut pairs, &self.esc(name), name, value)?;
            } else {
                self.form_flat(&mut pairs, name, value)?;
            }
        }
        Ok(pairs.join(self.pair_separator()))
    }

    /// Repeated keys for lists, dotted keys for nested mappings.
    fn form_exploded(
        &self,
        pairs: &mut Vec<String>,
        key: &str,
        path: &str,
        value: &ParamValue,
    ) -> CodecResult<()> {
        match value {
            ParamValue::List(items) if items.is_empty() => pairs.push(format!("{}=", key)),
            ParamValue::List(items) => {
                for text in self.scalars(items, path)? {
                    pairs.push(format!("{}={}", key, text));
                }
            }
            ParamValue::Map(entries) => {
                for (name, entry) in entries {
                    undotted(name, &child(path, name))?;
                    let nested_key = format!("{}.{}", key, self.esc(name));
                    self.form_exploded(pairs, &nested_key, &child(path, name), entry)?;
                }
            }
            scalar => pairs.push(format!("{}={}", key, self.scalar(scalar, path)?)),
        }
        Ok(())
    }

    /// One pair per parameter; lists and flat mappings are comma-joined.
    fn form_flat(&self, pairs: &mut Vec<String>, name: &str, value: &ParamValue) -> CodecResult<()> {
        let joined = self.joined(name, value, ",")?;
        pairs.push(format!("{}={}", self.esc(name), joined));
        Ok(())
    }

    /// A scalar, a list joined by `separator`, or a flat mapping written as
    /// `k{sep}v{sep}k{sep}v`.
    fn joined(&self, path: &str, value: &ParamValue, separator: &str) -> CodecResult<String> {
        match value {
            ParamValue::List(items) => Ok(self.scalars(items, path)?.join(separator)),
            ParamValue::Map(entries) => Ok(self
                .flat_pairs(entries, path)?
                .into_iter()
                .flat_map(|(k, v)| [k, v])
                .collect::<Vec<_>>()
                .join(separator)),
            scalar => self.scalar(scalar, path),
        }
    }

    pub(super) fn delimited(&self, params: &ParamMap) -> CodecResult<String> {
        if self.explode {
            return self.form(params);
        }
        let separator = self.delimiter();
        let mut pairs = Vec::with_capacity(params.len());
        for (name, value) in params {
            pairs.push(format!("{}={}", self.esc(name), self.joined(name, value, separator)?));
        }
        Ok(pairs.join("&"))
    }

    /// The written form of the list separator.
    fn delimiter(&self) -> &'static str {
        match self.style {
            Style::SpaceDelimited => "%20",
            Style::PipeDelimited => "|",
            _ => ",",
        }
    }

    pub(super) fn deep_object(&self, params: &ParamMap) -> CodecResult<String> {
        let mut pairs = Vec::new();
        for (name, value) in params {
            self.deep_entry(&mut pairs, &self.esc(name), name, value)?;
        }
        Ok(pairs.join("&"))
    }

    fn deep_entry(
        &self,
        pairs: &mut Vec<String>,
        key: &str,
        path: &str,
        value: &ParamValue,
    ) -> CodecResult<()> {
        let (open, close) = (self.esc("["), self.esc("]"));
        match value {
            ParamValue::Map(entries) => {
                for (name, entry) in entries {
                    let nested_key = format!("{}{}{}{}", key, open, self.esc(name), close);
                    self.deep_entry(pairs, &nested_key, &child(path, name), entry)?;
                }
            }
            ParamValue::List(items) => {
                for text in self.scalars(items, path)? {
                    pairs.push(format!("{}{}{}={}", key, open, close, text));
                }
            }
            scalar => pairs.push(format!("{}={}", key, self.scalar(scalar, path)?)),
        }
        Ok(())
    }

    pub(super) fn matrix(&self, params: &ParamMap) -> CodecResult<String> {
        let mut out = String::new();
        for (name, value) in params {
            let key = self.esc(name);
            match value {
                ParamValue::List(items) if self.explode && !items.is_empty() => {
                    for text in self.scalars(items, name)? {
                        out.push_str(&format!(";{}={}", key, text));
                    }
                }
                ParamValue::Map(entries) if self.explode => {
                    for (k, v) in self.flat_pairs(entries, name)? {
                        out.push_str(&format!(";{}={}", k, v));
                    }
                }
                other => out.push_str(&format!(";{}={}", key, self.joined(name, other, ",")?)),
            }
        }
        Ok(out)
    }
}
