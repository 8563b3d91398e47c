//! Keyless styles: simple and label.

use super::{Writer, ROOT};
use crate::error::CodecResult;
use crate::value::ParamValue;

impl Writer {
    /// `k=v` for exploded mappings, `k,v` otherwise.
    fn object_parts(&self, value: &ParamValue) -> CodecResult<Option<Vec<String>>> {
        let ParamValue::Map(entries) = value else {
            return Ok(None);
        };
        let pairs = self.flat_pairs(entries, ROOT)?;
        let parts = if self.explode {
            pairs.into_iter().map(|(k, v)| format!("{}={}", k, v)).collect()
        } else {
            pairs.into_iter().flat_map(|(k, v)| [k, v]).collect()
        };
        Ok(Some(parts))
    }

    fn parts(&self, value: &ParamValue) -> CodecResult<Vec<String>> {
        if let Some(parts) = self.object_parts(value)? {
            return Ok(parts);
        }
        match value {
            ParamValue::List(items) => self.scalars(items, ROOT),
            scalar => Ok(vec![self.scalar(scalar, ROOT)?]),
        }
    }

    pub(super) fn simple(&self, value: &ParamValue) -> CodecResult<String> {
        Ok(self.parts(value)?.join(","))
    }

    pub(super) fn label(&self, value: &ParamValue) -> CodecResult<String> {
        let separator = if self.explode { "." } else { "," };
        Ok(format!(".{}", self.parts(value)?.join(separator)))
    }
}
