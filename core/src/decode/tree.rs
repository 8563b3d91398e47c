//! Accumulates decoded `key path -> raw values` into a nested tree while
//! detecting leaf/prefix conflicts at every depth.

use crate::error::{CodecError, CodecResult};
use crate::value::{ParamMap, ParamValue};
use indexmap::IndexMap;

enum Node {
    /// Raw (still percent-encoded) values in encounter order.
    Leaf { raw: Vec<String>, force_list: bool },
    Branch(IndexMap<String, Node>),
}

/// How a leaf's raw values become a tree value.
pub(crate) trait LeafFinisher {
    fn finish(&self, key: &str, raw: Vec<String>, force_list: bool) -> CodecResult<ParamValue>;
}

impl<F> LeafFinisher for F
where
    F: Fn(&str, Vec<String>, bool) -> CodecResult<ParamValue>,
{
    fn finish(&self, key: &str, raw: Vec<String>, force_list: bool) -> CodecResult<ParamValue> {
        self(key, raw, force_list)
    }
}

/// A nested tree under construction.
pub(crate) struct Tree {
    root: IndexMap<String, Node>,
    max_depth: usize,
}

impl Tree {
    pub(crate) fn new(max_depth: usize) -> Self {
        Self {
            root: IndexMap::new(),
            max_depth,
        }
    }

    /// Records `raw_value` at `segments`. `append` marks the leaf as a list
    /// even with a single value (a trailing `[]`).
    ///
    /// `display_key` is the key as it appeared on the wire, for errors.
    pub(crate) fn insert(
        &mut self,
        display_key: &str,
        segments: &[String],
        raw_value: &str,
        append: bool,
    ) -> CodecResult<()> {
        let Some((last, parents)) = segments.split_last() else {
            return Err(CodecError::format(display_key, "empty key"));
        };
        if segments.len() > self.max_depth {
            return Err(CodecError::format(
                display_key,
                format!("nesting depth {} exceeds the maximum of {}", segments.len(), self.max_depth),
            ));
        }
        if segments.iter().any(String::is_empty) {
            return Err(CodecError::format(display_key, "empty key segment"));
        }

        let mut level = &mut self.root;
        for segment in parents {
            let node = level
                .entry(segment.clone())
                .or_insert_with(|| Node::Branch(IndexMap::new()));
            level = match node {
                Node::Branch(children) => children,
                Node::Leaf { .. } => return Err(conflict(display_key, segment)),
            };
        }

        let node = level.entry(last.clone()).or_insert_with(|| Node::Leaf {
            raw: Vec::new(),
            force_list: false,
        });
        match node {
            Node::Leaf { raw, force_list } => {
                raw.push(raw_value.to_string());
                *force_list |= append;
                Ok(())
            }
            Node::Branch(_) => Err(conflict(display_key, last)),
        }
    }

    /// Converts the accumulated nodes into a tree value.
    pub(crate) fn finish(self, finisher: &impl LeafFinisher) -> CodecResult<ParamMap> {
        finish_level(self.root, "", finisher)
    }
}

fn conflict(display_key: &str, segment: &str) -> CodecError {
    CodecError::format(
        display_key,
        format!("'{}' is used both as a value and as a nesting prefix", segment),
    )
}

fn finish_level(
    level: IndexMap<String, Node>,
    prefix: &str,
    finisher: &impl LeafFinisher,
) -> CodecResult<ParamMap> {
    let mut out = ParamMap::with_capacity(level.len());
    for (name, node) in level {
        let key = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{}.{}", prefix, name)
        };
        let value = match node {
            Node::Leaf { raw, force_list } => finisher.finish(&key, raw, force_list)?,
            Node::Branch(children) => ParamValue::Map(finish_level(children, &key, finisher)?),
        };
        out.insert(name, value);
    }
    Ok(out)
}
