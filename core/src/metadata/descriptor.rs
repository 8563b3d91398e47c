//! # Descriptors
//!
//! Turns a record's [`FieldDecl`]s into validated [`FieldDescriptor`]s.
//! Every annotation problem is reported here, at build time, as
//! [`CodecError::InvalidDescriptor`].

use super::annotation::{lex_body, lex_param, parse_flag, Lexed};
use super::MetadataCache;
use crate::error::{CodecError, CodecResult};
use crate::options::Options;
use crate::record::{Annotation, DescriptorFn, FieldDecl, FieldKind, Record};
use crate::style::{default_explode, default_style, BodyKind, ParameterLocation, Style};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Embedding chains deeper than this are rejected when flattening.
const MAX_EMBED_DEPTH: usize = 16;

/// Binding of a parameter field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamBinding {
    /// Location, style and explode flag.
    pub options: Options,
    /// Required flag (always `true` in the path location).
    pub required: bool,
}

/// Binding of the body field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyBinding {
    /// How the body bytes are interpreted.
    pub kind: BodyKind,
    /// Required flag.
    pub required: bool,
}

/// A field is bound either to a parameter or to the body, never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldBinding {
    /// A parameter field.
    Param(ParamBinding),
    /// The body field.
    Body(BodyBinding),
}

/// Compiled metadata for one field.
#[derive(Clone)]
pub struct FieldDescriptor {
    /// Source field name.
    pub source_name: &'static str,
    /// Parameter name or map key on the wire.
    pub wire_name: String,
    /// Shape of the field type.
    pub kind: FieldKind,
    /// Whether the field type is an optional wrapper.
    pub optional: bool,
    /// Whether the field is a flattened sub-record.
    pub embedded: bool,
    /// Skip the field when marshaling its default value.
    pub omit_default: bool,
    /// Parameter or body binding.
    pub binding: FieldBinding,
    /// Resolver of the nested record descriptor, for record-shaped fields.
    pub nested: Option<DescriptorFn>,
}

impl FieldDescriptor {
    /// Whether this is the body field.
    pub fn is_body(&self) -> bool {
        matches!(self.binding, FieldBinding::Body(_))
    }

    /// The parameter binding, `None` for the body field.
    pub fn param(&self) -> Option<&ParamBinding> {
        match &self.binding {
            FieldBinding::Param(param) => Some(param),
            FieldBinding::Body(_) => None,
        }
    }

    /// The body binding, `None` for parameter fields.
    pub fn body(&self) -> Option<&BodyBinding> {
        match &self.binding {
            FieldBinding::Body(body) => Some(body),
            FieldBinding::Param(_) => None,
        }
    }

    /// The parameter location, `None` for the body field.
    pub fn location(&self) -> Option<ParameterLocation> {
        self.param().map(|p| p.options.location())
    }

    /// Whether the field must be present on the wire.
    pub fn required(&self) -> bool {
        match &self.binding {
            FieldBinding::Param(param) => param.required,
            FieldBinding::Body(body) => body.required,
        }
    }

    /// Resolves the nested record descriptor.
    pub fn nested_descriptor(&self, cache: &MetadataCache) -> CodecResult<Option<Arc<RecordDescriptor>>> {
        self.nested.map(|resolve| resolve(cache)).transpose()
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("source_name", &self.source_name)
            .field("wire_name", &self.wire_name)
            .field("kind", &self.kind)
            .field("optional", &self.optional)
            .field("embedded", &self.embedded)
            .field("omit_default", &self.omit_default)
            .field("binding", &self.binding)
            .field("nested", &self.nested.is_some())
            .finish()
    }
}

// Resolver pointers are not compared: two descriptors built from the same
// declarations are equal.
impl PartialEq for FieldDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.source_name == other.source_name
            && self.wire_name == other.wire_name
            && self.kind == other.kind
            && self.optional == other.optional
            && self.embedded == other.embedded
            && self.omit_default == other.omit_default
            && self.binding == other.binding
            && self.nested.is_some() == other.nested.is_some()
    }
}

/// Compiled metadata for one record type. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDescriptor {
    type_name: &'static str,
    fields: Vec<FieldDescriptor>,
    index: HashMap<&'static str, usize>,
    body: Option<usize>,
}

impl RecordDescriptor {
    /// Builds the descriptor of `R` from its field declarations.
    pub fn build<R: Record>() -> CodecResult<Self> {
        let descriptor = Self::from_decls(R::type_name(), R::declare_fields())?;
        tracing::debug!(
            record = descriptor.type_name,
            fields = descriptor.fields.len(),
            "built record descriptor"
        );
        Ok(descriptor)
    }

    /// Builds a descriptor from explicit declarations.
    pub fn from_decls(type_name: &'static str, decls: Vec<FieldDecl>) -> CodecResult<Self> {
        let mut fields = Vec::with_capacity(decls.len());
        let mut index = HashMap::with_capacity(decls.len());
        let mut body = None;

        for decl in decls {
            let Some(field) = build_field(type_name, &decl)? else {
                continue;
            };
            if field.is_body() {
                if let Some(existing) = body {
                    let existing: &FieldDescriptor = &fields[existing];
                    return Err(invalid(
                        type_name,
                        decl.name,
                        format!("a record has at most one body field, '{}' is already one", existing.source_name),
                    ));
                }
                body = Some(fields.len());
            }
            index.insert(field.source_name, fields.len());
            fields.push(field);
        }

        Ok(Self {
            type_name,
            fields,
            index,
            body,
        })
    }

    /// Record type name.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Field descriptors in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Looks up a field by source name.
    pub fn field(&self, source_name: &str) -> Option<&FieldDescriptor> {
        self.index.get(source_name).map(|&i| &self.fields[i])
    }

    /// The body field, if the record has one.
    pub fn body_field(&self) -> Option<&FieldDescriptor> {
        self.body.map(|i| &self.fields[i])
    }

    /// Parameter fields with every embedded field replaced by the parameter
    /// fields of the embedded record, recursively.
    pub fn flattened_params(&self, cache: &MetadataCache) -> CodecResult<Vec<FieldDescriptor>> {
        let mut out = Vec::with_capacity(self.fields.len());
        self.collect_params(cache, 0, &mut out)?;
        Ok(out)
    }

    fn collect_params(
        &self,
        cache: &MetadataCache,
        depth: usize,
        out: &mut Vec<FieldDescriptor>,
    ) -> CodecResult<()> {
        for field in self.fields.iter().filter(|f| !f.is_body()) {
            if !field.embedded {
                out.push(field.clone());
                continue;
            }
            if depth >= MAX_EMBED_DEPTH {
                return Err(invalid(
                    self.type_name,
                    field.source_name,
                    "embedding is nested too deeply",
                ));
            }
            if let Some(nested) = field.nested_descriptor(cache)? {
                nested.collect_params(cache, depth + 1, out)?;
            }
        }
        Ok(())
    }
}

fn invalid(record: &str, field: &str, reason: impl Into<String>) -> CodecError {
    CodecError::InvalidDescriptor {
        record: record.to_string(),
        field: field.to_string(),
        reason: reason.into(),
    }
}

/// Builds the descriptor of one field, `None` when the field is skipped.
pub fn build_field(record: &str, decl: &FieldDecl) -> CodecResult<Option<FieldDescriptor>> {
    match decl.annotation {
        Annotation::None => build_param(record, decl, ""),
        Annotation::Param(text) => build_param(record, decl, text),
        Annotation::Body(text) => build_body(record, decl, text).map(Some),
    }
    .map(|field| {
        if field.is_none() {
            tracing::trace!(record, field = decl.name, "field skipped by annotation");
        }
        field
    })
}

fn build_param(record: &str, decl: &FieldDecl, text: &str) -> CodecResult<Option<FieldDescriptor>> {
    let lexed = lex_param(text).map_err(|reason| invalid(record, decl.name, reason))?;
    let annotation = match lexed {
        Lexed::Skip => return Ok(None),
        Lexed::Param(annotation) => annotation,
    };
    for unknown in &annotation.unknown {
        tracing::trace!(record, field = decl.name, option = %unknown, "ignoring unknown option");
    }

    let location = match &annotation.location {
        Some(token) => token
            .parse::<ParameterLocation>()
            .map_err(|e| invalid(record, decl.name, e.to_string()))?,
        None => ParameterLocation::Query,
    };
    let style = match &annotation.style {
        Some(token) => token
            .parse::<Style>()
            .map_err(|e| invalid(record, decl.name, e.to_string()))?,
        None => default_style(location),
    };
    let explode = match &annotation.explode {
        Some(value) => parse_flag("explode", value).map_err(|r| invalid(record, decl.name, r))?,
        None => default_explode(style),
    };
    let declared_required = match &annotation.required {
        Some(value) => parse_flag("required", value).map_err(|r| invalid(record, decl.name, r))?,
        None => false,
    };
    let options = Options::new(location, style, Some(explode))
        .map_err(|_| invalid(record, decl.name, format!("style '{}' is not allowed in {}", style, location)))?;

    if annotation.embed && decl.kind != FieldKind::Record {
        return Err(invalid(
            record,
            decl.name,
            format!("only record-shaped fields can be embedded, found {}", decl.kind),
        ));
    }

    Ok(Some(FieldDescriptor {
        source_name: decl.name,
        wire_name: annotation.name.unwrap_or_else(|| decl.name.to_string()),
        kind: decl.kind,
        optional: decl.optional,
        embedded: annotation.embed,
        omit_default: annotation.omit_default,
        binding: FieldBinding::Param(ParamBinding {
            options,
            required: declared_required || location == ParameterLocation::Path,
        }),
        nested: decl.nested,
    }))
}

fn build_body(record: &str, decl: &FieldDecl, text: &str) -> CodecResult<FieldDescriptor> {
    let annotation = lex_body(text);
    for unknown in &annotation.unknown {
        tracing::trace!(record, field = decl.name, option = %unknown, "ignoring unknown body option");
    }
    let kind = match &annotation.kind {
        Some(token) => token
            .parse::<BodyKind>()
            .map_err(|reason| invalid(record, decl.name, reason))?,
        None => BodyKind::Structured,
    };
    let required = match &annotation.required {
        Some(value) => parse_flag("required", value).map_err(|r| invalid(record, decl.name, r))?,
        None => false,
    };

    let shape_ok = match kind {
        BodyKind::Structured => decl.kind != FieldKind::File,
        BodyKind::File => decl.kind == FieldKind::File,
        BodyKind::Multipart => decl.kind == FieldKind::Record,
    };
    if !shape_ok {
        return Err(invalid(
            record,
            decl.name,
            format!("a {} body cannot bind a {} field", kind, decl.kind),
        ));
    }

    Ok(FieldDescriptor {
        source_name: decl.name,
        wire_name: decl.name.to_string(),
        kind: decl.kind,
        optional: decl.optional,
        embedded: false,
        omit_default: annotation.omit_default,
        binding: FieldBinding::Body(BodyBinding { kind, required }),
        nested: decl.nested,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn leaf(name: &'static str, annotation: Annotation) -> FieldDecl {
        FieldDecl::of::<String>(name, annotation)
    }

    fn build(decl: FieldDecl) -> CodecResult<Option<FieldDescriptor>> {
        build_field("Sample", &decl)
    }

    #[test]
    fn test_defaults_without_annotation() {
        let field = build(leaf("name", Annotation::None)).unwrap().unwrap();
        assert_eq!(field.wire_name, "name");
        let param = field.param().unwrap();
        assert_eq!(param.options.location(), ParameterLocation::Query);
        assert_eq!(param.options.style(), Style::Form);
        assert!(param.options.explode());
        assert!(!param.required);
        assert!(!field.embedded);
    }

    #[test]
    fn test_path_is_always_required() {
        let field = build(leaf("id", Annotation::Param("id,location=path,required=false")))
            .unwrap()
            .unwrap();
        assert!(field.required());
        assert_eq!(field.param().unwrap().options.style(), Style::Simple);
        assert!(!field.param().unwrap().options.explode());
    }

    #[test]
    fn test_explicit_options() {
        let field = build(leaf(
            "ids",
            Annotation::Param("id_list,location=query,style=pipeDelimited,explode=false,required"),
        ))
        .unwrap()
        .unwrap();
        assert_eq!(field.wire_name, "id_list");
        let param = field.param().unwrap();
        assert_eq!(param.options.style(), Style::PipeDelimited);
        assert!(!param.options.explode());
        assert!(param.required);
    }

    #[test]
    fn test_skip_sentinel_produces_nothing() {
        assert!(build(leaf("secret", Annotation::Param("-"))).unwrap().is_none());
    }

    #[test]
    fn test_illegal_style_for_location() {
        let err = build(leaf("x", Annotation::Param("x,location=header,style=form"))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDescriptor);
        assert!(err.to_string().contains("Sample.x"));
    }

    #[test]
    fn test_unknown_location_and_style() {
        assert!(build(leaf("x", Annotation::Param("x,location=body"))).is_err());
        assert!(build(leaf("x", Annotation::Param("x,style=tabDelimited"))).is_err());
    }

    #[test]
    fn test_bad_flag_value() {
        let err = build(leaf("x", Annotation::Param("x,explode=maybe"))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDescriptor);
    }

    #[test]
    fn test_embed_requires_record() {
        let err = build(leaf("x", Annotation::Param(",embed"))).unwrap_err();
        assert!(err.to_string().contains("embedded"));
    }

    #[test]
    fn test_body_defaults_and_kinds() {
        let field = build(FieldDecl::of::<crate::value::FilePart>("upload", Annotation::Body("file,required")))
            .unwrap()
            .unwrap();
        assert!(field.is_body());
        assert_eq!(field.body().unwrap().kind, BodyKind::File);
        assert!(field.required());
        assert!(field.location().is_none());

        let field = build(FieldDecl::of::<Vec<String>>("items", Annotation::Body(""))).unwrap().unwrap();
        assert_eq!(field.body().unwrap().kind, BodyKind::Structured);
        assert!(!field.required());
    }

    #[test]
    fn test_body_shape_mismatch() {
        let err = build(leaf("upload", Annotation::Body("file"))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDescriptor);
        assert!(build(leaf("form", Annotation::Body("multipart"))).is_err());
        assert!(build(leaf("form", Annotation::Body("yaml"))).is_err());
    }

    #[test]
    fn test_two_body_fields_rejected() {
        let err = RecordDescriptor::from_decls(
            "Twice",
            vec![
                FieldDecl::of::<Vec<String>>("a", Annotation::Body("")),
                FieldDecl::of::<Vec<String>>("b", Annotation::Body("")),
            ],
        )
        .unwrap_err();
        assert!(err.to_string().contains("at most one body field"));
    }

    #[test]
    fn test_record_descriptor_index() {
        let descriptor = RecordDescriptor::from_decls(
            "Listing",
            vec![
                leaf("q", Annotation::None),
                leaf("hidden", Annotation::Param("-")),
                FieldDecl::of::<Vec<u32>>("ids", Annotation::Param("id,explode=false")),
            ],
        )
        .unwrap();
        assert_eq!(descriptor.fields().len(), 2);
        assert_eq!(descriptor.field("ids").unwrap().wire_name, "id");
        assert!(descriptor.field("hidden").is_none());
        assert!(descriptor.body_field().is_none());
    }
}
