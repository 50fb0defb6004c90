//! Caller-defined index schemas.
//!
//! A [`Schema`] is an ordered set of typed [`FieldDef`]s. It is fixed when an
//! index is created, persisted beside the index files, and checked for
//! compatibility on every reopen. At most one field may be marked unique;
//! that field is the upsert key.

use serde::{Deserialize, Serialize};
use tantivy::schema::{
    DateOptions, FAST, IndexRecordOption, NumericOptions, STORED, STRING,
    Schema as TantivySchema, TextFieldIndexing, TextOptions,
};

use crate::{
    IndexError,
    document::{Document, Value},
};

/// Tokenizer used for tokenized text fields.
pub(crate) const TEXT_TOKENIZER: &str = "default";

/// The kind of values a field holds and how it is indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    /// Tokenized free text, scored by relevance.
    Text,
    /// A single opaque token, matched exactly (identifiers, links).
    Id,
    /// A short exact-match label (severity, category).
    Keyword,
    /// A boolean flag.
    Bool,
    /// An absolute timestamp, filterable by range.
    Date,
}

impl FieldKind {
    /// Returns true when values of this kind are strings.
    fn is_string(self) -> bool {
        matches!(self, Self::Text | Self::Id | Self::Keyword)
    }
}

/// A single field definition: name, kind, and storage/uniqueness flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field name, unique within the schema.
    name: String,
    /// Value kind.
    kind: FieldKind,
    /// Whether values are stored and returned by search.
    stored: bool,
    /// Whether this field is the upsert key.
    unique: bool,
}

impl FieldDef {
    /// Creates a field definition of the given kind.
    fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            stored: false,
            unique: false,
        }
    }

    /// Creates a tokenized text field.
    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Text)
    }

    /// Creates an exact-match identifier field.
    pub fn id(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Id)
    }

    /// Creates an exact-match keyword field.
    pub fn keyword(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Keyword)
    }

    /// Creates a boolean field.
    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Bool)
    }

    /// Creates a timestamp field.
    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Date)
    }

    /// Marks the field as stored: its values come back in search results.
    #[must_use]
    pub fn stored(mut self) -> Self {
        self.stored = true;
        self
    }

    /// Marks the field as the unique upsert key.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Returns the field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the field kind.
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Returns true when values are stored.
    pub fn is_stored(&self) -> bool {
        self.stored
    }

    /// Returns true when this field is the upsert key.
    pub fn is_unique(&self) -> bool {
        self.unique
    }
}

/// An ordered, validated set of field definitions.
///
/// Immutable once defined; an index created with a schema carries it for the
/// rest of its life.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Field definitions in declaration order.
    fields: Vec<FieldDef>,
}

impl Schema {
    /// Validates and freezes a set of field definitions.
    ///
    /// Fails with [`IndexError::Schema`] when:
    /// - `fields` is empty, or a name is empty or repeated
    /// - more than one field is marked unique
    /// - the unique field is not a stored `Id` or `Keyword` field (the
    ///   upsert key must be retrievable to keep re-ingestion idempotent)
    /// - no field is stored (search results would always be empty shells)
    pub fn define(fields: Vec<FieldDef>) -> Result<Self, IndexError> {
        if fields.is_empty() {
            return Err(IndexError::schema("a schema requires at least one field"));
        }

        for (i, field) in fields.iter().enumerate() {
            if field.name.is_empty() {
                return Err(IndexError::schema("field names must be non-empty"));
            }
            if fields[..i].iter().any(|f| f.name == field.name) {
                return Err(IndexError::schema(format!(
                    "duplicate field name {:?}",
                    field.name
                )));
            }
        }

        let unique: Vec<&FieldDef> = fields.iter().filter(|f| f.unique).collect();
        if unique.len() > 1 {
            return Err(IndexError::schema(format!(
                "at most one field may be unique, found {}",
                unique.len()
            )));
        }
        if let Some(field) = unique.first() {
            if !matches!(field.kind, FieldKind::Id | FieldKind::Keyword) {
                return Err(IndexError::schema(format!(
                    "unique field {:?} must be an id or keyword field",
                    field.name
                )));
            }
            if !field.stored {
                return Err(IndexError::schema(format!(
                    "unique field {:?} must be stored",
                    field.name
                )));
            }
        }

        if !fields.iter().any(|f| f.stored) {
            return Err(IndexError::schema("at least one field must be stored"));
        }

        Ok(Self { fields })
    }

    /// Returns the field definitions in declaration order.
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Looks up a field definition by name.
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns the unique upsert-key field, if the schema declares one.
    pub fn unique_field(&self) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.unique)
    }

    /// Builds the equivalent tantivy schema.
    pub(crate) fn to_tantivy(&self) -> TantivySchema {
        let mut builder = TantivySchema::builder();

        for field in &self.fields {
            match field.kind {
                FieldKind::Text => {
                    let indexing = TextFieldIndexing::default()
                        .set_tokenizer(TEXT_TOKENIZER)
                        .set_index_option(IndexRecordOption::WithFreqsAndPositions);
                    let mut options = TextOptions::default().set_indexing_options(indexing);
                    if field.stored {
                        options = options.set_stored();
                    }
                    builder.add_text_field(&field.name, options);
                }
                FieldKind::Id => {
                    let mut options = STRING;
                    if field.stored {
                        options = options | STORED;
                    }
                    builder.add_text_field(&field.name, options);
                }
                FieldKind::Keyword => {
                    let mut options = STRING | FAST;
                    if field.stored {
                        options = options | STORED;
                    }
                    builder.add_text_field(&field.name, options);
                }
                FieldKind::Bool => {
                    let mut options = NumericOptions::default().set_indexed();
                    if field.stored {
                        options = options.set_stored();
                    }
                    builder.add_bool_field(&field.name, options);
                }
                FieldKind::Date => {
                    let mut options = DateOptions::default().set_indexed().set_fast();
                    if field.stored {
                        options = options.set_stored();
                    }
                    builder.add_date_field(&field.name, options);
                }
            }
        }

        builder.build()
    }

    /// Checks that this (requested) schema can operate against `on_disk`.
    ///
    /// Compatible means: the same unique field, and the same kind for every
    /// field name both schemas share. Extra fields on either side are
    /// tolerated; documents referencing fields the on-disk schema lacks are
    /// rejected at upsert time instead.
    pub(crate) fn check_compatible(&self, on_disk: &Self) -> Result<(), String> {
        let requested_key = self.unique_field().map(FieldDef::name);
        let disk_key = on_disk.unique_field().map(FieldDef::name);
        if requested_key != disk_key {
            return Err(format!(
                "unique field is {} on disk but {} was requested",
                describe_key(disk_key),
                describe_key(requested_key)
            ));
        }

        for field in &self.fields {
            if let Some(existing) = on_disk.field(&field.name)
                && existing.kind != field.kind
            {
                return Err(format!(
                    "field {:?} is {:?} on disk but {:?} was requested",
                    field.name, existing.kind, field.kind
                ));
            }
        }

        Ok(())
    }

    /// Validates a document against this schema.
    ///
    /// Fails with [`IndexError::Field`] on unknown names, kind mismatches,
    /// or a missing upsert key.
    pub(crate) fn validate_document(&self, doc: &Document) -> Result<(), IndexError> {
        for (name, value) in doc.fields() {
            let Some(field) = self.field(name) else {
                return Err(IndexError::field(name, "not defined in the schema"));
            };

            let matches = match value {
                Value::Str(_) => field.kind.is_string(),
                Value::Bool(_) => field.kind == FieldKind::Bool,
                Value::Date(_) => field.kind == FieldKind::Date,
            };
            if !matches {
                return Err(IndexError::field(
                    name,
                    format!("value does not match the {:?} field kind", field.kind),
                ));
            }
        }

        if let Some(unique) = self.unique_field()
            && doc.get(unique.name()).is_none()
        {
            return Err(IndexError::field(
                unique.name(),
                "the unique upsert key is required on every document",
            ));
        }

        Ok(())
    }
}

/// Renders an optional key field name for error messages.
fn describe_key(name: Option<&str>) -> String {
    name.map_or_else(|| "absent".to_string(), |n| format!("{n:?}"))
}
