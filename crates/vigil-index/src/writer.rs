//! Writer sessions: buffered upserts with atomic commit.
//!
//! A [`WriterSession`] is the only way to change an index. Upserts are
//! buffered and invisible to readers until [`commit`](WriterSession::commit)
//! succeeds; commit is all-or-nothing. Upsert is an explicit two-phase
//! operation: delete any document carrying the same upsert key, then insert
//! the new one, both deferred to the same commit.

use std::{collections::HashMap, path::PathBuf};

use chrono::{DateTime, Utc};
use tantivy::{
    DateTime as TantivyDateTime, IndexWriter as TantivyIndexWriter, TantivyDocument, Term,
    schema::Field,
};

use crate::{
    Document, IndexError, Schema,
    document::Value,
};

/// A single-writer handle over one index.
///
/// Obtained from [`crate::Index::begin_write`]; holds the index writer lock
/// until the session commits, aborts, or is dropped. After `commit` or
/// `abort` the session is closed and every further call fails with
/// [`IndexError::SessionClosed`].
pub struct WriterSession {
    /// The tantivy writer, `None` once the session is closed.
    writer: Option<TantivyIndexWriter>,
    /// Schema documents are validated against.
    schema: Schema,
    /// Field name to tantivy field handle.
    fields: HashMap<String, Field>,
    /// Index directory path, kept for error reporting.
    path: PathBuf,
}

impl std::fmt::Debug for WriterSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriterSession")
            .field("writer", &self.writer.is_some())
            .field("schema", &self.schema)
            .field("fields", &self.fields)
            .field("path", &self.path)
            .finish()
    }
}

impl WriterSession {
    /// Creates a session over an acquired tantivy writer.
    pub(crate) fn new(
        writer: TantivyIndexWriter,
        schema: Schema,
        fields: HashMap<String, Field>,
        path: PathBuf,
    ) -> Self {
        Self {
            writer: Some(writer),
            schema,
            fields,
            path,
        }
    }

    /// Buffers an upsert of `doc`.
    ///
    /// The document is validated against the schema
    /// ([`IndexError::Field`] on unknown names or kind mismatches). When the
    /// schema declares a unique key, any previously indexed document with
    /// the same key value is deleted in the same commit, so at most one
    /// document per key is ever visible to search.
    pub fn upsert(&mut self, doc: &Document) -> Result<(), IndexError> {
        if self.writer.is_none() {
            return Err(IndexError::SessionClosed);
        }
        self.schema.validate_document(doc)?;

        if let Some(unique) = self.schema.unique_field()
            && let Some(key) = doc.get_str(unique.name())
        {
            self.delete_key(key)?;
        }

        let mut indexed = TantivyDocument::new();
        for (name, value) in doc.fields() {
            let field = self.field_handle(name)?;
            match value {
                Value::Str(s) => indexed.add_text(field, s),
                Value::Bool(b) => indexed.add_bool(field, *b),
                Value::Date(d) => indexed.add_date(field, to_tantivy_datetime(*d)),
            }
        }

        let writer = self.writer.as_mut().ok_or(IndexError::SessionClosed)?;
        writer
            .add_document(indexed)
            .map_err(|e| IndexError::storage(&self.path, &e))?;
        Ok(())
    }

    /// Buffers a deletion of every document whose upsert key equals `key`.
    pub(crate) fn delete_key(&mut self, key: &str) -> Result<(), IndexError> {
        let unique = self
            .schema
            .unique_field()
            .ok_or_else(|| IndexError::InvalidArgument("the schema has no unique field".into()))?;
        let field = self.field_handle(unique.name())?;

        let writer = self.writer.as_mut().ok_or(IndexError::SessionClosed)?;
        writer.delete_term(Term::from_field_text(field, key));
        Ok(())
    }

    /// Commits all buffered upserts atomically and closes the session.
    ///
    /// On failure nothing the session buffered becomes visible: tantivy's
    /// commit publishes by swapping the meta file, so the index keeps its
    /// last committed state and the error is [`IndexError::Commit`].
    pub fn commit(&mut self) -> Result<(), IndexError> {
        let mut writer = self.writer.take().ok_or(IndexError::SessionClosed)?;
        writer
            .commit()
            .map_err(|e| IndexError::Commit(e.to_string()))?;
        Ok(())
    }

    /// Discards all buffered upserts and closes the session.
    pub fn abort(&mut self) -> Result<(), IndexError> {
        let mut writer = self.writer.take().ok_or(IndexError::SessionClosed)?;
        writer
            .rollback()
            .map_err(|e| IndexError::Commit(e.to_string()))?;
        Ok(())
    }

    /// Returns the tantivy handle for a schema field.
    fn field_handle(&self, name: &str) -> Result<Field, IndexError> {
        self.fields
            .get(name)
            .copied()
            .ok_or_else(|| IndexError::UnknownField(name.to_string()))
    }
}

/// Converts a UTC timestamp to tantivy's date representation (seconds).
pub(crate) fn to_tantivy_datetime(value: DateTime<Utc>) -> TantivyDateTime {
    TantivyDateTime::from_timestamp_secs(value.timestamp())
}
