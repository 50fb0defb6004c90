//! The durable on-disk index.
//!
//! An [`Index`] pairs a tantivy index directory with the [`Schema`] it was
//! created under. The schema is persisted as `schema.json` beside the
//! tantivy files when the index is first created, and every later open
//! checks the caller's schema against it.

use std::{
    collections::HashMap,
    fs,
    ops::Bound,
    path::{Path, PathBuf},
};

use tantivy::{
    Index as TantivyIndex, TantivyDocument, TantivyError, Term,
    collector::{Count, TopDocs},
    directory::MmapDirectory,
    query::RangeQuery,
    schema::{Field, Value as _},
};

use crate::{
    Document, IndexError, Schema,
    chunk::chunk,
    schema::FieldKind,
    writer::WriterSession,
};

/// File persisted beside the tantivy files holding the index schema.
const SCHEMA_FILENAME: &str = "schema.json";

/// Heap budget for writer sessions (50 MB).
pub(crate) const WRITER_HEAP_SIZE: usize = 50_000_000;

/// Upper bound on chunks per document; chunk keys carry a four-digit suffix.
const MAX_DOCUMENT_CHUNKS: usize = 10_000;

/// A named, durable collection of documents conforming to one schema.
///
/// Opening is idempotent: every ingestion entry point may call
/// [`open_or_create`](Self::open_or_create) independently. Any number of
/// `Index` values (and processes) may read concurrently; writing is
/// serialized through [`begin_write`](Self::begin_write).
#[derive(Debug)]
pub struct Index {
    /// The underlying tantivy index.
    pub(crate) inner: TantivyIndex,
    /// The schema the index was created under (authoritative, from disk).
    schema: Schema,
    /// Index directory path, kept for error reporting.
    path: PathBuf,
    /// Field name to tantivy field handle.
    pub(crate) fields: HashMap<String, Field>,
}

impl Index {
    /// Opens the index at `path`, creating it when absent.
    ///
    /// On creation the schema is persisted; on open the persisted schema is
    /// authoritative and `schema` is only checked for compatibility (same
    /// unique field, same kinds for shared names), failing with
    /// [`IndexError::SchemaMismatch`] otherwise.
    pub fn open_or_create(path: &Path, schema: &Schema) -> Result<Self, IndexError> {
        fs::create_dir_all(path)?;

        let dir = MmapDirectory::open(path).map_err(|e| {
            let err: TantivyError = e.into();
            IndexError::storage(path, &err)
        })?;

        let schema_path = path.join(SCHEMA_FILENAME);
        let effective = if schema_path.exists() {
            let raw = fs::read_to_string(&schema_path)?;
            let on_disk: Schema = serde_json::from_str(&raw)
                .map_err(|e| IndexError::storage(path, format!("corrupt schema manifest: {e}")))?;
            schema
                .check_compatible(&on_disk)
                .map_err(|reason| IndexError::SchemaMismatch {
                    path: path.to_path_buf(),
                    reason,
                })?;
            on_disk
        } else {
            let raw = serde_json::to_string_pretty(schema).map_err(|e| {
                IndexError::storage(path, format!("cannot encode schema manifest: {e}"))
            })?;
            fs::write(&schema_path, raw)?;
            schema.clone()
        };

        let inner = TantivyIndex::open_or_create(dir, effective.to_tantivy())
            .map_err(|e| IndexError::storage(path, &e))?;

        let fields = effective
            .fields()
            .iter()
            .map(|f| {
                let handle = inner
                    .schema()
                    .get_field(f.name())
                    .map_err(|e| IndexError::storage(path, &e))?;
                Ok((f.name().to_string(), handle))
            })
            .collect::<Result<HashMap<_, _>, IndexError>>()?;

        Ok(Self {
            inner,
            schema: effective,
            path: path.to_path_buf(),
            fields,
        })
    }

    /// Returns the schema the index carries.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Returns the index directory path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens a writer session against this index.
    ///
    /// The session holds the index writer lock for its whole lifetime; a
    /// second concurrent session against the same storage path (from this or
    /// any other process) fails with [`IndexError::WriterBusy`]. Readers are
    /// unaffected and keep seeing the last committed state.
    pub fn begin_write(&self) -> Result<WriterSession, IndexError> {
        let writer = match self.inner.writer(WRITER_HEAP_SIZE) {
            Ok(writer) => writer,
            Err(TantivyError::LockFailure(..)) => return Err(IndexError::WriterBusy),
            Err(e) => return Err(IndexError::storage(&self.path, &e)),
        };

        Ok(WriterSession::new(
            writer,
            self.schema.clone(),
            self.fields.clone(),
            self.path.clone(),
        ))
    }

    /// Returns the number of committed documents.
    pub fn num_docs(&self) -> Result<u64, IndexError> {
        let reader = self
            .inner
            .reader()
            .map_err(|e| IndexError::storage(&self.path, &e))?;
        Ok(reader.searcher().num_docs())
    }

    /// Chunks `doc`'s text field and upserts one document per chunk, all
    /// within a single session and commit.
    ///
    /// Every field except `text_field` is copied into each chunk document.
    /// When the schema has a unique key, chunk keys are derived as
    /// `{key}#{index:04}` and any stale chunks from a previous ingestion of
    /// the same document are deleted in the same commit, so re-ingestion is
    /// idempotent and readers never observe a partially chunked document.
    ///
    /// Returns the number of chunks written.
    pub fn index_document(
        &self,
        doc: &Document,
        text_field: &str,
        chunk_size_words: usize,
    ) -> Result<usize, IndexError> {
        let field = self
            .schema
            .field(text_field)
            .ok_or_else(|| IndexError::UnknownField(text_field.to_string()))?;
        if field.kind() != FieldKind::Text {
            return Err(IndexError::InvalidArgument(format!(
                "chunked ingestion requires a text field, {text_field:?} is {:?}",
                field.kind()
            )));
        }
        let content = doc.get_str(text_field).ok_or_else(|| {
            IndexError::field(text_field, "chunked ingestion requires the text field")
        })?;

        let chunks = chunk(content, chunk_size_words)?;
        if chunks.len() > MAX_DOCUMENT_CHUNKS {
            return Err(IndexError::InvalidArgument(format!(
                "document splits into {} chunks, the limit is {MAX_DOCUMENT_CHUNKS}",
                chunks.len()
            )));
        }

        let mut session = self.begin_write()?;

        match self.schema.unique_field() {
            Some(unique) => {
                let base = doc
                    .get_str(unique.name())
                    .ok_or_else(|| {
                        IndexError::field(unique.name(), "the unique upsert key is required")
                    })?
                    .to_string();

                for stale in self.chunk_keys_on_disk(unique.name(), &base)? {
                    session.delete_key(&stale)?;
                }
                for (i, text) in chunks.iter().enumerate() {
                    let mut chunk_doc = doc.clone();
                    chunk_doc.set(text_field, text.as_str());
                    chunk_doc.set(unique.name(), format!("{base}#{i:04}"));
                    session.upsert(&chunk_doc)?;
                }
            }
            None => {
                for text in &chunks {
                    let mut chunk_doc = doc.clone();
                    chunk_doc.set(text_field, text.as_str());
                    session.upsert(&chunk_doc)?;
                }
            }
        }

        session.commit()?;
        Ok(chunks.len())
    }

    /// Returns the tantivy handle for a schema field.
    pub(crate) fn tantivy_field(&self, name: &str) -> Result<Field, IndexError> {
        self.fields
            .get(name)
            .copied()
            .ok_or_else(|| IndexError::UnknownField(name.to_string()))
    }

    /// Collects the committed chunk keys derived from `base` (`{base}#…`),
    /// by scanning the key field's term range.
    fn chunk_keys_on_disk(&self, key_field: &str, base: &str) -> Result<Vec<String>, IndexError> {
        let field = self.tantivy_field(key_field)?;

        // '$' is the byte after '#', so ["{base}#", "{base}$") covers
        // exactly the keys with a chunk suffix.
        let lower = Term::from_field_text(field, &format!("{base}#"));
        let upper = Term::from_field_text(field, &format!("{base}$"));
        let query = RangeQuery::new(Bound::Included(lower), Bound::Excluded(upper));

        let reader = self
            .inner
            .reader()
            .map_err(|e| IndexError::storage(&self.path, &e))?;
        let searcher = reader.searcher();

        let count = searcher
            .search(&query, &Count)
            .map_err(|e| IndexError::storage(&self.path, &e))?;
        if count == 0 {
            return Ok(Vec::new());
        }

        let top = searcher
            .search(&query, &TopDocs::with_limit(count))
            .map_err(|e| IndexError::storage(&self.path, &e))?;

        let mut keys = Vec::with_capacity(top.len());
        for (_, addr) in top {
            let stored: TantivyDocument = searcher
                .doc(addr)
                .map_err(|e| IndexError::storage(&self.path, &e))?;
            if let Some(key) = stored.get_first(field).and_then(|v| v.as_str()) {
                keys.push(key.to_string());
            }
        }
        Ok(keys)
    }
}
