//! Search execution against a committed index snapshot.
//!
//! Every call opens a fresh reader over the last committed state, so
//! searches never block on a concurrent writer session and never observe a
//! partially committed batch. Results are ranked by the underlying BM25
//! score; tantivy breaks score ties by document address, which is stable
//! for a fixed committed state, so a repeated search returns the same
//! order.

use chrono::{DateTime, Utc};
use tantivy::{
    TantivyDocument,
    collector::{Count, TopDocs},
    schema::Value as _,
};
use vigil_query::Query;

use crate::{
    Document, Index, IndexError,
    compile::compile,
    schema::FieldKind,
};

/// One ranked search result: the relevance score and the document's stored
/// fields.
#[derive(Debug, Clone)]
pub struct Hit {
    /// Relevance score (BM25 for text queries, constant for filters).
    pub score: f32,
    /// The stored fields of the matched document.
    pub doc: Document,
}

#[allow(clippy::multiple_inherent_impl)]
impl Index {
    /// Executes `query` against the last committed state.
    ///
    /// `limit` of `None` returns every match; `Some(n)` returns at most the
    /// `n` best-ranked. An index with no committed documents returns an
    /// empty result, not an error.
    pub fn search(&self, query: &Query, limit: Option<usize>) -> Result<Vec<Hit>, IndexError> {
        if limit == Some(0) {
            return Ok(Vec::new());
        }

        let compiled = compile(self, query)?;

        let reader = self
            .inner
            .reader()
            .map_err(|e| IndexError::storage(self.path(), &e))?;
        let searcher = reader.searcher();

        // "No limit" is first-class: count the matches, then collect
        // exactly that many.
        let cap = match limit {
            Some(n) => n,
            None => searcher
                .search(&*compiled, &Count)
                .map_err(|e| IndexError::storage(self.path(), &e))?,
        };
        if cap == 0 {
            return Ok(Vec::new());
        }

        let top = searcher
            .search(&*compiled, &TopDocs::with_limit(cap))
            .map_err(|e| IndexError::storage(self.path(), &e))?;

        let mut hits = Vec::with_capacity(top.len());
        for (score, address) in top {
            let stored: TantivyDocument = searcher
                .doc(address)
                .map_err(|e| IndexError::storage(self.path(), &e))?;
            hits.push(Hit {
                score,
                doc: self.stored_to_document(&stored)?,
            });
        }
        Ok(hits)
    }

    /// Extracts the stored schema fields of a retrieved tantivy document.
    fn stored_to_document(&self, stored: &TantivyDocument) -> Result<Document, IndexError> {
        let mut doc = Document::new();
        for def in self.schema().fields() {
            if !def.is_stored() {
                continue;
            }
            let field = self.tantivy_field(def.name())?;
            let Some(value) = stored.get_first(field) else {
                continue;
            };

            match def.kind() {
                FieldKind::Text | FieldKind::Id | FieldKind::Keyword => {
                    if let Some(s) = value.as_str() {
                        doc.set(def.name(), s);
                    }
                }
                FieldKind::Bool => {
                    if let Some(b) = value.as_bool() {
                        doc.set(def.name(), b);
                    }
                }
                FieldKind::Date => {
                    if let Some(d) = value.as_datetime() {
                        let utc: DateTime<Utc> =
                            DateTime::from_timestamp(d.into_timestamp_secs(), 0)
                                .unwrap_or(DateTime::UNIX_EPOCH);
                        doc.set(def.name(), utc);
                    }
                }
            }
        }
        Ok(doc)
    }
}
