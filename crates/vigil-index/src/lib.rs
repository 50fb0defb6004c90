//! Tantivy-backed document index and retrieval engine for vigil.
//!
//! This crate is the durable core of the retrieval pipeline:
//! - caller-defined typed schemas with a unique upsert key
//! - idempotent open-or-create of on-disk indexes
//! - single-writer sessions with buffered upserts and atomic commit
//! - word-count chunking for oversized document text
//! - compilation and execution of structured [`Query`] trees against a
//!   committed snapshot
//!
//! # Example
//!
//! ```no_run
//! use vigil_index::{Document, FieldDef, Index, Query, Schema};
//!
//! let schema = Schema::define(vec![
//!     FieldDef::id("id").stored().unique(),
//!     FieldDef::text("description").stored(),
//!     FieldDef::keyword("severity").stored(),
//! ])
//! .unwrap();
//!
//! let index = Index::open_or_create("./advisories".as_ref(), &schema).unwrap();
//!
//! let mut session = index.begin_write().unwrap();
//! session
//!     .upsert(
//!         &Document::new()
//!             .with("id", "CVE-2024-0001")
//!             .with("description", "remote code execution in the frobnicator")
//!             .with("severity", "HIGH"),
//!     )
//!     .unwrap();
//! session.commit().unwrap();
//!
//! let hits = index
//!     .search(&Query::text("description", "remote"), Some(5))
//!     .unwrap();
//! assert_eq!(hits[0].doc.get_str("id"), Some("CVE-2024-0001"));
//! ```

#![warn(missing_docs)]

mod chunk;
mod compile;
mod document;
mod error;
mod schema;
mod search;
mod store;
mod writer;

pub use chunk::chunk;
pub use document::{Document, Value};
pub use error::IndexError;
pub use schema::{FieldDef, FieldKind, Schema};
pub use search::Hit;
pub use store::Index;
pub use vigil_query::{ExactValue, Query, QueryError};
pub use writer::WriterSession;
