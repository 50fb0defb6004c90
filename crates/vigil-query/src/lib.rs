//! Query AST and text-query parsing for vigil retrieval.
//!
//! This crate defines the structured [`Query`] tree that the index layer
//! compiles and executes:
//!
//! - **Text**: tokenized match against one text field
//! - **MultiText**: the same tokenized input matched across several fields
//! - **Exact**: keyword or boolean equality
//! - **DateRange**: inclusive timestamp bounds, either side open-ended
//! - **All**: every document (the identity of AND)
//! - **And**: intersection of clauses
//!
//! Queries are plain values with no I/O. A thin [`parse`] translator turns
//! the free-form strings accepted by ingestion tooling (`severity:HIGH
//! ransomware`, or the literal `all`) into the structured tree; it is sugar
//! layered on top of the builders, not part of the engine semantics.
//!
//! # Example
//!
//! ```
//! use vigil_query::Query;
//!
//! let q = Query::and(vec![
//!     Query::All,
//!     Query::text("description", "remote code execution"),
//! ])
//! .unwrap();
//!
//! // All is the identity of AND and is dropped during flattening.
//! assert_eq!(q, Query::text("description", "remote code execution"));
//! ```

#![warn(missing_docs)]

mod ast;
mod error;
mod parser;

pub use ast::{ExactValue, Query};
pub use error::QueryError;
pub use parser::parse;
