//! The query tree.
//!
//! Represents structured search predicates before compilation against an
//! index schema. Construction is infallible except for [`Query::and`], which
//! rejects an empty clause list.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::error::QueryError;

/// A value compared for exact equality against a keyword or boolean field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExactValue {
    /// A non-tokenized string, e.g. a severity label or feed category.
    Str(String),
    /// A boolean flag.
    Bool(bool),
}

impl From<&str> for ExactValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ExactValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<bool> for ExactValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl fmt::Display for ExactValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{s}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// A structured search predicate over indexed documents.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Tokenized match against a single text field.
    Text {
        /// Name of the text field to search.
        field: String,
        /// Free text; tokenized at compile time with the index analyzer.
        text: String,
    },

    /// Tokenized match across several fields; a document matches when every
    /// token appears in at least one of the fields.
    MultiText {
        /// Names of the fields to search.
        fields: Vec<String>,
        /// Free text; tokenized at compile time with the index analyzer.
        text: String,
    },

    /// Exact equality against a keyword or boolean field.
    Exact {
        /// Name of the field to compare.
        field: String,
        /// The value the field must equal.
        value: ExactValue,
    },

    /// Inclusive timestamp range; either bound may be open-ended.
    DateRange {
        /// Name of the timestamp field.
        field: String,
        /// Inclusive lower bound, or `None` for unbounded.
        from: Option<DateTime<Utc>>,
        /// Inclusive upper bound, or `None` for unbounded.
        to: Option<DateTime<Utc>>,
    },

    /// Matches every document in the index.
    All,

    /// Intersection: a document matches when every clause matches.
    And(Vec<Self>),
}

impl Query {
    /// Creates a tokenized text match against one field.
    pub fn text(field: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Text {
            field: field.into(),
            text: text.into(),
        }
    }

    /// Creates a tokenized text match across several fields.
    pub fn multi_text<I, S>(fields: I, text: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::MultiText {
            fields: fields.into_iter().map(Into::into).collect(),
            text: text.into(),
        }
    }

    /// Creates an exact-equality match against a keyword or boolean field.
    pub fn exact(field: impl Into<String>, value: impl Into<ExactValue>) -> Self {
        Self::Exact {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Creates an inclusive date range over a timestamp field.
    pub fn date_range(
        field: impl Into<String>,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Self {
        Self::DateRange {
            field: field.into(),
            from,
            to,
        }
    }

    /// Combines clauses with AND, flattening nested `And`s and dropping
    /// `All` clauses (the identity of intersection).
    ///
    /// Fails with [`QueryError::Empty`] when `clauses` is empty. When every
    /// clause is `All`, the combination is `All`; a single surviving clause
    /// is returned unwrapped.
    pub fn and(clauses: Vec<Self>) -> Result<Self, QueryError> {
        if clauses.is_empty() {
            return Err(QueryError::Empty);
        }

        let flattened: Vec<Self> = clauses
            .into_iter()
            .flat_map(|clause| match clause {
                Self::And(inner) => inner,
                other => vec![other],
            })
            .filter(|clause| *clause != Self::All)
            .collect();

        Ok(match flattened.len() {
            0 => Self::All,
            1 => flattened.into_iter().next().ok_or(QueryError::Empty)?,
            _ => Self::And(flattened),
        })
    }
}

impl fmt::Display for Query {
    /// Renders a compact query-string form, e.g.
    /// `severity:HIGH AND description:(ransomware)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text { field, text } => write!(f, "{field}:({text})"),
            Self::MultiText { fields, text } => {
                write!(f, "({}):({text})", fields.join(","))
            }
            Self::Exact { field, value } => write!(f, "{field}:{value}"),
            Self::DateRange { field, from, to } => {
                let render = |bound: &Option<DateTime<Utc>>| {
                    bound.map_or_else(|| "*".to_string(), |b| b.to_rfc3339())
                };
                write!(f, "{field}:[{} TO {}]", render(from), render(to))
            }
            Self::All => write!(f, "*"),
            Self::And(clauses) => {
                let parts: Vec<String> = clauses.iter().map(ToString::to_string).collect();
                write!(f, "{}", parts.join(" AND "))
            }
        }
    }
}
