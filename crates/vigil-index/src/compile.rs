//! Compilation of [`Query`] trees into tantivy queries.
//!
//! Compilation is where a query meets the schema: field names are resolved
//! ([`IndexError::UnknownField`]) and field kinds are checked against what
//! each clause requires ([`IndexError::InvalidQuery`]). Text is tokenized
//! with the same analyzer the index used at write time, so query terms and
//! indexed terms agree.

use std::ops::Bound;

use chrono::{DateTime, Utc};
use tantivy::{
    Term,
    query::{AllQuery, BooleanQuery, EmptyQuery, Occur, Query as TantivyQuery, RangeQuery, TermQuery},
    schema::{Field, IndexRecordOption},
    tokenizer::TokenStream,
};
use vigil_query::{ExactValue, Query};

use crate::{
    Index, IndexError,
    schema::{FieldDef, FieldKind, TEXT_TOKENIZER},
    writer::to_tantivy_datetime,
};

/// Compiles a query against the index's schema and analyzer.
pub(crate) fn compile(index: &Index, query: &Query) -> Result<Box<dyn TantivyQuery>, IndexError> {
    match query {
        Query::Text { field, text } => {
            let def = resolve(index, field)?;
            if def.kind() != FieldKind::Text {
                return Err(IndexError::InvalidQuery(format!(
                    "text match requires a text field, {field:?} is {:?}",
                    def.kind()
                )));
            }
            let handle = index.tantivy_field(field)?;
            let tokens = tokenize(index, text)?;
            if tokens.is_empty() {
                return Ok(Box::new(EmptyQuery));
            }

            // Bare terms combine with AND: every token must appear.
            let clauses: Vec<(Occur, Box<dyn TantivyQuery>)> = tokens
                .iter()
                .map(|token| {
                    let term = Term::from_field_text(handle, token);
                    let query: Box<dyn TantivyQuery> =
                        Box::new(TermQuery::new(term, IndexRecordOption::WithFreqs));
                    (Occur::Must, query)
                })
                .collect();
            Ok(Box::new(BooleanQuery::new(clauses)))
        }

        Query::MultiText { fields, text } => {
            if fields.is_empty() {
                return Err(IndexError::InvalidQuery(
                    "multi-field text match requires at least one field".to_string(),
                ));
            }
            let mut handles: Vec<Field> = Vec::with_capacity(fields.len());
            for field in fields {
                let def = resolve(index, field)?;
                if !matches!(def.kind(), FieldKind::Text | FieldKind::Keyword) {
                    return Err(IndexError::InvalidQuery(format!(
                        "multi-field text match requires text or keyword fields, {field:?} is {:?}",
                        def.kind()
                    )));
                }
                handles.push(index.tantivy_field(field)?);
            }
            let tokens = tokenize(index, text)?;
            if tokens.is_empty() {
                return Ok(Box::new(EmptyQuery));
            }

            // Per token, at least one field must carry it; tokens combine
            // with AND. Keyword fields match when their exact value equals
            // a query token.
            let clauses: Vec<(Occur, Box<dyn TantivyQuery>)> = tokens
                .iter()
                .map(|token| {
                    let fanout: Vec<(Occur, Box<dyn TantivyQuery>)> = handles
                        .iter()
                        .map(|&handle| {
                            let term = Term::from_field_text(handle, token);
                            let query: Box<dyn TantivyQuery> =
                                Box::new(TermQuery::new(term, IndexRecordOption::WithFreqs));
                            (Occur::Should, query)
                        })
                        .collect();
                    let query: Box<dyn TantivyQuery> = Box::new(BooleanQuery::new(fanout));
                    (Occur::Must, query)
                })
                .collect();
            Ok(Box::new(BooleanQuery::new(clauses)))
        }

        Query::Exact { field, value } => {
            let def = resolve(index, field)?;
            let handle = index.tantivy_field(field)?;
            let term = exact_term(def, handle, value)?;
            Ok(Box::new(TermQuery::new(term, IndexRecordOption::Basic)))
        }

        Query::DateRange { field, from, to } => {
            let def = resolve(index, field)?;
            if def.kind() != FieldKind::Date {
                return Err(IndexError::InvalidQuery(format!(
                    "date range requires a date field, {field:?} is {:?}",
                    def.kind()
                )));
            }
            let handle = index.tantivy_field(field)?;
            let bound = |value: &Option<DateTime<Utc>>| {
                value.map_or(Bound::Unbounded, |v| {
                    Bound::Included(Term::from_field_date(handle, to_tantivy_datetime(v)))
                })
            };
            Ok(Box::new(RangeQuery::new(bound(from), bound(to))))
        }

        Query::All => Ok(Box::new(AllQuery)),

        Query::And(clauses) => {
            if clauses.is_empty() {
                return Err(IndexError::InvalidQuery(
                    "AND requires at least one clause".to_string(),
                ));
            }
            let compiled: Vec<(Occur, Box<dyn TantivyQuery>)> = clauses
                .iter()
                .map(|clause| Ok((Occur::Must, compile(index, clause)?)))
                .collect::<Result<_, IndexError>>()?;
            Ok(Box::new(BooleanQuery::new(compiled)))
        }
    }
}

/// Resolves a field name against the schema.
fn resolve<'a>(index: &'a Index, name: &str) -> Result<&'a FieldDef, IndexError> {
    index
        .schema()
        .field(name)
        .ok_or_else(|| IndexError::UnknownField(name.to_string()))
}

/// Builds the term for an exact-equality clause, coercing between string
/// and boolean representations where unambiguous.
fn exact_term(def: &FieldDef, handle: Field, value: &ExactValue) -> Result<Term, IndexError> {
    match (def.kind(), value) {
        (FieldKind::Id | FieldKind::Keyword, ExactValue::Str(s)) => {
            Ok(Term::from_field_text(handle, s))
        }
        (FieldKind::Id | FieldKind::Keyword, ExactValue::Bool(b)) => {
            Ok(Term::from_field_text(handle, if *b { "true" } else { "false" }))
        }
        (FieldKind::Bool, ExactValue::Bool(b)) => Ok(Term::from_field_bool(handle, *b)),
        (FieldKind::Bool, ExactValue::Str(s)) => match s.to_ascii_lowercase().as_str() {
            "true" => Ok(Term::from_field_bool(handle, true)),
            "false" => Ok(Term::from_field_bool(handle, false)),
            _ => Err(IndexError::InvalidQuery(format!(
                "{:?} is not a boolean value for field {:?}",
                s,
                def.name()
            ))),
        },
        (FieldKind::Text | FieldKind::Date, _) => Err(IndexError::InvalidQuery(format!(
            "exact match requires a keyword, id, or boolean field, {:?} is {:?}",
            def.name(),
            def.kind()
        ))),
    }
}

/// Tokenizes query text with the index's text analyzer.
fn tokenize(index: &Index, text: &str) -> Result<Vec<String>, IndexError> {
    let mut analyzer = index
        .inner
        .tokenizers()
        .get(TEXT_TOKENIZER)
        .ok_or_else(|| IndexError::storage(index.path(), "text analyzer is not registered"))?;

    let mut stream = analyzer.token_stream(text);
    let mut tokens = Vec::new();
    while let Some(token) = stream.next() {
        tokens.push(token.text.clone());
    }
    Ok(tokens)
}
