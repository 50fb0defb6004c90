//! Translator from free-form query strings to the structured [`Query`] tree.
//!
//! Ingestion tooling historically accepted loose query strings; this parser
//! maps that surface onto the builders without adding any semantics of its
//! own:
//!
//! - the literal `all` (alone, any case) becomes [`Query::All`]
//! - `field:value` becomes an exact match (`true`/`false` values become
//!   boolean)
//! - remaining bare words become one tokenized text match against the
//!   caller-supplied default field
//! - multiple clauses are AND-combined

use crate::{ExactValue, Query, QueryError};

/// Parses a free-form query string against a default text field.
///
/// Fails with [`QueryError::Empty`] on blank input and
/// [`QueryError::Syntax`] on malformed `field:value` tokens.
pub fn parse(input: &str, default_field: &str) -> Result<Query, QueryError> {
    let tokens = split_tokens(input);
    if tokens.is_empty() {
        return Err(QueryError::Empty);
    }

    if let [(_, only)] = tokens.as_slice()
        && only.eq_ignore_ascii_case("all")
    {
        return Ok(Query::All);
    }

    let mut clauses: Vec<Query> = Vec::new();
    let mut words: Vec<&str> = Vec::new();

    for (position, token) in tokens {
        match token.split_once(':') {
            Some((field, value)) => {
                if field.is_empty() || !is_field_name(field) {
                    return Err(QueryError::syntax(
                        format!("invalid field name in {token:?}"),
                        position,
                    ));
                }
                if value.is_empty() {
                    return Err(QueryError::syntax(
                        format!("missing value after {field:?}:"),
                        position,
                    ));
                }
                clauses.push(Query::exact(field, coerce_value(value)));
            }
            None => words.push(token),
        }
    }

    if !words.is_empty() {
        clauses.push(Query::text(default_field, words.join(" ")));
    }

    Query::and(clauses)
}

/// Splits the input on whitespace, keeping each token's byte offset.
fn split_tokens(input: &str) -> Vec<(usize, &str)> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;

    for (i, c) in input.char_indices() {
        if c.is_whitespace() {
            if let Some(s) = start.take() {
                tokens.push((s, &input[s..i]));
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        tokens.push((s, &input[s..]));
    }

    tokens
}

/// Returns true when `name` is a plausible schema field name.
fn is_field_name(name: &str) -> bool {
    name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Maps the literals `true`/`false` to booleans, everything else to a string.
fn coerce_value(value: &str) -> ExactValue {
    match value {
        v if v.eq_ignore_ascii_case("true") => ExactValue::Bool(true),
        v if v.eq_ignore_ascii_case("false") => ExactValue::Bool(false),
        v => ExactValue::Str(v.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_words_become_default_field_text() {
        let q = parse("remote code execution", "description").unwrap();
        assert_eq!(q, Query::text("description", "remote code execution"));
    }

    #[test]
    fn all_literal_matches_everything() {
        assert_eq!(parse("all", "description").unwrap(), Query::All);
        assert_eq!(parse("  ALL ", "description").unwrap(), Query::All);
    }

    #[test]
    fn all_among_other_tokens_is_a_bare_word() {
        let q = parse("all quiet", "description").unwrap();
        assert_eq!(q, Query::text("description", "all quiet"));
    }

    #[test]
    fn field_value_becomes_exact() {
        let q = parse("severity:HIGH", "description").unwrap();
        assert_eq!(q, Query::exact("severity", "HIGH"));
    }

    #[test]
    fn boolean_literals_coerce() {
        let q = parse("exploited:true", "description").unwrap();
        assert_eq!(q, Query::exact("exploited", true));
    }

    #[test]
    fn mixed_clauses_are_and_combined() {
        let q = parse("severity:HIGH ransomware hospital", "description").unwrap();
        assert_eq!(
            q,
            Query::And(vec![
                Query::exact("severity", "HIGH"),
                Query::text("description", "ransomware hospital"),
            ])
        );
    }

    #[test]
    fn value_may_contain_colons() {
        let q = parse("link:https://example.com/a", "description").unwrap();
        assert_eq!(q, Query::exact("link", "https://example.com/a"));
    }

    #[test]
    fn empty_input_is_rejected() {
        assert_eq!(parse("", "description"), Err(QueryError::Empty));
        assert_eq!(parse("   ", "description"), Err(QueryError::Empty));
    }

    #[test]
    fn missing_value_is_a_syntax_error() {
        let err = parse("severity: ransomware", "description").unwrap_err();
        assert!(matches!(err, QueryError::Syntax { position: 0, .. }));
    }

    #[test]
    fn bad_field_name_is_a_syntax_error() {
        let err = parse("ransomware se!verity:HIGH", "description").unwrap_err();
        assert!(matches!(err, QueryError::Syntax { position: 11, .. }));
    }
}
