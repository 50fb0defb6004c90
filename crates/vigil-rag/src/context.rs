//! Rendering retrieved documents into a single context block.
//!
//! The assembler is deliberately dumb: it renders the caller's field order
//! as `"Label: value"` lines, one block per document, in retrieval order.
//! It never re-sorts and never truncates; bounding the context is the
//! caller's job via the retrieval limit.

use vigil_index::Hit;

/// Rendered when retrieval produced no documents.
pub const EMPTY_CONTEXT: &str = "No relevant documents found.";

/// Renders retrieved documents into one context string.
///
/// For each hit, the fields named in `field_order` that the document
/// carries are rendered as `"Label: value"` lines joined by newlines;
/// blocks are separated by a blank line. An empty `hits` slice renders to
/// [`EMPTY_CONTEXT`].
pub fn assemble_context<S: AsRef<str>>(hits: &[Hit], field_order: &[S]) -> String {
    if hits.is_empty() {
        return EMPTY_CONTEXT.to_string();
    }

    let blocks: Vec<String> = hits
        .iter()
        .map(|hit| {
            let lines: Vec<String> = field_order
                .iter()
                .filter_map(|name| {
                    let name = name.as_ref();
                    hit.doc
                        .get(name)
                        .map(|value| format!("{}: {value}", field_label(name)))
                })
                .collect();
            lines.join("\n")
        })
        .collect();

    blocks.join("\n\n")
}

/// Derives a display label from a field name.
///
/// Short names become acronyms (`id` -> `ID`), longer names are
/// capitalized (`description` -> `Description`).
fn field_label(name: &str) -> String {
    if name.len() <= 2 {
        return name.to_uppercase();
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use vigil_index::Document;

    use super::*;

    fn hit(doc: Document) -> Hit {
        Hit { score: 1.0, doc }
    }

    #[test]
    fn empty_results_render_the_sentinel() {
        let rendered = assemble_context(&[], &["id", "title"]);
        assert_eq!(rendered, "No relevant documents found.");
    }

    #[test]
    fn renders_one_block_per_document_in_order() {
        let hits = vec![
            hit(Document::new()
                .with("id", "CVE-1")
                .with("description", "remote code execution")),
            hit(Document::new()
                .with("id", "CVE-2")
                .with("description", "privilege escalation")),
        ];

        let rendered = assemble_context(&hits, &["id", "description"]);
        assert_eq!(
            rendered,
            "ID: CVE-1\nDescription: remote code execution\n\n\
             ID: CVE-2\nDescription: privilege escalation"
        );
    }

    #[test]
    fn field_order_is_the_callers() {
        let hits = vec![hit(Document::new()
            .with("id", "CVE-1")
            .with("severity", "HIGH"))];

        let rendered = assemble_context(&hits, &["severity", "id"]);
        assert_eq!(rendered, "Severity: HIGH\nID: CVE-1");
    }

    #[test]
    fn missing_fields_are_skipped() {
        let hits = vec![hit(Document::new().with("id", "CVE-1"))];

        let rendered = assemble_context(&hits, &["id", "description"]);
        assert_eq!(rendered, "ID: CVE-1");
    }

    #[test]
    fn values_render_through_display() {
        let hits = vec![hit(Document::new()
            .with("id", "CVE-1")
            .with("exploited", true))];

        let rendered = assemble_context(&hits, &["exploited"]);
        assert_eq!(rendered, "Exploited: true");
    }
}
