//! Prompt construction and the language-model collaborator boundary.

use crate::RagError;

/// Builds the augmented prompt handed to the language model.
///
/// The template is fixed; the reply is never parsed or validated here.
pub fn augment(context: &str, question: &str) -> String {
    format!("Context: {context}\n\nQuestion: {question}\nAnswer:")
}

/// The inference collaborator.
///
/// Implementations wrap whatever service produces completions. The engine
/// hands over one opaque prompt string and a context-window hint and takes
/// back one reply string; transport, retries, and timeouts are the
/// implementation's business.
pub trait LanguageModel {
    /// Completes `prompt` within roughly `context_window` model tokens.
    fn complete(&self, prompt: &str, context_window: usize) -> Result<String, RagError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_is_fixed() {
        let prompt = augment("ID: CVE-1", "what is exploited?");
        assert_eq!(
            prompt,
            "Context: ID: CVE-1\n\nQuestion: what is exploited?\nAnswer:"
        );
    }

    #[test]
    fn empty_context_still_renders() {
        let prompt = augment("No relevant documents found.", "anything new?");
        assert!(prompt.starts_with("Context: No relevant documents found."));
        assert!(prompt.ends_with("Answer:"));
    }
}
