//! Word-count chunking for oversized document text.

use crate::IndexError;

/// Splits `text` into chunks of `chunk_size_words` whitespace-delimited
/// words; the final partial chunk is emitted only when non-empty.
///
/// Words are never dropped or reordered, so joining the chunks with single
/// spaces reconstructs the input with whitespace runs collapsed. Fails with
/// [`IndexError::InvalidArgument`] when `chunk_size_words` is zero.
pub fn chunk(text: &str, chunk_size_words: usize) -> Result<Vec<String>, IndexError> {
    if chunk_size_words == 0 {
        return Err(IndexError::InvalidArgument(
            "chunk size must be at least one word".to_string(),
        ));
    }

    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::with_capacity(chunk_size_words);

    for word in text.split_whitespace() {
        current.push(word);
        if current.len() == chunk_size_words {
            chunks.push(current.join(" "));
            current.clear();
        }
    }
    if !current.is_empty() {
        chunks.push(current.join(" "));
    }

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_every_n_words() {
        let chunks = chunk("one two three four five", 2).unwrap();
        assert_eq!(chunks, vec!["one two", "three four", "five"]);
    }

    #[test]
    fn exact_multiple_has_no_trailing_chunk() {
        let chunks = chunk("a b c d", 2).unwrap();
        assert_eq!(chunks, vec!["a b", "c d"]);
    }

    #[test]
    fn empty_and_blank_text_produce_nothing() {
        assert!(chunk("", 10).unwrap().is_empty());
        assert!(chunk("   \n\t ", 10).unwrap().is_empty());
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        assert!(matches!(
            chunk("text", 0).unwrap_err(),
            IndexError::InvalidArgument(_)
        ));
    }

    #[test]
    fn round_trip_collapses_whitespace() {
        let text = "  The quick\tbrown\n\nfox   jumps over the lazy dog ";
        for size in 1..6 {
            let joined = chunk(text, size).unwrap().join(" ");
            assert_eq!(joined, "The quick brown fox jumps over the lazy dog");
        }
    }
}
