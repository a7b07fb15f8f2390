//! Word-window chunking.
//!
//! Text is split on whitespace and regrouped into consecutive, non-overlapping windows
//! of `chunk_size` words. The last window may be shorter. Windows are joined with single
//! spaces, so original line breaks and runs of spaces are not preserved.

/// Default window size in words.
pub const DEFAULT_CHUNK_SIZE: usize = 300;

/// Splits `text` into word windows of `chunk_size` words.
///
/// Empty or whitespace-only input yields no chunks. A `chunk_size` of zero is treated
/// as one word per chunk.
pub fn chunk_words(text: &str, chunk_size: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    words
        .chunks(chunk_size.max(1))
        .map(|window| window.join(" "))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_input_yields_no_chunks() {
        assert!(chunk_words("", 300).is_empty());
        assert!(chunk_words("   \n\t ", 300).is_empty());
    }

    #[test]
    fn test_short_text_is_single_chunk() {
        let chunks = chunk_words("Rust engineer with five years of backend work", 300);
        assert_eq!(chunks, vec!["Rust engineer with five years of backend work"]);
    }

    #[test]
    fn test_final_window_may_be_shorter() {
        let chunks = chunk_words("a b c d e f g", 3);
        assert_eq!(chunks, vec!["a b c", "d e f", "g"]);
    }

    #[test]
    fn test_whitespace_is_normalized_to_single_spaces() {
        let chunks = chunk_words("  led\tthe\n\nmigration   to   kubernetes ", 2);
        assert_eq!(chunks, vec!["led the", "migration to", "kubernetes"]);
    }

    #[test]
    fn test_zero_chunk_size_means_one_word_per_chunk() {
        assert_eq!(chunk_words("one two", 0), vec!["one", "two"]);
    }

    proptest! {
        #[test]
        fn prop_chunk_count_is_ceil_of_word_count(
            words in proptest::collection::vec("[a-zA-Z0-9]{1,8}", 0..200),
            size in 1usize..50,
        ) {
            let text = words.join(" ");
            let chunks = chunk_words(&text, size);
            prop_assert_eq!(chunks.len(), words.len().div_ceil(size));
        }

        #[test]
        fn prop_rejoined_chunks_reproduce_word_sequence(
            text in "[a-z \\t\\n]{0,400}",
            size in 1usize..20,
        ) {
            let chunks = chunk_words(&text, size);
            let rejoined: Vec<&str> = chunks.iter().flat_map(|c| c.split(' ')).collect();
            let original: Vec<&str> = text.split_whitespace().collect();
            prop_assert_eq!(rejoined, original);
        }
    }
}
