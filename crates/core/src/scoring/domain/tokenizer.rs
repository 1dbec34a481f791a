/// Canonicalize raw text into a comparable token sequence.
///
/// Lowercases, strips everything outside `[a-z0-9]` and whitespace, collapses
/// whitespace runs, and splits on the result. Total over any input: empty or
/// whitespace-only text yields an empty sequence.
///
/// Unicode letters outside `a-z` are treated as punctuation and removed, not
/// as word characters. Good enough for English-language references; not a
/// substitute for real Unicode normalization.
pub fn normalize(text: &str) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect();

    cleaned.split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases_and_splits() {
        assert_eq!(normalize("The Quick Fox"), vec!["the", "quick", "fox"]);
    }

    #[test]
    fn test_strips_punctuation() {
        assert_eq!(
            normalize("Hello, world! It's 9am."),
            vec!["hello", "world", "its", "9am"]
        );
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(normalize("  a \t b\n\nc  "), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_empty_and_whitespace_only() {
        assert!(normalize("").is_empty());
        assert!(normalize("   \t\n").is_empty());
    }

    #[test]
    fn test_punctuation_only_yields_empty() {
        assert!(normalize("!?., --").is_empty());
    }

    #[test]
    fn test_non_ascii_letters_removed() {
        // Accented characters are stripped like punctuation, so "café"
        // collapses to "caf".
        assert_eq!(normalize("café naïve"), vec!["caf", "nave"]);
    }
}
