//! Text normalization shared by indexing, scoring and follow-up dedup.

use std::collections::BTreeSet;
use unicode_segmentation::UnicodeSegmentation;

/// Words that carry no topical signal.
const STOP_WORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "am", "an", "and", "any", "are", "as", "at", "be",
    "been", "but", "by", "can", "could", "did", "do", "does", "for", "from", "get", "had", "has",
    "have", "how", "i", "if", "in", "into", "is", "it", "its", "me", "more", "my", "of", "on",
    "or", "our", "should", "so", "tell", "than", "that", "the", "their", "them", "then", "there",
    "they", "this", "to", "us", "was", "we", "were", "what", "when", "where", "which", "who",
    "why", "will", "with", "would", "you", "your",
];

/// Split text into the set of lower-cased, stop-word-filtered, stemmed terms.
///
/// Queries and documents must go through this same function so that their
/// terms are comparable.
pub fn normalize_terms(text: &str) -> BTreeSet<String> {
    text.unicode_words()
        .map(str::to_lowercase)
        .filter(|word| !STOP_WORDS.contains(&word.as_str()))
        .map(|word| stem(&word))
        .filter(|word| word.chars().count() > 1)
        .collect()
}

/// Case- and whitespace-insensitive form of a whole sentence.
///
/// Trailing sentence punctuation is dropped so "What is X?" and "what is x"
/// compare equal.
pub fn normalize_phrase(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
        .trim_end_matches(['?', '.', '!'])
        .trim_end()
        .to_string()
}

/// Strip a handful of English inflections.
fn stem(word: &str) -> String {
    let len = word.len();

    if len > 5 && word.ends_with("ing") {
        return word[..len - 3].to_string();
    }

    if len > 4 && word.ends_with("ed") {
        return word[..len - 2].to_string();
    }

    if len > 3
        && word.ends_with('s')
        && !word.ends_with("ss")
        && !word.ends_with("us")
        && !word.ends_with("is")
    {
        return word[..len - 1].to_string();
    }

    word.to_string()
}
