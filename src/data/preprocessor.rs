// ============================================================
// Layer 4 — Description Preprocessor
// ============================================================
// Turns an item description into the words that get looked up
// in the word-vector vocabulary.
//
// Steps (applied in order):
//   1. Replace every run of non [a-zA-Z0-9] characters with a
//      single space
//   2. Split on whitespace
//   3. Drop English stop words
//
// Matching is case-sensitive: the vocabulary is, too, so "The"
// survives while "the" is dropped.

use std::collections::HashSet;

/// English stop words removed before vector lookup.
pub const STOP_WORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're",
    "you've", "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he",
    "him", "his", "himself", "she", "she's", "her", "hers", "herself", "it", "it's",
    "its", "itself", "they", "them", "their", "theirs", "themselves", "what", "which",
    "who", "whom", "this", "that", "that'll", "these", "those", "am", "is", "are",
    "was", "were", "be", "been", "being", "have", "has", "had", "having", "do", "does",
    "did", "doing", "a", "an", "the", "and", "but", "if", "or", "because", "as",
    "until", "while", "of", "at", "by", "for", "with", "about", "against", "between",
    "into", "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again", "further", "then",
    "once", "here", "there", "when", "where", "why", "how", "all", "any", "both", "each",
    "few", "more", "most", "other", "some", "such", "no", "nor", "not", "only", "own",
    "same", "so", "than", "too", "very", "s", "t", "can", "will", "just", "don",
    "don't", "should", "should've", "now", "d", "ll", "m", "o", "re", "ve", "y", "ain",
    "aren", "aren't", "couldn", "couldn't", "didn", "didn't", "doesn", "doesn't",
    "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn", "isn't", "ma",
    "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan", "shan't",
    "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't",
    "wouldn", "wouldn't",
];

pub struct Preprocessor {
    stop_words: HashSet<&'static str>,
}

impl Preprocessor {
    pub fn new() -> Self {
        Self { stop_words: STOP_WORDS.iter().copied().collect() }
    }

    /// Replace each run of non-alphanumeric ASCII characters with one space.
    pub fn clean(&self, text: &str) -> String {
        let mut out        = String::with_capacity(text.len());
        let mut last_space = false;

        for c in text.chars() {
            if c.is_ascii_alphanumeric() {
                out.push(c);
                last_space = false;
            } else if !last_space {
                out.push(' ');
                last_space = true;
            }
        }

        out
    }

    /// Cleaned words with stop words removed, in order.
    pub fn words(&self, text: &str) -> Vec<String> {
        self.clean(text)
            .split_whitespace()
            .filter(|w| !self.stop_words.contains(*w))
            .map(str::to_string)
            .collect()
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}
