//! Title similarity
//!
//! Normalized Levenshtein ratio in [0, 1]. OCR and the extractor often lose
//! or alter brackets around an edition, dots and full-width marks, so titles
//! are also compared with those separators stripped and the better of the two
//! scores wins. Symbols that name something (`C++`, `C#`) are never stripped.

use strsim::normalized_levenshtein;

/// Similarity of two titles, 1.0 for identical strings
pub fn title_similarity(a: &str, b: &str) -> f64 {
    let a_normalized = a.trim().to_lowercase();
    let b_normalized = b.trim().to_lowercase();

    let base_similarity = normalized_levenshtein(&a_normalized, &b_normalized);

    let a_stripped = strip_separators(&a_normalized);
    let b_stripped = strip_separators(&b_normalized);

    let stripped_similarity = if !a_stripped.is_empty() && !b_stripped.is_empty() {
        normalized_levenshtein(&a_stripped, &b_stripped)
    } else {
        0.0
    };

    base_similarity.max(stripped_similarity)
}

/// Brackets, quotes and separators that carry no meaning in a title
const SEPARATORS: &[char] = &[
    '(', ')', '[', ']', '{', '}', '（', '）', '【', '】', '《', '》', '〈', '〉', '「', '」',
    '『', '』', '"', '\'', '“', '”', '‘', '’', '·', '・', '.', ',', '，', '。', '、', ':',
    '：', ';', '；', '-', '—', '_', '/',
];

fn strip_separators(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace() && !SEPARATORS.contains(c))
        .collect()
}
