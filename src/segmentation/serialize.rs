//! Segment serialization
//!
//! Produces the single text blob handed to the extractor. Book boundaries are
//! marked by a token on its own line.

/// Marker placed between books
pub const BOOK_SEPARATOR: &str = "---BOOK_SEPARATOR---";

/// Join text blocks with `separator` on its own line
pub fn serialize_blocks<S: AsRef<str>>(blocks: &[S], separator: &str) -> String {
    let joiner = format!("\n{}\n", separator);
    blocks
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<&str>>()
        .join(&joiner)
}
