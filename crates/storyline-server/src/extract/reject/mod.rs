//! Replacements for axum's body, path and query extractors that reject with
//! the crate's [`Error`] instead of plain-text responses.
//!
//! [`Error`]: crate::handler::Error

mod enhanced_json;
mod enhanced_path;
mod enhanced_query;
mod validated;

pub use self::enhanced_json::Json;
pub use self::enhanced_path::Path;
pub use self::enhanced_query::Query;
pub use self::validated::{ValidateJson, ValidateQuery};

/// Keeps the first lines of a rejection message, capped in length.
pub(crate) fn sanitize_error_message(message: &str, max_chars: usize) -> String {
    message
        .lines()
        .take(2)
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(max_chars)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_truncates_lines_and_length() {
        let message = "first line\nsecond line\nthird line";
        assert_eq!(sanitize_error_message(message, 200), "first line second line");
        assert_eq!(sanitize_error_message(message, 5), "first");
    }
}
