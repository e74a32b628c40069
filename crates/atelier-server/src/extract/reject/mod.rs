//! Drop-in replacements for axum's extractors whose rejections are
//! [`Error`](crate::handler::Error)s with client-friendly messages.

mod json;
mod path;
mod query;
mod validated_json;

pub use self::json::Json;
pub use self::path::Path;
pub use self::query::Query;
pub use self::validated_json::ValidateJson;

/// Keeps the first lines of a parser error, capped in length.
fn sanitize_error_message(message: &str) -> String {
    message
        .lines()
        .take(3)
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(200)
        .collect()
}
