//! Shared helpers for query-string assembly.

/// Percent-encode a value for the engine's query string.
///
/// Standard form encoding, except that `*` stays literal: the engine
/// reads it as the wildcard token and expects it unescaped (the default
/// match-all query renders as `q=*%3A*`, not `q=%2A%3A%2A`).
pub(crate) fn encode(value: &str) -> String {
    // A literal `%` in the input encodes to `%25`, so any `%2A` left in
    // the output can only have come from `*`.
    urlencoding::encode(value).replace("%2A", "*")
}
