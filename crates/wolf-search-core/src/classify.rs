//! Query classification: navigate, search, or nothing.
//!
//! Only tokens that are unambiguously URL-shaped are routed to navigation.
//! Any whitespace disqualifies a token, so natural-language queries always
//! reach the search backend.
//!
//! # Rules (first match wins)
//!
//! 1. Blank after trimming → [`Classification::Empty`].
//! 2. Contains whitespace → [`Classification::Search`].
//! 3. Starts with `scheme://` → [`Classification::Navigate`], unchanged.
//! 4. Domain-like (`host.tld[/path]`) → [`Classification::Navigate`] with `https://` prepended.
//! 5. Anything else → [`Classification::Search`].
//!
//! Navigation candidates must also parse as an absolute URL; ones that do
//! not (`http://`, `a.b:port`) fall back to search. This is stricter than the
//! two patterns above on their own, which would accept `a.b:notaport`; keep
//! the check so every `Navigate` value is a URL a browser can open.

use url::Url;

/// The decision for one piece of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Nothing to do; the view should be cleared.
    Empty,
    /// Leave the search page for this absolute URL.
    Navigate(String),
    /// Run a search for the trimmed query.
    Search(String),
}

/// Classify raw input text.
///
/// ```rust
/// use wolf_search_core::classify::{classify, Classification};
///
/// assert_eq!(
///     classify("example.com"),
///     Classification::Navigate("https://example.com".to_string())
/// );
/// assert_eq!(classify("  "), Classification::Empty);
/// ```
pub fn classify(input: &str) -> Classification {
    let query = input.trim();
    if query.is_empty() {
        return Classification::Empty;
    }
    match parse_potential_url(query) {
        Some(url) => Classification::Navigate(url),
        None => Classification::Search(query.to_string()),
    }
}

/// Returns the normalized URL if `query` is a URL or bare domain.
pub fn parse_potential_url(query: &str) -> Option<String> {
    let query = query.trim();
    if query.is_empty() || query.chars().any(char::is_whitespace) {
        return None;
    }

    let candidate = if has_scheme(query) {
        query.to_string()
    } else if is_domain_like(query) {
        format!("https://{}", query)
    } else {
        return None;
    };

    // Url::parse only accepts absolute URLs, so a successful parse carries a scheme.
    Url::parse(&candidate).ok().map(|_| candidate)
}

/// `^[a-zA-Z][a-zA-Z0-9+.-]*://`
fn has_scheme(query: &str) -> bool {
    let Some(end) = query.find("://") else {
        return false;
    };
    let scheme = &query[..end];
    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '.' | '-'))
}

/// `^[^/\s]+\.[^\s/]+(/.*)?$`, whitespace already excluded by the caller.
///
/// The host part (everything before the first `/`) needs a dot with at least
/// one character on each side.
fn is_domain_like(query: &str) -> bool {
    let host = match query.find('/') {
        Some(slash) => &query[..slash],
        None => query,
    };
    host.char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < host.len())
}
