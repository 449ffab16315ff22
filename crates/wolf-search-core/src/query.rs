//! Query language for the in-memory index.
//!
//! A query is a whitespace-separated list of clauses:
//!
//! ```text
//! clause   := presence? (field ':')? term ('~' digits | '^' number)*
//! presence := '+' | '-'
//! field    := "title" | "content"
//! ```
//!
//! `*` inside a term is a wildcard. Characters other than letters, digits and
//! `*` are dropped from terms, and a clause whose term is dropped entirely is
//! ignored. Structural mistakes (unknown field, dangling modifier, bad number)
//! are reported as [`QueryParseError`], which the dispatcher answers with a
//! sanitized retry.

use thiserror::Error;

/// A syntax error in a query string.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("query syntax error at column {column}: {message}")]
pub struct QueryParseError {
    /// 1-based character position of the offending clause.
    pub column: usize,
    pub message: String,
}

impl QueryParseError {
    fn new(column: usize, message: impl Into<String>) -> Self {
        Self {
            column,
            message: message.into(),
        }
    }
}

/// Indexed fields a clause can be restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Title,
    Content,
}

impl Field {
    pub const ALL: [Field; 2] = [Field::Title, Field::Content];

    fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "title" => Some(Field::Title),
            "content" => Some(Field::Content),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Optional,
    Required,
    Prohibited,
}

/// One parsed clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub presence: Presence,
    /// `None` searches every field.
    pub field: Option<Field>,
    /// Lowercased; may contain `*`.
    pub term: String,
    pub edit_distance: usize,
    pub boost: f64,
}

impl Clause {
    pub fn fields(&self) -> Vec<Field> {
        match self.field {
            Some(f) => vec![f],
            None => Field::ALL.to_vec(),
        }
    }

    pub fn has_wildcard(&self) -> bool {
        self.term.contains('*')
    }
}

/// Parse a full query string into clauses.
pub fn parse(query: &str) -> Result<Vec<Clause>, QueryParseError> {
    let mut clauses = Vec::new();
    let mut column = 1;
    let mut token = String::new();
    let mut token_column = 1;

    for c in query.chars() {
        if c.is_whitespace() {
            if !token.is_empty() {
                if let Some(clause) = parse_clause(&token, token_column)? {
                    clauses.push(clause);
                }
                token.clear();
            }
        } else {
            if token.is_empty() {
                token_column = column;
            }
            token.push(c);
        }
        column += 1;
    }
    if !token.is_empty() {
        if let Some(clause) = parse_clause(&token, token_column)? {
            clauses.push(clause);
        }
    }
    Ok(clauses)
}

fn parse_clause(raw: &str, column: usize) -> Result<Option<Clause>, QueryParseError> {
    let (presence, rest) = match raw.chars().next() {
        Some('+') => (Presence::Required, &raw[1..]),
        Some('-') => (Presence::Prohibited, &raw[1..]),
        _ => (Presence::Optional, raw),
    };

    // Modifiers start at the first '~' or '^'.
    let modifiers_at = rest.find(['~', '^']).unwrap_or(rest.len());
    let (body, modifiers) = rest.split_at(modifiers_at);

    let (field, term) = match body.split_once(':') {
        Some((name, term)) => {
            if name.is_empty() {
                return Err(QueryParseError::new(column, "missing field name before ':'"));
            }
            let field = Field::parse(name).ok_or_else(|| {
                QueryParseError::new(column, format!("unrecognised field '{}'", name))
            })?;
            (Some(field), term)
        }
        None => (None, body),
    };

    if term.is_empty() {
        return Err(QueryParseError::new(column, "expected a term"));
    }
    if term.contains(':') {
        return Err(QueryParseError::new(column, "unexpected ':' in term"));
    }

    let (edit_distance, boost) = parse_modifiers(modifiers, column)?;

    let normalized: String = term
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '*')
        .flat_map(char::to_lowercase)
        .collect();
    if normalized.chars().all(|c| c == '*') {
        return Ok(None);
    }

    Ok(Some(Clause {
        presence,
        field,
        term: normalized,
        edit_distance,
        boost,
    }))
}

fn parse_modifiers(mut rest: &str, column: usize) -> Result<(usize, f64), QueryParseError> {
    let mut edit_distance = 0;
    let mut boost = 1.0;

    while let Some(marker) = rest.chars().next() {
        let after = &rest[marker.len_utf8()..];
        let end = after.find(['~', '^']).unwrap_or(after.len());
        let value = &after[..end];
        match marker {
            '~' => {
                edit_distance = value.parse::<usize>().map_err(|_| {
                    QueryParseError::new(column, format!("invalid edit distance '{}'", value))
                })?;
            }
            '^' => {
                boost = value
                    .parse::<f64>()
                    .ok()
                    .filter(|b| b.is_finite() && *b > 0.0)
                    .ok_or_else(|| {
                        QueryParseError::new(column, format!("invalid boost '{}'", value))
                    })?;
            }
            other => {
                return Err(QueryParseError::new(
                    column,
                    format!("unexpected '{}'", other),
                ))
            }
        }
        rest = &after[end..];
    }

    Ok((edit_distance, boost))
}

/// Match `text` against a `*` wildcard pattern.
pub fn wildcard_match(pattern: &str, text: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.len() == 1 {
        return pattern == text;
    }

    let first = parts[0];
    let last = parts[parts.len() - 1];
    if !text.starts_with(first) || text.len() < first.len() + last.len() {
        return false;
    }
    if !text[first.len()..].ends_with(last) {
        return false;
    }

    let mut middle = &text[first.len()..text.len() - last.len()];
    for part in &parts[1..parts.len() - 1] {
        match middle.find(part) {
            Some(pos) => middle = &middle[pos + part.len()..],
            None => return false,
        }
    }
    true
}
