//! Schema identifier validation and quoting.
//!
//! Table, view and column names cannot be sent as bound parameters, so every
//! value substituted for a `${name}` / `:{name}` binding is passed through
//! [`quote_name`] before it reaches the SQL text.
//!
//! - Bare identifiers matching `[A-Za-z][A-Za-z0-9_.]*` are returned unchanged
//! - Already quoted identifiers (`"..."` without embedded quotes) are returned unchanged
//! - `name alias` and `name AS alias` pairs are checked part by part
//! - Anything else is rejected, or wrapped in double quotes with [`QuoteMode::Auto`]
//!
//! # Example
//! ```ignore
//! use sqlweave::ident::{quote_name, quote_name_with, QuoteMode};
//!
//! assert_eq!(quote_name("users")?, "users");
//! assert_eq!(quote_name_with("order;items o", QuoteMode::Auto)?, r#""order;items" o"#);
//! assert!(quote_name("users; drop table users").is_err());
//! # Ok::<(), sqlweave::SqlError>(())
//! ```

use crate::error::{SqlError, SqlResult};
use regex::Regex;
use std::sync::OnceLock;

/// What to do with an identifier that fails the bare-identifier grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuoteMode {
    /// Fail with [`SqlError::InvalidArgument`].
    #[default]
    Reject,
    /// Wrap the identifier in double quotes.
    Auto,
}

fn plain_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^(?:[A-Za-z][A-Za-z0-9_.]*|"[^"]+")$"#)
            .expect("invalid built-in identifier regex")
    })
}

// Column aliases may use an optional `AS`; table aliases may not. Dropping the
// keyword lets both forms share one rendering.
fn alias_separator_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?-u:\s)+(?i:as(?-u:\s)+)?").expect("invalid built-in alias regex")
    })
}

/// Validate a schema object name, rejecting anything that would need quoting.
///
/// Shorthand for `quote_name_with(name, QuoteMode::Reject)`.
pub fn quote_name(name: &str) -> SqlResult<String> {
    quote_name_with(name, QuoteMode::Reject)
}

/// Validate a schema object name and quote it if `mode` allows it.
///
/// Names containing a double quote can never be quoted safely and are always
/// rejected.
pub fn quote_name_with(name: &str, mode: QuoteMode) -> SqlResult<String> {
    if plain_name_re().is_match(name) {
        return Ok(name.to_string());
    }

    let mut parts = alias_separator_re().splitn(name, 2);
    if let (Some(real), Some(alias)) = (parts.next(), parts.next()) {
        let real = quote_name_with(real, mode)?;
        let alias = quote_name_with(alias, mode)?;
        return Ok(format!("{real} {alias}"));
    }

    if mode == QuoteMode::Reject || name.contains('"') {
        return Err(SqlError::invalid_argument(format!(
            "Object name \"{name}\" contains invalid characters"
        )));
    }
    Ok(format!("\"{name}\""))
}
