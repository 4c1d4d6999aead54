//! Error types for sqlweave

use thiserror::Error;

/// Result type alias for sqlweave operations
pub type SqlResult<T> = Result<T, SqlError>;

/// Errors raised while composing, rendering or executing a statement
#[derive(Debug, Error)]
pub enum SqlError {
    /// Malformed or duplicate binding name, or an identifier that cannot be quoted
    #[error("{0}")]
    InvalidArgument(String),

    /// A collection argument without elements was matched to a `?`
    #[error("Collection parameters must contain at least one element")]
    EmptyCollection,

    /// Query execution error
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// A row mapper produced the same key twice
    #[error("Duplicate map key '{0}' is unsupported")]
    DuplicateKey(String),
}

impl SqlError {
    /// Create an invalid-argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Check if this is an invalid-argument error
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// Check if this is an empty-collection error
    pub fn is_empty_collection(&self) -> bool {
        matches!(self, Self::EmptyCollection)
    }

    /// Check if this is a database error
    pub fn is_query(&self) -> bool {
        matches!(self, Self::Query(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        assert_eq!(
            SqlError::EmptyCollection.to_string(),
            "Collection parameters must contain at least one element"
        );
        assert_eq!(
            SqlError::decode("2", "not an int").to_string(),
            "Decode error on column '2': not an int"
        );
        assert_eq!(
            SqlError::DuplicateKey("1".into()).to_string(),
            "Duplicate map key '1' is unsupported"
        );
    }

    #[test]
    fn predicates() {
        assert!(SqlError::invalid_argument("x").is_invalid_argument());
        assert!(!SqlError::EmptyCollection.is_invalid_argument());
        assert!(SqlError::EmptyCollection.is_empty_collection());
        assert!(!SqlError::EmptyCollection.is_query());
    }
}
