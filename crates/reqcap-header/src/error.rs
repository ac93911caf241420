use thiserror::Error;

/// Errors produced while parsing an OSGi header.
///
/// Every variant describes a header that does not follow the clause
/// grammar. Callers treat all of them as "malformed header".
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HeaderError {
    #[error("unterminated quote in header: {0}")]
    UnterminatedQuote(String),

    #[error("clause has attributes but no key: {0}")]
    MissingKey(String),

    #[error("empty name in clause: {0}")]
    EmptyName(String),

    #[error("missing value for '{0}'")]
    MissingValue(String),

    #[error("key '{key}' follows attributes in clause: {clause}")]
    KeyAfterAttribute { key: String, clause: String },

    #[error("duplicate attribute '{name}' on '{key}'")]
    DuplicateAttribute { key: String, name: String },

    #[error("unexpected characters after quoted value of '{0}'")]
    TrailingCharacters(String),

    #[error("unknown attribute type '{ty}' on '{name}'")]
    UnknownType { name: String, ty: String },

    #[error("invalid {ty} value for '{name}': {value}")]
    InvalidTypedValue {
        name: String,
        ty: String,
        value: String,
    },

    #[error("clause '{0}' has an empty namespace")]
    EmptyNamespace(String),
}

/// Convenience alias for header results.
pub type HeaderResult<T> = Result<T, HeaderError>;
