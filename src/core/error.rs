use thiserror::Error;

#[derive(Error, Debug)]
pub enum BaseError {
    #[error("Tag '{0}' not found")]
    UnknownTag(String),

    #[error("Invalid tag name '{0}'")]
    InvalidTagName(String),

    #[error("Tag alias chain is not supported: {0}")]
    UnsupportedAliasChain(String),

    #[error("Invalid alias table: {0}")]
    InvalidAliasTable(String),

    #[error("Invalid value {value} for config '{key}', expected {expected}")]
    InvalidConfigValue {
        key: String,
        value: String,
        expected: String,
    },

    #[error("Config '{0}' is not declared")]
    UnknownConfig(String),

    #[error("Parameter '{param}' is not valid for {class}")]
    InvalidParameter { param: String, class: String },

    #[error("Missing parameter '{param}' for {class}")]
    MissingParameter { param: String, class: String },

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Class '{0}' is not registered")]
    UnknownClass(String),

    #[error("Class '{0}' is already registered with a different definition")]
    DuplicateClass(String),

    #[error("Class '{0}' cannot be constructed from parameters")]
    NotConstructible(String),

    #[error("This instance of {0} has not been fitted yet")]
    NotFitted(String),

    #[error("The provided serialization format '{format}' is not supported. The possible formats are: {supported}")]
    UnsupportedSerializationFormat { format: String, supported: String },

    #[error("Serialization format '{0}' is unavailable: {1}")]
    CodecUnavailable(String, String),

    #[error("{class} violates the base object contract: {reason}")]
    ContractViolation { class: String, reason: String },

    #[error("Invalid path: {0}")]
    InvalidPathType(String),

    #[error("Path '{0}' already exists")]
    PathAlreadyExists(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Lock error: {0}")]
    LockError(String),

    #[error("I/O error: {0}")]
    IoError(String),
}

pub type Result<T> = std::result::Result<T, BaseError>;

impl From<std::io::Error> for BaseError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}

impl From<rmp_serde::encode::Error> for BaseError {
    fn from(err: rmp_serde::encode::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<rmp_serde::decode::Error> for BaseError {
    fn from(err: rmp_serde::decode::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(feature = "json")]
impl From<serde_json::Error> for BaseError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for BaseError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::LockError(err.to_string())
    }
}
