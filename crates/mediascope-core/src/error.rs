use thiserror::Error;

/// All errors that can occur around the matching engine.
///
/// The engine functions themselves are total; these only surface while
/// loading configuration or decoding records handed over by an import driver.
#[derive(Debug, Error)]
pub enum MediascopeError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, MediascopeError>;
