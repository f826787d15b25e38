use thiserror::Error;

#[derive(Error, Debug)]
pub enum EavError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Unknown entity: {0}")]
    UnknownEntity(String),
}

pub type Result<T> = std::result::Result<T, EavError>;

// Helper conversions
impl From<rusqlite::Error> for EavError {
    fn from(e: rusqlite::Error) -> Self { Self::Storage(e.to_string()) }
}
impl From<config::ConfigError> for EavError {
    fn from(e: config::ConfigError) -> Self { Self::Config(e.to_string()) }
}
impl From<serde_json::Error> for EavError {
    fn from(e: serde_json::Error) -> Self { Self::Validation(e.to_string()) }
}
