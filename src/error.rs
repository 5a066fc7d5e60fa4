//! Error types for the tank controller

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ControllerError {
    /// The snapshot violates a precondition of the field or goal math
    #[error("Malformed world state: {0}")]
    MalformedWorldState(String),

    #[error("Missing required world constant: {0}")]
    MissingConstant(String),

    #[error("Invalid world constant {name}: {value}")]
    InvalidConstant { name: String, value: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("World source error: {0}")]
    Source(String),

    #[error("Command sink error: {0}")]
    Sink(String),
}

pub type Result<T> = std::result::Result<T, ControllerError>;
