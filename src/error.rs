//! Error types and handling for the weather tracker

use thiserror::Error;

use crate::insight::GenerationError;
use crate::weather::LookupError;

/// Main error type for the weather tracker
#[derive(Error, Debug)]
pub enum TrackerError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// A single city's weather lookup failed
    #[error("Weather lookup for '{city}' failed: {source}")]
    Lookup {
        city: String,
        #[source]
        source: LookupError,
    },

    /// The generative model call failed
    #[error("Insight generation failed: {0}")]
    Generation(#[from] GenerationError),

    /// Chart drawing errors
    #[error("Chart error: {message}")]
    Chart { message: String },

    /// Page template errors
    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    /// JSON serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl TrackerError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Wrap a lookup failure with the city it belongs to
    pub fn lookup<S: Into<String>>(city: S, source: LookupError) -> Self {
        Self::Lookup {
            city: city.into(),
            source,
        }
    }

    /// Create a new chart error
    pub fn chart<S: Into<String>>(message: S) -> Self {
        Self::Chart {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            TrackerError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            TrackerError::Validation { message } => format!("Invalid input: {message}"),
            TrackerError::Lookup { city, source } => {
                format!("Could not retrieve data for {city}. {}", source.hint())
            }
            TrackerError::Generation(err) => format!("AI insight unavailable: {err}"),
            TrackerError::Chart { .. } => "The temperature chart could not be drawn.".to_string(),
            TrackerError::Template(_) | TrackerError::Serialization(_) => {
                "The page could not be rendered.".to_string()
            }
            TrackerError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}
