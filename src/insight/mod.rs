//! AI insights about a fetched observation
//!
//! The observation is rendered into a fixed one-line context, followed by a
//! blank line and the user's question, and sent to a [`TextGenerator`].

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, instrument};

use crate::models::WeatherObservation;

pub mod gemini;

pub use gemini::GeminiClient;

/// Errors returned by the generative model
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// Connection, DNS or timeout failure
    #[error("request failed: {0}")]
    Request(String),

    /// Non-success status, with the provider's own message when it sent one
    #[error("provider returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The prompt was refused by the provider's safety filters
    #[error("prompt was blocked: {0}")]
    Blocked(String),

    /// The provider answered without any text
    #[error("the model returned no text")]
    EmptyResponse,

    /// The response body could not be understood
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GenerationError::InvalidResponse(err.to_string())
        } else {
            GenerationError::Request(err.to_string())
        }
    }
}

/// A configured generative text model
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Submit a single prompt and return the model's text
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Model identifier, for logging and display
    fn model(&self) -> &str;
}

/// One question about one observation
#[derive(Debug, Clone)]
pub struct InsightQuery<'a> {
    pub observation: &'a WeatherObservation,
    pub question: &'a str,
}

impl InsightQuery<'_> {
    /// Observation context, a blank line, then the question verbatim
    #[must_use]
    pub fn prompt(&self) -> String {
        build_prompt(self.observation, self.question)
    }
}

#[must_use]
pub fn build_prompt(observation: &WeatherObservation, question: &str) -> String {
    format!("{}\n\n{}", observation.context_line(), question)
}

/// Ask the model a question about one observation.
///
/// The response is returned verbatim. Failures are not retried.
#[instrument(skip_all, fields(city = %observation.city(), model = generator.model()))]
pub async fn ask(
    question: &str,
    observation: &WeatherObservation,
    generator: &dyn TextGenerator,
) -> Result<String, GenerationError> {
    let query = InsightQuery {
        observation,
        question,
    };
    let response = generator.generate(&query.prompt()).await?;
    info!("Generated insight with {} characters", response.len());
    Ok(response)
}
