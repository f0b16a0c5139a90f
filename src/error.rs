//! Error handling and custom error types
//!
//! Provides unified error handling across the pipeline using thiserror, and
//! classifies each error into the failure taxonomy the orchestrator reports on.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Image service error (status {status}): {body}")]
    ServiceStatus { status: u16, body: String },

    #[error("Image service error: {0}")]
    ImageService(String),

    #[error("API key is not set")]
    MissingCredential,

    #[error("Derived prompt is blank")]
    BlankPrompt,

    #[error("Invocation marker {0:?} not found in document")]
    MarkerNotFound(String),

    #[error("No usable text precedes the invocation marker")]
    PromptUnavailable,

    #[error("Image retrieval error: {0}")]
    Retrieval(String),

    #[error("Image encoding error: {0}")]
    Encoding(String),

    #[error("Attachment store error: {0}")]
    Attachment(String),

    #[error("Document error: {0}")]
    Document(String),

    #[error("Interaction error: {0}")]
    Interaction(String),
}

/// Failure classes surfaced by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Missing credential, blank prompt, or marker problems. Alerted; nothing runs downstream.
    Precondition,
    /// Generation service unreachable or empty. Treated as "nothing to offer".
    Request,
    /// Retrieval, encoding, or attachment failures after a selection.
    Materialize,
    /// The host document or dialog facility itself failed.
    Host,
}

impl Error {
    pub fn kind(&self) -> FailureKind {
        match self {
            Error::MissingCredential
            | Error::BlankPrompt
            | Error::MarkerNotFound(_)
            | Error::PromptUnavailable => FailureKind::Precondition,
            Error::Http(_)
            | Error::ServiceStatus { .. }
            | Error::ImageService(_)
            | Error::Serialization(_) => FailureKind::Request,
            Error::Retrieval(_) | Error::Encoding(_) | Error::Attachment(_) => {
                FailureKind::Materialize
            }
            Error::Io(_) | Error::Document(_) | Error::Interaction(_) => FailureKind::Host,
        }
    }

    /// Human-readable text for the host's alerting facility.
    pub fn user_message(&self) -> String {
        match self {
            Error::MissingCredential => {
                "Please set your OpenAI API Key in the plugin settings".to_string()
            }
            Error::MarkerNotFound(_) | Error::PromptUnavailable => {
                "Could not determine preceding text to use as a prompt".to_string()
            }
            Error::BlankPrompt => "Could not determine a prompt to generate images from".to_string(),
            e if e.kind() == FailureKind::Materialize => {
                format!("Could not attach the chosen image: {}", e)
            }
            e => format!("Image generation failed: {}", e),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
