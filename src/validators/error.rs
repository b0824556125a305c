//! Validation error types

use serde::Serialize;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error type for validator construction and validation failures
///
/// Every variant maps to an HTTP status so the API layer can render it
/// directly with [`ValidationError::to_response`].
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// Required configuration missing or blank
    #[error("{0}")]
    InvalidArgument(String),

    /// No implementation registered under the requested key
    #[error("{0}")]
    NotFound(String),

    /// Implementation exists but does not provide the requested capability
    #[error("{0}")]
    BadRequest(String),

    /// Implementation failed while being constructed
    #[error("{message}")]
    Internal {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Policy rejected: missing artifact, undecodable coordinate, unusable client
    #[error("{message}")]
    NotAcceptable {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Repository answered with a status other than 200 or 404
    #[error("{body}")]
    RemoteStatus { status: u16, body: String },
}

impl ValidationError {
    pub fn not_acceptable(message: impl Into<String>) -> Self {
        ValidationError::NotAcceptable {
            message: message.into(),
            source: None,
        }
    }

    pub fn not_acceptable_with(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        ValidationError::NotAcceptable {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// HTTP status the API layer should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            ValidationError::InvalidArgument(_) => 400,
            ValidationError::NotFound(_) => 404,
            ValidationError::BadRequest(_) => 400,
            ValidationError::Internal { .. } => 500,
            ValidationError::NotAcceptable { .. } => 406,
            ValidationError::RemoteStatus { status, .. } => *status,
        }
    }

    /// Render as a structured API error body
    pub fn to_response(&self) -> ErrorResponse {
        let mut error_details = Vec::new();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            error_details.push(cause.to_string());
            source = cause.source();
        }

        ErrorResponse {
            response_code: self.status_code(),
            error_message: self.to_string(),
            error_details,
        }
    }
}

/// Error body returned to API clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub response_code: u16,
    pub error_message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub error_details: Vec<String>,
}
