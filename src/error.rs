//! Unified error type for roomcraft.

use thiserror::Error;

/// Errors raised while encoding images or talking to the generation service.
#[derive(Debug, Error)]
pub enum DesignError {
    /// The uploaded image could not be read or is not an image.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// An API returned an error response.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code (0 for replayed errors).
        status: u16,
        /// Error message from the API.
        message: String,
    },

    /// A network error occurred.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The API answered with a body we could not interpret.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The call succeeded but carried no usable payload.
    #[error("Empty result: {0}")]
    EmptyResult(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// Invalid argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Image format conversion error.
    #[error("Image conversion error: {0}")]
    ImageConversion(String),

    /// No API key configured for the provider.
    #[error("No API key for {provider}. Set {env_var} or add it to config file.")]
    MissingApiKey {
        /// The provider name.
        provider: String,
        /// The environment variable name.
        env_var: String,
    },
}

impl DesignError {
    /// Coarse error kind used in logs and cassettes.
    ///
    /// `encoding`, `service` and `empty_result` are the failures the
    /// controller converts into user-visible text; everything else is `local`.
    #[must_use]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Encoding(_) => "encoding",
            Self::Api { .. } | Self::Network(_) | Self::MalformedResponse(_) => "service",
            Self::EmptyResult(_) => "empty_result",
            Self::Io(_)
            | Self::Config(_)
            | Self::InvalidArgument(_)
            | Self::ImageConversion(_)
            | Self::MissingApiKey { .. } => "local",
        }
    }

    /// Rebuild an error from its recorded category and message.
    #[must_use]
    pub fn from_recorded(kind: &str, message: String) -> Self {
        match kind {
            "encoding" => Self::Encoding(message),
            "empty_result" => Self::EmptyResult(message),
            _ => Self::Api { status: 0, message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories() {
        assert_eq!(DesignError::Encoding("x".into()).category(), "encoding");
        assert_eq!(DesignError::Api { status: 500, message: "boom".into() }.category(), "service");
        assert_eq!(DesignError::MalformedResponse("x".into()).category(), "service");
        assert_eq!(DesignError::EmptyResult("x".into()).category(), "empty_result");
        assert_eq!(DesignError::Config("x".into()).category(), "local");
    }

    #[test]
    fn recorded_kinds_round_trip_to_variants() {
        assert!(matches!(
            DesignError::from_recorded("empty_result", "none".into()),
            DesignError::EmptyResult(_)
        ));
        assert!(matches!(
            DesignError::from_recorded("encoding", "bad".into()),
            DesignError::Encoding(_)
        ));
        assert!(matches!(
            DesignError::from_recorded("service", "down".into()),
            DesignError::Api { status: 0, .. }
        ));
    }
}
