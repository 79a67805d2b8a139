use thiserror::Error;

#[derive(Error, Debug)]
pub enum MockupError {
    #[error("API key not configured. Set GEMINI_API_KEY environment variable or run: mockup3d config set api.key <your-key>")]
    MissingApiKey,

    /// Form input rejected before anything is sent
    #[error("{0}")]
    Validation(String),

    /// The service refused the request on policy/safety grounds
    #[error("Generation blocked by the service: {reason}")]
    BlockedContent { reason: String },

    /// The call succeeded but carried no image payload
    #[error("The API did not return an image (finish reason: {})", .finish_reason.as_deref().unwrap_or("unknown"))]
    NoImageReturned { finish_reason: Option<String> },

    #[error("API error: {message}")]
    ApiError {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Image processing error: {0}")]
    ImageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl MockupError {
    /// Short label for the error kind, used in JSON output
    pub fn kind(&self) -> &'static str {
        match self {
            MockupError::Validation(_) => "validation",
            MockupError::BlockedContent { .. } => "blocked_content",
            MockupError::NoImageReturned { .. } => "no_image_returned",
            MockupError::MissingApiKey => "missing_api_key",
            MockupError::InvalidParameter(_) => "invalid_parameter",
            _ => "transport_or_unknown",
        }
    }
}

impl From<reqwest::Error> for MockupError {
    fn from(err: reqwest::Error) -> Self {
        MockupError::ApiError {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<image::ImageError> for MockupError {
    fn from(err: image::ImageError) -> Self {
        MockupError::ImageError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_image_message_falls_back_to_unknown() {
        let err = MockupError::NoImageReturned { finish_reason: None };
        assert_eq!(
            err.to_string(),
            "The API did not return an image (finish reason: unknown)"
        );

        let err = MockupError::NoImageReturned {
            finish_reason: Some("STOP".into()),
        };
        assert!(err.to_string().contains("STOP"));
    }

    #[test]
    fn kinds_map_to_error_classes() {
        assert_eq!(MockupError::Validation("x".into()).kind(), "validation");
        assert_eq!(
            MockupError::BlockedContent { reason: "SAFETY".into() }.kind(),
            "blocked_content"
        );
        assert_eq!(
            MockupError::InvalidResponse("bad".into()).kind(),
            "transport_or_unknown"
        );
    }
}
