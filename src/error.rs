//! Error types for the season_scan library

use thiserror::Error;

/// Result type alias for season_scan operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Error types for portrait season analysis
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The face locator found no face in the image
    #[error("No face detected in image")]
    NoFaceDetected,

    /// Skin region too small or empty to estimate a color from
    #[error("Insufficient skin data: {reason}")]
    InsufficientData { reason: String },

    /// Upstream contract violation (malformed landmarks, bad parameters)
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    /// Image file or bytes could not be loaded or decoded
    #[error("Failed to load image: {message}")]
    ImageLoadError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Pipeline configuration could not be read, written or validated
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Styling knowledge base is malformed or missing an entry
    #[error("Knowledge base error: {message}")]
    KnowledgeBaseError { message: String },

    /// OpenCV operation failed
    #[cfg(feature = "opencv")]
    #[error("OpenCV error: {operation}")]
    OpenCvError {
        operation: String,
        #[source]
        source: Option<opencv::Error>,
    },
}

impl AnalysisError {
    /// Create an image load error with context
    pub fn image_load<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ImageLoadError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a configuration error with context
    pub fn config<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ConfigError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    pub fn insufficient_data(reason: impl Into<String>) -> Self {
        Self::InsufficientData {
            reason: reason.into(),
        }
    }

    /// Create an OpenCV error with context
    #[cfg(feature = "opencv")]
    pub fn opencv(operation: impl Into<String>, source: opencv::Error) -> Self {
        Self::OpenCvError {
            operation: operation.into(),
            source: Some(source),
        }
    }

    /// Whether a different photo could succeed.
    ///
    /// Content problems (no face, degenerate skin region) are terminal for
    /// the given image but the user can retry with another one. Everything
    /// else is an integration error.
    pub fn is_retryable_with_new_photo(&self) -> bool {
        matches!(
            self,
            AnalysisError::NoFaceDetected | AnalysisError::InsufficientData { .. }
        )
    }

    /// Get user-friendly error description for application display
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::NoFaceDetected => {
                "Face not detected. Please try another photo with clear facial features.".to_string()
            }
            AnalysisError::InsufficientData { .. } => {
                "Not enough visible skin to analyze. Please use a well-lit, front-facing photo.".to_string()
            }
            AnalysisError::ImageLoadError { .. } => {
                "Could not load the image. Please check the file format and try again.".to_string()
            }
            _ => "Color analysis failed due to an internal error.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_errors_are_retryable() {
        assert!(AnalysisError::NoFaceDetected.is_retryable_with_new_photo());
        assert!(AnalysisError::insufficient_data("empty hull").is_retryable_with_new_photo());
        assert!(!AnalysisError::invalid_input("67 landmarks").is_retryable_with_new_photo());
    }

    #[test]
    fn test_no_face_user_message() {
        let msg = AnalysisError::NoFaceDetected.user_message();
        assert!(msg.starts_with("Face not detected"));
    }

    #[test]
    fn test_invalid_input_is_distinct() {
        let err = AnalysisError::invalid_input("expected 68 landmarks, got 5");
        assert_eq!(err.to_string(), "Invalid input: expected 68 landmarks, got 5");
        assert_ne!(err.user_message(), AnalysisError::NoFaceDetected.user_message());
    }

    #[test]
    fn test_image_load_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = AnalysisError::image_load("Failed to open portrait.jpg", io);
        assert!(std::error::Error::source(&err).is_some());
    }
}
