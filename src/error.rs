//! Error types for the sheet-music-to-MIDI system

use std::fmt;

/// Custom error type for sheet music recognition and conversion
#[derive(Debug, Clone)]
pub enum OmrError {
    /// E001: Image could not be loaded or decoded
    ImageLoadError(String),
    /// E002: Unsupported image format
    UnsupportedImageFormat(String),
    /// E003: Configuration validation failed
    ConfigValidationFailed(String),
    /// E004: Image preprocessing error
    PreprocessingError(String),
    /// E005: Processing pipeline error
    ProcessingPipelineError(String),
    /// E006: MIDI export error
    MidiExportError(String),
    /// E007: Analysis export error
    AnalysisExportError(String),
    /// E008: QA artifact generation error
    QaGenerationError(String),
    /// E009: Input validation error
    InputValidationError(String),
    /// E010: Invalid configuration parameter
    InvalidConfigParameter(String),
}

impl fmt::Display for OmrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OmrError::ImageLoadError(msg) => {
                write!(f, "E001: Image load error - {}", msg)
            }
            OmrError::UnsupportedImageFormat(msg) => {
                write!(f, "E002: Unsupported image format - {}", msg)
            }
            OmrError::ConfigValidationFailed(msg) => {
                write!(f, "E003: Configuration validation failed - {}", msg)
            }
            OmrError::PreprocessingError(msg) => {
                write!(f, "E004: Image preprocessing error - {}", msg)
            }
            OmrError::ProcessingPipelineError(msg) => {
                write!(f, "E005: Processing pipeline error - {}", msg)
            }
            OmrError::MidiExportError(msg) => {
                write!(f, "E006: MIDI export error - {}", msg)
            }
            OmrError::AnalysisExportError(msg) => {
                write!(f, "E007: Analysis export error - {}", msg)
            }
            OmrError::QaGenerationError(msg) => {
                write!(f, "E008: QA artifact generation error - {}", msg)
            }
            OmrError::InputValidationError(msg) => {
                write!(f, "E009: Input validation error - {}", msg)
            }
            OmrError::InvalidConfigParameter(msg) => {
                write!(f, "E010: Invalid configuration parameter - {}", msg)
            }
        }
    }
}

impl std::error::Error for OmrError {}

// From implementations for common error types
impl From<std::io::Error> for OmrError {
    fn from(err: std::io::Error) -> Self {
        OmrError::ImageLoadError(format!("File I/O error: {}", err))
    }
}

impl From<image::ImageError> for OmrError {
    fn from(err: image::ImageError) -> Self {
        OmrError::ImageLoadError(format!("Image decode error: {}", err))
    }
}

impl From<serde_json::Error> for OmrError {
    fn from(err: serde_json::Error) -> Self {
        OmrError::AnalysisExportError(format!("JSON serialization error: {}", err))
    }
}

impl From<anyhow::Error> for OmrError {
    fn from(err: anyhow::Error) -> Self {
        OmrError::ProcessingPipelineError(format!("Generic error: {}", err))
    }
}

/// Result type alias for sheet-music-to-MIDI operations
pub type Result<T> = std::result::Result<T, OmrError>;
