use thiserror::Error;

/// Request-level failures of [`super::Pipeline::process`].
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("No input provided. Submit an image or text.")]
    NoInput,

    #[error("Invalid file type: {0}")]
    InvalidFileType(String),

    #[error("OCR failed: {0}")]
    OcrFailure(String),
}

impl PipelineError {
    /// True for failures caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::NoInput | Self::InvalidFileType(_))
    }
}
