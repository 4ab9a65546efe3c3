use thiserror::Error;

/// Everything that can go wrong while detecting or blurring faces.
#[derive(Debug, Error)]
pub enum BlurFacesError {
    /// The input bytes are not a supported image.
    #[error("failed to decode image: {0}")]
    DecodeError(String),

    /// The image decoded to a zero-width or zero-height buffer.
    #[error("image dimensions are zero")]
    ZeroDimensions,

    /// A filter stage could not produce the output buffer.
    #[error("failed to render composited image: {0}")]
    RenderError(String),

    /// Writing the output format failed.
    #[error("failed to encode image: {0}")]
    EncodeError(String),

    /// Blur sigma outside `(0, MAX_BLUR_SIGMA]`, or not finite.
    #[error("blur sigma must be finite and in (0, {max}], got {0}", max = crate::MAX_BLUR_SIGMA)]
    InvalidSigma(f32),

    /// JPEG quality outside `0.0..=1.0`.
    #[error("quality must be between 0.0 and 1.0, got {0}")]
    InvalidQuality(f32),

    /// The face detection model could not be loaded.
    #[error("failed to load face detection model: {0}")]
    Model(String),
}

impl BlurFacesError {
    /// True for failures that mean the input bytes were never a usable image.
    pub fn is_decode_failure(&self) -> bool {
        matches!(
            self,
            BlurFacesError::DecodeError(_) | BlurFacesError::ZeroDimensions
        )
    }
}
