use thiserror::Error;

// Error
//------------------------------------------------------------------------------

/// Failures surfaced by the reader. A symbol that simply isn't there is not an error; decode
/// calls report it as `Ok(None)`.
#[derive(Debug, Error)]
pub enum ScanError {
    // Configuration
    #[error("No luminance source factory configured")]
    MissingLuminanceSource,
    #[error("Image is empty")]
    EmptyImage,
    #[error("Pixel buffer of {len} bytes doesn't match {width}x{height} with {bpp} bytes per pixel")]
    InvalidBuffer { len: usize, width: u32, height: u32, bpp: usize },
    #[error("Unknown character set {0:?}")]
    UnknownCharacterSet(String),
    #[error("Luminance source doesn't support rotation")]
    RotationUnsupported,
    #[error("Luminance source doesn't support inversion")]
    InversionUnsupported,

    // Engine
    #[error("Decoding engine failed: {0}")]
    Engine(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ScanError {
    /// Wraps a fault raised inside a decoding engine so it reaches the caller untouched.
    pub fn engine<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Engine(err.into())
    }
}

pub type ScanResult<T> = Result<T, ScanError>;
