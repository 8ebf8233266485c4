use core::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    SizeMismatch { expected: usize, actual: usize },
    OutOfBounds,
    InvalidStride,
    EmptyImage,
    Configuration(ConfigError),
    EstimationFailed(EstimationFailure),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    NotEnoughEndpoints { placed: usize },
    InvalidParameter { name: &'static str, reason: String },
    /// A settings or configuration document could not be read or parsed.
    Document(String),
}

/// Why a wavelength/phase estimate could not be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstimationFailure {
    EmptySignal,
    /// All samples are equal; there is no oscillation to measure.
    FlatSignal,
    /// The winning frequency bucket maps to zero cycles over the window.
    ZeroCycles,
}

impl Error {
    pub fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::Configuration(ConfigError::InvalidParameter {
            name,
            reason: reason.into(),
        })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SizeMismatch { expected, actual } => {
                write!(f, "size mismatch: expected {expected}, got {actual}")
            }
            Self::OutOfBounds => write!(f, "out of bounds"),
            Self::InvalidStride => write!(f, "invalid stride"),
            Self::EmptyImage => write!(f, "image has no pixels"),
            Self::Configuration(e) => write!(f, "configuration error: {e}"),
            Self::EstimationFailed(e) => write!(f, "estimation failed: {e}"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotEnoughEndpoints { placed } => {
                write!(f, "need 2 endpoints, {placed} placed")
            }
            Self::InvalidParameter { name, reason } => write!(f, "`{name}`: {reason}"),
            Self::Document(reason) => write!(f, "bad document: {reason}"),
        }
    }
}

impl fmt::Display for EstimationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySignal => write!(f, "empty signal"),
            Self::FlatSignal => write!(f, "flat signal"),
            Self::ZeroCycles => write!(f, "dominant bucket has zero cycles"),
        }
    }
}

impl std::error::Error for Error {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Configuration(e)
    }
}

impl From<EstimationFailure> for Error {
    fn from(e: EstimationFailure) -> Self {
        Self::EstimationFailed(e)
    }
}
