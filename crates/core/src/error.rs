/// Result alias that carries the custom [`RepCounterError`] type.
pub type Result<T> = std::result::Result<T, RepCounterError>;

/// Common error type for the core crate.
///
/// Frame evaluation never produces one of these: missing landmarks, an
/// unsupported exercise and malformed frames are reported through feedback
/// on the session instead. Errors are reserved for configuration problems
/// and misuse of session handles.
#[derive(Debug, thiserror::Error)]
pub enum RepCounterError {
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Configuration or frame payload that could not be decoded.
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    /// Configuration that decoded fine but violates a constraint.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A handle that was never issued or whose session already ended.
    #[error("unknown session handle {0}")]
    UnknownSession(u64),
}

impl RepCounterError {
    pub fn invalid_config<T: Into<String>>(msg: T) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
