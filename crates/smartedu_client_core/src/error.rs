#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("resource not found")]
    NotFound,
    #[error("server responded {status}: {body}")]
    Status { status: u16, body: String },
    #[error("request unsuccessful: {0}")]
    Unsuccessful(String),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// True when the server answered but had nothing for us. Pages render a 404
    /// for these; transport and decode failures propagate instead.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ApiError::NotFound | ApiError::Status { .. } | ApiError::Unsuccessful(_)
        )
    }
}

/// Turn "not found" style failures into `Ok(None)`.
pub trait NotFoundExt<T> {
    fn or_not_found(self) -> Result<Option<T>, ApiError>;
}

impl<T> NotFoundExt<T> for Result<T, ApiError> {
    fn or_not_found(self) -> Result<Option<T>, ApiError> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_not_found() => {
                log::warn!("Treating failed fetch as not found: {}", e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
