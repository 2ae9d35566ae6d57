use thiserror::Error;
pub type Result<T> = std::result::Result<T, GazetteerError>;

#[derive(Error, Debug)]
pub enum GazetteerError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Malformed response: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Invalid service URL: {0}")]
    Endpoint(#[from] url::ParseError),
    #[error("Unexpected payload: {0}")]
    Payload(String),
}

impl GazetteerError {
    /// True when the failure came from the transport rather than the payload.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_))
    }
}
