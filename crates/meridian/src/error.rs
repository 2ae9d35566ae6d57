use thiserror::Error;

use crate::query::{QueryRejection, ResolveError};

#[derive(Error, Debug)]
pub enum MeridianError {
    #[error("Query rejected: {0}")]
    Rejected(#[from] QueryRejection),
    #[error("Lookup error: {0}")]
    Lookup(#[from] meridian_gazetteer::GazetteerError),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Init Logging error: {0}")]
    InitLoggingError(#[from] tracing_subscriber::filter::ParseError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<ResolveError> for MeridianError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::Rejected(rejection) => Self::Rejected(rejection),
            ResolveError::Lookup(lookup) => Self::Lookup(lookup),
        }
    }
}

pub type Result<T> = std::result::Result<T, MeridianError>;
