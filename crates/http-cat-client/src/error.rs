//! Error types for the remote image source

use std::fmt;

#[derive(Debug)]
pub enum ImageSourceError {
    /// Transport failure: connection refused, timeout, body read error
    Http(Box<reqwest::Error>),
    /// The service answered with a non-success status
    Status(u16),
}

impl fmt::Display for ImageSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSourceError::Http(err) => write!(f, "HTTP error: {}", err),
            ImageSourceError::Status(status) => {
                write!(f, "Image source returned status {}", status)
            }
        }
    }
}

impl std::error::Error for ImageSourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImageSourceError::Http(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ImageSourceError {
    fn from(err: reqwest::Error) -> Self {
        ImageSourceError::Http(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, ImageSourceError>;
