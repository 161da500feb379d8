//! Error types for the image cache

use std::fmt;

#[derive(Debug)]
pub enum CacheError {
    /// No entry is stored for the requested code
    NotFound,
    Io(Box<std::io::Error>),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::NotFound => write!(f, "Cache entry not found"),
            CacheError::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for CacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CacheError::Io(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CacheError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            CacheError::NotFound
        } else {
            CacheError::Io(Box::new(err))
        }
    }
}

pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_not_found_io_error_maps_to_not_found() {
        let err: CacheError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, CacheError::NotFound));
    }

    #[test]
    fn test_other_io_error_is_kept() {
        let err: CacheError = io::Error::new(io::ErrorKind::PermissionDenied, "denied").into();
        assert!(matches!(err, CacheError::Io(_)));
        assert_eq!(format!("{}", err), "IO error: denied");
    }

    #[test]
    fn test_not_found_display() {
        assert_eq!(format!("{}", CacheError::NotFound), "Cache entry not found");
    }
}
