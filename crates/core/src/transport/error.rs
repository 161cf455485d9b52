//! Transport errors.

use thiserror::Error;

/// A failed GET.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportError {
    /// HTTP status when the server answered.
    pub status: Option<u16>,
    /// The provider could not be reached at all (DNS, refused, timeout).
    pub connection_error: bool,
    pub message: String,
}

impl TransportError {
    pub fn connection(message: impl Into<String>) -> Self {
        Self {
            status: None,
            connection_error: true,
            message: message.into(),
        }
    }

    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            connection_error: false,
            message: message.into(),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self {
            status: None,
            connection_error: false,
            message: message.into(),
        }
    }

    /// The provider refused this asset.
    pub fn is_forbidden(&self) -> bool {
        self.status == Some(403)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let err = TransportError::connection("dns failure");
        assert!(err.connection_error);
        assert_eq!(err.status, None);
        assert_eq!(err.to_string(), "dns failure");

        let err = TransportError::status(403, "Forbidden");
        assert!(err.is_forbidden());
        assert!(!err.connection_error);

        assert!(!TransportError::status(500, "boom").is_forbidden());
    }
}
