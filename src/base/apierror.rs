//! The closed set of failures a request can end with.

use crate::base::neterror::NetError;
use crate::http::status::StatusFamily;
use thiserror::Error;

/// Every failure that crosses the [`Client`](crate::client::Client) boundary.
///
/// Compilation, connectivity, status and decoding failures each own a
/// variant; transport failures (DNS, timeouts, resets, pinning
/// cancellation) are carried unchanged in [`ApiError::Transport`] so callers
/// can tell "never reached the server" apart from "server rejected".
#[derive(Debug, Error, Clone)]
pub enum ApiError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Data conversion failed: {0}")]
    DataConversionFailed(String),
    #[error("String conversion failed: {0}")]
    StringConversionFailed(String),
    /// SOAP requests are rejected at compile time.
    #[error("SOAP requests are not supported")]
    SoapUnsupported,
    #[error("Network is not reachable")]
    NoNetwork,
    #[error("HTTP error: {family} (status {status:?})")]
    Http {
        family: StatusFamily,
        status: Option<u16>,
    },
    #[error("Invalid response")]
    InvalidResponse,
    #[error(transparent)]
    Transport(#[from] NetError),
}

impl ApiError {
    /// Failure for a response that never reported a status code.
    pub fn missing_status() -> Self {
        ApiError::Http {
            family: StatusFamily::ClientError,
            status: None,
        }
    }

    /// Failure for a non-success status code.
    pub fn from_status(code: u16) -> Self {
        ApiError::Http {
            family: StatusFamily::from_code(code),
            status: Some(code),
        }
    }

    /// The status family when this is an HTTP status failure.
    pub fn status_family(&self) -> Option<StatusFamily> {
        match self {
            ApiError::Http { family, .. } => Some(*family),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_buckets() {
        assert_eq!(
            ApiError::from_status(404).status_family(),
            Some(StatusFamily::ClientError)
        );
        assert_eq!(
            ApiError::from_status(503).status_family(),
            Some(StatusFamily::ServerError)
        );
        assert_eq!(
            ApiError::from_status(301).status_family(),
            Some(StatusFamily::Redirect)
        );
    }

    #[test]
    fn test_missing_status_is_client_error() {
        match ApiError::missing_status() {
            ApiError::Http { family, status } => {
                assert_eq!(family, StatusFamily::ClientError);
                assert_eq!(status, None);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_transport_error_passes_through() {
        let err: ApiError = NetError::ConnectionReset.into();
        assert!(matches!(err, ApiError::Transport(NetError::ConnectionReset)));
        assert_eq!(err.status_family(), None);
    }
}
