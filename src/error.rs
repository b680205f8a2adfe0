// SPDX-License-Identifier: MPL-2.0
use std::fmt;

#[derive(Debug, Clone)]
pub enum Error {
    Io(String),
    Config(String),
    Api(ApiError),
}

/// Failure classes of the remote notification service.
///
/// `Unauthorized` is kept apart from the other variants because a `401`
/// is handled by session expiry, never by the generic fallback path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The bearer credential was rejected (HTTP 401).
    Unauthorized,

    /// Any other non-success HTTP status.
    Status { code: u16, detail: Option<String> },

    /// The request never produced a response (connection refused, timeout, ...).
    Transport(String),

    /// The response body did not match the expected shape.
    Decode(String),
}

impl ApiError {
    /// Maps an HTTP status code to an error class.
    pub fn from_status(code: u16, detail: Option<String>) -> Self {
        if code == 401 {
            ApiError::Unauthorized
        } else {
            ApiError::Status { code, detail }
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }

    /// HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized => Some(401),
            ApiError::Status { code, .. } => Some(*code),
            ApiError::Transport(_) | ApiError::Decode(_) => None,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Unauthorized => write!(f, "Session expired or credentials rejected"),
            ApiError::Status {
                code,
                detail: Some(detail),
            } => write!(f, "HTTP {}: {}", code, detail),
            ApiError::Status { code, detail: None } => write!(f, "HTTP {}", code),
            ApiError::Transport(msg) => write!(f, "Network error: {}", msg),
            ApiError::Decode(msg) => write!(f, "Unexpected response: {}", msg),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O Error: {}", e),
            Error::Config(e) => write!(f, "Config Error: {}", e),
            Error::Api(e) => write!(f, "API Error: {}", e),
        }
    }
}

impl std::error::Error for Error {}

impl std::error::Error for ApiError {}

impl From<ApiError> for Error {
    fn from(err: ApiError) -> Self {
        Error::Api(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            ApiError::from_status(status.as_u16(), None)
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_io_error() {
        let err = Error::Io("disk failure".to_string());
        assert_eq!(format!("{}", err), "I/O Error: disk failure");
    }

    #[test]
    fn from_io_error_produces_io_variant() {
        let io_error = std::io::Error::other("boom");
        let err: Error = io_error.into();
        match err {
            Error::Io(message) => assert!(message.contains("boom")),
            _ => panic!("expected Io variant"),
        }
    }

    #[test]
    fn config_error_formats_properly() {
        let err = Error::Config("bad field".into());
        assert_eq!(format!("{}", err), "Config Error: bad field");
    }

    #[test]
    fn status_401_is_unauthorized() {
        let err = ApiError::from_status(401, Some("token expired".into()));
        assert!(err.is_unauthorized());
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn other_statuses_keep_code_and_detail() {
        let err = ApiError::from_status(503, Some("maintenance".into()));
        assert!(!err.is_unauthorized());
        assert_eq!(err.status(), Some(503));
        assert_eq!(format!("{}", err), "HTTP 503: maintenance");
    }

    #[test]
    fn transport_errors_have_no_status() {
        let err = ApiError::Transport("connection refused".into());
        assert_eq!(err.status(), None);
        assert!(format!("{}", err).contains("connection refused"));
    }

    #[test]
    fn api_error_wraps_into_crate_error() {
        let err: Error = ApiError::Unauthorized.into();
        assert!(matches!(err, Error::Api(ApiError::Unauthorized)));
    }
}
