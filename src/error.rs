//! Error taxonomy shared by the fetch layer, the collectors and the sink.

use thiserror::Error;

/// Failure of a single HTTP exchange.
///
/// Collectors decide whether this is terminal or a normal end-of-pagination
/// signal; the fetch layer itself never retries.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The server answered with a non-2xx status.
    #[error("request to {url} failed with status {status}")]
    Status { status: u16, url: String },

    /// The request never produced a response (DNS, connect, timeout, body read).
    #[error("network error for {url}: {message}")]
    Network { url: String, message: String },

    /// The request was rejected before being sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl FetchError {
    /// Status code carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The url that was attempted.
    pub fn url(&self) -> Option<&str> {
        match self {
            FetchError::Status { url, .. } | FetchError::Network { url, .. } => Some(url),
            FetchError::InvalidRequest(_) => None,
        }
    }
}

/// Malformed payload returned by an otherwise successful request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid JSON: {0}")]
    Json(String),

    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("GraphQL error: {0}")]
    GraphQl(String),

    #[error("cannot resolve link {href:?}: {message}")]
    InvalidLink { href: String, message: String },
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        ParseError::Json(err.to_string())
    }
}

/// A record whose field set differs from the first record of its set.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("record {index} has fields {found:?}, expected {expected:?}")]
pub struct SchemaMismatchError {
    pub index: usize,
    pub expected: Vec<String>,
    pub found: Vec<String>,
}

/// Failure while writing a record set to disk.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error(transparent)]
    Schema(#[from] SchemaMismatchError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_status_accessor() {
        let err = FetchError::Status { status: 403, url: "http://x/a".to_string() };
        assert_eq!(err.status(), Some(403));
        assert_eq!(err.url(), Some("http://x/a"));

        let err = FetchError::Network { url: "http://x".to_string(), message: "boom".to_string() };
        assert_eq!(err.status(), None);
        assert!(err.to_string().contains("network error"));

        assert_eq!(FetchError::InvalidRequest("empty".to_string()).url(), None);
    }

    #[test]
    fn test_fetch_error_display_carries_url() {
        let err = FetchError::Status { status: 500, url: "http://host/products".to_string() };
        let msg = err.to_string();
        assert!(msg.contains("500"));
        assert!(msg.contains("http://host/products"));
    }

    #[test]
    fn test_parse_error_from_serde() {
        let err: ParseError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(matches!(err, ParseError::Json(_)));
    }

    #[test]
    fn test_invalid_link_display() {
        let err = ParseError::InvalidLink {
            href: "http://".to_string(),
            message: "empty host".to_string(),
        };
        assert_eq!(err.to_string(), "cannot resolve link \"http://\": empty host");
    }

    #[test]
    fn test_schema_mismatch_display() {
        let err = SchemaMismatchError {
            index: 2,
            expected: vec!["a".to_string(), "b".to_string()],
            found: vec!["a".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("record 2"));
        assert!(msg.contains("\"b\""));
    }
}
