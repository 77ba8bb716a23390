//! Error taxonomy for calls against the remote notes API.

/// Error returned by every API operation.
///
/// Cloneable so that a single in-flight request can hand the same outcome
/// to every caller waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (connect, TLS, timeout).
    #[error("network error: {message}")]
    Network { message: String },

    /// The service answered with a non-2xx status.
    #[error("server error ({status}): {body}")]
    Remote { status: u16, body: String },

    /// The service rejected a create request as invalid.
    #[error("rejected by server ({status}): {message}")]
    ValidationRejected { status: u16, message: String },

    /// A 2xx response whose body did not match the expected shape.
    #[error("invalid response: {message}")]
    InvalidResponse { message: String },

    /// The configured token cannot be sent as a header value.
    #[error("invalid token value: {message}")]
    InvalidToken { message: String },
}

impl ApiError {
    /// HTTP status of a remote error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } | Self::ValidationRejected { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// True for `Remote { status: 404, .. }`.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Remote { status: 404, .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::InvalidResponse {
                message: err.to_string(),
            }
        } else {
            Self::Network {
                message: err.to_string(),
            }
        }
    }
}

/// Reduces an error body to the service's message when it sent JSON.
///
/// Looks for a string `message` field, then `error`; anything else is
/// returned verbatim.
pub(crate) fn error_message(body: &str) -> String {
    let Ok(json) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.to_string();
    };

    ["message", "error"]
        .iter()
        .find_map(|field| json.get(field).and_then(|v| v.as_str()))
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string())
}

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_message_field() {
        assert_eq!(
            error_message(r#"{"message":"Note not found","error":"Not Found"}"#),
            "Note not found"
        );
        assert_eq!(error_message(r#"{"error":"Unauthorized"}"#), "Unauthorized");
    }

    #[test]
    fn error_message_keeps_plain_bodies() {
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
        assert_eq!(error_message(r#"{"code":7}"#), r#"{"code":7}"#);
    }

    #[test]
    fn status_and_not_found() {
        let err = ApiError::Remote {
            status: 404,
            body: "Note not found".to_string(),
        };
        assert!(err.is_not_found());
        assert_eq!(err.status(), Some(404));

        let err = ApiError::Network {
            message: "connection refused".to_string(),
        };
        assert!(!err.is_not_found());
        assert_eq!(err.status(), None);

        let err = ApiError::ValidationRejected {
            status: 422,
            message: "tag must be one of the allowed values".to_string(),
        };
        assert_eq!(err.status(), Some(422));
    }
}
