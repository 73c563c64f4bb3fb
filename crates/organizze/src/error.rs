use api_types::FieldErrors;
use reqwest::StatusCode;
use thiserror::Error;

/// Everything a client call can fail with.
///
/// Three kinds, no more: callers match narrowly (show validation detail to
/// the user, alert the operator on auth) or broadly (log and apologize).
/// Nothing here is retried by this layer.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Credentials rejected (HTTP 401). Carries no response body.
    #[error("invalid credentials")]
    Auth,
    /// Upstream rejected the payload (HTTP 422), or local validation did
    /// before any request was sent. Field name -> messages.
    #[error("validation failed")]
    Validation { errors: FieldErrors },
    /// Any other failure: unexpected status, timeout, transport or decode
    /// error. The message is sanitized and never contains credentials.
    #[error("API request failed: {message}")]
    Api {
        status: Option<StatusCode>,
        message: String,
    },
}

impl ApiError {
    pub(crate) fn api(status: Option<StatusCode>, message: impl Into<String>) -> Self {
        ApiError::Api {
            status,
            message: message.into(),
        }
    }
}

impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        ApiError::Validation { errors }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return ApiError::api(None, "request timeout");
        }
        if err.is_decode() {
            return ApiError::api(err.status(), "malformed response body");
        }
        // Deliberately not forwarding the reqwest message.
        ApiError::api(err.status(), "request failed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_types::field_error;

    #[test]
    fn field_errors_convert_to_validation() {
        let err: ApiError = field_error("name", "can't be blank").into();
        match err {
            ApiError::Validation { errors } => {
                assert_eq!(errors["name"], vec!["can't be blank".to_string()]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
