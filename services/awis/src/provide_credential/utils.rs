use awis_core::Error;
use http::StatusCode;

/// Map a non-200 answer from the instance metadata service to an error.
pub fn parse_imds_error(operation: &str, status: StatusCode, body: &str) -> Error {
    let err = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Error::credential_denied(format!("IMDS rejected {operation}"))
        }
        StatusCode::NOT_FOUND => Error::config_invalid(format!("IMDS has nothing for {operation}"))
            .with_context("hint: check if an IAM role is attached to this instance"),
        s if s.is_server_error() => {
            Error::unexpected(format!("IMDS failed during {operation}")).set_retryable(true)
        }
        _ => Error::unexpected(format!("IMDS returned unexpected status during {operation}")),
    };

    err.with_context(format!("status: {status}"))
        .with_context(format!("body: {body}"))
}
