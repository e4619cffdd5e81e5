use http::StatusCode;
use thiserror::Error;

/// Errors returned by [`Client::execute`](crate::Client::execute).
///
/// Every call either succeeds completely or fails with one of these; nothing
/// is retried or swallowed internally.
#[derive(Debug, Error)]
pub enum Error {
    /// Neither an access key nor a secret key could be resolved.
    #[error(
        "missing credentials: set AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY \
         or pass them through Config before retrying"
    )]
    MissingCredentials,

    /// The credential locator failed. The inner error is passed through as is.
    #[error(transparent)]
    Credential(awis_core::Error),

    /// The signer could not produce an authorization header.
    #[error("failed to sign request: {0}")]
    Signing(#[source] awis_core::Error),

    /// The request could not be built or sent.
    #[error("failed to send request: {0}")]
    Transport(#[source] awis_core::Error),

    /// The service answered with a status code of 400 or above.
    #[error("request failed with http status {status}")]
    HttpFailure {
        /// The status code returned by the service.
        status: StatusCode,
    },

    /// The response body is not valid UTF-8.
    #[error("response body is not valid utf-8")]
    InvalidBody(#[from] std::string::FromUtf8Error),

    /// The response body is not well-formed XML.
    #[error("failed to parse response xml: {0}")]
    Xml(#[from] quick_xml::Error),

    /// An expected field is absent from the parsed response.
    #[error("malformed response: missing {path}")]
    MalformedResponse {
        /// Dotted path of the missing field, e.g. `Response.ResponseStatus.StatusCode`.
        path: String,
    },
}

impl Error {
    /// Status code carried by an [`Error::HttpFailure`].
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::HttpFailure { status } => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn malformed(path: impl Into<String>) -> Self {
        Error::MalformedResponse { path: path.into() }
    }
}

/// Convenience type alias for Results
pub type Result<T> = std::result::Result<T, Error>;
