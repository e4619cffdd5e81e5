use crate::time::DateTime;
use bytes::Bytes;
use http::HeaderMap;
use http::HeaderValue;
use http::Method;

/// Describes everything a signer needs to know about one request.
///
/// The descriptor is built once per call and discarded afterwards.
#[derive(Debug, Clone)]
pub struct SigningRequest {
    /// HTTP method.
    pub method: Method,
    /// Host the request is signed for.
    pub authority: String,
    /// HTTP path, not yet percent encoded.
    pub path: String,
    /// Query parameters in caller order, not yet percent encoded.
    pub query: Vec<(String, String)>,
    /// Headers that take part in the signature.
    pub headers: HeaderMap,
    /// Request body.
    pub body: Bytes,
    /// The instant this request is signed at.
    pub time: DateTime,
    /// Region used in the credential scope.
    pub region: String,
    /// Service name used in the credential scope.
    pub service: String,
}

impl SigningRequest {
    /// Get header names as sorted vector.
    pub fn header_name_to_vec_sorted(&self) -> Vec<&str> {
        let mut h = self
            .headers
            .keys()
            .map(|k| k.as_str())
            .collect::<Vec<&str>>();
        h.sort_unstable();

        h
    }

    /// Normalize header value the way SigV4 canonicalizes it: trim leading
    /// and trailing spaces and collapse inner runs of spaces into one.
    pub fn header_value_normalize(v: &mut HeaderValue) {
        let trimmed = v.as_bytes().trim_ascii();
        let mut bs = Vec::with_capacity(trimmed.len());
        for &b in trimmed {
            if b == b' ' && bs.last() == Some(&b' ') {
                continue;
            }
            bs.push(b);
        }

        // Only spaces were removed from a valid HeaderValue.
        *v = HeaderValue::from_bytes(&bs).expect("invalid header value")
    }
}

/// Output of a [`SignRequest`](crate::SignRequest) implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// Hex encoded SHA-256 of the request body.
    pub body_hash: String,
    /// Value for the `Authorization` header.
    pub authorization: String,
}
