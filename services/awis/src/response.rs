use crate::xml::{XmlTree, XmlValue};
use crate::{Error, Result};
use http::StatusCode;
use serde::Serialize;

const REQUEST_ID_PATH: [&str; 3] = ["Response", "OperationRequest", "RequestId"];
const STATUS_CODE_PATH: [&str; 3] = ["Response", "ResponseStatus", "StatusCode"];

/// A successful AWIS answer.
///
/// `body` is the root element of the returned document, e.g. the content of
/// `UrlInfoResponse`. Its shape depends on the action and is left to the
/// caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AwisResponse {
    /// `Response.OperationRequest.RequestId`
    pub request_id: String,
    /// `Response.ResponseStatus.StatusCode`, `Success` on a normal answer.
    pub status_code: String,
    /// Local name of the root element, e.g. `UrlInfoResponse`.
    pub root_name: String,
    /// The root element.
    pub body: XmlTree,
}

/// Fail with [`Error::HttpFailure`] when `status` is 400 or above.
pub fn validate(status: StatusCode) -> Result<()> {
    if status.as_u16() >= 400 {
        return Err(Error::HttpFailure { status });
    }
    Ok(())
}

/// Unwrap the root element of `document` and pick the request metadata out
/// of it.
pub fn normalize(document: XmlTree) -> Result<AwisResponse> {
    let (root_name, root) = document
        .into_first_child()
        .ok_or_else(|| Error::malformed("root element"))?;
    let body = match root {
        XmlValue::Tree(tree) => tree,
        _ => return Err(Error::malformed(format!("{root_name}.Response"))),
    };

    let request_id = required_text(&body, &root_name, &REQUEST_ID_PATH)?;
    let status_code = required_text(&body, &root_name, &STATUS_CODE_PATH)?;

    Ok(AwisResponse {
        request_id,
        status_code,
        root_name,
        body,
    })
}

fn required_text(tree: &XmlTree, root_name: &str, path: &[&str]) -> Result<String> {
    tree.text_at(path)
        .map(str::to_string)
        .ok_or_else(|| Error::malformed(format!("{root_name}.{}", path.join("."))))
}
