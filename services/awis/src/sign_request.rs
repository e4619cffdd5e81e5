use crate::constants::{AWS_QUERY_ENCODE_SET, AWS_URI_ENCODE_SET};
use crate::Credential;
use async_trait::async_trait;
use awis_core::hash::{hex_hmac_sha256, hex_sha256, hmac_sha256};
use awis_core::time::{format_date, format_iso8601, DateTime};
use awis_core::{Context, Error, Result, SignRequest, Signature, SigningRequest};
use log::debug;
use percent_encoding::{percent_decode_str, utf8_percent_encode};
use std::fmt::Write;

/// RequestSigner that implement AWS SigV4 with header based authorization.
///
/// - [Signature Version 4 signing process](https://docs.aws.amazon.com/general/latest/gr/signature-version-4.html)
///
/// The signer only reads the request descriptor. Session tokens and the
/// content hash header are attached by the caller after signing.
#[derive(Debug, Default, Clone, Copy)]
pub struct RequestSigner;

impl RequestSigner {
    /// Create a new AWS V4 signer.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SignRequest for RequestSigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        _: &Context,
        req: &SigningRequest,
        cred: &Self::Credential,
    ) -> Result<Signature> {
        let body_hash = hex_sha256(&req.body);

        // build canonical request and string to sign.
        let creq = canonical_request_string(req, &body_hash)?;
        debug!("calculated canonical request: {creq}");
        let encoded_req = hex_sha256(creq.as_bytes());

        // Scope: "20220313/<region>/<service>/aws4_request"
        let scope = format!(
            "{}/{}/{}/aws4_request",
            format_date(req.time),
            req.region,
            req.service
        );
        debug!("calculated scope: {scope}");

        // StringToSign:
        //
        // AWS4-HMAC-SHA256
        // 20220313T072004Z
        // 20220313/<region>/<service>/aws4_request
        // <hashed_canonical_request>
        let string_to_sign = {
            let mut f = String::new();
            writeln!(f, "AWS4-HMAC-SHA256")?;
            writeln!(f, "{}", format_iso8601(req.time))?;
            writeln!(f, "{}", &scope)?;
            write!(f, "{}", &encoded_req)?;
            f
        };
        debug!("calculated string to sign: {string_to_sign}");

        let signing_key =
            generate_signing_key(&cred.secret_access_key, req.time, &req.region, &req.service);
        let signature = hex_hmac_sha256(&signing_key, string_to_sign.as_bytes());

        let authorization = format!(
            "AWS4-HMAC-SHA256 Credential={}/{}, SignedHeaders={}, Signature={}",
            cred.access_key_id,
            scope,
            req.header_name_to_vec_sorted().join(";"),
            signature
        );

        Ok(Signature {
            body_hash,
            authorization,
        })
    }
}

/// Percent encode and sort query pairs the way the canonical request wants them.
///
/// The same pairs must be used for the URL that is actually sent, otherwise
/// the service computes a different canonical request.
pub fn canonical_query(query: &[(String, String)]) -> Vec<(String, String)> {
    let mut encoded: Vec<(String, String)> = query
        .iter()
        .map(|(k, v)| {
            (
                utf8_percent_encode(k, &AWS_QUERY_ENCODE_SET).to_string(),
                utf8_percent_encode(v, &AWS_QUERY_ENCODE_SET).to_string(),
            )
        })
        .collect();
    encoded.sort();
    encoded
}

/// Join encoded query pairs into `a=b&c=d`.
pub fn canonical_query_string(query: &[(String, String)]) -> String {
    canonical_query(query)
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

fn canonical_request_string(req: &SigningRequest, body_hash: &str) -> Result<String> {
    // 256 is specially chosen to avoid reallocation for most requests.
    let mut f = String::with_capacity(256);

    // Insert method
    writeln!(f, "{}", req.method)?;
    // Insert encoded path
    let path = percent_decode_str(&req.path).decode_utf8().map_err(|e| {
        Error::request_invalid("request path is not valid utf-8")
            .with_source(e)
            .with_context(format!("path: {}", req.path))
    })?;
    writeln!(f, "{}", utf8_percent_encode(&path, &AWS_URI_ENCODE_SET))?;
    // Insert query
    writeln!(f, "{}", canonical_query_string(&req.query))?;
    // Insert signed headers
    let signed_headers = req.header_name_to_vec_sorted();
    for header in signed_headers.iter() {
        // Repeated headers are joined with `,` in the order they were added.
        let mut values = Vec::new();
        for value in req.headers.get_all(*header) {
            let mut value = value.clone();
            SigningRequest::header_value_normalize(&mut value);
            values.push(value.to_str()?.to_string());
        }
        writeln!(f, "{}:{}", header, values.join(","))?;
    }
    writeln!(f)?;
    writeln!(f, "{}", signed_headers.join(";"))?;
    write!(f, "{body_hash}")?;

    Ok(f)
}

fn generate_signing_key(secret: &str, time: DateTime, region: &str, service: &str) -> Vec<u8> {
    // Sign secret
    let secret = format!("AWS4{secret}");
    // Sign date
    let sign_date = hmac_sha256(secret.as_bytes(), format_date(time).as_bytes());
    // Sign region
    let sign_region = hmac_sha256(sign_date.as_slice(), region.as_bytes());
    // Sign service
    let sign_service = hmac_sha256(sign_region.as_slice(), service.as_bytes());
    // Sign request
    hmac_sha256(sign_service.as_slice(), "aws4_request".as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{AWIS_PATH, AWIS_SERVICE, X_AMZ_DATE};
    use aws_credential_types::Credentials;
    use aws_sigv4::http_request::{SignableBody, SignableRequest, SigningSettings};
    use aws_sigv4::sign::v4;
    use awis_core::time::now;
    use bytes::Bytes;
    use chrono::TimeZone;
    use http::{header, HeaderMap, HeaderValue, Method};
    use pretty_assertions::assert_eq;
    use std::time::SystemTime;

    fn test_credential() -> Credential {
        Credential {
            access_key_id: "access_key_id".to_string(),
            secret_access_key: "secret_access_key".to_string(),
            ..Default::default()
        }
    }

    fn test_request(time: DateTime, query: &[(&str, &str)]) -> SigningRequest {
        let host = "awis.us-west-1.amazonaws.com";
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static(host));
        headers.insert(
            X_AMZ_DATE,
            HeaderValue::try_from(format_iso8601(time)).expect("must be valid"),
        );

        SigningRequest {
            method: Method::GET,
            authority: host.to_string(),
            path: AWIS_PATH.to_string(),
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            headers,
            body: Bytes::new(),
            time,
            region: "us-west-1".to_string(),
            service: AWIS_SERVICE.to_string(),
        }
    }

    #[test]
    fn test_canonical_query() {
        let query = vec![
            ("Url".to_string(), "example.com/a b".to_string()),
            ("Action".to_string(), "UrlInfo".to_string()),
            ("ResponseGroup".to_string(), "Rank,LinksInCount".to_string()),
        ];

        assert_eq!(
            canonical_query_string(&query),
            "Action=UrlInfo&ResponseGroup=Rank%2CLinksInCount&Url=example.com%2Fa%20b"
        );
    }

    #[test]
    fn test_canonical_request_string() {
        let time = chrono::Utc
            .with_ymd_and_hms(2022, 3, 13, 7, 20, 4)
            .unwrap();
        let req = test_request(time, &[("Url", "example.com"), ("Action", "UrlInfo")]);

        let creq = canonical_request_string(&req, &hex_sha256(b"")).expect("must build");
        assert_eq!(
            creq,
            "GET\n\
             /api\n\
             Action=UrlInfo&Url=example.com\n\
             host:awis.us-west-1.amazonaws.com\n\
             x-amz-date:20220313T072004Z\n\
             \n\
             host;x-amz-date\n\
             e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_canonical_request_repeated_header() {
        let time = chrono::Utc
            .with_ymd_and_hms(2022, 3, 13, 7, 20, 4)
            .unwrap();
        let mut req = test_request(time, &[("Action", "UrlInfo")]);
        req.headers.append("x-awis-tag", HeaderValue::from_static("one"));
        req.headers
            .append("x-awis-tag", HeaderValue::from_static("  two   words "));

        let creq = canonical_request_string(&req, &hex_sha256(b"")).expect("must build");
        assert!(
            creq.contains("\nx-awis-tag:one,two words\n"),
            "unexpected canonical request: {creq}"
        );
        assert!(creq.contains("\nhost;x-amz-date;x-awis-tag\n"));
    }

    #[tokio::test]
    async fn test_repeated_header_matches_aws_sigv4() -> anyhow::Result<()> {
        let now = now();
        let mut req = test_request(now, &[("Action", "UrlInfo"), ("Url", "example.com")]);
        req.headers.append("x-awis-tag", HeaderValue::from_static("one"));
        req.headers
            .append("x-awis-tag", HeaderValue::from_static("  two   words "));

        let uri = format!(
            "https://{}{}?{}",
            req.authority,
            req.path,
            canonical_query_string(&req.query)
        );

        let id = Credentials::new(
            "access_key_id",
            "secret_access_key",
            None,
            None,
            "hardcoded-credentials",
        )
        .into();
        let sp = v4::SigningParams::builder()
            .identity(&id)
            .region("us-west-1")
            .name("awis")
            .time(SystemTime::from(now))
            .settings(SigningSettings::default())
            .build()
            .expect("signing params must be valid");

        let headers = [("x-awis-tag", "one"), ("x-awis-tag", "  two   words ")];
        let output = aws_sigv4::http_request::sign(
            SignableRequest::new(
                "GET",
                uri.clone(),
                headers.into_iter(),
                SignableBody::Bytes(b""),
            )
            .expect("signable request must be valid"),
            &sp.into(),
        )?;
        let (_, expected) = output.into_parts();

        let sig = RequestSigner::new()
            .sign_request(&Context::new(), &req, &test_credential())
            .await?;

        assert!(
            sig.authorization.ends_with(&format!("Signature={expected}")),
            "signature mismatch for {uri}: {}",
            sig.authorization
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_authorization_format() -> Result<()> {
        let time = chrono::Utc
            .with_ymd_and_hms(2022, 3, 13, 7, 20, 4)
            .unwrap();
        let req = test_request(time, &[("Action", "UrlInfo")]);

        let sig = RequestSigner::new()
            .sign_request(&Context::new(), &req, &test_credential())
            .await?;

        assert_eq!(sig.body_hash, hex_sha256(b""));
        let prefix = "AWS4-HMAC-SHA256 Credential=access_key_id/20220313/us-west-1/awis/aws4_request, SignedHeaders=host;x-amz-date, Signature=";
        assert!(sig.authorization.starts_with(prefix), "{}", sig.authorization);
        assert_eq!(sig.authorization.len(), prefix.len() + 64);
        Ok(())
    }

    #[tokio::test]
    async fn test_signature_matches_aws_sigv4() -> anyhow::Result<()> {
        let _ = env_logger::builder().is_test(true).try_init();

        let cases: Vec<Vec<(&str, &str)>> = vec![
            vec![],
            vec![("Action", "UrlInfo"), ("Url", "example.com")],
            vec![
                ("Url", "example.com/path?x=1"),
                ("ResponseGroup", "Rank,LinksInCount"),
                ("Action", "UrlInfo"),
            ],
            vec![("Action", "CategoryBrowse"), ("Path", "Top/Computers/Software")],
        ];

        for query in cases {
            let now = now();
            let req = test_request(now, &query);

            let uri = if req.query.is_empty() {
                format!("https://{}{}", req.authority, req.path)
            } else {
                format!(
                    "https://{}{}?{}",
                    req.authority,
                    req.path,
                    canonical_query_string(&req.query)
                )
            };

            let id = Credentials::new(
                "access_key_id",
                "secret_access_key",
                None,
                None,
                "hardcoded-credentials",
            )
            .into();
            let sp = v4::SigningParams::builder()
                .identity(&id)
                .region("us-west-1")
                .name("awis")
                .time(SystemTime::from(now))
                .settings(SigningSettings::default())
                .build()
                .expect("signing params must be valid");

            let output = aws_sigv4::http_request::sign(
                SignableRequest::new("GET", uri.clone(), std::iter::empty(), SignableBody::Bytes(b""))
                    .expect("signable request must be valid"),
                &sp.into(),
            )?;
            let (_, expected) = output.into_parts();

            let sig = RequestSigner::new()
                .sign_request(&Context::new(), &req, &test_credential())
                .await?;

            assert!(
                sig.authorization.ends_with(&format!("Signature={expected}")),
                "signature mismatch for {uri}: {}",
                sig.authorization
            );
        }

        Ok(())
    }
}
