use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use awis::{Client, Config, Credential, Error, Query, RequestSigner};
use awis_core::time::{format_iso8601_with_separator, parse_iso8601_with_separator};
use awis_core::{Context, HttpSend, ProvideCredential, SignRequest, Signature, SigningRequest, StaticEnv};
use awis_file_read_tokio::TokioFileRead;
use bytes::Bytes;
use http::header::{AUTHORIZATION, HOST};
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use pretty_assertions::assert_eq;

const URL_INFO: &str = r#"<?xml version="1.0"?>
<aws:UrlInfoResponse xmlns:aws="http://alexa.amazonaws.com/doc/2005-10-05/">
  <aws:Response>
    <aws:OperationRequest><aws:RequestId>abc-123</aws:RequestId></aws:OperationRequest>
    <aws:UrlInfoResult>
      <aws:Alexa>
        <aws:TrafficData><aws:DataUrl type="canonical">example.com/</aws:DataUrl><aws:Rank>42</aws:Rank></aws:TrafficData>
      </aws:Alexa>
    </aws:UrlInfoResult>
    <aws:ResponseStatus><aws:StatusCode>Success</aws:StatusCode></aws:ResponseStatus>
  </aws:Response>
</aws:UrlInfoResponse>"#;

const MOCK_BODY_HASH: &str = "mock-body-hash";
const MOCK_AUTHORIZATION: &str = "AWS4-HMAC-SHA256 Credential=mock, SignedHeaders=host;x-amz-date, Signature=mock";

/// Replies with a canned response and keeps every request it saw.
#[derive(Debug, Clone)]
struct MockHttpSend {
    status: StatusCode,
    body: &'static str,
    requests: Arc<Mutex<Vec<http::Request<Bytes>>>>,
}

impl MockHttpSend {
    fn new(status: StatusCode, body: &'static str) -> Self {
        Self {
            status,
            body,
            requests: Arc::default(),
        }
    }

    fn requests(&self) -> Vec<http::Request<Bytes>> {
        self.requests.lock().expect("lock poisoned").drain(..).collect()
    }
}

#[async_trait]
impl HttpSend for MockHttpSend {
    async fn http_send(
        &self,
        req: http::Request<Bytes>,
    ) -> awis_core::Result<http::Response<Bytes>> {
        self.requests.lock().expect("lock poisoned").push(req);
        Ok(http::Response::builder()
            .status(self.status)
            .body(Bytes::from_static(self.body.as_bytes()))
            .expect("response must be valid"))
    }
}

/// Returns a fixed signature and keeps the descriptors it was asked to sign.
#[derive(Debug, Clone, Default)]
struct MockSigner {
    seen: Arc<Mutex<Vec<SigningRequest>>>,
}

#[async_trait]
impl SignRequest for MockSigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        _: &Context,
        req: &SigningRequest,
        _: &Self::Credential,
    ) -> awis_core::Result<Signature> {
        self.seen.lock().expect("lock poisoned").push(req.clone());
        Ok(Signature {
            body_hash: MOCK_BODY_HASH.to_string(),
            authorization: MOCK_AUTHORIZATION.to_string(),
        })
    }
}

#[derive(Debug)]
struct FixedCredential(Credential);

#[async_trait]
impl ProvideCredential for FixedCredential {
    type Credential = Credential;

    async fn provide_credential(&self, _: &Context) -> awis_core::Result<Option<Credential>> {
        Ok(Some(self.0.clone()))
    }
}

fn context(http: MockHttpSend, envs: &[(&str, &str)]) -> Context {
    Context::new().with_http_send(http).with_env(StaticEnv {
        home_dir: None,
        envs: envs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>(),
    })
}

fn credential(session_token: Option<&str>) -> Credential {
    Credential {
        access_key_id: "access_key_id".to_string(),
        secret_access_key: "secret_access_key".to_string(),
        session_token: session_token.map(str::to_string),
        expires_in: None,
    }
}

fn config() -> Config {
    Config::default()
        .with_access_key_id("access_key_id")
        .with_secret_access_key("secret_access_key")
}

#[tokio::test]
async fn test_missing_credentials_sends_nothing() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();

    let http = MockHttpSend::new(StatusCode::OK, URL_INFO);
    let signer = MockSigner::default();
    let ctx = context(http.clone(), &[("AWS_ACCESS_KEY_ID", ""), ("AWS_SECRET_ACCESS_KEY", "")]);
    let client = Client::new(ctx, Config::default())
        .with_credential_provider(FixedCredential(credential(None)))
        .with_signer(signer.clone());

    let err = client
        .execute(&Query::url_info("example.com", "Rank"), HeaderMap::new())
        .await
        .expect_err("must fail");

    assert!(matches!(err, Error::MissingCredentials));
    assert!(err.to_string().contains("AWS_ACCESS_KEY_ID"));
    assert!(http.requests().is_empty());
    assert!(signer.seen.lock().expect("lock poisoned").is_empty());
    Ok(())
}

#[tokio::test]
async fn test_headers_follow_signature() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();

    for (token, expected) in [(None, None), (Some(""), None), (Some("tok"), Some("tok"))] {
        let http = MockHttpSend::new(StatusCode::OK, URL_INFO);
        let signer = MockSigner::default();
        let client = Client::new(context(http.clone(), &[]), config())
            .with_credential_provider(FixedCredential(credential(token)))
            .with_signer(signer.clone());

        let mut caller = HeaderMap::new();
        caller.insert(
            HeaderName::from_static("x-amz-date"),
            HeaderValue::from_static("19700101T000000Z"),
        );
        caller.insert(
            HeaderName::from_static("user-agent"),
            HeaderValue::from_static("awis-test"),
        );

        client
            .execute(&Query::url_info("example.com", "Rank"), caller)
            .await?;

        let reqs = http.requests();
        assert_eq!(reqs.len(), 1);
        let headers = reqs[0].headers();
        assert_eq!(headers["x-amz-content-sha256"], MOCK_BODY_HASH);
        assert_eq!(headers[AUTHORIZATION], MOCK_AUTHORIZATION);
        assert_eq!(headers[HOST], "awis.us-west-1.amazonaws.com");
        assert_eq!(headers["user-agent"], "awis-test");
        assert_eq!(
            headers
                .get("x-amz-security-token")
                .map(|v| v.to_str().expect("must be ascii")),
            expected
        );
        assert_ne!(headers["x-amz-date"], "19700101T000000Z");
    }
    Ok(())
}

#[tokio::test]
async fn test_header_and_signing_time_are_one_instant() -> Result<()> {
    let http = MockHttpSend::new(StatusCode::OK, URL_INFO);
    let signer = MockSigner::default();
    let client = Client::new(context(http.clone(), &[]), config())
        .with_credential_provider(FixedCredential(credential(None)))
        .with_signer(signer.clone());

    client
        .execute(&Query::url_info("example.com", "Rank"), HeaderMap::new())
        .await?;

    let seen = signer.seen.lock().expect("lock poisoned").clone();
    assert_eq!(seen.len(), 1);
    let signed = &seen[0];

    let reqs = http.requests();
    let sent_date = reqs[0].headers()["x-amz-date"].to_str()?.to_string();

    assert_eq!(sent_date, format_iso8601_with_separator(signed.time));
    assert_eq!(signed.headers["x-amz-date"], sent_date.as_str());
    assert_eq!(
        parse_iso8601_with_separator(&sent_date)?.timestamp(),
        signed.time.timestamp()
    );
    assert_eq!(signed.authority, "awis.us-west-1.amazonaws.com");
    assert_eq!(signed.path, "/api");
    assert_eq!(signed.service, "awis");
    assert!(signed.body.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_query_string_matches_signed_query() -> Result<()> {
    let http = MockHttpSend::new(StatusCode::OK, URL_INFO);
    let signer = MockSigner::default();
    let client = Client::new(context(http.clone(), &[]), config())
        .with_credential_provider(FixedCredential(credential(None)))
        .with_signer(signer.clone());

    let query = Query::url_info("example.com/a b", "Rank,LinksInCount");
    client.execute(&query, HeaderMap::new()).await?;

    let seen = signer.seen.lock().expect("lock poisoned").clone();
    assert_eq!(seen[0].query, query.params().to_vec());

    let reqs = http.requests();
    let uri = reqs[0].uri();
    assert_eq!(uri.host(), Some("awis.amazonaws.com"));
    assert_eq!(uri.path(), "/api");
    assert_eq!(
        uri.query(),
        Some(awis::canonical_query_string(query.params()).as_str())
    );
    assert_eq!(reqs[0].method(), http::Method::GET);
    Ok(())
}

#[tokio::test]
async fn test_success_returns_root_and_metadata() -> Result<()> {
    let http = MockHttpSend::new(StatusCode::OK, URL_INFO);
    let client = Client::new(context(http, &[]), config())
        .with_credential_provider(FixedCredential(credential(None)))
        .with_signer(MockSigner::default());

    let resp = client
        .execute(&Query::url_info("example.com", "Rank"), HeaderMap::new())
        .await?;

    assert_eq!(resp.request_id, "abc-123");
    assert_eq!(resp.status_code, "Success");
    assert_eq!(resp.root_name, "UrlInfoResponse");
    assert!(resp.body.get("UrlInfoResponse").is_none());
    assert_eq!(
        resp.body.text_at(&[
            "Response",
            "UrlInfoResult",
            "Alexa",
            "TrafficData",
            "Rank"
        ]),
        Some("42")
    );
    Ok(())
}

#[tokio::test]
async fn test_http_failure_skips_parsing() -> Result<()> {
    let http = MockHttpSend::new(StatusCode::FORBIDDEN, "<not xml");
    let client = Client::new(context(http, &[]), config())
        .with_credential_provider(FixedCredential(credential(None)))
        .with_signer(MockSigner::default());

    let err = client
        .execute(&Query::url_info("example.com", "Rank"), HeaderMap::new())
        .await
        .expect_err("must fail");

    assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
    Ok(())
}

#[tokio::test]
async fn test_missing_status_is_malformed() -> Result<()> {
    let http = MockHttpSend::new(
        StatusCode::OK,
        "<UrlInfoResponse><Response><OperationRequest><RequestId>abc-123</RequestId>\
         </OperationRequest></Response></UrlInfoResponse>",
    );
    let client = Client::new(context(http, &[]), config())
        .with_credential_provider(FixedCredential(credential(None)))
        .with_signer(MockSigner::default());

    let err = client
        .execute(&Query::url_info("example.com", "Rank"), HeaderMap::new())
        .await
        .expect_err("must fail");

    assert!(
        matches!(&err, Error::MalformedResponse { path } if path.ends_with("ResponseStatus.StatusCode")),
        "{err:?}"
    );
    Ok(())
}

#[tokio::test]
async fn test_credential_errors_propagate() -> Result<()> {
    #[derive(Debug)]
    struct Denied;

    #[async_trait]
    impl ProvideCredential for Denied {
        type Credential = Credential;

        async fn provide_credential(&self, _: &Context) -> awis_core::Result<Option<Credential>> {
            Err(awis_core::Error::credential_denied("role not assumable"))
        }
    }

    let http = MockHttpSend::new(StatusCode::OK, URL_INFO);
    let client = Client::new(context(http.clone(), &[]), config())
        .with_credential_provider(Denied)
        .with_signer(MockSigner::default());

    let err = client
        .execute(&Query::url_info("example.com", "Rank"), HeaderMap::new())
        .await
        .expect_err("must fail");

    match err {
        Error::Credential(e) => assert_eq!(e.kind(), awis_core::ErrorKind::CredentialDenied),
        e => panic!("unexpected error: {e:?}"),
    }
    assert!(http.requests().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_real_signer_authorization_scope() -> Result<()> {
    let http = MockHttpSend::new(StatusCode::OK, URL_INFO);
    let client = Client::new(context(http.clone(), &[]), config().with_region("eu-west-1"))
        .with_signer(RequestSigner::new());

    client
        .execute(&Query::url_info("example.com", "Rank"), HeaderMap::new())
        .await?;

    let reqs = http.requests();
    let auth = reqs[0].headers()[AUTHORIZATION].to_str()?.to_string();
    assert!(auth.starts_with("AWS4-HMAC-SHA256 Credential=access_key_id/"));
    assert!(auth.contains("/eu-west-1/awis/aws4_request"));
    assert!(auth.contains("SignedHeaders=host;x-amz-date,"));
    assert_eq!(reqs[0].headers()[HOST], "awis.eu-west-1.amazonaws.com");
    Ok(())
}

#[tokio::test]
async fn test_incomplete_credential_is_rejected() -> Result<()> {
    let http = MockHttpSend::new(StatusCode::OK, URL_INFO);
    let signer = MockSigner::default();
    let incomplete = Credential {
        secret_access_key: String::new(),
        ..credential(None)
    };
    let client = Client::new(context(http.clone(), &[]), config())
        .with_credential_provider(FixedCredential(incomplete))
        .with_signer(signer.clone());

    let err = client
        .execute(&Query::url_info("example.com", "Rank"), HeaderMap::new())
        .await
        .expect_err("must fail");

    match err {
        Error::Credential(e) => assert_eq!(e.kind(), awis_core::ErrorKind::CredentialInvalid),
        e => panic!("unexpected error: {e:?}"),
    }
    assert!(http.requests().is_empty());
    assert!(signer.seen.lock().expect("lock poisoned").is_empty());
    Ok(())
}

#[tokio::test]
async fn test_key_only_config_falls_through_to_profile() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();

    let config_file = format!("{}/testdata/default_config", env!("CARGO_MANIFEST_DIR"));
    let credentials_file = format!("{}/testdata/not_exist", env!("CARGO_MANIFEST_DIR"));
    let http = MockHttpSend::new(StatusCode::OK, URL_INFO);
    let ctx = context(
        http.clone(),
        &[
            ("AWS_CONFIG_FILE", config_file.as_str()),
            ("AWS_SHARED_CREDENTIALS_FILE", credentials_file.as_str()),
            ("AWS_EC2_METADATA_DISABLED", "true"),
        ],
    )
    .with_file_read(TokioFileRead);
    let client = Client::new(ctx, Config::default().with_access_key_id("ak_only"))
        .with_signer(RequestSigner::new());

    client
        .execute(&Query::url_info("example.com", "Rank"), HeaderMap::new())
        .await?;

    let reqs = http.requests();
    assert_eq!(reqs.len(), 1);
    let auth = reqs[0].headers()[AUTHORIZATION].to_str()?.to_string();
    assert!(
        auth.starts_with("AWS4-HMAC-SHA256 Credential=config_access_key_id/"),
        "unexpected authorization: {auth}"
    );
    Ok(())
}
