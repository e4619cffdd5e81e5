use crate::constants::{AWS_EC2_METADATA_DISABLED, AWS_EC2_METADATA_SERVICE_ENDPOINT};
use crate::provide_credential::utils::parse_imds_error;
use crate::Credential;
use async_trait::async_trait;
use awis_core::time::{now, parse_rfc3339, DateTime};
use awis_core::{Context, Error, ProvideCredential, Result};
use bytes::Bytes;
use http::header::CONTENT_LENGTH;
use http::{Method, StatusCode};
use serde::Deserialize;
use std::sync::{Arc, Mutex};

const IMDS_DEFAULT_ENDPOINT: &str = "http://169.254.169.254";
const IMDS_TOKEN_HEADER: &str = "x-aws-ec2-metadata-token";
const IMDS_TOKEN_TTL_HEADER: &str = "x-aws-ec2-metadata-token-ttl-seconds";
/// 21600s (6h) is recommended by AWS.
const IMDS_TOKEN_TTL_SECONDS: i64 = 21600;

/// IMDSv2CredentialProvider loads the role credentials of an EC2 instance.
///
/// A session token is fetched first and cached until ten minutes before it
/// expires. Set `AWS_EC2_METADATA_DISABLED=true` to skip this provider.
#[derive(Debug, Clone)]
pub struct IMDSv2CredentialProvider {
    endpoint: Option<String>,
    token: Arc<Mutex<(String, DateTime)>>,
}

impl Default for IMDSv2CredentialProvider {
    fn default() -> Self {
        Self {
            endpoint: None,
            token: Arc::new(Mutex::new((String::new(), DateTime::default()))),
        }
    }
}

impl IMDSv2CredentialProvider {
    /// Create a new `IMDSv2CredentialProvider` instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the endpoint for the metadata service.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    fn get_endpoint(&self, ctx: &Context) -> String {
        self.endpoint
            .clone()
            .or_else(|| ctx.env_var(AWS_EC2_METADATA_SERVICE_ENDPOINT))
            .unwrap_or_else(|| IMDS_DEFAULT_ENDPOINT.to_string())
    }

    async fn load_ec2_metadata_token(&self, ctx: &Context) -> Result<String> {
        {
            let (token, expires_in) = self.token.lock().expect("lock poisoned").clone();
            if expires_in > now() {
                return Ok(token);
            }
        }

        let endpoint = self.get_endpoint(ctx);
        let url = format!("{endpoint}/latest/api/token");
        let req = http::Request::builder()
            .uri(&url)
            .method(Method::PUT)
            .header(CONTENT_LENGTH, "0")
            .header(IMDS_TOKEN_TTL_HEADER, IMDS_TOKEN_TTL_SECONDS.to_string())
            .body(Bytes::new())
            .map_err(|e| {
                Error::request_invalid("failed to build IMDS token request")
                    .with_source(e)
                    .with_context(format!("url: {url}"))
            })?;

        let resp = ctx.http_send_as_string(req).await.map_err(|e| {
            Error::unexpected("failed to connect to IMDS")
                .with_source(e)
                .with_context(format!("endpoint: {endpoint}"))
                .with_context("hint: check if running on EC2 instance")
                .set_retryable(true)
        })?;

        if resp.status() != StatusCode::OK {
            return Err(parse_imds_error(
                "fetch_imds_token",
                resp.status(),
                resp.body(),
            ));
        }
        let ec2_token = resp.into_body();
        // Expire ten minutes early to enforce re-read.
        let expires_in = now() + chrono::TimeDelta::seconds(IMDS_TOKEN_TTL_SECONDS - 600);

        {
            *self.token.lock().expect("lock poisoned") = (ec2_token.clone(), expires_in);
        }

        Ok(ec2_token)
    }

    async fn get_with_token(
        &self,
        ctx: &Context,
        token: &str,
        url: String,
        operation: &str,
    ) -> Result<String> {
        let req = http::Request::builder()
            .uri(&url)
            .method(Method::GET)
            .header(IMDS_TOKEN_HEADER, token)
            .body(Bytes::new())
            .map_err(|e| {
                Error::request_invalid(format!("failed to build IMDS request for {operation}"))
                    .with_source(e)
                    .with_context(format!("url: {url}"))
            })?;

        let resp = ctx.http_send_as_string(req).await.map_err(|e| {
            Error::unexpected(format!("failed to send IMDS request for {operation}"))
                .with_source(e)
                .with_context(format!("operation: {operation}"))
                .set_retryable(true)
        })?;

        if resp.status() != StatusCode::OK {
            return Err(parse_imds_error(operation, resp.status(), resp.body()));
        }
        Ok(resp.into_body())
    }
}

#[async_trait]
impl ProvideCredential for IMDSv2CredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        if ctx
            .env_var(AWS_EC2_METADATA_DISABLED)
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
        {
            return Ok(None);
        }

        let token = self.load_ec2_metadata_token(ctx).await?;
        let endpoint = self.get_endpoint(ctx);

        // List all credentials that node has.
        let profile_name = self
            .get_with_token(
                ctx,
                &token,
                format!("{endpoint}/latest/meta-data/iam/security-credentials/"),
                "list_instance_profiles",
            )
            .await?;
        let profile_name = profile_name.lines().next().unwrap_or_default().trim();
        if profile_name.is_empty() {
            return Err(
                Error::config_invalid("no IAM role attached to EC2 instance")
                    .with_context("hint: attach an IAM role to your EC2 instance"),
            );
        }

        let content = self
            .get_with_token(
                ctx,
                &token,
                format!("{endpoint}/latest/meta-data/iam/security-credentials/{profile_name}"),
                "fetch_credentials",
            )
            .await
            .map_err(|e| e.with_context(format!("profile: {profile_name}")))?;

        let resp: Ec2MetadataIamSecurityCredentials =
            serde_json::from_str(&content).map_err(|e| {
                Error::unexpected("failed to parse IMDS credentials response")
                    .with_source(e)
                    .with_context(format!("response_length: {}", content.len()))
                    .with_context(format!("profile: {profile_name}"))
            })?;

        match resp.code.as_str() {
            "Success" => {}
            "AssumeRoleUnauthorizedAccess" => {
                return Err(Error::credential_denied(format!(
                    "EC2 instance not authorized to assume role: {}",
                    resp.message
                ))
                .with_context(format!("error_code: {}", resp.code))
                .with_context(format!("profile: {profile_name}")));
            }
            code if code.contains("Expired") => {
                return Err(Error::credential_invalid(format!(
                    "IMDS credentials expired: {}",
                    resp.message
                ))
                .with_context(format!("error_code: {}", resp.code)));
            }
            _ => {
                return Err(Error::unexpected(format!(
                    "IMDS returned error: [{}] {}",
                    resp.code, resp.message
                ))
                .with_context(format!("profile: {profile_name}")));
            }
        }

        Ok(Some(Credential {
            access_key_id: resp.access_key_id,
            secret_access_key: resp.secret_access_key,
            session_token: Some(resp.token),
            expires_in: Some(parse_rfc3339(&resp.expiration).map_err(|e| {
                e.with_context(format!("expiration_value: {}", resp.expiration))
            })?),
        }))
    }
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct Ec2MetadataIamSecurityCredentials {
    access_key_id: String,
    secret_access_key: String,
    token: String,
    expiration: String,

    code: String,
    message: String,
}
