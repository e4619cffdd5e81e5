use crate::constants::*;
use crate::provide_credential::DefaultCredentialProvider;
use crate::response::{normalize, validate, AwisResponse};
use crate::sign_request::canonical_query_string;
use crate::xml::XmlTree;
use crate::{Config, Credential, Error, Query, RequestSigner, Result};
use awis_core::time::{format_iso8601_with_separator, now};
use awis_core::{
    Context, ProvideCredential, SignRequest, Signature, SigningCredential, SigningRequest,
};
use bytes::Bytes;
use http::header::{AUTHORIZATION, HOST};
use http::{HeaderMap, HeaderValue, Method};
use log::{debug, info};
use std::sync::Arc;

/// Client sends signed requests to AWIS and hands back the normalized answer.
///
/// A client holds no state between calls. Credentials are resolved again on
/// every [`Client::execute`].
#[derive(Clone, Debug)]
pub struct Client {
    ctx: Context,
    config: Config,
    loader: Arc<dyn ProvideCredential<Credential = Credential>>,
    builder: Arc<dyn SignRequest<Credential = Credential>>,
}

impl Client {
    /// Create a client that resolves credentials through
    /// [`DefaultCredentialProvider::from_config`] and signs with [`RequestSigner`].
    pub fn new(ctx: Context, config: Config) -> Self {
        let loader = DefaultCredentialProvider::from_config(&config);
        Self {
            ctx,
            config,
            loader: Arc::new(loader),
            builder: Arc::new(RequestSigner::new()),
        }
    }

    /// Replace the credential provider.
    pub fn with_credential_provider(
        mut self,
        loader: impl ProvideCredential<Credential = Credential>,
    ) -> Self {
        self.loader = Arc::new(loader);
        self
    }

    /// Replace the request signer.
    pub fn with_signer(mut self, builder: impl SignRequest<Credential = Credential>) -> Self {
        self.builder = Arc::new(builder);
        self
    }

    /// The config this client was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run one AWIS action.
    ///
    /// `headers` are sent along with the request. `host`, `x-amz-date`,
    /// `x-amz-content-sha256`, `x-amz-security-token` and `authorization` are
    /// generated and replace any caller value of the same name.
    pub async fn execute(&self, query: &Query, headers: HeaderMap) -> Result<AwisResponse> {
        self.check_keys()?;

        let cred = self.load_credential().await?;

        let hostname = self.config.hostname();
        let time = now();
        let amz_date = format_iso8601_with_separator(time);

        let mut signed_headers = headers.clone();
        signed_headers.insert(HOST, header_value(&hostname)?);
        signed_headers.insert(X_AMZ_DATE, header_value(&amz_date)?);

        let req = SigningRequest {
            method: Method::GET,
            authority: hostname.clone(),
            path: AWIS_PATH.to_string(),
            query: query.params().to_vec(),
            headers: signed_headers,
            body: Bytes::new(),
            time,
            region: self.config.region().to_string(),
            service: AWIS_SERVICE.to_string(),
        };
        let signature = self
            .builder
            .sign_request(&self.ctx, &req, &cred)
            .await
            .map_err(Error::Signing)?;

        let headers = build_headers(
            headers,
            &hostname,
            &amz_date,
            &signature,
            cred.session_token(),
        )?;

        let url = match canonical_query_string(query.params()) {
            qs if qs.is_empty() => self.config.endpoint().to_string(),
            qs => format!("{}?{qs}", self.config.endpoint()),
        };
        debug!("sending request to {url}");

        let mut http_req = http::Request::builder()
            .method(Method::GET)
            .uri(&url)
            .body(Bytes::new())
            .map_err(|e| {
                Error::Transport(
                    awis_core::Error::request_invalid("failed to build request")
                        .with_source(e)
                        .with_context(format!("url: {url}")),
                )
            })?;
        *http_req.headers_mut() = headers;

        let resp = self
            .ctx
            .http_send(http_req)
            .await
            .map_err(Error::Transport)?;

        validate(resp.status())?;

        let body = String::from_utf8(resp.into_body().to_vec())?;
        let resp = normalize(XmlTree::parse(&body)?)?;

        info!("request id: {}", resp.request_id);
        info!("response status: {}", resp.status_code);
        Ok(resp)
    }

    /// Fail early when neither key nor secret is known.
    fn check_keys(&self) -> Result<()> {
        let key = self
            .config
            .access_key_id
            .clone()
            .or_else(|| self.ctx.env_var(AWS_ACCESS_KEY_ID))
            .unwrap_or_default();
        let secret = self
            .config
            .secret_access_key
            .clone()
            .or_else(|| self.ctx.env_var(AWS_SECRET_ACCESS_KEY))
            .unwrap_or_default();

        if key.is_empty() && secret.is_empty() {
            return Err(Error::MissingCredentials);
        }
        Ok(())
    }

    async fn load_credential(&self) -> Result<Credential> {
        let cred = self
            .loader
            .provide_credential(&self.ctx)
            .await
            .map_err(Error::Credential)?
            .ok_or_else(|| {
                Error::Credential(awis_core::Error::credential_invalid(
                    "no valid credential found in the provider chain",
                ))
            })?;
        if !cred.is_valid() {
            return Err(Error::Credential(awis_core::Error::credential_invalid(
                "resolved credential is incomplete or expired",
            )));
        }

        if self.config.verbose {
            info!("using credential {cred:?} for region {}", self.config.region());
        }
        Ok(cred)
    }
}

fn header_value(v: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(v).map_err(|e| Error::Signing(e.into()))
}

/// Merge generated headers over the caller's.
pub(crate) fn build_headers(
    mut headers: HeaderMap,
    hostname: &str,
    amz_date: &str,
    signature: &Signature,
    session_token: Option<&str>,
) -> Result<HeaderMap> {
    headers.insert(HOST, header_value(hostname)?);
    headers.insert(X_AMZ_DATE, header_value(amz_date)?);
    headers.insert(X_AMZ_CONTENT_SHA_256, header_value(&signature.body_hash)?);
    if let Some(token) = session_token.filter(|v| !v.is_empty()) {
        let mut value = header_value(token)?;
        value.set_sensitive(true);
        headers.insert(X_AMZ_SECURITY_TOKEN, value);
    }
    let mut value = header_value(&signature.authorization)?;
    value.set_sensitive(true);
    headers.insert(AUTHORIZATION, value);
    Ok(headers)
}
