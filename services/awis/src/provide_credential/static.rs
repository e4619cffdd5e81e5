use crate::{Config, Credential};
use async_trait::async_trait;
use awis_core::{Context, ProvideCredential, Result};

/// StaticCredentialProvider serves keys fixed at construction, usually the
/// ones set on [`Config`].
///
/// A key pair missing either half yields `None`, so a chain moves on to the
/// environment, the shared config files and IMDS.
#[derive(Debug, Clone)]
pub struct StaticCredentialProvider {
    credential: Credential,
}

impl StaticCredentialProvider {
    /// Serve `access_key_id` and `secret_access_key`.
    pub fn new(access_key_id: &str, secret_access_key: &str) -> Self {
        Self {
            credential: Credential {
                access_key_id: access_key_id.to_string(),
                secret_access_key: secret_access_key.to_string(),
                ..Default::default()
            },
        }
    }

    /// Serve the keys set on `config`, with its session token if any.
    pub fn from_config(config: &Config) -> Self {
        let provider = Self::new(
            config.access_key_id.as_deref().unwrap_or_default(),
            config.secret_access_key.as_deref().unwrap_or_default(),
        );
        match &config.session_token {
            Some(token) => provider.with_session_token(token),
            None => provider,
        }
    }

    /// Attach a session token. An empty token is dropped.
    pub fn with_session_token(mut self, token: &str) -> Self {
        self.credential.session_token = Some(token.to_string()).filter(|v| !v.is_empty());
        self
    }

    fn is_complete(&self) -> bool {
        !self.credential.access_key_id.is_empty() && !self.credential.secret_access_key.is_empty()
    }
}

#[async_trait]
impl ProvideCredential for StaticCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, _: &Context) -> Result<Option<Self::Credential>> {
        if !self.is_complete() {
            return Ok(None);
        }
        Ok(Some(self.credential.clone()))
    }
}
