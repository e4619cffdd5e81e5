use crate::constants::*;
use awis_core::utils::Redact;
use awis_core::Context;
use std::fmt::{Debug, Formatter};

/// Config carries everything a [`Client`](crate::Client) needs to know about
/// where and as whom to send requests.
///
/// Build it explicitly, then call [`Config::from_env`] to fill what is still
/// missing from the environment. Values set explicitly are never overwritten.
#[derive(Clone, Default)]
pub struct Config {
    /// `access_key_id` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: `AWS_ACCESS_KEY_ID`
    pub access_key_id: Option<String>,
    /// `secret_access_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: `AWS_SECRET_ACCESS_KEY`
    pub secret_access_key: Option<String>,
    /// `session_token` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: `AWS_SESSION_TOKEN`
    pub session_token: Option<String>,
    /// `region` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: `AWS_REGION`, then `AWS_DEFAULT_REGION`
    /// - `us-west-1` otherwise, see [`Config::region`]
    pub region: Option<String>,
    /// Shared config profile, loaded from `AWS_PROFILE` if unset.
    pub profile: Option<String>,
    /// Full URL requests are sent to, loaded from `AWIS_ENDPOINT` if unset.
    ///
    /// Defaults to `https://awis.amazonaws.com/api`.
    pub endpoint: Option<String>,
    /// Log credential resolution at info level. Enabled by `AWIS_VERBOSE`.
    pub verbose: bool,
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("access_key_id", &Redact::from(&self.access_key_id))
            .field("secret_access_key", &Redact::from(&self.secret_access_key))
            .field("session_token", &Redact::from(&self.session_token))
            .field("region", &self.region)
            .field("profile", &self.profile)
            .field("endpoint", &self.endpoint)
            .field("verbose", &self.verbose)
            .finish()
    }
}

impl Config {
    /// Fill unset fields from the environment visible to `ctx`.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        let envs = ctx.env_vars();

        if self.access_key_id.is_none() {
            self.access_key_id = envs.get(AWS_ACCESS_KEY_ID).cloned();
        }
        if self.secret_access_key.is_none() {
            self.secret_access_key = envs.get(AWS_SECRET_ACCESS_KEY).cloned();
        }
        if self.session_token.is_none() {
            self.session_token = envs.get(AWS_SESSION_TOKEN).cloned();
        }
        if self.region.is_none() {
            self.region = envs
                .get(AWS_REGION)
                .filter(|v| !v.is_empty())
                .or_else(|| envs.get(AWS_DEFAULT_REGION).filter(|v| !v.is_empty()))
                .cloned();
        }
        if self.profile.is_none() {
            self.profile = envs.get(AWS_PROFILE).cloned();
        }
        if self.endpoint.is_none() {
            self.endpoint = envs.get(AWIS_ENDPOINT).cloned();
        }
        if let Some(v) = envs.get(AWIS_VERBOSE) {
            self.verbose |= matches!(v.to_lowercase().as_str(), "1" | "true" | "on");
        }
        self
    }

    /// Set the access key id.
    pub fn with_access_key_id(mut self, v: impl Into<String>) -> Self {
        self.access_key_id = Some(v.into());
        self
    }

    /// Set the secret access key.
    pub fn with_secret_access_key(mut self, v: impl Into<String>) -> Self {
        self.secret_access_key = Some(v.into());
        self
    }

    /// Set the session token.
    pub fn with_session_token(mut self, v: impl Into<String>) -> Self {
        self.session_token = Some(v.into());
        self
    }

    /// Set the region.
    pub fn with_region(mut self, v: impl Into<String>) -> Self {
        self.region = Some(v.into());
        self
    }

    /// Set the endpoint.
    pub fn with_endpoint(mut self, v: impl Into<String>) -> Self {
        self.endpoint = Some(v.into());
        self
    }

    /// Region to sign for.
    pub fn region(&self) -> &str {
        self.region.as_deref().unwrap_or(AWIS_DEFAULT_REGION)
    }

    /// Endpoint to send to.
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(AWIS_DEFAULT_ENDPOINT)
    }

    /// Hostname the request is signed for: `awis.<region>.amazonaws.com`.
    pub fn hostname(&self) -> String {
        format!("awis.{}.amazonaws.com", self.region())
    }
}
