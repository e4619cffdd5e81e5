use crate::constants::*;
use crate::Credential;
use async_trait::async_trait;
use awis_core::{Context, Error, ProvideCredential, Result};
use ini::Ini;
use log::debug;

/// ProfileCredentialProvider loads credentials from the shared AWS files.
///
/// This provider loads credentials from:
/// - `~/.aws/credentials` (or the path specified by `AWS_SHARED_CREDENTIALS_FILE`)
/// - `~/.aws/config` (or the path specified by `AWS_CONFIG_FILE`)
///
/// The profile to use is determined by:
/// 1. The profile specified via `with_profile()`
/// 2. The `AWS_PROFILE` environment variable
/// 3. Default to "default"
#[derive(Debug, Default, Clone)]
pub struct ProfileCredentialProvider {
    profile: Option<String>,
    config_file: Option<String>,
    credentials_file: Option<String>,
}

/// Which of the two shared files is being read. Section naming differs.
#[derive(Debug, Clone, Copy)]
enum SharedFile {
    Credentials,
    Config,
}

impl ProfileCredentialProvider {
    /// Create a new ProfileCredentialProvider with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the profile name to use.
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    /// Set the path to the config file.
    pub fn with_config_file(mut self, path: impl Into<String>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Set the path to the credentials file.
    pub fn with_credentials_file(mut self, path: impl Into<String>) -> Self {
        self.credentials_file = Some(path.into());
        self
    }

    async fn load(&self, ctx: &Context, file: SharedFile, profile: &str) -> Result<Option<Credential>> {
        let (configured, env_key, fallback) = match file {
            SharedFile::Credentials => (
                &self.credentials_file,
                AWS_SHARED_CREDENTIALS_FILE,
                "~/.aws/credentials",
            ),
            SharedFile::Config => (&self.config_file, AWS_CONFIG_FILE, "~/.aws/config"),
        };
        let path = configured
            .clone()
            .or_else(|| ctx.env_var(env_key))
            .unwrap_or_else(|| fallback.to_string());

        let Some(expanded_path) = ctx.expand_home_dir(&path) else {
            debug!("failed to expand homedir for path: {path}");
            return Ok(None);
        };

        let content = match ctx.file_read(&expanded_path).await {
            Ok(content) => content,
            Err(err) => {
                debug!("failed to read {file:?} file {expanded_path}: {err:?}");
                return Ok(None);
            }
        };

        let conf = Ini::load_from_str(&String::from_utf8_lossy(&content)).map_err(|e| {
            Error::config_invalid(format!("failed to parse {file:?} file"))
                .with_source(e)
                .with_context(format!("path: {expanded_path}"))
        })?;

        let section = match (file, profile) {
            (SharedFile::Config, x) if x != "default" => format!("profile {x}"),
            (_, x) => x.to_string(),
        };

        let Some(props) = conf.section(Some(section.as_str())) else {
            debug!("section {section} not found in {expanded_path}");
            return Ok(None);
        };

        match (
            props.get("aws_access_key_id"),
            props.get("aws_secret_access_key"),
        ) {
            (Some(ak), Some(sk)) => Ok(Some(Credential {
                access_key_id: ak.to_string(),
                secret_access_key: sk.to_string(),
                session_token: props.get("aws_session_token").map(|s| s.to_string()),
                expires_in: None,
            })),
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl ProvideCredential for ProfileCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let profile = self
            .profile
            .clone()
            .or_else(|| ctx.env_var(AWS_PROFILE))
            .unwrap_or_else(|| "default".to_string());

        if let Some(cred) = self.load(ctx, SharedFile::Credentials, &profile).await? {
            return Ok(Some(cred));
        }

        self.load(ctx, SharedFile::Config, &profile).await
    }
}
