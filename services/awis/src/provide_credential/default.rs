use crate::provide_credential::{
    EnvCredentialProvider, IMDSv2CredentialProvider, ProfileCredentialProvider,
    StaticCredentialProvider,
};
use crate::{Config, Credential};
use async_trait::async_trait;
use awis_core::{Context, ProvideCredential, ProvideCredentialChain, Result};

/// DefaultCredentialProvider is a loader that will try to load credential via default chains.
///
/// Resolution order:
///
/// 1. Keys set on [`Config`] (only with [`DefaultCredentialProvider::from_config`])
/// 2. Environment variables
/// 3. Shared config (`~/.aws/credentials`, `~/.aws/config`)
/// 4. EC2 IMDSv2
#[derive(Debug)]
pub struct DefaultCredentialProvider {
    chain: ProvideCredentialChain<Credential>,
}

impl Default for DefaultCredentialProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultCredentialProvider {
    /// Create a new `DefaultCredentialProvider` instance.
    pub fn new() -> Self {
        let chain = ProvideCredentialChain::new()
            .push(EnvCredentialProvider::new())
            .push(ProfileCredentialProvider::new())
            .push(IMDSv2CredentialProvider::new());

        Self { chain }
    }

    /// Build the chain for `config`: its keys go first when both are set and
    /// its profile selects the shared config section.
    pub fn from_config(config: &Config) -> Self {
        let mut profile = ProfileCredentialProvider::new();
        if let Some(name) = &config.profile {
            profile = profile.with_profile(name);
        }

        let chain = ProvideCredentialChain::new()
            .push(StaticCredentialProvider::from_config(config))
            .push(EnvCredentialProvider::new())
            .push(profile)
            .push(IMDSv2CredentialProvider::new());

        Self { chain }
    }

    /// Create with a custom credential chain.
    pub fn with_chain(chain: ProvideCredentialChain<Credential>) -> Self {
        Self { chain }
    }
}

#[async_trait]
impl ProvideCredential for DefaultCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        self.chain.provide_credential(ctx).await
    }
}
