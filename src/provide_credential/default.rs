use crate::constants::{AWS_PROFILE, AWS_SHARED_CREDENTIALS_FILE};
use crate::provide_credential::{
    EnvCredentialProvider, ProvideCredentialChain, SharedFileCredentialProvider,
};
use crate::{Context, Credential, ErrorKind, ProvideCredential, Result};
use log::debug;

/// DefaultCredentialProvider resolves credentials the way the ambient
/// environment does, with no explicit source configured.
///
/// Resolution order:
///
/// 1. Environment variables
/// 2. Shared credentials file at its standard location
///    (`AWS_SHARED_CREDENTIALS_FILE` or `~/.aws/credentials`)
#[derive(Debug)]
pub struct DefaultCredentialProvider {
    chain: ProvideCredentialChain,
}

impl Default for DefaultCredentialProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultCredentialProvider {
    /// Create a new `DefaultCredentialProvider`.
    pub fn new() -> Self {
        let chain = ProvideCredentialChain::new()
            .push(EnvCredentialProvider::new())
            .push(StandardLocationProvider);

        Self { chain }
    }

    /// Create with a custom credential chain.
    pub fn with_chain(chain: ProvideCredentialChain) -> Self {
        Self { chain }
    }
}

#[async_trait::async_trait]
impl ProvideCredential for DefaultCredentialProvider {
    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Credential>> {
        self.chain.provide_credential(ctx).await
    }
}

/// Reads the shared credentials file at its standard location, resolving the
/// path and profile from the environment at call time.
///
/// Unlike the explicitly configured [`SharedFileCredentialProvider`], an
/// absent file or profile here just means "nothing from this source".
#[derive(Debug, Clone, Copy)]
struct StandardLocationProvider;

#[async_trait::async_trait]
impl ProvideCredential for StandardLocationProvider {
    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Credential>> {
        let path = ctx
            .env_var(AWS_SHARED_CREDENTIALS_FILE)
            .unwrap_or_else(|| "~/.aws/credentials".to_string());
        let profile = ctx
            .env_var(AWS_PROFILE)
            .unwrap_or_else(|| "default".to_string());

        match SharedFileCredentialProvider::new(path, profile)
            .provide_credential(ctx)
            .await
        {
            Ok(cred) => Ok(cred),
            Err(err) if matches!(err.kind(), ErrorKind::ProfileNotFound | ErrorKind::Unexpected) => {
                debug!("no credentials at standard shared file location: {err:?}");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}
