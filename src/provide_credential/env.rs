use crate::constants::{AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY, AWS_SESSION_TOKEN};
use crate::{Context, Credential, ProvideCredential, Result};

/// EnvCredentialProvider reads credentials from the standard AWS environment
/// variables. First stop of the default resolution chain.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentialProvider;

impl EnvCredentialProvider {
    /// Create a new EnvCredentialProvider.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl ProvideCredential for EnvCredentialProvider {
    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Credential>> {
        let (Some(access_key_id), Some(secret_access_key)) = (
            ctx.env_var(AWS_ACCESS_KEY_ID),
            ctx.env_var(AWS_SECRET_ACCESS_KEY),
        ) else {
            return Ok(None);
        };

        if access_key_id.is_empty() || secret_access_key.is_empty() {
            return Ok(None);
        }

        Ok(Some(Credential {
            access_key_id,
            secret_access_key,
            session_token: ctx.env_var(AWS_SESSION_TOKEN),
            expires_in: None,
        }))
    }
}
