use crate::{Context, Credential, ProvideCredential, Result};
use std::fmt::Debug;
use std::sync::Arc;

/// Parameters for one role-assumption exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssumeRoleRequest {
    /// ARN of the role to assume.
    pub role_arn: String,
    /// Session name attached to the issued credentials.
    pub session_name: String,
    /// Region of the token service endpoint.
    pub sts_region: String,
}

/// ExchangeToken is the opaque token-issuing-service capability: trade a role
/// ARN for temporary credentials.
///
/// The wire exchange lives outside this crate; implementations are injected
/// at construction. Errors propagate to the caller unchanged.
#[async_trait::async_trait]
pub trait ExchangeToken: Debug + Send + Sync + 'static {
    /// Exchange the role for temporary credentials.
    async fn exchange(&self, ctx: &Context, req: &AssumeRoleRequest) -> Result<Credential>;
}

/// AssumeRoleCredentialProvider loads temporary credentials through an
/// [`ExchangeToken`] capability.
///
/// Issued credentials carry an expiry; the cache refreshes them by calling
/// back into this provider once they near expiration.
#[derive(Debug)]
pub struct AssumeRoleCredentialProvider {
    role_arn: String,
    session_name: String,
    sts_region: String,
    exchange: Arc<dyn ExchangeToken>,
}

impl AssumeRoleCredentialProvider {
    /// Create a new provider for the given role.
    pub fn new(role_arn: String, exchange: Arc<dyn ExchangeToken>) -> Self {
        Self {
            role_arn,
            session_name: "sigv4auth".to_string(),
            sts_region: String::new(),
            exchange,
        }
    }

    /// Set the role session name. Empty values keep the default.
    pub fn with_session_name(mut self, name: String) -> Self {
        if !name.is_empty() {
            self.session_name = name;
        }
        self
    }

    /// Set the token service region.
    pub fn with_sts_region(mut self, region: String) -> Self {
        self.sts_region = region;
        self
    }
}

#[async_trait::async_trait]
impl ProvideCredential for AssumeRoleCredentialProvider {
    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Credential>> {
        let req = AssumeRoleRequest {
            role_arn: self.role_arn.clone(),
            session_name: self.session_name.clone(),
            sts_region: self.sts_region.clone(),
        };

        let cred = self.exchange.exchange(ctx, &req).await?;
        Ok(Some(cred))
    }
}
