//! Credential providers and their selection.

use crate::{Config, Context, Credential, Error, Result};
use log::warn;
use std::fmt::Debug;
use std::sync::Arc;

mod chain;
pub use chain::ProvideCredentialChain;

mod env;
pub use env::EnvCredentialProvider;

mod shared_file;
pub use shared_file::SharedFileCredentialProvider;

mod default;
pub use default::DefaultCredentialProvider;

mod assume_role;
pub use assume_role::AssumeRoleCredentialProvider;
pub use assume_role::AssumeRoleRequest;
pub use assume_role::ExchangeToken;

/// ProvideCredential is the capability every credential source implements.
///
/// - `Ok(Some(cred))`: this source produced credentials.
/// - `Ok(None)`: this source has nothing to offer (e.g. env vars unset);
///   chains move on to the next source.
/// - `Err(_)`: this source failed; the error carries the cause.
#[async_trait::async_trait]
pub trait ProvideCredential: Debug + Send + Sync + 'static {
    /// Load credentials from this source.
    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Credential>>;
}

/// Select the active credential provider for the given configuration.
///
/// Precedence, evaluated once:
///
/// 1. assume-role ARN configured
/// 2. shared credentials file configured
/// 3. default resolution chain
///
/// Assume-role requires the token-exchange capability to have been supplied.
pub fn provider_from_config(
    cfg: &Config,
    exchange: Option<Arc<dyn ExchangeToken>>,
) -> Result<Box<dyn ProvideCredential>> {
    let has_role = !cfg.assume_role.arn.is_empty();
    let has_file = !cfg.shared_credentials_watcher.file_location.is_empty();

    if has_role && has_file {
        warn!(
            "both assume_role and shared_credentials_watcher are configured; \
             assume_role takes precedence and the credentials file will not be used"
        );
    }

    if has_role {
        let exchange = exchange.ok_or_else(|| {
            Error::config_invalid("assume_role is configured but no token exchange was supplied")
        })?;
        return Ok(Box::new(AssumeRoleCredentialProvider::new(
            cfg.assume_role.arn.clone(),
            exchange,
        )
        .with_session_name(cfg.assume_role.session_name.clone())
        .with_sts_region(cfg.assume_role.sts_region.clone())));
    }

    if has_file {
        return Ok(Box::new(SharedFileCredentialProvider::new(
            cfg.shared_credentials_watcher.file_location.clone(),
            cfg.profile_name(),
        )));
    }

    Ok(Box::new(DefaultCredentialProvider::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AssumeRoleConfig, SharedCredentialsWatcherConfig};

    #[derive(Debug)]
    struct DenyExchange;

    #[async_trait::async_trait]
    impl ExchangeToken for DenyExchange {
        async fn exchange(&self, _: &Context, _: &AssumeRoleRequest) -> Result<Credential> {
            Err(Error::unexpected("exchange must not be called"))
        }
    }

    fn base_config() -> Config {
        Config {
            region: "us-east-1".to_string(),
            service: "aps".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_selects_default_provider() {
        let provider = provider_from_config(&base_config(), None).unwrap();
        assert!(format!("{provider:?}").contains("DefaultCredentialProvider"));
    }

    #[test]
    fn test_selects_shared_file_provider() {
        let mut cfg = base_config();
        cfg.shared_credentials_watcher = SharedCredentialsWatcherConfig {
            file_location: "/tmp/creds".to_string(),
            profile_name: String::new(),
        };

        let provider = provider_from_config(&cfg, None).unwrap();
        assert!(format!("{provider:?}").contains("SharedFileCredentialProvider"));
    }

    #[test]
    fn test_assume_role_takes_precedence() {
        let mut cfg = base_config();
        cfg.shared_credentials_watcher = SharedCredentialsWatcherConfig {
            file_location: "/tmp/creds".to_string(),
            profile_name: String::new(),
        };
        cfg.assume_role = AssumeRoleConfig {
            arn: "arn:aws:iam::123456789012:role/demo".to_string(),
            session_name: "demo".to_string(),
            sts_region: "us-east-1".to_string(),
        };

        let provider = provider_from_config(&cfg, Some(Arc::new(DenyExchange))).unwrap();
        assert!(format!("{provider:?}").contains("AssumeRoleCredentialProvider"));
    }

    #[test]
    fn test_assume_role_requires_exchange() {
        let mut cfg = base_config();
        cfg.assume_role.arn = "arn:aws:iam::123456789012:role/demo".to_string();

        let err = provider_from_config(&cfg, None).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::ConfigInvalid);
    }
}
