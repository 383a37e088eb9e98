use crate::provide_credential::{provider_from_config, ExchangeToken};
use crate::sign::{SignRequest, SigningContext, SigningHttpSend};
use crate::watch::CredentialFileWatcher;
use crate::{Config, Context, CredentialCache, Error, HttpSend, Result};
use log::info;
use std::sync::Arc;

/// Status events the extension reports to its host without failing.
#[derive(Debug)]
pub enum StatusEvent {
    /// Establishing the credentials file watch failed; the extension keeps
    /// running, credentials still refresh on expiry.
    WatchSetupFailed(Error),
}

/// Host is the boundary to the plugin host's status reporting.
pub trait Host: Send + Sync {
    /// Report a non-fatal status event.
    fn report_status(&self, event: StatusEvent);
}

/// SigV4Auth wires the credential provider chain, cache, file watcher, and
/// signing transport together for one configuration.
///
/// Construction selects the provider, wraps it in a cache, and primes the
/// cache once so misconfiguration (unreadable file, missing profile,
/// unreachable token service) fails fast instead of on the first request.
#[derive(Debug)]
pub struct SigV4Auth {
    cfg: Config,
    ctx: Context,
    signer: Arc<dyn SignRequest>,
    cache: Arc<CredentialCache>,
    watcher: Option<CredentialFileWatcher>,
}

impl SigV4Auth {
    /// Build the extension from configuration.
    ///
    /// `signer` is the opaque SigV4 primitive; `exchange` is the opaque
    /// token-issuing-service capability, required when assume-role is
    /// configured.
    pub async fn new(
        cfg: Config,
        ctx: Context,
        signer: Arc<dyn SignRequest>,
        exchange: Option<Arc<dyn ExchangeToken>>,
    ) -> Result<Self> {
        cfg.validate()?;

        let provider = provider_from_config(&cfg, exchange)?;
        let cache = Arc::new(CredentialCache::new(provider));

        // Prime once: startup is the right time to learn no provider can
        // produce credentials.
        cache.provide_credential(&ctx).await?;

        Ok(Self {
            cfg,
            ctx,
            signer,
            cache,
            watcher: None,
        })
    }

    /// Start the extension: establish the credentials file watch when the
    /// shared-file provider is the active one.
    ///
    /// Watch-setup failure is reported through the host rather than
    /// returned; losing file-triggered invalidation must not take down an
    /// otherwise functional extension.
    pub fn start(&mut self, host: &dyn Host) -> Result<()> {
        let location = &self.cfg.shared_credentials_watcher.file_location;
        if location.is_empty() || !self.cfg.assume_role.arn.is_empty() {
            return Ok(());
        }

        match CredentialFileWatcher::spawn(location, Arc::clone(&self.cache)) {
            Ok(watcher) => {
                self.watcher = Some(watcher);
                info!("started credentials file watcher on {location}");
            }
            Err(err) => host.report_status(StatusEvent::WatchSetupFailed(err)),
        }

        Ok(())
    }

    /// Shut the extension down: stop the file watcher and release its OS
    /// handle. Teardown errors propagate.
    pub async fn shutdown(&mut self) -> Result<()> {
        if let Some(watcher) = self.watcher.take() {
            watcher.stop().await?;
        }
        Ok(())
    }

    /// Decorate a base transport with per-request signing.
    pub fn wrap<S: HttpSend>(&self, base: S) -> SigningHttpSend<S> {
        SigningHttpSend::new(
            base,
            self.ctx.clone(),
            Arc::clone(&self.cache),
            Arc::clone(&self.signer),
            SigningContext {
                region: self.cfg.region.clone(),
                service: self.cfg.service.clone(),
            },
        )
    }

    /// Per-call credentials for non-HTTP (streaming RPC) transports.
    ///
    /// Deliberately not implemented.
    pub fn per_rpc_credentials(&self) -> Result<std::convert::Infallible> {
        Err(Error::unsupported(
            "per-RPC credentials for non-HTTP transports are not implemented",
        ))
    }

    /// The credential cache backing this extension.
    pub fn cache(&self) -> &Arc<CredentialCache> {
        &self.cache
    }
}
