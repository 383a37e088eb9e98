use crate::{Context, Credential, Error, ProvideCredential, Result};
use log::debug;
use std::fmt::{self, Debug};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

/// CredentialCache bounds the rate of expensive provider calls while keeping
/// credentials fresh.
///
/// The cache owns the invalidation state for whatever provider it wraps; the
/// file watcher (or any other external trigger) calls [`invalidate`] and the
/// next retrieval re-reads through the provider.
///
/// Refreshes are single-flight: the slot mutex is held across the provider
/// call, so concurrent callers that miss together wait for the one in-flight
/// refresh instead of issuing their own.
///
/// [`invalidate`]: CredentialCache::invalidate
pub struct CredentialCache {
    provider: Box<dyn ProvideCredential>,
    slot: Mutex<Option<Entry>>,
    generation: AtomicU64,
}

struct Entry {
    cred: Credential,
    /// Invalidation generation observed when this entry's refresh started.
    /// An entry from an older generation is stale no matter how young it is.
    generation: u64,
}

impl CredentialCache {
    /// Wrap a provider in a cache.
    pub fn new(provider: Box<dyn ProvideCredential>) -> Self {
        Self {
            provider,
            slot: Mutex::new(None),
            generation: AtomicU64::new(0),
        }
    }

    /// Return the cached credential, refreshing through the wrapped provider
    /// when the cache is empty, expired, or invalidated.
    ///
    /// A provider that yields nothing is an error at this boundary: by the
    /// time a cache wraps a provider, "no credentials" means the
    /// configuration cannot be served.
    pub async fn provide_credential(&self, ctx: &Context) -> Result<Credential> {
        let mut slot = self.slot.lock().await;

        let generation = self.generation.load(Ordering::Acquire);
        if let Some(entry) = slot.as_ref() {
            if entry.generation == generation && entry.cred.is_valid() {
                return Ok(entry.cred.clone());
            }
        }

        debug!("credential cache miss, refreshing");
        let cred = self
            .provider
            .provide_credential(ctx)
            .await?
            .ok_or_else(|| Error::credential_invalid("credential provider returned no credentials"))?;

        // Tag the entry with the generation observed before the refresh: an
        // invalidation that lands mid-refresh leaves this entry stale.
        *slot = Some(Entry {
            cred: cred.clone(),
            generation,
        });

        Ok(cred)
    }

    /// Mark the cached value stale without re-fetching.
    ///
    /// The next [`provide_credential`] performs the refresh. Side-effect
    /// only, never fails.
    ///
    /// [`provide_credential`]: CredentialCache::provide_credential
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::Release);
    }
}

impl Debug for CredentialCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialCache")
            .field("provider", &self.provider)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::now;
    use crate::TokioFileRead;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    /// Provider that counts its calls and hands out numbered credentials.
    #[derive(Debug, Default)]
    struct Counting {
        calls: Arc<AtomicUsize>,
        expires: Option<chrono::TimeDelta>,
    }

    #[async_trait::async_trait]
    impl ProvideCredential for Counting {
        async fn provide_credential(&self, _: &Context) -> Result<Option<Credential>> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            // Let concurrent callers pile up on the refresh.
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            Ok(Some(Credential {
                access_key_id: format!("key-{n}"),
                secret_access_key: "secret".to_string(),
                session_token: None,
                expires_in: self.expires.map(|d| now() + d),
            }))
        }
    }

    #[tokio::test]
    async fn test_serves_cached_value() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = CredentialCache::new(Box::new(Counting {
            calls: calls.clone(),
            expires: None,
        }));
        let ctx = Context::new(TokioFileRead);

        let first = cache.provide_credential(&ctx).await.unwrap();
        let second = cache.provide_credential(&ctx).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_miss_refreshes_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = Arc::new(CredentialCache::new(Box::new(Counting {
            calls: calls.clone(),
            expires: None,
        })));
        let ctx = Context::new(TokioFileRead);

        let a = tokio::spawn({
            let cache = cache.clone();
            let ctx = ctx.clone();
            async move { cache.provide_credential(&ctx).await.unwrap() }
        });
        let b = tokio::spawn({
            let cache = cache.clone();
            let ctx = ctx.clone();
            async move { cache.provide_credential(&ctx).await.unwrap() }
        });

        let (a, b) = (a.await.unwrap(), b.await.unwrap());
        assert_eq!(a, b);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_reread() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = CredentialCache::new(Box::new(Counting {
            calls: calls.clone(),
            expires: None,
        }));
        let ctx = Context::new(TokioFileRead);

        let first = cache.provide_credential(&ctx).await.unwrap();
        assert_eq!(first.access_key_id, "key-1");

        cache.invalidate();

        let second = cache.provide_credential(&ctx).await.unwrap();
        assert_eq!(second.access_key_id, "key-2");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_expired_entry_refreshes() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = CredentialCache::new(Box::new(Counting {
            calls: calls.clone(),
            // Already inside the validity buffer, so immediately stale.
            expires: Some(chrono::TimeDelta::seconds(10)),
        }));
        let ctx = Context::new(TokioFileRead);

        cache.provide_credential(&ctx).await.unwrap();
        cache.provide_credential(&ctx).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_no_expiry_never_self_expires() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = CredentialCache::new(Box::new(Counting {
            calls: calls.clone(),
            expires: None,
        }));
        let ctx = Context::new(TokioFileRead);

        for _ in 0..5 {
            cache.provide_credential(&ctx).await.unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalidate_mid_refresh_forces_reread() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = Arc::new(CredentialCache::new(Box::new(Counting {
            calls: calls.clone(),
            expires: None,
        })));
        let ctx = Context::new(TokioFileRead);

        let inflight = tokio::spawn({
            let cache = cache.clone();
            let ctx = ctx.clone();
            async move { cache.provide_credential(&ctx).await.unwrap() }
        });

        // Invalidate once the first refresh is inside the provider call.
        while calls.load(Ordering::SeqCst) == 0 {
            tokio::time::sleep(std::time::Duration::from_millis(1)).await;
        }
        cache.invalidate();

        // The in-flight caller gets the value its own refresh produced.
        let stale = inflight.await.unwrap();
        assert_eq!(stale.access_key_id, "key-1");

        // But the entry that refresh stored predates the invalidation, so a
        // retrieval beginning after invalidate() returned re-reads instead of
        // serving it.
        let fresh = cache.provide_credential(&ctx).await.unwrap();
        assert_eq!(fresh.access_key_id, "key-2");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_cancelled_refresh_does_not_poison_cache() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = Arc::new(CredentialCache::new(Box::new(Counting {
            calls: calls.clone(),
            expires: None,
        })));
        let ctx = Context::new(TokioFileRead);

        let inflight = tokio::spawn({
            let cache = cache.clone();
            let ctx = ctx.clone();
            async move { cache.provide_credential(&ctx).await }
        });

        // Abort the caller while its refresh holds the slot lock.
        while calls.load(Ordering::SeqCst) == 0 {
            tokio::time::sleep(std::time::Duration::from_millis(1)).await;
        }
        inflight.abort();
        let _ = inflight.await;

        // The abandoned refresh released the lock; later callers go through.
        let cred = cache.provide_credential(&ctx).await.unwrap();
        assert!(cred.access_key_id.starts_with("key-"));
        let again = cache.provide_credential(&ctx).await.unwrap();
        assert_eq!(cred, again);
    }

    #[derive(Debug)]
    struct NothingProvider;

    #[async_trait::async_trait]
    impl ProvideCredential for NothingProvider {
        async fn provide_credential(&self, _: &Context) -> Result<Option<Credential>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_empty_provider_is_an_error() {
        let cache = CredentialCache::new(Box::new(NothingProvider));
        let ctx = Context::new(TokioFileRead);

        let err = cache.provide_credential(&ctx).await.unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::CredentialInvalid);
    }
}
