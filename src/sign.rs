use crate::constants::{X_AMZ_CONTENT_SHA_256, X_AMZ_SECURITY_TOKEN};
use crate::hash::{hex_sha256, EMPTY_STRING_SHA256};
use crate::time::{now, DateTime};
use crate::{Context, Credential, CredentialCache, HttpSend, Result};
use bytes::Bytes;
use http::{HeaderName, HeaderValue};
use std::fmt::Debug;
use std::sync::Arc;

/// Region and service a transport signs for. Fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningContext {
    /// AWS region.
    pub region: String,
    /// AWS service name.
    pub service: String,
}

/// SignRequest is the opaque SigV4 primitive: given request metadata,
/// credentials, region/service, the body hash, and a timestamp, attach the
/// signature headers to the request.
///
/// This crate never computes the canonicalization itself; implementations
/// are injected at construction.
#[async_trait::async_trait]
pub trait SignRequest: Debug + Send + Sync + 'static {
    /// Compute the signature and attach its headers to `req`.
    async fn sign_request(
        &self,
        req: &mut http::request::Parts,
        cred: &Credential,
        signing: &SigningContext,
        body_sha256: &str,
        time: DateTime,
    ) -> Result<()>;
}

/// SigningHttpSend decorates a base transport with per-request SigV4 signing.
///
/// Every call retrieves current credentials from the cache, hashes the body,
/// invokes the signing primitive, and delegates. Nothing is reused across
/// calls; the signature is time-sensitive and request-specific.
#[derive(Debug)]
pub struct SigningHttpSend<S: HttpSend> {
    base: S,
    ctx: Context,
    cache: Arc<CredentialCache>,
    signer: Arc<dyn SignRequest>,
    signing: SigningContext,
}

impl<S: HttpSend> SigningHttpSend<S> {
    /// Wrap a base transport.
    pub fn new(
        base: S,
        ctx: Context,
        cache: Arc<CredentialCache>,
        signer: Arc<dyn SignRequest>,
        signing: SigningContext,
    ) -> Self {
        Self {
            base,
            ctx,
            cache,
            signer,
            signing,
        }
    }
}

#[async_trait::async_trait]
impl<S: HttpSend> HttpSend for SigningHttpSend<S> {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let (mut parts, body) = req.into_parts();

        // Bytes bodies hash without being consumed; the same body is
        // forwarded to the base transport untouched.
        let body_sha256 = if body.is_empty() {
            EMPTY_STRING_SHA256.to_string()
        } else {
            hex_sha256(&body)
        };

        // Credential retrieval failure fails the whole call before the base
        // transport is ever touched. Retries belong to the caller.
        let cred = self.cache.provide_credential(&self.ctx).await?;

        parts.headers.insert(
            HeaderName::from_static(X_AMZ_CONTENT_SHA_256),
            HeaderValue::from_str(&body_sha256)?,
        );
        if let Some(token) = &cred.session_token {
            let mut value = HeaderValue::from_str(token)?;
            value.set_sensitive(true);
            parts
                .headers
                .insert(HeaderName::from_static(X_AMZ_SECURITY_TOKEN), value);
        }

        self.signer
            .sign_request(&mut parts, &cred, &self.signing, &body_sha256, now())
            .await?;

        self.base
            .http_send(http::Request::from_parts(parts, body))
            .await
    }
}
