//! SigV4 request-signing middleware.
//!
//! This crate injects AWS Signature Version 4 authentication into outgoing
//! HTTP requests. Credentials come from one of several pluggable providers,
//! are cached with single-flight refresh, and stay fresh without blocking
//! the request path: a file watcher invalidates the cache when a shared
//! credentials file is rewritten externally.
//!
//! ## Overview
//!
//! - **[`ProvideCredential`]**: the credential-source capability. Variants:
//!   default environment resolution, shared-credentials-file profile, and
//!   assumed-role via an injected token exchange.
//! - **[`CredentialCache`]**: wraps the selected provider, serves cached
//!   credentials until expiry or explicit invalidation.
//! - **[`CredentialFileWatcher`]**: bridges filesystem events on the shared
//!   credentials file to cache invalidation.
//! - **[`SigningHttpSend`]**: the transport decorator that hashes the body,
//!   retrieves credentials, invokes the signing primitive, and delegates.
//! - **[`SigV4Auth`]**: lifecycle glue constructing all of the above from
//!   [`Config`] and tearing the watcher down at shutdown.
//!
//! The SigV4 canonicalization itself and the role-assumption network
//! exchange are deliberately outside this crate: both are capabilities
//! ([`SignRequest`], [`ExchangeToken`]) injected at construction.
//!
//! ## Example
//!
//! ```no_run
//! use sigv4auth::{
//!     Config, Context, HttpSend, ReqwestHttpSend, SigV4Auth, TokioFileRead,
//! };
//! use std::sync::Arc;
//!
//! # #[derive(Debug)] struct MySigner;
//! # #[async_trait::async_trait]
//! # impl sigv4auth::SignRequest for MySigner {
//! #     async fn sign_request(
//! #         &self,
//! #         _: &mut http::request::Parts,
//! #         _: &sigv4auth::Credential,
//! #         _: &sigv4auth::SigningContext,
//! #         _: &str,
//! #         _: sigv4auth::time::DateTime,
//! #     ) -> sigv4auth::Result<()> { Ok(()) }
//! # }
//! # async fn example() -> sigv4auth::Result<()> {
//! let cfg = Config {
//!     region: "us-east-1".to_string(),
//!     service: "aps".to_string(),
//!     ..Default::default()
//! };
//!
//! let ctx = Context::new(TokioFileRead);
//! let auth = SigV4Auth::new(cfg, ctx, Arc::new(MySigner), None).await?;
//!
//! let transport = auth.wrap(ReqwestHttpSend::default());
//! let req = http::Request::builder()
//!     .method("POST")
//!     .uri("https://aps.us-east-1.amazonaws.com/api/v1/remote_write")
//!     .body(bytes::Bytes::new())?;
//! let resp = transport.http_send(req).await?;
//! # Ok(())
//! # }
//! ```

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;

mod constants;

mod error;
pub use error::{Error, ErrorKind, Result};

mod context;
pub use context::{Context, Env, FileRead, OsEnv, StaticEnv, TokioFileRead};

mod credential;
pub use credential::Credential;

mod config;
pub use config::{AssumeRoleConfig, Config, SharedCredentialsWatcherConfig};

mod http;
pub use crate::http::{HttpSend, ReqwestHttpSend};

pub mod provide_credential;
pub use provide_credential::{
    AssumeRoleRequest, DefaultCredentialProvider, ExchangeToken, ProvideCredential,
    SharedFileCredentialProvider,
};

mod cache;
pub use cache::CredentialCache;

mod watch;
pub use watch::CredentialFileWatcher;

mod sign;
pub use sign::{SignRequest, SigningContext, SigningHttpSend};

mod extension;
pub use extension::{Host, SigV4Auth, StatusEvent};
