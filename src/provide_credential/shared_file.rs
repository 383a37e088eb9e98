use crate::constants::{INI_ACCESS_KEY_ID, INI_SECRET_ACCESS_KEY, INI_SESSION_TOKEN};
use crate::{Context, Credential, Error, ProvideCredential, Result};
use ini::Ini;

/// SharedFileCredentialProvider reads a named profile from an INI-style
/// shared credentials file.
///
/// The file is re-read and re-parsed on **every** call. That is what makes
/// watcher-driven cache invalidation meaningful: once the cache entry is
/// dropped, the next retrieval observes whatever is on disk now.
#[derive(Debug, Clone)]
pub struct SharedFileCredentialProvider {
    path: String,
    profile: String,
}

impl SharedFileCredentialProvider {
    /// Create a new provider for the given file path and profile name.
    pub fn new(path: impl Into<String>, profile: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            profile: profile.into(),
        }
    }
}

#[async_trait::async_trait]
impl ProvideCredential for SharedFileCredentialProvider {
    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Credential>> {
        let path = ctx.expand_home_dir(&self.path).ok_or_else(|| {
            Error::config_invalid(format!("cannot expand home dir in path {}", self.path))
        })?;

        let content = ctx.file_read_as_string(&path).await?;

        let conf = Ini::load_from_str(&content).map_err(|e| {
            Error::config_invalid(format!("failed to parse credentials file {path}"))
                .with_source(anyhow::Error::new(e))
        })?;

        let props = conf.section(Some(self.profile.as_str())).ok_or_else(|| {
            Error::profile_not_found(format!(
                "profile {} not found in credentials file {path}",
                self.profile
            ))
        })?;

        let (Some(access_key_id), Some(secret_access_key)) = (
            props.get(INI_ACCESS_KEY_ID),
            props.get(INI_SECRET_ACCESS_KEY),
        ) else {
            return Err(Error::credential_invalid(format!(
                "profile {} is missing access key material",
                self.profile
            )));
        };

        Ok(Some(Credential {
            access_key_id: access_key_id.to_string(),
            secret_access_key: secret_access_key.to_string(),
            session_token: props.get(INI_SESSION_TOKEN).map(|s| s.to_string()),
            // Entries read from disk never expire on their own; they are
            // refreshed only through explicit invalidation.
            expires_in: None,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, TokioFileRead};
    use pretty_assertions::assert_eq;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_credentials(dir: &std::path::Path, body: &str) -> String {
        let path = dir.join("credentials");
        let mut file = File::create(&path).unwrap();
        write!(file, "{body}").unwrap();
        path.to_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_reads_named_profile() {
        let _ = env_logger::builder().is_test(true).try_init();

        let dir = tempdir().unwrap();
        let path = write_credentials(
            dir.path(),
            "[default]\n\
             aws_access_key_id = AKIA_TEST\n\
             aws_secret_access_key = SECRET_TEST\n\
             \n\
             [other]\n\
             aws_access_key_id = OTHER_KEY\n\
             aws_secret_access_key = OTHER_SECRET\n\
             aws_session_token = OTHER_TOKEN\n",
        );

        let ctx = Context::new(TokioFileRead);
        let cred = SharedFileCredentialProvider::new(&path, "default")
            .provide_credential(&ctx)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cred.access_key_id, "AKIA_TEST");
        assert_eq!(cred.secret_access_key, "SECRET_TEST");
        assert!(cred.session_token.is_none());
        assert!(cred.expires_in.is_none());

        let cred = SharedFileCredentialProvider::new(&path, "other")
            .provide_credential(&ctx)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cred.access_key_id, "OTHER_KEY");
        assert_eq!(cred.session_token, Some("OTHER_TOKEN".to_string()));
    }

    #[tokio::test]
    async fn test_missing_profile_is_an_error() {
        let dir = tempdir().unwrap();
        let path = write_credentials(
            dir.path(),
            "[default]\n\
             aws_access_key_id = AKIA_TEST\n\
             aws_secret_access_key = SECRET_TEST\n",
        );

        let ctx = Context::new(TokioFileRead);
        let err = SharedFileCredentialProvider::new(&path, "nonexistent")
            .provide_credential(&ctx)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ProfileNotFound);
    }

    #[tokio::test]
    async fn test_rereads_file_each_call() {
        let dir = tempdir().unwrap();
        let path = write_credentials(
            dir.path(),
            "[default]\n\
             aws_access_key_id = FIRST\n\
             aws_secret_access_key = SECRET\n",
        );

        let ctx = Context::new(TokioFileRead);
        let provider = SharedFileCredentialProvider::new(&path, "default");

        let cred = provider.provide_credential(&ctx).await.unwrap().unwrap();
        assert_eq!(cred.access_key_id, "FIRST");

        write_credentials(
            dir.path(),
            "[default]\n\
             aws_access_key_id = SECOND\n\
             aws_secret_access_key = SECRET\n",
        );

        let cred = provider.provide_credential(&ctx).await.unwrap().unwrap();
        assert_eq!(cred.access_key_id, "SECOND");
    }

    #[tokio::test]
    async fn test_unreadable_file_is_an_error() {
        let ctx = Context::new(TokioFileRead);
        let err = SharedFileCredentialProvider::new("/no/such/file", "default")
            .provide_credential(&ctx)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unexpected);
    }
}
