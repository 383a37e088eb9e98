use crate::{Error, Result};
use serde::Deserialize;

/// Configuration for the sigv4auth extension.
///
/// Mirrors the host-side configuration surface: signing region/service plus
/// at most one non-default credential source. When both an assume-role ARN
/// and a shared credentials file are configured, assume-role wins.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// AWS region the signed requests target. Required.
    pub region: String,
    /// AWS service name used in the signing scope. Required.
    pub service: String,
    /// Assume-role credential source.
    #[serde(default)]
    pub assume_role: AssumeRoleConfig,
    /// Shared-credentials-file source, watched for external rewrites.
    #[serde(default)]
    pub shared_credentials_watcher: SharedCredentialsWatcherConfig,
}

/// Assume-role section of [`Config`].
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AssumeRoleConfig {
    /// ARN of the role to assume. Empty means assume-role is not used.
    #[serde(default)]
    pub arn: String,
    /// Session name passed to the token service.
    #[serde(default)]
    pub session_name: String,
    /// Region of the token service endpoint.
    #[serde(default)]
    pub sts_region: String,
}

/// Shared-credentials-watcher section of [`Config`].
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SharedCredentialsWatcherConfig {
    /// Path of the shared credentials file. Empty means this source is not used.
    #[serde(default)]
    pub file_location: String,
    /// Profile section to read from the file.
    #[serde(default)]
    pub profile_name: String,
}

impl Config {
    /// Validate the static parts of the configuration.
    ///
    /// Whether the selected provider can actually produce credentials is
    /// checked later, when the cache is primed at construction.
    pub fn validate(&self) -> Result<()> {
        if self.region.is_empty() {
            return Err(Error::config_invalid("region must not be empty"));
        }
        if self.service.is_empty() {
            return Err(Error::config_invalid("service must not be empty"));
        }
        Ok(())
    }

    /// Profile name to read from the shared credentials file, defaulting
    /// to `default` when unset.
    pub fn profile_name(&self) -> &str {
        if self.shared_credentials_watcher.profile_name.is_empty() {
            "default"
        } else {
            &self.shared_credentials_watcher.profile_name
        }
    }
}
