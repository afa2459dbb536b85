//! Where the engine gets its Rebrickable credentials.

use bricksync_types::{RemoteConfig, SyncError};

pub const API_KEY_ENV: &str = "REBRICKABLE_API_KEY";
pub const USER_TOKEN_ENV: &str = "REBRICKABLE_USER_TOKEN";

/// Source of the API key and user token. Either may be absent, in which
/// case sync runs are skipped.
pub trait CredentialProvider: Send + Sync {
    fn api_key(&self) -> Option<String>;
    fn user_token(&self) -> Option<String>;

    /// Both credentials, when both are present and non-blank.
    fn pair(&self) -> Option<(String, String)> {
        Some((non_blank(self.api_key())?, non_blank(self.user_token())?))
    }

    /// Like [`CredentialProvider::pair`], naming what is missing on failure.
    fn require(&self) -> Result<(String, String), SyncError> {
        match (non_blank(self.api_key()), non_blank(self.user_token())) {
            (Some(key), Some(token)) => Ok((key, token)),
            (None, Some(_)) => Err(SyncError::NotConfigured { missing: "API key".to_string() }),
            (Some(_), None) => Err(SyncError::NotConfigured { missing: "user token".to_string() }),
            (None, None) => Err(SyncError::NotConfigured {
                missing: "API key and user token".to_string(),
            }),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    api_key: Option<String>,
    user_token: Option<String>,
}

impl StaticCredentials {
    pub fn new(api_key: impl Into<String>, user_token: impl Into<String>) -> Self {
        Self { api_key: Some(api_key.into()), user_token: Some(user_token.into()) }
    }

    pub fn none() -> Self {
        Self::default()
    }
}

impl CredentialProvider for StaticCredentials {
    fn api_key(&self) -> Option<String> {
        self.api_key.clone()
    }

    fn user_token(&self) -> Option<String> {
        self.user_token.clone()
    }
}

/// Credentials from the persisted config, overridable per variable from the
/// environment.
#[derive(Debug, Clone)]
pub struct ConfigCredentials {
    api_key: Option<String>,
    user_token: Option<String>,
}

impl ConfigCredentials {
    pub fn new(remote: &RemoteConfig) -> Self {
        Self {
            api_key: non_blank(std::env::var(API_KEY_ENV).ok()).or_else(|| remote.api_key.clone()),
            user_token: non_blank(std::env::var(USER_TOKEN_ENV).ok())
                .or_else(|| remote.user_token.clone()),
        }
    }
}

impl CredentialProvider for ConfigCredentials {
    fn api_key(&self) -> Option<String> {
        self.api_key.clone()
    }

    fn user_token(&self) -> Option<String> {
        self.user_token.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_requires_both() {
        assert!(StaticCredentials::none().pair().is_none());
        assert!(StaticCredentials::new("key", "  ").pair().is_none());
        assert_eq!(
            StaticCredentials::new(" key ", "token").pair(),
            Some(("key".to_string(), "token".to_string()))
        );
    }

    #[test]
    fn test_require_names_missing_credential() {
        let err = StaticCredentials::new("key", "").require().unwrap_err();
        assert_eq!(err, SyncError::NotConfigured { missing: "user token".to_string() });

        let err = StaticCredentials::none().require().unwrap_err();
        assert!(err.to_string().contains("API key and user token"));
    }

    #[test]
    fn test_config_credentials_fall_back_to_config() {
        let remote = RemoteConfig {
            api_key: Some("from-config".to_string()),
            user_token: Some("tok".to_string()),
            ..RemoteConfig::default()
        };
        let credentials = ConfigCredentials::new(&remote);
        // Environment may override, but something is always present here
        assert!(credentials.pair().is_some());
    }
}
