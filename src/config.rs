use crate::error::StratzError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const TOKEN_ENV: &str = "STRATZ_TOKEN";
pub const ENDPOINT_ENV: &str = "STRATZ_GQL";

/// Secrets as they sit in `config.json`. Either key may be missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredConfig {
    #[serde(rename = "STRATZ_TOKEN", default)]
    pub token: Option<String>,
    #[serde(rename = "STRATZ_GQL", default)]
    pub endpoint: Option<String>,
}

/// Validated credentials for one request cycle.
#[derive(Clone, PartialEq)]
pub struct ApiConfig {
    pub token: String,
    pub endpoint: String,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("token", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl TryFrom<StoredConfig> for ApiConfig {
    type Error = StratzError;

    fn try_from(stored: StoredConfig) -> Result<Self, Self::Error> {
        let token = stored.token.filter(|t| !t.trim().is_empty());
        let endpoint = stored.endpoint.filter(|e| !e.trim().is_empty());
        match (token, endpoint) {
            (Some(token), Some(endpoint)) => Ok(ApiConfig { token, endpoint }),
            (token, endpoint) => Err(StratzError::ConfigMissing {
                token: token.is_some(),
                endpoint: endpoint.is_some(),
            }),
        }
    }
}

#[async_trait]
pub trait ConfigProvider: Send + Sync {
    /// Re-reads the secrets. Called once per inbound request.
    async fn load(&self) -> Result<ApiConfig, StratzError>;
}

/// Reads `config.json` from the user's config dir, with env overrides.
#[derive(Debug, Clone)]
pub struct FileConfigProvider {
    path: PathBuf,
}

impl FileConfigProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_location() -> Result<Self, StratzError> {
        Ok(Self::new(default_config_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copies a bundled config into storage unless one is already there.
    /// Returns whether a copy happened.
    pub async fn install_if_missing(&self, bundled: &Path) -> Result<bool, StratzError> {
        if tokio::fs::try_exists(&self.path).await? {
            debug!(path = %self.path.display(), "config already installed");
            return Ok(false);
        }
        let raw = tokio::fs::read_to_string(bundled).await?;
        // reject garbage before it lands in storage
        let stored: StoredConfig = serde_json::from_str(&raw)?;
        self.save(&stored).await?;
        info!(from = %bundled.display(), to = %self.path.display(), "bundled config installed");
        Ok(true)
    }

    pub async fn save(&self, stored: &StoredConfig) -> Result<(), StratzError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, serde_json::to_vec_pretty(stored)?).await?;
        Ok(())
    }

    async fn read_stored(&self) -> Result<StoredConfig, StratzError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StoredConfig::default()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl ConfigProvider for FileConfigProvider {
    async fn load(&self) -> Result<ApiConfig, StratzError> {
        let mut stored = self.read_stored().await?;
        if let Ok(token) = std::env::var(TOKEN_ENV) {
            stored.token = Some(token);
        }
        if let Ok(endpoint) = std::env::var(ENDPOINT_ENV) {
            stored.endpoint = Some(endpoint);
        }
        let config = ApiConfig::try_from(stored)?;
        debug!(endpoint = %config.endpoint, has_token = true, "config loaded");
        Ok(config)
    }
}

/// Fixed credentials, for demos and embedding.
#[derive(Debug, Clone)]
pub struct StaticConfigProvider {
    stored: StoredConfig,
}

impl StaticConfigProvider {
    pub fn new(token: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            stored: StoredConfig {
                token: Some(token.into()),
                endpoint: Some(endpoint.into()),
            },
        }
    }

    pub fn empty() -> Self {
        Self { stored: StoredConfig::default() }
    }
}

#[async_trait]
impl ConfigProvider for StaticConfigProvider {
    async fn load(&self) -> Result<ApiConfig, StratzError> {
        ApiConfig::try_from(self.stored.clone())
    }
}

fn default_config_path() -> Result<PathBuf, StratzError> {
    let base = dirs::config_dir().ok_or_else(|| {
        StratzError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no config directory for this platform",
        ))
    })?;
    Ok(base.join("stratz-local-api").join("config.json"))
}

/// Settings for the local service process.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind_addr: String,
    pub config_path: Option<PathBuf>,
    pub bundled_config: Option<PathBuf>,
    pub hero_take: u32,
    pub game_version_id: u16,
    pub http_timeout_secs: u64,
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:9923".to_string(),
            config_path: None,
            bundled_config: None,
            hero_take: 50_000,
            game_version_id: 169,
            http_timeout_secs: 30,
            log_level: "info".to_string(),
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(bind) = std::env::var("STRATZ_BIND") {
            config.bind_addr = bind;
        }
        if let Ok(path) = std::env::var("STRATZ_CONFIG_PATH") {
            config.config_path = Some(PathBuf::from(path));
        }
        if let Ok(path) = std::env::var("STRATZ_BUNDLED_CONFIG") {
            config.bundled_config = Some(PathBuf::from(path));
        }
        if let Ok(take) = std::env::var("STRATZ_HERO_TAKE") {
            config.hero_take = take.parse().unwrap_or(config.hero_take);
        }
        if let Ok(version) = std::env::var("STRATZ_GAME_VERSION") {
            config.game_version_id = version.parse().unwrap_or(config.game_version_id);
        }
        if let Ok(secs) = std::env::var("STRATZ_HTTP_TIMEOUT_SECS") {
            config.http_timeout_secs = secs.parse().unwrap_or(config.http_timeout_secs);
        }
        if let Ok(level) = std::env::var("STRATZ_LOG_LEVEL") {
            config.log_level = level;
        }

        config
    }

    pub fn config_provider(&self) -> Result<FileConfigProvider, StratzError> {
        match &self.config_path {
            Some(path) => Ok(FileConfigProvider::new(path.clone())),
            None => FileConfigProvider::default_location(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_stored_config_uses_extension_keys() {
        let stored: StoredConfig =
            serde_json::from_str(r#"{"STRATZ_TOKEN":"abc","STRATZ_GQL":"https://api.stratz.com/graphql"}"#)
                .unwrap();
        let config = ApiConfig::try_from(stored).unwrap();
        assert_eq!(config.token, "abc");
        assert_eq!(config.endpoint, "https://api.stratz.com/graphql");
    }

    #[test]
    fn test_missing_or_blank_secrets_rejected() {
        let stored = StoredConfig { token: Some("  ".into()), endpoint: Some("https://x".into()) };
        match ApiConfig::try_from(stored) {
            Err(StratzError::ConfigMissing { token, endpoint }) => {
                assert!(!token);
                assert!(endpoint);
            }
            other => panic!("expected ConfigMissing, got {:?}", other),
        }
        assert!(ApiConfig::try_from(StoredConfig::default()).is_err());
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = ApiConfig { token: "secret".into(), endpoint: "https://x".into() };
        assert!(!format!("{:?}", config).contains("secret"));
    }

    #[tokio::test]
    async fn test_install_if_missing_copies_once() {
        let dir = TempDir::new().unwrap();
        let bundled = dir.path().join("bundled.json");
        std::fs::write(&bundled, r#"{"STRATZ_TOKEN":"t","STRATZ_GQL":"https://e"}"#).unwrap();

        let provider = FileConfigProvider::new(dir.path().join("store").join("config.json"));
        assert!(provider.install_if_missing(&bundled).await.unwrap());
        assert!(!provider.install_if_missing(&bundled).await.unwrap());

        let stored = provider.read_stored().await.unwrap();
        assert_eq!(stored.token.as_deref(), Some("t"));
        assert_eq!(stored.endpoint.as_deref(), Some("https://e"));
    }

    #[tokio::test]
    async fn test_missing_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let provider = FileConfigProvider::new(dir.path().join("nope.json"));
        let stored = provider.read_stored().await.unwrap();
        assert!(stored.token.is_none());
        assert!(stored.endpoint.is_none());
    }

    #[tokio::test]
    async fn test_static_provider() {
        assert!(StaticConfigProvider::empty().load().await.is_err());
        let config = StaticConfigProvider::new("t", "https://e").load().await.unwrap();
        assert_eq!(config.endpoint, "https://e");
    }
}
