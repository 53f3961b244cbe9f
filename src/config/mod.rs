//! Configuration and credential storage

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::auth::TokenStore;

/// Application configuration, holding the durable credential pair.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Bearer access token for the Dreamhouse API
    pub access_token: Option<String>,
    /// Long-lived refresh token exchanged for new access tokens
    pub refresh_token: Option<String>,
}

impl Config {
    /// Get config directory path
    fn config_dir() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "dreamhouse-cli", "dreamhouse-cli")
            .context("Could not determine config directory")?;
        Ok(proj_dirs.config_dir().to_path_buf())
    }

    /// Get config file path
    fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from disk
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        toml::from_str(&content).context("Failed to parse config file")
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let dir = Self::config_dir()?;
        fs::create_dir_all(&dir).context("Failed to create config directory")?;

        let path = Self::config_path()?;
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&path, content).context("Failed to write config file")?;

        // Set restrictive permissions on config file (contains tokens)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            fs::set_permissions(&path, perms).context("Failed to set config permissions")?;
        }

        Ok(())
    }

    /// Persist after a token mutation. The refresh protocol mutates tokens
    /// mid-request, so durability cannot wait for an explicit save call.
    fn persist(&self) {
        if let Err(e) = self.save() {
            tracing::warn!("Failed to persist tokens: {:#}", e);
        }
    }
}

impl TokenStore for Config {
    fn get_access_token(&self) -> Option<String> {
        self.access_token.clone()
    }

    fn set_access_token(&mut self, token: String) {
        self.access_token = Some(token);
        self.persist();
    }

    fn get_refresh_token(&self) -> Option<String> {
        self.refresh_token.clone()
    }

    fn set_refresh_token(&mut self, token: String) {
        self.refresh_token = Some(token);
        self.persist();
    }

    fn clear_tokens(&mut self) {
        self.access_token = None;
        self.refresh_token = None;
        self.persist();
    }
}
