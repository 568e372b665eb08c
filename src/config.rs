use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::quiz::model::QuestionStyle;
use crate::store::export::ExportFormat;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_user_id")]
    pub user_id: String,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default)]
    pub default_style: QuestionStyle,
    #[serde(default = "default_export_dir")]
    pub export_dir: String,
    #[serde(default)]
    pub export_format: ExportFormat,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Delete sets on this client only, without telling the backend.
    #[serde(default = "default_local_delete_only")]
    pub local_delete_only: bool,
}

fn default_api_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}
fn default_user_id() -> String {
    "12".to_string()
}
fn default_theme() -> String {
    "terminal-default".to_string()
}
fn default_export_dir() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("lecturebank")
        .join("exports")
        .to_string_lossy()
        .to_string()
}
fn default_request_timeout_secs() -> u64 {
    30
}
fn default_local_delete_only() -> bool {
    false
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            user_id: default_user_id(),
            theme: default_theme(),
            default_style: QuestionStyle::default(),
            export_dir: default_export_dir(),
            export_format: ExportFormat::default(),
            request_timeout_secs: default_request_timeout_secs(),
            local_delete_only: default_local_delete_only(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lecturebank")
            .join("config.toml")
    }

    pub fn export_path(&self) -> PathBuf {
        PathBuf::from(&self.export_dir)
    }

    /// Repair values a hand-edited file may have broken. Run after loading
    /// and after CLI overrides.
    pub fn validate(&mut self) {
        let url = self.api_base_url.trim().trim_end_matches('/');
        self.api_base_url = if url.is_empty() {
            default_api_base_url()
        } else {
            url.to_string()
        };
        if self.user_id.trim().is_empty() {
            self.user_id = default_user_id();
        }
        if self.theme.trim().is_empty() {
            self.theme = default_theme();
        }
        if self.export_dir.trim().is_empty() {
            self.export_dir = default_export_dir();
        }
        self.request_timeout_secs = self.request_timeout_secs.clamp(1, 600);
    }
}
