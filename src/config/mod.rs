//! Configuration management
//!
//! This module handles loading and parsing configuration for HR Companion.
//! Configuration can be loaded from:
//! - config.yml file
//! - Environment variables (override file settings)
//!
//! Missing optional values are filled with sensible defaults.

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Hosted backend configuration
    #[serde(default)]
    pub backend: BackendConfig,
    /// Object storage configuration
    #[serde(default)]
    pub storage: StorageConfig,
    /// UI behaviour (pagination, notifications, search)
    #[serde(default)]
    pub ui: UiConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origin (for cookie-based auth)
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
    /// Mark session cookies as `Secure`
    #[serde(default)]
    pub secure_cookies: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
            secure_cookies: false,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "http://localhost:3000".to_string()
}

/// Hosted backend-as-a-service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the project, e.g. `https://xyz.supabase.co`
    #[serde(default)]
    pub url: String,
    /// Public anon key sent as `apikey` on every request
    #[serde(default)]
    pub anon_key: String,
    /// Per-request timeout
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_request_timeout() -> u64 {
    15
}

/// Object storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Bucket holding user avatars
    #[serde(default = "default_avatar_bucket")]
    pub avatar_bucket: String,
    /// Bucket holding post thumbnails
    #[serde(default = "default_thumbnail_bucket")]
    pub thumbnail_bucket: String,
    /// Maximum file size in bytes (default: 5MB)
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Allowed image MIME types
    #[serde(default = "default_allowed_types")]
    pub allowed_types: Vec<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            avatar_bucket: default_avatar_bucket(),
            thumbnail_bucket: default_thumbnail_bucket(),
            max_file_size: default_max_file_size(),
            allowed_types: default_allowed_types(),
        }
    }
}

fn default_avatar_bucket() -> String {
    "avatars".to_string()
}

fn default_thumbnail_bucket() -> String {
    "post-thumbnails".to_string()
}

fn default_max_file_size() -> u64 {
    5 * 1024 * 1024
}

fn default_allowed_types() -> Vec<String> {
    vec![
        "image/jpeg".to_string(),
        "image/png".to_string(),
        "image/gif".to_string(),
        "image/webp".to_string(),
    ]
}

impl StorageConfig {
    /// Check if a MIME type is allowed
    pub fn is_type_allowed(&self, mime_type: &str) -> bool {
        self.allowed_types.iter().any(|t| t == mime_type)
    }

    /// Get file extension for a MIME type
    pub fn get_extension(&self, mime_type: &str) -> &'static str {
        match mime_type {
            "image/jpeg" => "jpg",
            "image/png" => "png",
            "image/gif" => "gif",
            "image/webp" => "webp",
            _ => "bin",
        }
    }
}

/// UI behaviour shared by every screen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Page size for public listings
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Page size for admin tables
    #[serde(default = "default_admin_page_size")]
    pub admin_page_size: u32,
    /// Maximum notifications visible at once
    #[serde(default = "default_notification_max_visible")]
    pub notification_max_visible: usize,
    /// How long a notification stays visible
    #[serde(default = "default_notification_duration_ms")]
    pub notification_duration_ms: u64,
    /// Quiet period before a live search query runs
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            admin_page_size: default_admin_page_size(),
            notification_max_visible: default_notification_max_visible(),
            notification_duration_ms: default_notification_duration_ms(),
            search_debounce_ms: default_search_debounce_ms(),
        }
    }
}

fn default_page_size() -> u32 {
    10
}

fn default_admin_page_size() -> u32 {
    20
}

fn default_notification_max_visible() -> usize {
    3
}

fn default_notification_duration_ms() -> u64 {
    5000
}

fn default_search_debounce_ms() -> u64 {
    300
}

/// Error type for configuration parsing
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    ParseError {
        path: String,
        message: String,
    },
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

impl Config {
    /// Load configuration from file
    ///
    /// If the file doesn't exist, returns default configuration.
    /// If the file exists but is invalid YAML, returns an error with details.
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(&content).map_err(|e| {
            ConfigError::ParseError {
                path: path.display().to_string(),
                message: format_yaml_error(&e),
            }
        })?;

        Ok(config)
    }

    /// Load configuration from file with environment variable overrides
    ///
    /// Environment variables follow the pattern:
    /// - HRC_SERVER_HOST, HRC_SERVER_PORT, HRC_SERVER_CORS_ORIGIN, HRC_SERVER_SECURE_COOKIES
    /// - HRC_BACKEND_URL, HRC_BACKEND_ANON_KEY, HRC_BACKEND_REQUEST_TIMEOUT_SECS
    /// - HRC_STORAGE_AVATAR_BUCKET, HRC_STORAGE_THUMBNAIL_BUCKET, HRC_STORAGE_MAX_FILE_SIZE
    /// - HRC_UI_PAGE_SIZE, HRC_UI_ADMIN_PAGE_SIZE
    /// - HRC_UI_NOTIFICATION_MAX_VISIBLE, HRC_UI_NOTIFICATION_DURATION_MS
    /// - HRC_UI_SEARCH_DEBOUNCE_MS
    pub fn load_with_env(path: &std::path::Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Check the values the application cannot start without
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "backend.url is required".to_string(),
            ));
        }
        if !self.backend.url.starts_with("http://") && !self.backend.url.starts_with("https://") {
            return Err(ConfigError::ValidationError(format!(
                "backend.url must be an http(s) URL, got '{}'",
                self.backend.url
            )));
        }
        if self.backend.anon_key.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "backend.anon_key is required".to_string(),
            ));
        }
        if self.ui.notification_max_visible == 0 {
            return Err(ConfigError::ValidationError(
                "ui.notification_max_visible must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply environment variable overrides to the configuration
    fn apply_env_overrides(&mut self) {
        // Server configuration
        if let Ok(host) = std::env::var("HRC_SERVER_HOST") {
            self.server.host = host;
        }
        override_parsed("HRC_SERVER_PORT", &mut self.server.port);
        if let Ok(cors_origin) = std::env::var("HRC_SERVER_CORS_ORIGIN") {
            self.server.cors_origin = cors_origin;
        }
        override_parsed("HRC_SERVER_SECURE_COOKIES", &mut self.server.secure_cookies);

        // Backend configuration
        if let Ok(url) = std::env::var("HRC_BACKEND_URL") {
            self.backend.url = url;
        }
        if let Ok(key) = std::env::var("HRC_BACKEND_ANON_KEY") {
            self.backend.anon_key = key;
        }
        override_parsed(
            "HRC_BACKEND_REQUEST_TIMEOUT_SECS",
            &mut self.backend.request_timeout_secs,
        );

        // Storage configuration
        if let Ok(bucket) = std::env::var("HRC_STORAGE_AVATAR_BUCKET") {
            self.storage.avatar_bucket = bucket;
        }
        if let Ok(bucket) = std::env::var("HRC_STORAGE_THUMBNAIL_BUCKET") {
            self.storage.thumbnail_bucket = bucket;
        }
        override_parsed("HRC_STORAGE_MAX_FILE_SIZE", &mut self.storage.max_file_size);

        // UI configuration
        override_parsed("HRC_UI_PAGE_SIZE", &mut self.ui.page_size);
        override_parsed("HRC_UI_ADMIN_PAGE_SIZE", &mut self.ui.admin_page_size);
        override_parsed(
            "HRC_UI_NOTIFICATION_MAX_VISIBLE",
            &mut self.ui.notification_max_visible,
        );
        override_parsed(
            "HRC_UI_NOTIFICATION_DURATION_MS",
            &mut self.ui.notification_duration_ms,
        );
        override_parsed("HRC_UI_SEARCH_DEBOUNCE_MS", &mut self.ui.search_debounce_ms);
    }
}

/// Overwrite `target` with the parsed env value; invalid values are ignored
fn override_parsed<T: std::str::FromStr>(var: &str, target: &mut T) {
    if let Ok(raw) = std::env::var(var) {
        match raw.trim().parse::<T>() {
            Ok(value) => *target = value,
            Err(_) => tracing::warn!("Ignoring invalid value for {}: {}", var, raw),
        }
    }
}

/// Format YAML parsing error with location and context
fn format_yaml_error(e: &serde_yaml::Error) -> String {
    if let Some(location) = e.location() {
        format!(
            "at line {}, column {}: {}",
            location.line(),
            location.column(),
            e
        )
    } else {
        e.to_string()
    }
}

// Shared mutex for all config tests that modify environment variables.
#[cfg(test)]
static CONFIG_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());
