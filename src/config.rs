use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

pub const DEFAULT_API_BASE: &str = "/api/v1";
pub const DEFAULT_PROXY_TARGET: &str = "http://127.0.0.1:8000";

#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub auth: AuthConfig,
    pub upload: UploadConfig,
    /// Page size used for paginated photocard lists
    pub page_size: u32,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the catalog API, without trailing slash. May be relative
    /// (e.g. `/api/v1`), in which case it is resolved against `proxy_target`.
    pub base_url: String,
    /// Origin that relative base URLs are served from (dev proxy).
    pub proxy_target: String,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// Auth/storage provider URL (Supabase project URL)
    pub provider_url: String,
    /// Public key sent as `apikey` with every provider request
    pub anon_key: String,
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub bucket: String,
    /// Maximum size of each uploaded image in bytes
    pub max_file_size: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            proxy_target: DEFAULT_PROXY_TARGET.to_string(),
            request_timeout: Duration::from_secs(20),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            bucket: "photocards".to_string(),
            max_file_size: 5 * 1024 * 1024, // 5MB
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            auth: AuthConfig::default(),
            upload: UploadConfig::default(),
            page_size: 40,
        }
    }
}

impl ApiConfig {
    /// True when the base URL already names a host.
    pub fn is_absolute(&self) -> bool {
        self.base_url.starts_with("http://") || self.base_url.starts_with("https://")
    }

    /// The absolute base URL requests are built from.
    pub fn resolved_base(&self) -> String {
        if self.is_absolute() {
            self.base_url.clone()
        } else {
            format!(
                "{}{}",
                self.proxy_target.trim_end_matches('/'),
                self.base_url
            )
        }
    }
}

impl AuthConfig {
    pub fn is_configured(&self) -> bool {
        !self.provider_url.is_empty() && !self.anon_key.is_empty()
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let base_url = normalize_base(
            &std::env::var("KATALOG_API_BASE_URL").unwrap_or_default(),
        );

        let proxy_target = std::env::var("KATALOG_API_PROXY_TARGET")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_PROXY_TARGET.to_string());

        let request_timeout = std::env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(20));

        let provider_url = std::env::var("SUPABASE_URL")
            .unwrap_or_default()
            .trim_end_matches('/')
            .to_string();
        let anon_key = std::env::var("SUPABASE_ANON_KEY").unwrap_or_default();

        let bucket = std::env::var("STORAGE_BUCKET").unwrap_or_else(|_| "photocards".to_string());

        let max_file_size = std::env::var("MAX_UPLOAD_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5 * 1024 * 1024); // 5MB

        let page_size = std::env::var("PAGE_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(40);

        let config = Config {
            api: ApiConfig {
                base_url,
                proxy_target,
                request_timeout,
            },
            auth: AuthConfig {
                provider_url,
                anon_key,
            },
            upload: UploadConfig {
                bucket,
                max_file_size,
            },
            page_size,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.api.is_absolute() && !self.api.base_url.starts_with('/') {
            return Err(ConfigError::ValidationError(format!(
                "KATALOG_API_BASE_URL must be an http(s) URL or start with '/', got '{}'",
                self.api.base_url
            )));
        }

        if self.page_size == 0 {
            return Err(ConfigError::ValidationError(
                "PAGE_SIZE must be greater than 0".to_string(),
            ));
        }

        if self.api.request_timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "REQUEST_TIMEOUT_SECS must be greater than 0".to_string(),
            ));
        }

        if self.upload.max_file_size == 0 {
            return Err(ConfigError::ValidationError(
                "MAX_UPLOAD_SIZE must be greater than 0".to_string(),
            ));
        }

        if self.upload.bucket.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "STORAGE_BUCKET cannot be empty".to_string(),
            ));
        }

        if !self.auth.is_configured() {
            tracing::warn!(
                "Auth provider not configured. Set SUPABASE_URL and SUPABASE_ANON_KEY \
                 to sign in and upload photocards."
            );
        }

        Ok(())
    }
}

/// Empty means the default base; a trailing slash is stripped.
fn normalize_base(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return DEFAULT_API_BASE.to_string();
    }
    trimmed.trim_end_matches('/').to_string()
}
