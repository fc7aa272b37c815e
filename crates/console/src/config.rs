/// Default catalog host, matching the backend's development address.
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";

/// Console configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminConfig {
    /// Catalog host without the `/products` path.
    pub api_base_url: String,
    /// Check each product image after a listing and fall back to the
    /// placeholder for the ones that fail to load.
    pub probe_images: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("API_BASE_URL must start with http:// or https://, got '{0}'")]
    InvalidBaseUrl(String),

    #[error("{name} must be true or false, got '{value}'")]
    InvalidFlag { name: &'static str, value: String },
}

impl AdminConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var        | Default                 |
    /// |----------------|-------------------------|
    /// | `API_BASE_URL` | `http://127.0.0.1:8000` |
    /// | `PROBE_IMAGES` | `true`                  |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_base_url = lookup("API_BASE_URL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(api_base_url));
        }

        let probe_images = match lookup("PROBE_IMAGES") {
            None => true,
            Some(value) => parse_flag("PROBE_IMAGES", &value)?,
        };

        Ok(Self {
            api_base_url,
            probe_images,
        })
    }
}

fn parse_flag(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            name,
            value: value.to_string(),
        }),
    }
}
