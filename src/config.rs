//! Service configuration, read from the environment (and `.env` if present).

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use crate::error::ConfigError;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub static_dir: PathBuf,
    pub pages_dir: PathBuf,
    /// `None` allows any origin.
    pub cors_origins: Option<Vec<String>>,
    pub gemini: GeminiConfig,
}

#[derive(Clone)]
pub struct GeminiConfig {
    /// Chat generation is disabled when no key is configured.
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            static_dir: PathBuf::from("static"),
            pages_dir: PathBuf::from("."),
            cors_origins: None,
            gemini: GeminiConfig {
                api_key: None,
                model: DEFAULT_GEMINI_MODEL.into(),
                endpoint: DEFAULT_GEMINI_ENDPOINT.into(),
            },
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {:?}", path);
        }
        let config = Self::from_lookup(|key| std::env::var(key).ok())?;
        tracing::info!("Configuration loaded: {}", config.bind_addr);
        Ok(config)
    }

    /// Build a config from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let host: IpAddr = match get("HOST") {
            Some(raw) => raw.parse().map_err(|e: std::net::AddrParseError| {
                ConfigError::InvalidValue {
                    key: "HOST",
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?,
            None => defaults.bind_addr.ip(),
        };

        let port: u16 = match get("PORT") {
            Some(raw) => raw.parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidValue {
                    key: "PORT",
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?,
            None => defaults.bind_addr.port(),
        };

        let cors_origins = get("HAYYA_CORS_ORIGINS").and_then(|raw| {
            let origins: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect();
            if origins.is_empty() || origins.iter().any(|o| o == "*") {
                None
            } else {
                Some(origins)
            }
        });

        Ok(Self {
            bind_addr: SocketAddr::new(host, port),
            static_dir: get("HAYYA_STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            pages_dir: get("HAYYA_PAGES_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.pages_dir),
            cors_origins,
            gemini: GeminiConfig {
                api_key: get("GEMINI_API_KEY"),
                model: get("GEMINI_MODEL").unwrap_or(defaults.gemini.model),
                endpoint: get("GEMINI_ENDPOINT")
                    .map(|e| e.trim_end_matches('/').to_string())
                    .unwrap_or(defaults.gemini.endpoint),
            },
        })
    }
}
