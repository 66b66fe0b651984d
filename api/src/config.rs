use std::net::{IpAddr, Ipv4Addr, SocketAddr};

pub const DEFAULT_BACKEND_API_URL: &str = "http://localhost:3001";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// Log line format selected through `LOG_FORMAT`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    /// `json` (any case) selects JSON lines; anything else is human-readable.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }

    pub fn from_env() -> Self {
        std::env::var("LOG_FORMAT")
            .map(|v| Self::parse(&v))
            .unwrap_or_default()
    }
}

/// Service configuration, resolved once at startup and injected into
/// [`AppState`](crate::state::AppState).
#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of the activity service.
    pub backend_api_url: String,
    pub host: IpAddr,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_api_url: DEFAULT_BACKEND_API_URL.to_string(),
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            allowed_origins: vec![DEFAULT_ALLOWED_ORIGIN.to_string()],
            log_format: LogFormat::Pretty,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Unset or empty keys keep
    /// their defaults; unparseable values are logged and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(url) = get("BACKEND_API_URL") {
            config.backend_api_url = url;
        }

        if let Some(host) = get("HOST") {
            match host.parse::<IpAddr>() {
                Ok(host) => config.host = host,
                Err(_) => tracing::warn!(value = %host, "Invalid HOST, using default"),
            }
        }

        if let Some(port) = get("PORT") {
            match port.parse::<u16>() {
                Ok(port) => config.port = port,
                Err(_) => tracing::warn!(value = %port, "Invalid PORT, using default"),
            }
        }

        if let Some(origins) = get("CORS_ALLOWED_ORIGINS") {
            config.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect();
        }

        if let Some(format) = get("LOG_FORMAT") {
            config.log_format = LogFormat::parse(&format);
        }

        config
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
