use serde::Deserialize;
use std::time::Duration;

/// Settings for hosting a router with [`Server`](crate::Server).
///
/// Covers the blocking pool that runs handlers, the listen address and the
/// HTTP/1.x and HTTP/2 (with the "http2" feature) connection options. It can
/// be loaded from environment variables with the "WAY_" prefix or from a
/// config file.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Maximum number of blocking threads running handlers. Defaults to CPU count * 15.
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
    /// Seconds an idle handler thread is kept before it exits. Defaults to 6 seconds.
    #[serde(default = "default_keep_alive_secs")]
    pub worker_keep_alive_secs: u64,
    /// Server host address. Defaults to "127.0.0.1".
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port number. Defaults to 3000.
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_true")]
    pub http1_keep_alive: bool,
    #[serde(default)]
    pub http1_half_close: bool,
    /// Maximum buffer size for HTTP/1.x connections. Defaults to 512kb (524,288 bytes).
    #[serde(default = "default_max_buf_size")]
    pub http1_max_buf_size: usize,
    #[serde(default)]
    pub http1_pipeline_flush: bool,
    #[serde(default = "default_true")]
    pub http1_writev: bool,
    #[serde(default)]
    pub http1_title_case_headers: bool,
    #[serde(default)]
    pub http1_preserve_header_case: bool,
    #[serde(default)]
    pub http1_only: bool,
    #[cfg(feature = "http2")]
    #[serde(default)]
    pub http2_only: bool,
    #[cfg(feature = "http2")]
    #[serde(default)]
    pub http2_initial_stream_window_size: Option<u32>,
    #[cfg(feature = "http2")]
    #[serde(default)]
    pub http2_initial_connection_window_size: Option<u32>,
    #[cfg(feature = "http2")]
    #[serde(default = "default_true")]
    pub http2_adaptive_window: bool,
    #[cfg(feature = "http2")]
    #[serde(default)]
    pub http2_max_frame_size: Option<u32>,
    #[cfg(feature = "http2")]
    #[serde(default)]
    pub http2_max_concurrent_streams: Option<u32>,
    #[cfg(feature = "http2")]
    #[serde(default = "default_max_buf_size")]
    pub http2_max_send_buf_size: usize,
}

impl TryFrom<config::Config> for ServerConfig {
    type Error = config::ConfigError;

    fn try_from(config: config::Config) -> Result<Self, Self::Error> {
        config.try_deserialize()
    }
}

impl ServerConfig {
    /// Loads the configuration.
    ///
    /// Sources, later ones overriding earlier ones:
    /// 1. a `.env` file, if present, is loaded into the environment
    /// 2. a "config" file (`config.toml`, `config.json`, ...), if present
    /// 3. environment variables prefixed with "WAY_", e.g. `WAY_PORT=8080`
    ///
    /// # Errors
    /// Returns a ConfigError if a source cannot be read or a value has the wrong type.
    pub fn new() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();

        config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("WAY"))
            .build()?
            .try_into()
    }

    /// The `host:port` pair to listen on.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Converts worker_keep_alive_secs into a Duration.
    pub fn worker_keep_alive(&self) -> Duration {
        Duration::from_secs(self.worker_keep_alive_secs)
    }
}

fn default_max_workers() -> usize {
    num_cpus::get() * 15
}

fn default_keep_alive_secs() -> u64 {
    6
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

/// 512kb
fn default_max_buf_size() -> usize {
    524_288
}

fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
            worker_keep_alive_secs: default_keep_alive_secs(),
            host: default_host(),
            port: default_port(),
            http1_keep_alive: true,
            http1_half_close: false,
            http1_max_buf_size: default_max_buf_size(),
            http1_pipeline_flush: false,
            http1_writev: true,
            http1_title_case_headers: false,
            http1_preserve_header_case: false,
            http1_only: false,
            #[cfg(feature = "http2")]
            http2_only: false,
            #[cfg(feature = "http2")]
            http2_initial_stream_window_size: None,
            #[cfg(feature = "http2")]
            http2_initial_connection_window_size: None,
            #[cfg(feature = "http2")]
            http2_adaptive_window: true,
            #[cfg(feature = "http2")]
            http2_max_frame_size: None,
            #[cfg(feature = "http2")]
            http2_max_concurrent_streams: None,
            #[cfg(feature = "http2")]
            http2_max_send_buf_size: default_max_buf_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    /// Tests that the default configuration values are set correctly.
    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.max_workers, num_cpus::get() * 15);
        assert_eq!(config.port, 3000);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.addr(), "127.0.0.1:3000");
        assert_eq!(config.worker_keep_alive(), Duration::from_secs(6));
    }

    /// Tests that an empty source deserializes to the same values as `Default`.
    #[test]
    fn test_serde_defaults_match_default() {
        let loaded: ServerConfig = config::Config::builder()
            .build()
            .unwrap()
            .try_into()
            .unwrap();
        let default = ServerConfig::default();

        assert_eq!(loaded.addr(), default.addr());
        assert_eq!(loaded.max_workers, default.max_workers);
        assert_eq!(loaded.http1_keep_alive, default.http1_keep_alive);
        assert_eq!(loaded.http1_max_buf_size, default.http1_max_buf_size);
        assert_eq!(loaded.http1_writev, default.http1_writev);
    }

    /// Tests configuration loading from environment variables with the
    /// "WAY_" prefix.
    #[test]
    fn test_config_from_env() {
        env::set_var("WAY_PORT", "9000");
        env::set_var("WAY_HOST", "0.0.0.0");
        env::set_var("WAY_MAX_WORKERS", "4");

        let config = ServerConfig::new().unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.max_workers, 4);

        env::remove_var("WAY_PORT");
        env::remove_var("WAY_HOST");
        env::remove_var("WAY_MAX_WORKERS");
    }

    /// Tests HTTP/2 specific default configuration values.
    #[cfg(feature = "http2")]
    #[test]
    fn test_http2_config() {
        let config = ServerConfig::default();
        assert_eq!(config.http2_max_send_buf_size, 524288);
        assert!(config.http2_adaptive_window);
        assert!(!config.http2_only);
    }
}
