use std::future::{self, Future};
use std::net as sys;
use std::time::Duration;

use hyper::server::conn::AddrIncoming;
use hyper::server::Builder;

use crate::config::ServerConfig;
use crate::error::{Result, ServeError};
use crate::router::Router;

/// Smallest HTTP/1 read buffer hyper accepts.
const MIN_HTTP1_BUF_SIZE: usize = 8192;

/// Hosts a [`Router`] on hyper.
///
/// ```no_run
/// use way::{Body, Request, Response, Router, Server};
///
/// fn main() -> Result<(), way::ServeError> {
///     let mut router = Router::new();
///     router.handle_func("GET", "/", |_req: Request| Response::new(Body::new("Hello World!")));
///
///     Server::bind("127.0.0.1:3000").run(router)
/// }
/// ```
#[derive(Debug)]
pub struct Server {
    listener: Listener,
    config: ServerConfig,
}

#[derive(Debug)]
enum Listener {
    Addr(String),
    Tcp(sys::TcpListener),
}

impl Server {
    /// Creates a server that will listen on `addr`, with default settings
    /// for everything else.
    pub fn bind(addr: impl Into<String>) -> Self {
        Self {
            listener: Listener::Addr(addr.into()),
            config: ServerConfig::default(),
        }
    }

    /// Creates a server listening on the configured `host:port`.
    pub fn from_config(config: ServerConfig) -> Self {
        Self {
            listener: Listener::Addr(config.addr()),
            config,
        }
    }

    /// Loads [`ServerConfig::new`] and creates a server from it.
    pub fn from_env() -> Result<Self> {
        Ok(Self::from_config(ServerConfig::new()?))
    }

    /// Serves on an already bound listener, keeping `config` for the
    /// connection and pool settings.
    pub fn from_tcp(listener: sys::TcpListener, config: ServerConfig) -> Self {
        Self {
            listener: Listener::Tcp(listener),
            config,
        }
    }

    /// Upper bound on threads running handlers concurrently.
    pub fn max_workers(mut self, max_workers: usize) -> Self {
        self.config.max_workers = max_workers;
        self
    }

    /// How long an idle handler thread lingers before exiting.
    ///
    /// Kept in whole seconds; a fractional part rounds up.
    pub fn worker_keep_alive(mut self, keep_alive: Duration) -> Self {
        let partial = u64::from(keep_alive.subsec_nanos() > 0);
        self.config.worker_keep_alive_secs = keep_alive.as_secs().saturating_add(partial);
        self
    }

    pub fn http1_keep_alive(mut self, enabled: bool) -> Self {
        self.config.http1_keep_alive = enabled;
        self
    }

    pub fn http1_only(mut self, enabled: bool) -> Self {
        self.config.http1_only = enabled;
        self
    }

    #[cfg(feature = "http2")]
    pub fn http2_only(mut self, enabled: bool) -> Self {
        self.config.http2_only = enabled;
        self
    }

    /// Serves `router` until the server fails.
    ///
    /// Must be called within a tokio runtime. Handlers run on the runtime's
    /// blocking pool, see [`Server::run`] to size it from the configuration.
    pub async fn serve(self, router: Router) -> Result<()> {
        self.serve_with_shutdown(router, future::pending()).await
    }

    /// Serves `router` until `signal` completes, then drains open
    /// connections and returns.
    pub async fn serve_with_shutdown<F>(self, router: Router, signal: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let Server { listener, config } = self;
        let builder = configure(listener.incoming().await?, &config);

        let server = builder.serve(router.into_service());
        log::info!("listening on http://{}", server.local_addr());

        server.with_graceful_shutdown(signal).await.map_err(|err| {
            log::error!("server error: {}", err);
            ServeError::Server(err)
        })
    }

    /// Builds a multi-threaded tokio runtime and serves `router` on it.
    ///
    /// The blocking pool grows up to `max_workers` threads and idle threads
    /// exit after `worker_keep_alive`.
    pub fn run(self, router: Router) -> Result<()> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("way-worker")
            .max_blocking_threads(self.config.max_workers.max(1))
            .thread_keep_alive(self.config.worker_keep_alive())
            .build()
            .map_err(ServeError::Runtime)?;

        runtime.block_on(self.serve(router))
    }
}

impl Listener {
    async fn incoming(self) -> Result<Builder<AddrIncoming>> {
        match self {
            Listener::Tcp(listener) => hyper::Server::from_tcp(listener).map_err(ServeError::Bind),
            Listener::Addr(addr) => {
                let resolved = tokio::net::lookup_host(addr.as_str())
                    .await
                    .map_err(|err| ServeError::Address(addr.clone(), err))?
                    .next()
                    .ok_or_else(|| ServeError::Unresolved(addr.clone()))?;
                hyper::Server::try_bind(&resolved).map_err(ServeError::Bind)
            }
        }
    }
}

fn configure(builder: Builder<AddrIncoming>, config: &ServerConfig) -> Builder<AddrIncoming> {
    if config.http1_max_buf_size < MIN_HTTP1_BUF_SIZE {
        log::warn!(
            "http1_max_buf_size {} is below {}, using {}",
            config.http1_max_buf_size,
            MIN_HTTP1_BUF_SIZE,
            MIN_HTTP1_BUF_SIZE
        );
    }

    let builder = builder
        .http1_keepalive(config.http1_keep_alive)
        .http1_half_close(config.http1_half_close)
        .http1_max_buf_size(config.http1_max_buf_size.max(MIN_HTTP1_BUF_SIZE))
        .http1_pipeline_flush(config.http1_pipeline_flush)
        .http1_writev(config.http1_writev)
        .http1_title_case_headers(config.http1_title_case_headers)
        .http1_preserve_header_case(config.http1_preserve_header_case)
        .http1_only(config.http1_only);

    #[cfg(feature = "http2")]
    let builder = builder
        .http2_only(config.http2_only)
        .http2_initial_stream_window_size(config.http2_initial_stream_window_size)
        .http2_initial_connection_window_size(config.http2_initial_connection_window_size)
        .http2_adaptive_window(config.http2_adaptive_window)
        .http2_max_frame_size(config.http2_max_frame_size)
        .http2_max_concurrent_streams(config.http2_max_concurrent_streams)
        .http2_max_send_buf_size(config.http2_max_send_buf_size);

    builder
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests that the builder toggles land in the configuration.
    #[test]
    fn test_builder_settings() {
        let server = Server::bind("127.0.0.1:0")
            .max_workers(4)
            .worker_keep_alive(Duration::from_secs(30))
            .http1_keep_alive(false)
            .http1_only(true);

        assert!(matches!(&server.listener, Listener::Addr(addr) if addr == "127.0.0.1:0"));
        assert_eq!(server.config.max_workers, 4);
        assert_eq!(server.config.worker_keep_alive(), Duration::from_secs(30));
        assert!(!server.config.http1_keep_alive);
        assert!(server.config.http1_only);
    }

    /// Tests that a sub-second keep-alive rounds up instead of collapsing to zero.
    #[test]
    fn test_worker_keep_alive_rounds_up() {
        let server = Server::bind("127.0.0.1:0").worker_keep_alive(Duration::from_millis(500));
        assert_eq!(server.config.worker_keep_alive(), Duration::from_secs(1));

        let server = Server::bind("127.0.0.1:0").worker_keep_alive(Duration::from_millis(2500));
        assert_eq!(server.config.worker_keep_alive(), Duration::from_secs(3));
    }

    /// Tests that `from_config` listens on the configured host and port.
    #[test]
    fn test_from_config_addr() {
        let config = ServerConfig {
            host: "0.0.0.0".into(),
            port: 8080,
            ..ServerConfig::default()
        };
        let server = Server::from_config(config);

        assert!(matches!(&server.listener, Listener::Addr(addr) if addr == "0.0.0.0:8080"));
    }

    /// Tests that an unresolvable address is reported before serving.
    #[tokio::test]
    async fn test_invalid_address() {
        let result = Server::bind("not an address").serve(Router::new()).await;
        assert!(matches!(result, Err(ServeError::Address(..))));
    }

    /// Tests that a resolved address is bound and served until shutdown.
    #[tokio::test]
    async fn test_resolved_address_serves() {
        let result = Server::bind("127.0.0.1:0")
            .serve_with_shutdown(Router::new(), async {})
            .await;
        assert!(result.is_ok(), "{:?}", result);
    }
}
