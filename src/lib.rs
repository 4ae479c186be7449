#![allow(clippy::return_self_not_must_use)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

//! ## Matching
//!
//! Routes are tried in registration order and the first one that fits wins:
//!
//! - the method must equal the request method, ignoring case, unless the
//!   route was registered with `*`;
//! - the pattern and the request path are split on `/` after dropping one
//!   leading and one trailing slash;
//! - `:name` segments match any single request segment and bind it, other
//!   segments must be equal byte for byte;
//! - a pattern ending in `/` is a prefix route and matches any path that
//!   starts with its segments, otherwise the segment counts must be equal.
//!
//! Requests nothing matches go to the not-found handler, a bare 404 unless
//! replaced with [`Router::not_found`].
//!
//! ## Serving
//!
//! [`Router::into_service`] mounts a router on any `hyper::Server`, and
//! [`Server`] wraps that with settings loaded from the environment
//! (`WAY_` prefix), a `config` file or the builder API. Handlers are plain
//! synchronous functions and run on tokio's blocking pool.
//!
//! ## Features
//! - `http2`: Enables HTTP/2 support (enabled by default)

pub use crate::config::ServerConfig;
pub use crate::error::{Result, ServeError};
pub use crate::handler::{handler_fn, Handler, HandlerFn, NotFound};
pub use crate::http::{Body, Bytes, Request, Response, ResponseBuilder};
pub use crate::params::{param, RequestExt};
pub use crate::router::{MakeRouterService, Router, RouterService};
pub use crate::server::Server;

mod config;
mod error;
mod handler;
mod http;
mod params;
mod router;
mod server;

// Re-export common types
pub use hyper;
