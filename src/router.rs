//! Registration, matching and dispatch.
//!
//! Routes are kept in registration order and scanned linearly for every
//! request. The first route whose method and segments match wins, so an
//! earlier registration shadows any later one it overlaps with.

use std::convert::Infallible;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future;
use tokio::task::JoinError;

use crate::handler::{handler_fn, Handler, NotFound};
use crate::http::{Body, Request, Response};
use crate::params::Params;

/// Method sentinel matching every request method.
const ANY_METHOD: &str = "*";

/// One component of a route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// Must equal the request segment byte for byte.
    Literal(String),
    /// `:name`; matches any single request segment and binds it to `name`.
    Param(String),
}

impl Segment {
    fn parse(raw: &str) -> Self {
        match raw.strip_prefix(':') {
            Some(name) => Segment::Param(name.to_owned()),
            None => Segment::Literal(raw.to_owned()),
        }
    }
}

struct Route {
    method: String,
    segments: Vec<Segment>,
    /// The pattern ended in `/`: any longer request path is matched too.
    prefix: bool,
    handler: Box<dyn Handler>,
}

impl Route {
    fn new(method: &str, pattern: &str, handler: Box<dyn Handler>) -> Self {
        let (segments, prefix) = split_path(pattern);
        Self {
            method: method.to_ascii_uppercase(),
            segments: segments.into_iter().map(Segment::parse).collect(),
            prefix,
            handler,
        }
    }

    fn accepts_method(&self, method: &str) -> bool {
        self.method == ANY_METHOD || self.method.eq_ignore_ascii_case(method)
    }

    /// Matches the request segments against this route, returning the bound
    /// parameters on success.
    fn match_segments(&self, path: &[&str]) -> Option<Params> {
        let fits = if self.prefix {
            path.len() >= self.segments.len()
        } else {
            path.len() == self.segments.len()
        };
        if !fits {
            return None;
        }

        let mut params = Params::new();
        for (segment, value) in self.segments.iter().zip(path) {
            match segment {
                Segment::Param(name) => params.insert(name, value),
                Segment::Literal(literal) if literal == value => {}
                Segment::Literal(_) => return None,
            }
        }
        Some(params)
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("segments", &self.segments)
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

/// Splits a pattern or request path into its segments.
///
/// A single leading and a single trailing `/` are ignored, and the root path
/// has no segments. The flag reports whether the input ended with `/`.
fn split_path(path: &str) -> (Vec<&str>, bool) {
    let trailing = path.ends_with('/');
    let path = path.strip_prefix('/').unwrap_or(path);
    let path = path.strip_suffix('/').unwrap_or(path);
    if path.is_empty() {
        return (Vec::new(), trailing);
    }
    (path.split('/').collect(), trailing)
}

/// A first-match HTTP request router.
///
/// ```
/// use way::{Body, Request, RequestExt, Response, Router};
///
/// let mut router = Router::new();
/// router
///     .handle_func("GET", "/hello/:name", |req: Request| {
///         Response::new(Body::new(format!("Hello, {}!", req.param("name"))))
///     })
///     .handle_func("*", "/static/", |_req: Request| Response::new(Body::new("asset")));
///
/// let req = hyper::Request::get("/hello/world").body(Body::empty()).unwrap();
/// let res = router.serve(req);
/// assert_eq!(&res.into_body().into_bytes().unwrap()[..], b"Hello, world!");
/// ```
///
/// Patterns are `/`-separated segments. A segment starting with `:` is a
/// parameter and matches any single request segment. A pattern ending in `/`
/// is a prefix route and also matches longer paths. The method `*` matches
/// every request method; other methods compare case-insensitively.
pub struct Router {
    routes: Vec<Route>,
    not_found: Box<dyn Handler>,
}

impl Router {
    /// Creates a router with no routes and the default 404 handler.
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            not_found: Box::new(NotFound),
        }
    }

    /// Registers `handler` for requests matching `method` and `pattern`.
    ///
    /// Routes are tried in the order they were registered.
    pub fn handle(&mut self, method: &str, pattern: &str, handler: impl Handler) -> &mut Self {
        log::trace!("registering route {} {}", method, pattern);
        self.routes
            .push(Route::new(method, pattern, Box::new(handler)));
        self
    }

    /// Registers a plain function or closure, see [`Router::handle`].
    pub fn handle_func<F>(&mut self, method: &str, pattern: &str, f: F) -> &mut Self
    where
        F: Fn(Request) -> Response + Send + Sync + 'static,
    {
        self.handle(method, pattern, handler_fn(f))
    }

    /// Replaces the handler used when no route matches.
    pub fn not_found(&mut self, handler: impl Handler) -> &mut Self {
        self.not_found = Box::new(handler);
        self
    }

    /// Finds the first route accepting `method` and `path`, with the
    /// parameters it binds.
    fn find(&self, method: &str, path: &str) -> Option<(&Route, Params)> {
        let (path, _) = split_path(path);
        self.routes.iter().find_map(|route| {
            if !route.accepts_method(method) {
                return None;
            }
            route.match_segments(&path).map(|params| (route, params))
        })
    }

    /// Dispatches a request to the first matching route, or to the
    /// not-found handler.
    pub fn serve(&self, mut request: Request) -> Response {
        let method = request.method().as_str();

        match self.find(method, request.uri().path()) {
            Some((route, params)) => {
                log::trace!("{} {} matched {:?}", method, request.uri().path(), route);
                request.extensions_mut().insert(params);
                route.handler.call(request)
            }
            None => {
                log::debug!("no route for {} {}", method, request.uri().path());
                self.not_found.call(request)
            }
        }
    }

    /// Converts the router into a service factory for [`hyper::Server`].
    ///
    /// ```no_run
    /// # async fn run() -> Result<(), hyper::Error> {
    /// let router = way::Router::new();
    /// let addr = ([127, 0, 0, 1], 3000).into();
    /// hyper::Server::bind(&addr).serve(router.into_service()).await
    /// # }
    /// ```
    pub fn into_service(self) -> MakeRouterService {
        MakeRouterService {
            router: Arc::new(self),
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.routes)
            .finish_non_exhaustive()
    }
}

impl Handler for Router {
    fn call(&self, request: Request) -> Response {
        self.serve(request)
    }
}

/// Hands out one [`RouterService`] per connection. Created with
/// [`Router::into_service`].
#[derive(Clone, Debug)]
pub struct MakeRouterService {
    router: Arc<Router>,
}

impl<T> hyper::service::Service<T> for MakeRouterService {
    type Response = RouterService;
    type Error = Infallible;
    type Future = future::Ready<Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, _target: T) -> Self::Future {
        future::ready(Ok(RouterService {
            router: self.router.clone(),
        }))
    }
}

/// A [`Router`] served over a single hyper connection.
///
/// Each request is dispatched on tokio's blocking pool. A panicking handler
/// is not caught: the panic resumes on the connection task.
#[derive(Clone, Debug)]
pub struct RouterService {
    router: Arc<Router>,
}

impl hyper::service::Service<hyper::Request<hyper::Body>> for RouterService {
    type Response = hyper::Response<hyper::Body>;
    type Error = JoinError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: hyper::Request<hyper::Body>) -> Self::Future {
        let router = self.router.clone();
        Box::pin(async move {
            let dispatch = tokio::task::spawn_blocking(move || router.serve(request.map(Body)));
            match dispatch.await {
                Ok(response) => Ok(response.map(|body| body.0)),
                Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
                Err(err) => Err(err),
            }
        })
    }
}
