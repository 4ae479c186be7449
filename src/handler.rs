use std::fmt;
use std::sync::Arc;

use hyper::StatusCode;

use crate::http::{Body, Request, Response};

/// Something that turns a [`Request`] into a [`Response`].
///
/// Handlers are synchronous and run on tokio's blocking pool when served, so
/// they may block, for example to read the request body.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, request: Request) -> Response;
}

/// Adapts a plain function or closure into a [`Handler`].
///
/// ```
/// use way::{handler_fn, Body, Request, Response, Router};
///
/// fn index(_: Request) -> Response {
///     Response::new(Body::new("index"))
/// }
///
/// let mut router = Router::new();
/// router.handle("GET", "/", handler_fn(index));
/// ```
pub fn handler_fn<F>(f: F) -> HandlerFn<F>
where
    F: Fn(Request) -> Response + Send + Sync + 'static,
{
    HandlerFn(f)
}

/// A [`Handler`] backed by a function. Created with [`handler_fn`].
#[derive(Clone, Copy)]
pub struct HandlerFn<F>(F);

impl<F> Handler for HandlerFn<F>
where
    F: Fn(Request) -> Response + Send + Sync + 'static,
{
    fn call(&self, request: Request) -> Response {
        (self.0)(request)
    }
}

impl<F> fmt::Debug for HandlerFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerFn").finish_non_exhaustive()
    }
}

/// The default not-found handler: status 404, no headers, empty body.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotFound;

impl Handler for NotFound {
    fn call(&self, _request: Request) -> Response {
        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::NOT_FOUND;
        response
    }
}

impl<H: Handler + ?Sized> Handler for Arc<H> {
    fn call(&self, request: Request) -> Response {
        (**self).call(request)
    }
}

impl<H: Handler + ?Sized> Handler for Box<H> {
    fn call(&self, request: Request) -> Response {
        (**self).call(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests that the default not-found handler writes a bare 404.
    #[test]
    fn test_not_found_default() {
        let response = NotFound.call(Request::new(Body::empty()));

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().is_empty());
        assert!(response.into_body().into_bytes().unwrap().is_empty());
    }

    /// Tests that `handler_fn` forwards the request to the wrapped closure.
    #[test]
    fn test_handler_fn_forwards() {
        let handler = handler_fn(|req: Request| Response::new(Body::new(req.uri().path().to_owned())));
        let req = hyper::Request::builder()
            .uri("/echo/path")
            .body(Body::empty())
            .unwrap();

        let body = handler.call(req).into_body().into_bytes().unwrap();
        assert_eq!(&body[..], b"/echo/path");
    }

    /// Tests that shared and boxed handlers delegate to the inner handler.
    #[test]
    fn test_shared_handlers_delegate() {
        let shared: Arc<dyn Handler> = Arc::new(NotFound);
        assert_eq!(shared.call(Request::new(Body::empty())).status(), 404);

        let boxed: Box<dyn Handler> = Box::new(NotFound);
        assert_eq!(boxed.call(Request::new(Body::empty())).status(), 404);
    }
}
