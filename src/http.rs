use core::fmt;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::executor;
use futures::Stream;
use hyper::body::HttpBody;

pub use hyper::body::Bytes;

/// An HTTP request as seen by a [`Handler`](crate::Handler).
///
/// Path parameters bound by the [`Router`](crate::Router) travel in the
/// request's extensions and are read back with [`param`](crate::param).
pub type Request = hyper::Request<Body>;

/// An HTTP response.
///
/// ```
/// # use way::{Response, Body};
/// let response = Response::new(Body::new("Hello world!"));
/// ```
///
/// Or with a [`ResponseBuilder`]:
///
/// ```
/// # use way::{ResponseBuilder, Body};
/// let response = ResponseBuilder::new()
///     .status(404)
///     .header("X-Custom-Foo", "Bar")
///     .body(Body::new("Page not found."))
///     .unwrap();
/// ```
pub type Response = hyper::Response<Body>;

/// Builder for [`Response`], re-exported from `http`.
pub type ResponseBuilder = hyper::http::response::Builder;

/// A request or response body.
///
/// Handlers run on the blocking pool, so the body can be consumed
/// synchronously, either chunk by chunk through its [`Iterator`]
/// implementation or all at once with [`Body::into_bytes`].
///
/// ```rust
/// # use way::{Request, Response, Body};
/// fn echo(req: Request) -> Response {
///     match req.into_body().into_bytes() {
///         Ok(bytes) => Response::new(Body::new(bytes)),
///         Err(_) => Response::new(Body::empty()),
///     }
/// }
/// ```
pub struct Body(pub(crate) hyper::Body);

impl Body {
    /// Create a body from a string or bytes.
    ///
    /// ```rust
    /// # use way::Body;
    /// let string = Body::new("Hello world!");
    /// let bytes = Body::new(vec![0, 1, 0, 1, 0]);
    /// ```
    pub fn new(data: impl Into<Bytes>) -> Body {
        Body(hyper::Body::from(data.into()))
    }

    /// Create an empty body.
    pub fn empty() -> Body {
        Body(hyper::Body::empty())
    }

    /// Blocks until the whole body has been received and returns it.
    pub fn into_bytes(self) -> io::Result<Bytes> {
        executor::block_on(hyper::body::to_bytes(self.0))
            .map_err(|err| io::Error::new(io::ErrorKind::Other, err))
    }
}

impl<T> From<T> for Body
where
    Bytes: From<T>,
{
    fn from(data: T) -> Body {
        Body::new(data)
    }
}

impl Iterator for Body {
    type Item = io::Result<Bytes>;

    fn next(&mut self) -> Option<Self::Item> {
        executor::block_on(self.0.data()).map(|chunk| {
            chunk.map_err(|err| {
                log::debug!("error reading body chunk: {}", err);
                io::Error::new(io::ErrorKind::Other, err)
            })
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        Stream::size_hint(&self.0)
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::empty()
    }
}

impl HttpBody for Body {
    type Data = Bytes;
    type Error = hyper::Error;

    fn poll_data(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Self::Data, Self::Error>>> {
        Pin::new(&mut self.0).poll_data(cx)
    }

    fn poll_trailers(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<hyper::HeaderMap>, Self::Error>> {
        Pin::new(&mut self.0).poll_trailers(cx)
    }

    fn is_end_stream(&self) -> bool {
        self.0.is_end_stream()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests that a body created from a string yields its content as one chunk.
    #[test]
    fn test_body_creation() {
        let body = Body::new("Hello World!");
        let content: Vec<_> = body.map(|chunk| chunk.unwrap()).collect();
        assert_eq!(&content[0][..], b"Hello World!");
    }

    /// Tests that an empty body yields no chunks.
    #[test]
    fn test_empty_body() {
        let mut body = Body::empty();
        assert!(body.next().is_none());
    }

    /// Tests that a streamed body is collected in order by `into_bytes`.
    #[test]
    fn test_into_bytes_collects_stream() {
        let chunks: Vec<Result<_, io::Error>> = vec![Ok("Hello, "), Ok("World!")];
        let body = Body(hyper::Body::wrap_stream(futures::stream::iter(chunks)));
        let bytes = body.into_bytes().unwrap();
        assert_eq!(&bytes[..], b"Hello, World!");
    }

    /// Tests the `ResponseBuilder` by creating a response and verifying its status and headers.
    #[test]
    fn test_response_builder() {
        let response = ResponseBuilder::new()
            .status(200)
            .header("Content-Type", "text/plain")
            .body(Body::new("OK"))
            .unwrap();

        assert_eq!(response.status(), 200);
        assert_eq!(
            response.headers().get("Content-Type").unwrap(),
            "text/plain"
        );
    }
}
