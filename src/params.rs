//! Path parameters bound during routing.
//!
//! The bindings ride in the request's extensions under a key type private to
//! this crate, so handlers can only read them through [`param`] or
//! [`RequestExt::param`].

use std::collections::HashMap;

use crate::http::Request;

/// Name to value bindings captured from `:name` segments of the matched route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Params(HashMap<String, String>);

impl Params {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Binds `name`, replacing any earlier value under the same name.
    pub(crate) fn insert(&mut self, name: &str, value: &str) {
        self.0.insert(name.to_owned(), value.to_owned());
    }

    pub(crate) fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }
}

/// Returns the value bound to the path parameter `name`, or `""` when the
/// request carries no such binding.
///
/// ```
/// use way::{param, Body, Request, Response, Router};
///
/// let mut router = Router::new();
/// router.handle_func("GET", "/users/:id", |req: Request| {
///     Response::new(Body::new(format!("user {}", param(&req, "id"))))
/// });
/// ```
pub fn param<'r>(request: &'r Request, name: &str) -> &'r str {
    request
        .extensions()
        .get::<Params>()
        .and_then(|params| params.get(name))
        .unwrap_or("")
}

/// Method-call access to path parameters.
///
/// ```
/// use way::{Body, Request, RequestExt, Response};
///
/// fn hello(req: Request) -> Response {
///     Response::new(Body::new(format!("Hello, {}!", req.param("name"))))
/// }
/// ```
pub trait RequestExt {
    /// See [`param`].
    fn param(&self, name: &str) -> &str;
}

impl RequestExt for Request {
    fn param(&self, name: &str) -> &str {
        param(self, name)
    }
}
