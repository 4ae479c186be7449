//! Serves a handful of routes showing parameters, prefix routes, wildcard
//! methods, shared state and a custom not-found page.
//!
//! Listens on the address from `WAY_HOST`/`WAY_PORT` (default 127.0.0.1:3000).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use way::{handler_fn, Body, Request, RequestExt, Response, ResponseBuilder, Router, Server};

fn router() -> Router {
    let counter = Arc::new(AtomicUsize::new(0));
    let mut router = Router::new();

    router
        .handle_func("GET", "/", |_req: Request| Response::new(Body::new("Welcome to Way!")))
        .handle_func("GET", "/hello/:name", |req: Request| {
            Response::new(Body::new(format!("Hello, {}!", req.param("name"))))
        })
        .handle_func("GET", "/counter", move |_req: Request| {
            let count = counter.fetch_add(1, Ordering::Relaxed) + 1;
            Response::new(Body::new(format!("Counter: {}", count)))
        })
        .handle_func("*", "/echo", |req: Request| {
            let method = req.method().clone();
            match req.into_body().into_bytes() {
                Ok(body) => Response::new(Body::new(format!("{} {}", method, String::from_utf8_lossy(&body)))),
                Err(err) => ResponseBuilder::new()
                    .status(400)
                    .body(Body::new(err.to_string()))
                    .unwrap_or_default(),
            }
        })
        .handle_func("GET", "/static/:kind/", |req: Request| {
            Response::new(Body::new(format!("{} asset at {}", req.param("kind"), req.uri().path())))
        })
        .not_found(handler_fn(|req: Request| {
            ResponseBuilder::new()
                .status(404)
                .body(Body::new(format!("Nothing at {}", req.uri().path())))
                .unwrap_or_default()
        }));

    router
}

fn main() -> Result<(), way::ServeError> {
    let server = Server::from_env()?;

    println!("Try these routes:");
    println!("  - /");
    println!("  - /hello/your-name");
    println!("  - /counter (increments on each visit)");
    println!("  - /echo (any method, echoes the body)");
    println!("  - /static/css/site/main.css");

    server.run(router())
}
