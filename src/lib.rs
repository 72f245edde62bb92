//! lite_web - Small from-scratch HTTP/1.1 server library
//!
//! A compact HTTP/1.1 server for small services, built directly on TCP
//! with no HTTP runtime underneath: its own wire parser, a path-segment
//! trie router with `:name` parameters, a user middleware chain, static
//! file serving, and graceful shutdown.
//!
//! # Features
//!
//! - **Trie routing** - literal and dynamic (`/items/:id`) segments,
//!   per-method handlers, literal-over-dynamic precedence.
//! - **Middleware** - plain `handler -> handler` wrappers, applied in
//!   registration order.
//! - **Static files** - optional base directory consulted before the
//!   router, with path-traversal protection.
//! - **Cookies** - parsing on requests, `Set-Cookie` emission with the
//!   full attribute set on responses.
//! - **Graceful shutdown** - SIGINT/SIGTERM stop the accept loop and
//!   drain in-flight connections, optionally bounded.
//!
//! One request per connection; keep-alive, TLS, and HTTP/2 are out of
//! scope.
//!
//! # Quick Start
//!
//! ```no_run
//! use lite_web::{handler_fn, run, Method, ServeMux, StatusCode};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut mux = ServeMux::new(None);
//!
//!     mux.add_route(
//!         "/hello/:name",
//!         &[Method::Get],
//!         handler_fn(|resp, req| {
//!             Box::pin(async move {
//!                 let greeting = format!("Hello, {}!", req.param("name"));
//!                 let _ = resp.write_header(StatusCode::Ok).await;
//!                 let _ = resp.write(greeting.as_bytes()).await;
//!             })
//!         }),
//!     );
//!
//!     run("127.0.0.1:8080", mux).await.unwrap();
//! }
//! ```
pub(crate) mod http {
    pub(crate) mod cookie;
    pub(crate) mod header;
    pub mod query;
    pub(crate) mod request;
    pub(crate) mod response;
    pub(crate) mod types;
}
pub(crate) mod mux {
    pub(crate) mod multiplexer;
    pub(crate) mod router;
    pub(crate) mod static_files;
}
pub(crate) mod server {
    pub(crate) mod connection;
    pub(crate) mod server_impl;
}
pub(crate) mod errors;

pub use crate::{
    errors::{CookieError, ParseError},
    http::{
        cookie::Cookie,
        header::Header,
        query,
        request::{Body, Request},
        response::Response,
        types::{Method, StatusCode, Url, PROTOCOL},
    },
    mux::multiplexer::{error_reply, logging_middleware, ServeMux},
    server::server_impl::{
        error_handler_fn, handler_fn, middleware_fn, run, BoxFuture, ErrorHandler, Handler,
        HandlerFunc, Middleware, Server,
    },
};
