//! Request multiplexer: static files, trie dispatch, middleware.

use crate::{
    http::{
        request::Request,
        response::Response,
        types::{Method, StatusCode},
    },
    mux::{router::RouteTrie, static_files::StaticFiles},
    server::server_impl::{
        middleware_fn, BoxFuture, ErrorHandler, Handler, HandlerFunc, Middleware,
    },
};
use std::{io, path::PathBuf, sync::Arc, time::Instant};
use tracing::{debug, info};

/// Routes requests to handlers.
///
/// Dispatch order: the static responder (when a base directory is
/// configured), then the route trie. A trie hit gets the registered
/// middleware chain applied around the handler; a miss goes to the
/// error handler, the default handler, or the built-in 404, in that
/// order of preference.
///
/// Register everything up front, then hand the mux to
/// [`run`](crate::run) — registration needs `&mut self`, so the borrow
/// checker keeps it from racing concurrent lookups.
pub struct ServeMux {
    routes: RouteTrie,
    middlewares: Vec<Middleware>,
    default_handler: Option<HandlerFunc>,
    error_handler: Option<ErrorHandler>,
    static_files: Option<StaticFiles>,
}

impl ServeMux {
    /// An empty mux. With `base_dir` set, files under it are served
    /// before any route is consulted.
    pub fn new(base_dir: Option<PathBuf>) -> Self {
        ServeMux {
            routes: RouteTrie::new(),
            middlewares: Vec::new(),
            default_handler: None,
            error_handler: None,
            static_files: base_dir.map(StaticFiles::new),
        }
    }

    /// Registers `handler` at `pattern` for the given methods. Segments
    /// beginning with `:` are dynamic and bind the matched path segment
    /// into [`Request::params`].
    pub fn add_route(&mut self, pattern: &str, methods: &[Method], handler: HandlerFunc) {
        self.routes.add_route(pattern, methods, handler);
    }

    /// Registers `handler` at `pattern` for every supported method.
    pub fn handle(&mut self, pattern: &str, handler: HandlerFunc) {
        self.add_route(pattern, &Method::ALL, handler);
    }

    /// Appends a middleware. The chain is applied as `h = mw(h)` in
    /// registration order, so the last registration wraps outermost.
    pub fn use_middleware(&mut self, middleware: Middleware) {
        self.middlewares.push(middleware);
    }

    /// Handler for requests no route matches. Superseded by the error
    /// handler when both are set.
    pub fn set_default_handler(&mut self, handler: HandlerFunc) {
        self.default_handler = Some(handler);
    }

    /// Handler for status-coded dispatch failures (route misses).
    pub fn set_error_handler(&mut self, handler: ErrorHandler) {
        self.error_handler = Some(handler);
    }

    /// Dispatches one request.
    pub async fn serve(&self, resp: &mut Response, req: &mut Request) {
        if let Some(static_files) = &self.static_files {
            match static_files.serve(resp, req.url.path()).await {
                Ok(true) => return,
                Ok(false) => {}
                Err(error) => {
                    debug!(%error, path = req.url.path(), "static file write failed");
                    return;
                }
            }
        }

        match self.routes.lookup(req.url.path(), req.method) {
            Some((handler, params)) => {
                req.params = params;
                let handler = self
                    .middlewares
                    .iter()
                    .fold(handler, |wrapped, middleware| middleware(wrapped));
                handler(resp, req).await;
            }
            None => {
                debug!(method = %req.method, path = req.url.path(), "no route matched");
                self.miss(resp, req).await;
            }
        }
    }

    async fn miss(&self, resp: &mut Response, req: &mut Request) {
        if let Some(error_handler) = &self.error_handler {
            error_handler(resp, req, StatusCode::NotFound).await;
        } else if let Some(default_handler) = &self.default_handler {
            default_handler(resp, req).await;
        } else if let Err(error) = error_reply(resp, StatusCode::NotFound, "Not Found").await {
            debug!(%error, "failed to write 404");
        }
    }
}

impl Handler for ServeMux {
    fn serve_http<'a>(&'a self, resp: &'a mut Response, req: &'a mut Request) -> BoxFuture<'a> {
        Box::pin(self.serve(resp, req))
    }
}

/// Writes `status` with a plain-text body of `message` plus a newline.
pub async fn error_reply(resp: &mut Response, status: StatusCode, message: &str) -> io::Result<()> {
    resp.write_header(status).await?;
    resp.write(message.as_bytes()).await?;
    resp.write(b"\n").await?;
    Ok(())
}

/// Middleware logging one line per dispatched request: method, path,
/// resulting status, and handling time.
pub fn logging_middleware() -> Middleware {
    middleware_fn(|next: HandlerFunc| -> HandlerFunc {
        Arc::new(move |resp: &mut Response, req: &mut Request| {
            let next = next.clone();
            Box::pin(async move {
                let start = Instant::now();
                next(&mut *resp, &mut *req).await;
                info!(
                    method = %req.method,
                    path = req.url.path(),
                    status = resp.status().as_u16(),
                    elapsed_us = start.elapsed().as_micros() as u64,
                    "request handled"
                );
            })
        })
    })
}

#[cfg(test)]
mod multiplexer_self {
    use super::*;
    use crate::{
        error_handler_fn, handler_fn, tools::SharedBuf, Cookie, Url,
    };
    use std::time::{Duration, SystemTime};

    fn request(method: Method, path: &str) -> Request {
        Request::new(method, Url::parse(path).unwrap())
    }

    async fn dispatch(mux: &ServeMux, method: Method, path: &str) -> String {
        let buf = SharedBuf::new();
        let mut resp = Response::new(buf.clone());
        let mut req = request(method, path);
        mux.serve(&mut resp, &mut req).await;
        buf.as_string()
    }

    fn text_handler(status: StatusCode, body: &'static str) -> HandlerFunc {
        handler_fn(move |resp, _req| {
            Box::pin(async move {
                let _ = resp.write_header(status).await;
                let _ = resp.write(body.as_bytes()).await;
            })
        })
    }

    #[tokio::test]
    async fn static_route() {
        let mut mux = ServeMux::new(None);
        mux.add_route(
            "/api/static",
            &[Method::Get],
            text_handler(StatusCode::Ok, "Static route"),
        );

        let wire = dispatch(&mux, Method::Get, "/api/static").await;
        assert!(wire.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(wire.ends_with("Static route"));
    }

    #[tokio::test]
    async fn dynamic_route_binds_param() {
        let mut mux = ServeMux::new(None);
        mux.add_route(
            "/api/items/:id",
            &[Method::Get],
            handler_fn(|resp, req| {
                Box::pin(async move {
                    let body = format!("Item ID: {}", req.param("id"));
                    let _ = resp.write_header(StatusCode::Ok).await;
                    let _ = resp.write(body.as_bytes()).await;
                })
            }),
        );

        let wire = dispatch(&mux, Method::Get, "/api/items/123").await;
        assert!(wire.ends_with("Item ID: 123"));
    }

    #[tokio::test]
    async fn method_mismatch_is_not_found() {
        let mut mux = ServeMux::new(None);
        mux.add_route(
            "/api/test",
            &[Method::Get],
            text_handler(StatusCode::Ok, "GET only"),
        );

        let wire = dispatch(&mux, Method::Post, "/api/test").await;
        assert!(wire.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(wire.ends_with("Not Found\n"));
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let mux = ServeMux::new(None);

        let wire = dispatch(&mux, Method::Get, "/nonexistent").await;
        assert!(wire.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(wire.ends_with("Not Found\n"));
    }

    #[tokio::test]
    async fn middleware_wraps_handler() {
        let mut mux = ServeMux::new(None);
        mux.use_middleware(middleware_fn(|next: HandlerFunc| -> HandlerFunc {
            Arc::new(move |resp: &mut Response, req: &mut Request| {
                let next = next.clone();
                Box::pin(async move {
                    resp.header().set("X-Middleware", "true");
                    next(&mut *resp, &mut *req).await;
                })
            })
        }));
        mux.add_route("/api/mw", &[Method::Get], text_handler(StatusCode::Ok, "ok"));

        let wire = dispatch(&mux, Method::Get, "/api/mw").await;
        assert!(wire.contains("X-Middleware: true\r\n"));
        assert!(wire.ends_with("ok"));
    }

    #[tokio::test]
    async fn middleware_registration_order_is_outermost_last() {
        let mut mux = ServeMux::new(None);
        for tag in ["inner", "outer"] {
            mux.use_middleware(middleware_fn(move |next: HandlerFunc| -> HandlerFunc {
                Arc::new(move |resp: &mut Response, req: &mut Request| {
                    let next = next.clone();
                    Box::pin(async move {
                        // First writer wins: whoever runs first sets it.
                        if resp.header().get("X-First").is_empty() {
                            resp.header().set("X-First", tag);
                        }
                        next(&mut *resp, &mut *req).await;
                    })
                })
            }));
        }
        mux.add_route("/", &[Method::Get], text_handler(StatusCode::Ok, "done"));

        let wire = dispatch(&mux, Method::Get, "/").await;
        assert!(wire.contains("X-First: outer\r\n"));
    }

    #[tokio::test]
    async fn cookie_flow() {
        let mut mux = ServeMux::new(None);
        mux.add_route(
            "/login",
            &[Method::Get],
            handler_fn(|resp, _req| {
                Box::pin(async move {
                    let cookie = Cookie {
                        path: "/".into(),
                        expires: Some(SystemTime::now() + Duration::from_secs(24 * 3600)),
                        http_only: true,
                        ..Cookie::new("session_id", "abc123")
                    };
                    resp.set_cookie(&cookie).unwrap();
                    let _ = resp.write_header(StatusCode::Ok).await;
                })
            }),
        );

        let wire = dispatch(&mux, Method::Get, "/login").await;
        assert!(wire.contains("Set-Cookie: session_id=abc123"));
    }

    #[tokio::test]
    async fn default_handler_takes_misses() {
        let mut mux = ServeMux::new(None);
        mux.set_default_handler(text_handler(StatusCode::NotFound, "Not Found\n"));

        let wire = dispatch(&mux, Method::Get, "/unknown").await;
        assert!(wire.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(wire.ends_with("Not Found\n"));
    }

    #[tokio::test]
    async fn error_handler_supersedes_default() {
        let mut mux = ServeMux::new(None);
        mux.set_default_handler(text_handler(StatusCode::Ok, "default"));
        mux.set_error_handler(error_handler_fn(|resp, _req, status| {
            Box::pin(async move {
                let _ = resp.write_header(status).await;
                let body = format!("Error {}", status.reason());
                let _ = resp.write(body.as_bytes()).await;
            })
        }));

        let wire = dispatch(&mux, Method::Get, "/nonexistent").await;
        assert!(wire.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(wire.ends_with("Error Not Found"));
    }

    #[tokio::test]
    async fn static_files_run_before_routes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("page.html"), "<p>static</p>").unwrap();

        let mut mux = ServeMux::new(Some(dir.path().to_path_buf()));
        mux.add_route(
            "/page.html",
            &[Method::Get],
            text_handler(StatusCode::Ok, "from route"),
        );

        let wire = dispatch(&mux, Method::Get, "/page.html").await;
        assert!(wire.ends_with("<p>static</p>"));

        // Anything the responder misses falls through to the trie.
        let wire = dispatch(&mux, Method::Get, "/other").await;
        assert!(wire.starts_with("HTTP/1.1 404 Not Found\r\n"));
    }

    #[tokio::test]
    async fn concurrent_dispatch() {
        let mut mux = ServeMux::new(None);
        mux.add_route(
            "/api/concurrent",
            &[Method::Get],
            text_handler(StatusCode::Ok, "Concurrent Test"),
        );
        let mux = Arc::new(mux);

        let mut workers = Vec::new();
        for _ in 0..50 {
            let mux = mux.clone();
            workers.push(tokio::spawn(async move {
                let buf = SharedBuf::new();
                let mut resp = Response::new(buf.clone());
                let mut req = request(Method::Get, "/api/concurrent");
                mux.serve(&mut resp, &mut req).await;
                buf.as_string()
            }));
        }

        for worker in workers {
            let wire = worker.await.unwrap();
            assert!(wire.starts_with("HTTP/1.1 200 OK\r\n"));
            assert!(wire.ends_with("Concurrent Test"));
        }
    }
}
