//! Listener, accept loop, and graceful shutdown.

use crate::{
    http::{request::Request, response::Response, types::StatusCode},
    server::connection,
};
use std::{
    future::Future,
    io,
    pin::Pin,
    sync::Arc,
    time::Duration,
};
use tokio::{net::TcpListener, signal, task::JoinSet};
use tracing::{info, warn};

/// Boxed future used by handler and middleware signatures.
pub type BoxFuture<'a, T = ()> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A request handler: writes its response and returns nothing.
///
/// Build one from a closure with [`handler_fn`]:
/// ```no_run
/// use lite_web::{handler_fn, StatusCode};
///
/// let hello = handler_fn(|resp, _req| {
///     Box::pin(async move {
///         let _ = resp.write(b"hello").await;
///     })
/// });
/// # drop(hello);
/// ```
pub type HandlerFunc =
    Arc<dyn for<'a> Fn(&'a mut Response, &'a mut Request) -> BoxFuture<'a> + Send + Sync>;

/// A middleware wraps a handler in another handler. Registration order
/// matters: the multiplexer applies `h = mw(h)` left to right, so the
/// last middleware registered becomes the outermost wrapper.
pub type Middleware = Arc<dyn Fn(HandlerFunc) -> HandlerFunc + Send + Sync>;

/// Handler invoked with the status code of a failed dispatch (route
/// miss), replacing the built-in error body.
pub type ErrorHandler = Arc<
    dyn for<'a> Fn(&'a mut Response, &'a mut Request, StatusCode) -> BoxFuture<'a> + Send + Sync,
>;

/// Wraps a closure into a [`HandlerFunc`].
pub fn handler_fn<F>(f: F) -> HandlerFunc
where
    F: for<'a> Fn(&'a mut Response, &'a mut Request) -> BoxFuture<'a> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Wraps a closure into a [`Middleware`].
pub fn middleware_fn<F>(f: F) -> Middleware
where
    F: Fn(HandlerFunc) -> HandlerFunc + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Wraps a closure into an [`ErrorHandler`].
pub fn error_handler_fn<F>(f: F) -> ErrorHandler
where
    F: for<'a> Fn(&'a mut Response, &'a mut Request, StatusCode) -> BoxFuture<'a>
        + Send
        + Sync
        + 'static,
{
    Arc::new(f)
}

/// Anything that can answer a parsed request.
///
/// [`ServeMux`](crate::ServeMux) is the implementation shipped with the
/// crate; embedders with a single endpoint can implement it directly.
pub trait Handler: Send + Sync + 'static {
    fn serve_http<'a>(&'a self, resp: &'a mut Response, req: &'a mut Request) -> BoxFuture<'a>;
}

/// TCP server: accepts connections and runs one task per connection.
///
/// Each task reads a single request (bounded by the parse deadline),
/// dispatches it through the handler, and closes the socket; there is
/// no keep-alive. Shutdown stops the accept loop and drains in-flight
/// tasks — indefinitely unless [`drain_timeout`](Server::drain_timeout)
/// bounds the wait.
pub struct Server<H: Handler> {
    addr: String,
    handler: Arc<H>,
    drain_timeout: Option<Duration>,
}

impl<H: Handler> Server<H> {
    pub fn new(addr: impl Into<String>, handler: H) -> Self {
        Server {
            addr: addr.into(),
            handler: Arc::new(handler),
            drain_timeout: None,
        }
    }

    /// Bounds the shutdown drain. Connections still in flight when the
    /// bound expires are aborted.
    pub fn drain_timeout(mut self, limit: Duration) -> Self {
        self.drain_timeout = Some(limit);
        self
    }

    /// Binds the configured address and serves until `shutdown`
    /// resolves. Returns early only on a bind failure.
    pub async fn serve_until(self, shutdown: impl Future<Output = ()>) -> io::Result<()> {
        let listener = TcpListener::bind(&self.addr).await?;
        self.serve_on(listener, shutdown).await
    }

    /// Serves on an already-bound listener. Useful when the caller
    /// needs the local address (e.g. bound to port 0).
    pub async fn serve_on(
        self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()>,
    ) -> io::Result<()> {
        if let Ok(addr) = listener.local_addr() {
            info!(%addr, "server listening");
        }

        let mut tasks = JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let handler = Arc::clone(&self.handler);
                        tasks.spawn(connection::handle(handler, stream, peer));
                    }
                    // Transient accept failures (e.g. EMFILE) are logged
                    // and the loop keeps going.
                    Err(error) => warn!(%error, "accept failed"),
                },
                _ = &mut shutdown => break,
            }

            // Reap whatever already finished so the set stays small.
            while tasks.try_join_next().is_some() {}
        }

        // Dropping the listener closes the accept queue; later
        // connection attempts get refused by the OS.
        drop(listener);
        info!(in_flight = tasks.len(), "shutting down");

        let drain = async {
            while tasks.join_next().await.is_some() {}
        };
        match self.drain_timeout {
            Some(limit) => {
                if tokio::time::timeout(limit, drain).await.is_err() {
                    warn!("drain deadline expired, aborting remaining connections");
                }
            }
            None => drain.await,
        }

        Ok(())
    }
}

/// Binds `addr`, installs the interrupt/terminate signal handlers, and
/// serves until one of them fires. Blocks for the life of the server.
///
/// ```no_run
/// use lite_web::{run, ServeMux};
///
/// #[tokio::main]
/// async fn main() {
///     let mux = ServeMux::new(None);
///     run("127.0.0.1:8080", mux).await.unwrap();
/// }
/// ```
pub async fn run<H: Handler>(addr: &str, handler: H) -> io::Result<()> {
    Server::new(addr, handler)
        .serve_until(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut terminate = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(terminate) => terminate,
            Err(error) => {
                warn!(%error, "failed to install SIGTERM handler");
                let _ = signal::ctrl_c().await;
                return;
            }
        };

        tokio::select! {
            _ = signal::ctrl_c() => {}
            _ = terminate.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = signal::ctrl_c().await;
    }

    info!("shutdown signal received");
}
