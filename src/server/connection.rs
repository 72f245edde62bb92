//! Per-connection task: one request in, one response out.

use crate::{
    errors::ParseError,
    http::{request, response::Response},
    server::server_impl::Handler,
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::{
    io::AsyncWriteExt,
    net::{tcp::OwnedWriteHalf, TcpStream},
    time::timeout,
};
use tracing::debug;

/// How long a peer gets to deliver its request line and headers.
pub(crate) const READ_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Supervises one accepted connection to completion.
///
/// The socket is split; the read half feeds the parser (raced against
/// the deadline) and the write half backs the response. Every exit
/// path drops both halves, which closes the socket.
pub(crate) async fn handle<H: Handler>(handler: Arc<H>, stream: TcpStream, peer: SocketAddr) {
    handle_with_deadline(handler, stream, peer, READ_REQUEST_TIMEOUT).await;
}

pub(crate) async fn handle_with_deadline<H: Handler>(
    handler: Arc<H>,
    stream: TcpStream,
    peer: SocketAddr,
    deadline: Duration,
) {
    let (read_half, write_half) = stream.into_split();

    let parsed = match timeout(deadline, request::parse(read_half)).await {
        Ok(parsed) => parsed,
        Err(_) => Err(ParseError::DeadlineExceeded),
    };

    let mut request = match parsed {
        Ok(request) => request,
        Err(error) => {
            reject(write_half, &error, peer).await;
            return;
        }
    };

    let mut response = Response::new(write_half);
    handler.serve_http(&mut response, &mut request).await;
}

// A parse failure answers with a bare status line; a peer that never
// sent anything gets nothing back.
async fn reject(mut write_half: OwnedWriteHalf, error: &ParseError, peer: SocketAddr) {
    if matches!(error, ParseError::ClosedBeforeRequest) {
        return;
    }

    debug!(%peer, %error, "request rejected");
    if let Err(error) = write_half.write_all(error.as_http()).await {
        debug!(%peer, %error, "failed to write rejection");
    }
}
