//! Response emitter: status line, headers, and body onto the connection.

use crate::{
    errors::CookieError,
    http::{cookie::Cookie, header::Header, types::StatusCode},
};
use std::io;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Writer for one HTTP/1.1 response, bound to a connection.
///
/// The status line and header block go out exactly once, on the first
/// [`write_header`](Response::write_header) — explicit or implied by
/// the first [`write`](Response::write). After that point header
/// mutation is still possible but never reaches the wire.
///
/// The sink is any `AsyncWrite`; the server hands handlers a response
/// backed by the socket, while tests can back one with an in-memory
/// buffer and assert on the exact bytes.
pub struct Response {
    status: StatusCode,
    headers: Header,
    sink: Box<dyn AsyncWrite + Send + Unpin>,
    headers_sent: bool,
}

impl Response {
    /// Wraps a byte sink. The status starts at `200 OK`, which is what
    /// a bodyless `write` will implicitly send.
    pub fn new(sink: impl AsyncWrite + Send + Unpin + 'static) -> Self {
        Response {
            status: StatusCode::Ok,
            headers: Header::new(),
            sink: Box::new(sink),
            headers_sent: false,
        }
    }

    /// The current status code; after emission, the one on the wire.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Whether the status line and header block have been emitted.
    pub fn headers_sent(&self) -> bool {
        self.headers_sent
    }

    /// The mutable response headers. Mutations after the headers went
    /// out are silently inert.
    pub fn header(&mut self) -> &mut Header {
        &mut self.headers
    }

    /// Emits `HTTP/1.1 <code> <reason>`, one line per header key with
    /// its first value, and the terminating blank line. A second call
    /// is a no-op.
    pub async fn write_header(&mut self, status: StatusCode) -> io::Result<()> {
        if self.headers_sent {
            return Ok(());
        }
        self.status = status;

        let mut head = Vec::with_capacity(128);
        head.extend_from_slice(status.status_line());
        for (name, values) in self.headers.iter() {
            if let Some(first) = values.first() {
                head.extend_from_slice(name.as_bytes());
                head.extend_from_slice(b": ");
                head.extend_from_slice(first.as_bytes());
                head.extend_from_slice(b"\r\n");
            }
        }
        head.extend_from_slice(b"\r\n");

        // Latch before awaiting so a failed write cannot re-emit.
        self.headers_sent = true;
        self.sink.write_all(&head).await
    }

    /// Writes body bytes verbatim, emitting the header block first if
    /// it has not gone out yet.
    pub async fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        if !self.headers_sent {
            let status = self.status;
            self.write_header(status).await?;
        }

        self.sink.write_all(data).await?;
        Ok(data.len())
    }

    /// Queues a `Set-Cookie` header for `cookie`.
    ///
    /// # Errors
    /// [`CookieError::EmptyName`] — a nameless cookie is a caller bug.
    pub fn set_cookie(&mut self, cookie: &Cookie) -> Result<(), CookieError> {
        if cookie.name.is_empty() {
            return Err(CookieError::EmptyName);
        }

        self.headers.set("Set-Cookie", cookie.to_string());
        Ok(())
    }

    /// Tells the client to drop `name`: an empty value with a negative
    /// max-age, via [`set_cookie`](Response::set_cookie).
    pub fn delete_cookie(&mut self, name: &str) -> Result<(), CookieError> {
        self.set_cookie(&Cookie {
            max_age: -1,
            ..Cookie::new(name, "")
        })
    }
}

#[cfg(test)]
mod response_self {
    use super::*;
    use crate::tools::SharedBuf;

    fn wired() -> (Response, SharedBuf) {
        let buf = SharedBuf::new();
        (Response::new(buf.clone()), buf)
    }

    #[tokio::test]
    async fn status_line_headers_then_body() {
        let (mut resp, buf) = wired();
        resp.header().set("Content-Type", "text/plain");
        resp.write_header(StatusCode::Ok).await.unwrap();
        resp.write(b"hello").await.unwrap();

        assert_eq!(
            buf.as_string(),
            "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n\r\nhello"
        );
    }

    #[tokio::test]
    async fn write_header_only_once() {
        let (mut resp, buf) = wired();
        resp.write_header(StatusCode::NotFound).await.unwrap();
        resp.write_header(StatusCode::Ok).await.unwrap();

        assert_eq!(resp.status(), StatusCode::NotFound);
        assert_eq!(buf.as_string(), "HTTP/1.1 404 Not Found\r\n\r\n");
    }

    #[tokio::test]
    async fn implicit_write_header() {
        let (mut resp, buf) = wired();
        resp.write(b"ok").await.unwrap();

        assert!(resp.headers_sent());
        assert_eq!(buf.as_string(), "HTTP/1.1 200 OK\r\n\r\nok");
    }

    #[tokio::test]
    async fn late_header_mutation_stays_off_the_wire() {
        let (mut resp, buf) = wired();
        resp.write_header(StatusCode::Ok).await.unwrap();
        resp.header().set("X-Late", "true");
        resp.write(b"body").await.unwrap();

        assert!(!buf.as_string().contains("X-Late"));
    }

    #[tokio::test]
    async fn only_first_value_per_key() {
        let (mut resp, buf) = wired();
        resp.header().set("Warning", "one");
        resp.header().set("Warning", "two");
        resp.write_header(StatusCode::Ok).await.unwrap();

        let wire = buf.as_string();
        assert!(wire.contains("Warning: one\r\n"));
        assert!(!wire.contains("two"));
    }

    #[tokio::test]
    async fn set_cookie() {
        let (mut resp, buf) = wired();
        let mut cookie = Cookie::new("session_id", "abc123");
        cookie.path = "/".into();
        cookie.http_only = true;

        resp.set_cookie(&cookie).unwrap();
        resp.write_header(StatusCode::Ok).await.unwrap();

        assert!(buf
            .as_string()
            .contains("Set-Cookie: session_id=abc123; Path=/; HttpOnly\r\n"));
    }

    #[tokio::test]
    async fn set_cookie_rejects_empty_name() {
        let (mut resp, _) = wired();
        assert_eq!(
            resp.set_cookie(&Cookie::new("", "v")),
            Err(CookieError::EmptyName)
        );
    }

    #[tokio::test]
    async fn delete_cookie_sends_expiry_form() {
        let (mut resp, buf) = wired();
        resp.delete_cookie("session_id").unwrap();
        resp.write_header(StatusCode::Ok).await.unwrap();

        assert!(buf
            .as_string()
            .contains("Set-Cookie: session_id=; Max-Age=0\r\n"));
    }
}
