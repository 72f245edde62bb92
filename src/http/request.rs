//! Request representation and the HTTP/1.1 wire parser.

use crate::{
    errors::{CookieError, ParseError},
    http::{
        cookie::Cookie,
        header::Header,
        types::{Method, Url, PROTOCOL},
    },
};
use memchr::memchr;
use std::{collections::HashMap, fmt, io, str};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};

/// One parsed HTTP/1.1 request.
///
/// Built by the wire parser for each accepted connection; `params` is
/// filled in later by the router when the matched pattern has dynamic
/// segments. The request lives exactly as long as its connection task.
#[derive(Debug)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub headers: Header,
    /// Cookies extracted from `Cookie` headers during the parse.
    pub cookies: Vec<Cookie>,
    /// Route parameters, e.g. `id` for a route `/items/:id`.
    pub params: HashMap<String, String>,
    /// The unread remainder of the connection; read-once.
    pub body: Body,
}

impl Request {
    /// A synthetic request with empty headers and body. Useful when
    /// driving a [`ServeMux`](crate::ServeMux) without a connection.
    pub fn new(method: Method, url: Url) -> Self {
        Request {
            method,
            url,
            headers: Header::new(),
            cookies: Vec::new(),
            params: HashMap::new(),
            body: Body::empty(),
        }
    }

    /// Looks a request cookie up by name.
    ///
    /// # Errors
    /// [`CookieError::NotFound`] when no cookie with that name arrived.
    pub fn cookie(&self, name: &str) -> Result<&Cookie, CookieError> {
        self.cookies
            .iter()
            .find(|cookie| cookie.name == name)
            .ok_or(CookieError::NotFound)
    }

    /// Shorthand for a route parameter, `""` when absent.
    pub fn param(&self, name: &str) -> &str {
        self.params.get(name).map(String::as_str).unwrap_or("")
    }
}

// BODY

/// Read-once handle over the bytes following the header block.
///
/// Wraps the connection's buffered reader, so bytes the line reader
/// already pulled off the socket are not lost. Reading past the data
/// the peer sent blocks until the peer closes its half.
pub struct Body {
    reader: Box<dyn AsyncRead + Send + Unpin>,
}

impl Body {
    pub(crate) fn new(reader: impl AsyncRead + Send + Unpin + 'static) -> Self {
        Body {
            reader: Box::new(reader),
        }
    }

    /// A body with nothing in it.
    pub fn empty() -> Self {
        Body::new(tokio::io::empty())
    }

    /// Reads into `buf`, returning the number of bytes read; zero means
    /// the body is exhausted.
    pub async fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf).await
    }

    /// Drains the whole body into a single buffer. Only sensible when
    /// the peer half-closes after sending; otherwise prefer sized
    /// [`read`](Body::read) calls.
    pub async fn read_to_end(&mut self) -> io::Result<Vec<u8>> {
        let mut data = Vec::new();
        self.reader.read_to_end(&mut data).await?;
        Ok(data)
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Body")
    }
}

// PARSER

/// Reads one request off `stream`.
///
/// Consumes the request line and header block and nothing more; the
/// buffered remainder becomes the request body. The caller is expected
/// to race this against a deadline (`tokio::time::timeout`) — the
/// parser itself never gives up waiting.
pub(crate) async fn parse<R>(stream: R) -> Result<Request, ParseError>
where
    R: AsyncRead + Send + Unpin + 'static,
{
    let mut reader = BufReader::new(stream);
    let mut line = Vec::new();

    if reader.read_until(b'\n', &mut line).await? == 0 {
        return Err(ParseError::ClosedBeforeRequest);
    }
    let (method, url) = parse_request_line(&line)?;

    let mut headers = Header::new();
    let mut cookies = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line).await? == 0 {
            // Header block never terminated.
            return Err(ParseError::MalformedRequest);
        }
        if line == b"\r\n" {
            break;
        }

        let (name, value) = parse_header_line(&line)?;
        if name == "Cookie" {
            cookies.extend(Cookie::parse_header(value));
        }
        headers.set(name, value);
    }

    Ok(Request {
        method,
        url,
        headers,
        cookies,
        params: HashMap::new(),
        body: Body::new(reader),
    })
}

// `METHOD SP target SP HTTP/1.1`, exactly three tokens.
fn parse_request_line(line: &[u8]) -> Result<(Method, Url), ParseError> {
    let line = str::from_utf8(line).map_err(|_| ParseError::MalformedRequest)?;

    let mut tokens = line.split_whitespace();
    let (method, target, proto) = match (tokens.next(), tokens.next(), tokens.next()) {
        (Some(method), Some(target), Some(proto)) if tokens.next().is_none() => {
            (method, target, proto)
        }
        _ => return Err(ParseError::MalformedRequest),
    };

    if proto != PROTOCOL {
        return Err(ParseError::UnsupportedProtocol);
    }

    Ok((Method::from_bytes(method.as_bytes())?, Url::parse(target)?))
}

// `Name: value`, split at the first colon, both sides trimmed.
fn parse_header_line(line: &[u8]) -> Result<(&str, &str), ParseError> {
    let colon = memchr(b':', line).ok_or(ParseError::MalformedRequest)?;

    let name = str::from_utf8(&line[..colon]).map_err(|_| ParseError::MalformedRequest)?;
    let value = str::from_utf8(&line[colon + 1..]).map_err(|_| ParseError::MalformedRequest)?;

    Ok((name.trim(), value.trim()))
}
