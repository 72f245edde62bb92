use std::{error, fmt, io};

/// Reasons a request never made it through the wire parser.
///
/// The connection supervisor turns each variant into a bare status line
/// (see [`ParseError::as_http`]) and closes the connection.
#[derive(Debug, PartialEq)]
pub enum ParseError {
    /// The peer closed the connection before sending a single byte.
    /// Nothing is written back.
    ClosedBeforeRequest,
    /// Bad request line, bad URL, or a header line without a colon.
    MalformedRequest,
    /// The request line named a protocol other than `HTTP/1.1`.
    UnsupportedProtocol,
    /// The parse phase outlived its deadline.
    DeadlineExceeded,
    /// The transport failed before the header block was complete.
    Io(IoError),
}

impl ParseError {
    /// The status line written to the peer for this failure, terminated
    /// by the end-of-headers blank line. Empty for variants that close
    /// the connection silently.
    pub(crate) const fn as_http(&self) -> &'static [u8] {
        match self {
            Self::ClosedBeforeRequest => b"",
            Self::MalformedRequest => b"HTTP/1.1 400 Bad Request\r\n\r\n",
            Self::UnsupportedProtocol => b"HTTP/1.1 400 Bad Request\r\n\r\n",
            Self::DeadlineExceeded => b"HTTP/1.1 408 Request Timeout\r\n\r\n",
            Self::Io(_) => b"HTTP/1.1 500 Internal Server Error\r\n\r\n",
        }
    }
}

impl error::Error for ParseError {}
impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClosedBeforeRequest => write!(f, "connection closed before request"),
            Self::MalformedRequest => write!(f, "malformed request"),
            Self::UnsupportedProtocol => write!(f, "unsupported protocol"),
            Self::DeadlineExceeded => write!(f, "request read deadline exceeded"),
            Self::Io(e) => write!(f, "i/o error while reading request: {}", e.0),
        }
    }
}

impl From<io::Error> for ParseError {
    fn from(err: io::Error) -> Self {
        ParseError::Io(IoError(err))
    }
}

/// Wrapper so [`ParseError`] can derive `PartialEq`; two I/O errors
/// compare equal when their kinds match.
#[derive(Debug)]
pub struct IoError(pub(crate) io::Error);

impl PartialEq for IoError {
    fn eq(&self, other: &Self) -> bool {
        self.0.kind() == other.0.kind()
    }
}

/// Cookie-level failures, surfaced to handlers rather than to the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CookieError {
    /// `Request::cookie` found no cookie with the requested name.
    NotFound,
    /// `Response::set_cookie` was handed a cookie with an empty name.
    EmptyName,
}

impl error::Error for CookieError {}
impl fmt::Display for CookieError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "cookie not found"),
            Self::EmptyName => write!(f, "cookie name cannot be empty"),
        }
    }
}
