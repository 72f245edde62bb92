//! Core HTTP protocol types: methods, status codes, and parsed URLs.

use crate::{errors::ParseError, query};
use std::{collections::HashMap, fmt};

/// The protocol accepted and spoken by this library.
pub const PROTOCOL: &str = "HTTP/1.1";

// METHOD

/// HTTP request methods.
///
/// `TRACE` and `CONNECT` are deliberately absent; a request naming them
/// fails to parse.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
}

impl Method {
    /// Every supported method, in the order [`ServeMux::handle`]
    /// registers them.
    ///
    /// [`ServeMux::handle`]: crate::ServeMux::handle
    pub const ALL: [Method; 7] = [
        Method::Get,
        Method::Post,
        Method::Put,
        Method::Delete,
        Method::Patch,
        Method::Options,
        Method::Head,
    ];

    /// Parses a request-line token. The match is exact: methods are
    /// case-sensitive on the wire.
    pub(crate) fn from_bytes(src: &[u8]) -> Result<Self, ParseError> {
        match src {
            b"GET" => Ok(Method::Get),
            b"POST" => Ok(Method::Post),
            b"PUT" => Ok(Method::Put),
            b"DELETE" => Ok(Method::Delete),
            b"PATCH" => Ok(Method::Patch),
            b"OPTIONS" => Ok(Method::Options),
            b"HEAD" => Ok(Method::Head),
            _ => Err(ParseError::MalformedRequest),
        }
    }

    /// The uppercase wire name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Options => "OPTIONS",
            Method::Head => "HEAD",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// STATUS CODE

macro_rules! status_codes {
    ($(
        $(#[$docs:meta])*
        $name:ident = ($num:literal, $reason:literal);
    )+) => {
        /// HTTP response status codes.
        ///
        /// The set covers what a small service actually sends; codes
        /// outside it are unrepresentable rather than reasonless.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u16)]
        pub enum StatusCode { $(
            $(#[$docs])*
            #[doc = concat!(stringify!($num), " ", $reason)]
            $name = $num,
        )+ }

        impl StatusCode {
            /// The numeric code.
            pub const fn as_u16(self) -> u16 {
                self as u16
            }

            /// The reason phrase, e.g. `"Not Found"` for 404.
            pub const fn reason(self) -> &'static str {
                match self { $(
                    StatusCode::$name => $reason,
                )+ }
            }

            /// Looks a status up by number. `None` for codes outside
            /// the table.
            pub const fn from_u16(code: u16) -> Option<Self> {
                match code { $(
                    $num => Some(StatusCode::$name),
                )+
                    _ => None,
                }
            }

            // The full first line as static bytes, CRLF included.
            pub(crate) const fn status_line(self) -> &'static [u8] {
                match self { $(
                    StatusCode::$name => {
                        concat!("HTTP/1.1 ", $num, " ", $reason, "\r\n").as_bytes()
                    },
                )+ }
            }
        }
    }
}

status_codes! {
    Ok = (200, "OK");
    Created = (201, "Created");
    Accepted = (202, "Accepted");
    NoContent = (204, "No Content");

    MovedPermanently = (301, "Moved Permanently");
    Found = (302, "Found");
    SeeOther = (303, "See Other");
    NotModified = (304, "Not Modified");
    TemporaryRedirect = (307, "Temporary Redirect");
    PermanentRedirect = (308, "Permanent Redirect");

    BadRequest = (400, "Bad Request");
    Unauthorized = (401, "Unauthorized");
    Forbidden = (403, "Forbidden");
    NotFound = (404, "Not Found");
    MethodNotAllowed = (405, "Method Not Allowed");
    NotAcceptable = (406, "Not Acceptable");
    RequestTimeout = (408, "Request Timeout");
    Conflict = (409, "Conflict");
    Gone = (410, "Gone");
    LengthRequired = (411, "Length Required");
    PayloadTooLarge = (413, "Payload Too Large");
    UnsupportedMediaType = (415, "Unsupported Media Type");
    UnprocessableEntity = (422, "Unprocessable Entity");
    TooManyRequests = (429, "Too Many Requests");

    InternalServerError = (500, "Internal Server Error");
    NotImplemented = (501, "Not Implemented");
    BadGateway = (502, "Bad Gateway");
    ServiceUnavailable = (503, "Service Unavailable");
    GatewayTimeout = (504, "Gateway Timeout");
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason())
    }
}

// URL

/// The request target, split into path and raw query.
///
/// Only origin-form targets (`/path?query`) are accepted; anything not
/// starting with `/` fails the parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Url {
    target: String,
    path: String,
    raw_query: Option<String>,
}

impl Url {
    /// Parses an origin-form request target.
    ///
    /// # Errors
    /// [`ParseError::MalformedRequest`] when `raw` does not start with
    /// `/`.
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        if !raw.starts_with('/') {
            return Err(ParseError::MalformedRequest);
        }

        let (path, raw_query) = match raw.split_once('?') {
            Some((path, query)) => (path.to_owned(), Some(query.to_owned())),
            None => (raw.to_owned(), None),
        };

        Ok(Url {
            target: raw.to_owned(),
            path,
            raw_query,
        })
    }

    /// The full request target as it appeared on the request line.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// The path component, query excluded.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The raw query string without the leading `?`, if one was present.
    pub fn raw_query(&self) -> Option<&str> {
        self.raw_query.as_deref()
    }

    /// Parses the query string into a multimap, preserving duplicate
    /// keys. No percent-decoding is performed; values are returned as
    /// they appeared on the wire.
    pub fn query(&self) -> HashMap<String, Vec<String>> {
        let mut map: HashMap<String, Vec<String>> = HashMap::new();
        if let Some(raw) = self.raw_query.as_deref() {
            for (key, value) in query::parse(raw) {
                map.entry(key).or_default().push(value);
            }
        }
        map
    }

    // Path segments with the leading empty token discarded. A trailing
    // slash yields a final "" segment, which the router matches
    // literally.
    pub(crate) fn segments(&self) -> impl Iterator<Item = &str> {
        self.path.split('/').skip(1)
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.target)
    }
}
