//! HTTP cookie model and wire serialization.

use std::{
    fmt,
    time::{SystemTime, UNIX_EPOCH},
};

/// An HTTP cookie, carried on `Cookie` request headers and emitted on
/// `Set-Cookie` response headers.
///
/// Unset optional attributes are skipped during serialization: empty
/// `path`/`domain`, `expires` of `None`, and a `max_age` of zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub path: String,
    pub domain: String,
    /// Absolute expiry instant; `None` leaves the attribute off.
    pub expires: Option<SystemTime>,
    /// Zero means unset; a negative value marks the cookie for deletion
    /// and serializes as `Max-Age=0`.
    pub max_age: i64,
    pub secure: bool,
    pub http_only: bool,
}

impl Cookie {
    /// A plain session cookie with every optional attribute unset.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Cookie {
            name: name.into(),
            value: value.into(),
            ..Cookie::default()
        }
    }

    /// The delete form for `name` under `path`: empty value, expiry at
    /// the Unix epoch, and a negative max-age. Sending it overwrites
    /// and immediately invalidates the client's copy.
    pub fn expired(name: impl Into<String>, path: impl Into<String>) -> Self {
        Cookie {
            name: name.into(),
            path: path.into(),
            expires: Some(UNIX_EPOCH),
            max_age: -1,
            ..Cookie::default()
        }
    }

    // Splits one `Cookie` header value into its name/value pairs.
    // Pairs without a `=` are dropped, matching common client behavior.
    pub(crate) fn parse_header(value: &str) -> Vec<Cookie> {
        value
            .split(';')
            .filter_map(|part| {
                let (name, value) = part.trim().split_once('=')?;
                Some(Cookie::new(name, value))
            })
            .collect()
    }
}

impl fmt::Display for Cookie {
    /// The `Set-Cookie` wire form: `name=value` followed by the set
    /// attributes, each prefixed with `"; "`, in the order Path,
    /// Domain, Expires, Max-Age, Secure, HttpOnly.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)?;

        if !self.path.is_empty() {
            write!(f, "; Path={}", self.path)?;
        }
        if !self.domain.is_empty() {
            write!(f, "; Domain={}", self.domain)?;
        }
        if let Some(expires) = self.expires {
            write!(f, "; Expires={}", httpdate::fmt_http_date(expires))?;
        }
        if self.max_age > 0 {
            write!(f, "; Max-Age={}", self.max_age)?;
        } else if self.max_age < 0 {
            write!(f, "; Max-Age=0")?;
        }
        if self.secure {
            write!(f, "; Secure")?;
        }
        if self.http_only {
            write!(f, "; HttpOnly")?;
        }

        Ok(())
    }
}
