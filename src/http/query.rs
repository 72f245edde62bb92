//! URL query string parsing.
//!
//! Splits `a=1&b=2&flag` style strings into pairs. There is currently
//! no percent-decoding (`%20`, `%40`, …); values come back exactly as
//! they appeared on the wire.

/// Parses a raw query string into `(name, value)` pairs, in wire order.
///
/// A leading `?` is tolerated, so `?a=1` and `a=1` parse alike. A part
/// without a `=` becomes a pair with an empty value; empty parts (as in
/// `a=1&&b=2`) are skipped. Duplicate names are all kept.
///
/// # Examples
/// ```
/// use lite_web::query;
///
/// let pairs = query::parse("name=john&age=25&debug");
/// assert_eq!(pairs.len(), 3);
/// assert_eq!(pairs[0], ("name".to_owned(), "john".to_owned()));
/// assert_eq!(pairs[2], ("debug".to_owned(), "".to_owned()));
/// ```
pub fn parse(query: &str) -> Vec<(String, String)> {
    let query = query.strip_prefix('?').unwrap_or(query);

    query
        .split('&')
        .filter(|part| !part.is_empty())
        .map(|part| match part.split_once('=') {
            Some((name, value)) => (name.to_owned(), value.to_owned()),
            None => (part.to_owned(), String::new()),
        })
        .collect()
}
