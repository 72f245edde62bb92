//! Ordered, multi-valued header store.

/// Header container shared by requests and responses.
///
/// Keys are case-sensitive and never normalized; what the peer sent (or
/// the handler set) is what is stored. Each key maps to the ordered
/// sequence of values it was given, and keys themselves keep insertion
/// order, which is also the order they are emitted on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    entries: Vec<(String, Vec<String>)>,
}

impl Header {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `value` under `key`, preserving any values already
    /// present. Despite the name this never replaces; it mirrors the
    /// append-on-set wire model where repeated headers accumulate.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        match self.entries.iter_mut().find(|(name, _)| *name == key) {
            Some((_, values)) => values.push(value.into()),
            None => self.entries.push((key, vec![value.into()])),
        }
    }

    /// The first value recorded for `key`, or `""` when absent.
    pub fn get(&self, key: &str) -> &str {
        self.get_all(key).first().map(String::as_str).unwrap_or("")
    }

    /// Every value recorded for `key`, oldest first.
    pub fn get_all(&self, key: &str) -> &[String] {
        self.entries
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, values)| values.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(name, _)| name == key)
    }

    /// Keys with their value sequences, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
