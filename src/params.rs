//! Path parameters captured while matching a route template.
//!
//! A [`Params`] value is an ordered sequence of name/value pairs; the order
//! matches the left-to-right order of the capture segments in the matched
//! template. Lookup returns the first pair with the requested name; `map()`
//! projects the set into a name → value map where the last pair wins.

use std::collections::HashMap;
use std::num::ParseIntError;
use std::slice;

/// A single captured path parameter. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    name: String,
    value: String,
}

impl Param {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Ordered set of captured path parameters.
///
/// Names need not be unique; [`Params::get`] returns the first match. The
/// typed accessors parse the stored text and return the `ParseIntError` from
/// the standard library when it is not a valid representation of the target
/// type — an absent name parses as the empty string and therefore errors too.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    inner: Vec<Param>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub(crate) fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.push(Param::new(name, value));
    }

    pub(crate) fn pop(&mut self) {
        self.inner.pop();
    }

    /// Returns the value of the first parameter named `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner.iter().find(|param| param.name == name).map(|param| param.value.as_str())
    }

    /// Like [`Params::get`], but absence is a silent outcome: returns `""`.
    pub fn text(&self, name: &str) -> &str {
        self.get(name).unwrap_or("")
    }

    pub fn uint32(&self, name: &str) -> Result<u32, ParseIntError> {
        self.text(name).parse()
    }

    pub fn uint64(&self, name: &str) -> Result<u64, ParseIntError> {
        self.text(name).parse()
    }

    pub fn int32(&self, name: &str) -> Result<i32, ParseIntError> {
        self.text(name).parse()
    }

    pub fn int64(&self, name: &str) -> Result<i64, ParseIntError> {
        self.text(name).parse()
    }

    /// Projects the set into a name → value map, last pair wins on duplicate
    /// names. Empty map for an empty set.
    pub fn map(&self) -> HashMap<String, String> {
        let mut map = HashMap::with_capacity(self.inner.len());
        for param in &self.inner {
            map.insert(param.name.clone(), param.value.clone());
        }
        map
    }

    pub fn iter(&self) -> slice::Iter<'_, Param> {
        self.inner.iter()
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let inner = iter.into_iter().map(|(name, value)| Param::new(name, value)).collect();
        Self { inner }
    }
}

impl<'p> IntoIterator for &'p Params {
    type Item = &'p Param;
    type IntoIter = slice::Iter<'p, Param>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}
