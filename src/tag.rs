use std::collections::btree_map::{self, BTreeMap};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;
use crate::quote::quote;

/// Key/value pairs parsed from a tag string such as
/// `json:"host" env:"SERVER_HOST" default:"localhost"`.
///
/// Keys iterate in lexicographic order, so serialization is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Tag {
    entries: BTreeMap<String, String>,
}

impl Tag {
    pub fn new() -> Self {
        Tag {
            entries: BTreeMap::new(),
        }
    }

    /// Look up the value bound to `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Bind `key` to `value`, returning the value it replaced.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.entries.iter(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.values().map(String::as_str)
    }

    /// Copy every pair of `other` into `self`; `other` wins on shared keys.
    pub fn merge_from(&mut self, other: &Tag) {
        for (key, value) in other {
            self.insert(key, value);
        }
    }

    /// Serialize back to `key:"value"` pairs joined by single spaces.
    ///
    /// Values are escaped, so `parse(&tag.to_tag_string())` yields `tag`
    /// again as long as every key is a valid key (see [`is_valid_key`]).
    pub fn to_tag_string(&self) -> String {
        let mut out = String::new();
        for (key, value) in self {
            out.push_str(key);
            out.push(':');
            out.push_str(&quote(value));
            out.push(' ');
        }
        out.truncate(out.trim_end().len());
        out
    }
}

/// Combine tags into a new one; later tags win on key collisions.
///
/// None of the inputs is modified. An empty sequence yields an empty tag.
pub fn merge<'a, I>(tags: I) -> Tag
where
    I: IntoIterator<Item = &'a Tag>,
{
    let mut merged = Tag::new();
    let mut count = 0usize;
    for tag in tags {
        merged.merge_from(tag);
        count += 1;
    }
    log::debug!("merged {} tags into {} entries", count, merged.len());
    merged
}

/// Whether `key` can appear as a key in a tag string: non-empty, and made
/// only of characters above the space that are not `:`, `"`, `,` or DEL.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|b| is_key_byte(b) && b != b',')
}

/// Bytes the scanner accepts inside a key span. Commas are accepted here and
/// rejected separately so they can be reported as a bad separator.
pub(crate) fn is_key_byte(b: u8) -> bool {
    b > b' ' && b != b':' && b != b'"' && b != 0x7f
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_tag_string())
    }
}

impl FromStr for Tag {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::parser::parse(s)
    }
}

/// Borrowing iterator over a tag's pairs in key order.
pub struct Iter<'a> {
    inner: btree_map::Iter<'a, String, String>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a> IntoIterator for &'a Tag {
    type Item = (&'a str, &'a str);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for Tag {
    type Item = (String, String);
    type IntoIter = btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Tag {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut tag = Tag::new();
        tag.extend(iter);
        tag
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for Tag {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for Tag {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}
