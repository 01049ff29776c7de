//! Registry key type.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Name under which a factory is registered.
///
/// Keys are immutable once created and cheap to clone, so the registry can
/// hand copies to errors, observers and reports without reallocating.
/// A `Key` borrows as `str`, which lets lookups use plain string slices.
///
/// # Examples
///
/// ```rust
/// use ferrous_registry::Key;
///
/// let key = Key::from("Object1");
/// assert_eq!(key.as_str(), "Object1");
/// assert_eq!(key, Key::from(String::from("Object1")));
/// assert_eq!(key.to_string(), "Object1");
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(Arc<str>);

impl Key {
    /// Creates a key from anything string-like.
    pub fn new(name: impl AsRef<str>) -> Self {
        Key(Arc::from(name.as_ref()))
    }

    /// The key as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({:?})", &*self.0)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Key {
    #[inline]
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key(Arc::from(name))
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key(Arc::from(name))
    }
}

impl From<&String> for Key {
    fn from(name: &String) -> Self {
        Key(Arc::from(name.as_str()))
    }
}

impl From<&Key> for Key {
    fn from(key: &Key) -> Self {
        key.clone()
    }
}

impl PartialEq<str> for Key {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for Key {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}
