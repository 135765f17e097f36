//! Unit addressing derived from normalized codes
//!
//! A unit address is the character path from the tree root to a node: `""`
//! for the root, `"J"`, `"J/F"`, `"J/F/K"` for the nodes along the code
//! `JFK`. The address is derived purely from the normalized query code, with
//! no tree or store involved, which is what makes lookup-time resolution
//! deterministic and O(code length).

use crate::record::normalize_code;
use std::fmt;

/// Address of one persisted unit: the character path from the tree root.
///
/// Internally stored as the bare normalized character sequence (`"JFK"`);
/// [`Display`](fmt::Display) and [`storage_path`](UnitAddress::storage_path)
/// render the slash-separated form used by path-based stores.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UnitAddress(String);

impl UnitAddress {
    /// The root address (empty character path).
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Resolve the address for a query code of arbitrary case.
    ///
    /// No validation beyond normalization is performed: an unknown or
    /// malformed code simply resolves to an address that will fail to load.
    pub fn for_code(code: &str) -> Self {
        Self(normalize_code(code))
    }

    /// Extend this address by one character (the edge to a child node).
    pub fn child(&self, c: char) -> Self {
        let mut path = String::with_capacity(self.0.len() + c.len_utf8());
        path.push_str(&self.0);
        path.push(c);
        Self(path)
    }

    /// Whether this is the root (empty) address.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The bare character sequence of this address (no separators).
    #[inline]
    pub fn as_code(&self) -> &str {
        &self.0
    }

    /// Iterate over the path characters from the root.
    pub fn segments(&self) -> impl Iterator<Item = char> + '_ {
        self.0.chars()
    }

    /// Render the slash-separated storage path, one segment per character.
    ///
    /// The root renders as `""`; `JFK` renders as `"J/F/K"`.
    pub fn storage_path(&self) -> String {
        let mut out = String::with_capacity(self.0.len() * 2);
        for (i, c) in self.0.chars().enumerate() {
            if i > 0 {
                out.push('/');
            }
            out.push(c);
        }
        out
    }
}

impl fmt::Display for UnitAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.storage_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_code_normalizes() {
        assert_eq!(UnitAddress::for_code("jfk"), UnitAddress::for_code("JFK"));
        assert_eq!(UnitAddress::for_code(" lga "), UnitAddress::for_code("LGA"));
    }

    #[test]
    fn test_storage_path() {
        assert_eq!(UnitAddress::root().storage_path(), "");
        assert_eq!(UnitAddress::for_code("J").storage_path(), "J");
        assert_eq!(UnitAddress::for_code("JFK").storage_path(), "J/F/K");
    }

    #[test]
    fn test_child_extends_path() {
        let root = UnitAddress::root();
        let j = root.child('J');
        let jf = j.child('F');
        assert_eq!(j.as_code(), "J");
        assert_eq!(jf.as_code(), "JF");
        assert_eq!(jf.storage_path(), "J/F");
        assert!(root.is_root());
        assert!(!jf.is_root());
    }

    #[test]
    fn test_display_matches_storage_path() {
        let address = UnitAddress::for_code("ORD");
        assert_eq!(address.to_string(), "O/R/D");
    }

    #[test]
    fn test_segments() {
        let address = UnitAddress::for_code("JFK");
        let segments: Vec<char> = address.segments().collect();
        assert_eq!(segments, vec!['J', 'F', 'K']);
        assert_eq!(UnitAddress::root().segments().count(), 0);
    }
}
