//! Sorted identifier set
//!
//! An ordered set of unique strings kept in a sorted `Vec` and searched
//! with binary search. Doubles as the sync work queue: popping always
//! yields the smallest remaining identifier, so traversal order is
//! deterministic.

/// Ordered set of unique identifiers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortedSet {
    items: Vec<String>,
}

impl SortedSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an identifier. Returns `false` if it was already present.
    pub fn insert(&mut self, item: impl Into<String>) -> bool {
        let item = item.into();
        match self.find(&item) {
            Ok(_) => false,
            Err(pos) => {
                self.items.insert(pos, item);
                true
            }
        }
    }

    /// Remove an identifier. Returns `false` if it was absent.
    pub fn remove(&mut self, item: &str) -> bool {
        match self.find(item) {
            Ok(pos) => {
                self.items.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    pub fn contains(&self, item: &str) -> bool {
        self.find(item).is_ok()
    }

    /// Remove and return the smallest identifier
    pub fn pop_first(&mut self) -> Option<String> {
        if self.items.is_empty() {
            None
        } else {
            Some(self.items.remove(0))
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate in sorted order
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.items.iter()
    }

    /// Borrow the sorted contents
    pub fn as_slice(&self) -> &[String] {
        &self.items
    }

    fn find(&self, item: &str) -> Result<usize, usize> {
        self.items.binary_search_by(|probe| probe.as_str().cmp(item))
    }
}

impl<S: Into<String>> FromIterator<S> for SortedSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<S: Into<String>> Extend<S> for SortedSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for item in iter {
            self.insert(item);
        }
    }
}

impl IntoIterator for SortedSet {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a SortedSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
