//! Unordered collections of unique strings (disk ids, gpu names).

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A set of string items. Insertion order is kept for display only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Set(Vec<String>);

impl Set {
    pub fn new(items: Vec<String>) -> Self {
        Self(items)
    }

    pub fn items(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, item: &str) -> bool {
        self.0.iter().any(|x| x == item)
    }

    /// Union, keeping the receiver's order and appending new items.
    pub fn add(&self, other: &Set) -> Set {
        let mut seen: HashSet<&str> = self.0.iter().map(String::as_str).collect();
        let mut items = self.0.clone();
        for item in &other.0 {
            if seen.insert(item.as_str()) {
                items.push(item.clone());
            }
        }
        Set(items)
    }

    /// Difference. `other` need not be a subset of the receiver.
    pub fn subtract(&self, other: &Set) -> Set {
        let removed: HashSet<&str> = other.0.iter().map(String::as_str).collect();
        Set(self
            .0
            .iter()
            .filter(|item| !removed.contains(item.as_str()))
            .cloned()
            .collect())
    }

    /// Containment comparison: `Equal` for the same members, `Less` when
    /// the receiver is a proper subset of `other`, `Greater` otherwise.
    pub fn compare(&self, other: &Set) -> Ordering {
        let left: HashSet<&str> = self.0.iter().map(String::as_str).collect();
        let right: HashSet<&str> = other.0.iter().map(String::as_str).collect();
        if left == right {
            Ordering::Equal
        } else if left.is_subset(&right) {
            Ordering::Less
        } else {
            Ordering::Greater
        }
    }

    pub(crate) fn has_duplicates(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.0.len());
        !self.0.iter().all(|item| seen.insert(item.as_str()))
    }
}

impl<S: Into<String>> FromIterator<S> for Set {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for Set {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.0.join(","))
    }
}
