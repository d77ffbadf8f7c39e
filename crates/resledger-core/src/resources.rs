//! The resource ledger: an ordered multiset of [`Resource`] entries.
//!
//! `add` and `subtract` keep the ledger canonical: entries that are
//! [`Resource::addable`] with each other are merged into one line, so a
//! ledger holds at most one entry per identity (name, type, role,
//! reservation, disk persistence, revocability). Persistent volumes are the
//! exception and always keep their own line.
//!
//! Invalid or empty inputs are dropped without error. The ledger only
//! tracks valid, non-zero capacity; callers that need strict checking run
//! [`Resource::validate`] themselves before adding.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, trace};

use crate::raw::RawResource;
use crate::resource::{Resource, Value};

/// A ledger of offered or consumed capacity.
///
/// Mutating methods (`add`, `add1`, `subtract`, `subtract1`) change the
/// receiver in place and return it for chaining. `plus` and `minus` work on
/// a copy. A ledger shared between threads needs external locking, or can
/// be replaced wholesale with the result of `plus`/`minus`.
///
/// Deserializing goes through [`Resources::from_raw`], so a malformed entry
/// in a decoded offer is dropped without losing the rest.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Resources(Vec<Resource>);

impl Resources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Resource> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Resource] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<Resource> {
        self.0
    }

    /// Builds a ledger from wire-shaped resources. Entries that fail
    /// conversion are skipped; the rest are folded through `add1`.
    pub fn from_raw<I>(raw: I) -> Resources
    where
        I: IntoIterator<Item = RawResource>,
    {
        let mut ledger = Resources::new();
        for r in raw {
            let name = r.name.clone();
            match Resource::try_from(r) {
                Ok(resource) => {
                    ledger.add1(&resource);
                }
                Err(err) => debug!(%name, error = %err, "dropping malformed resource"),
            }
        }
        ledger
    }

    /// Folds `that` into the ledger, merging it into an addable entry or
    /// appending a copy. Invalid or empty resources are ignored.
    pub fn add1(&mut self, that: &Resource) -> &mut Self {
        if let Err(err) = that.validate() {
            debug!(resource = %that, error = %err, "dropping invalid resource");
            return self;
        }
        if that.is_empty() {
            debug!(resource = %that, "dropping empty resource");
            return self;
        }

        if let Some(entry) = self.0.iter_mut().find(|r| r.addable(that)) {
            entry.add(that);
            trace!(resource = %that, merged = %entry, "merged into existing entry");
        } else {
            trace!(resource = %that, "appended new entry");
            self.0.push(that.clone());
        }
        self
    }

    /// Folds every resource of `that` into the ledger.
    pub fn add<'a, I>(&mut self, that: I) -> &mut Self
    where
        I: IntoIterator<Item = &'a Resource>,
    {
        for r in that {
            self.add1(r);
        }
        self
    }

    /// Takes `that` out of the first subtractable entry. An entry that
    /// becomes invalid (e.g. a negative scalar) or empty is removed. When
    /// nothing is subtractable, or `that` is invalid or empty, the ledger is
    /// left unchanged.
    pub fn subtract1(&mut self, that: &Resource) -> &mut Self {
        if that.validate().is_err() || that.is_empty() {
            debug!(resource = %that, "ignoring invalid or empty subtrahend");
            return self;
        }

        let Some(idx) = self.0.iter().position(|r| r.subtractable(that)) else {
            debug!(resource = %that, "no subtractable entry");
            return self;
        };

        let entry = &mut self.0[idx];
        entry.subtract(that);
        if entry.validate().is_err() || entry.is_empty() {
            let removed = self.0.remove(idx);
            trace!(resource = %that, removed = %removed, "entry exhausted");
        }
        self
    }

    /// Subtracts every resource of `that` from the ledger.
    pub fn subtract<'a, I>(&mut self, that: I) -> &mut Self
    where
        I: IntoIterator<Item = &'a Resource>,
    {
        for r in that {
            self.subtract1(r);
        }
        self
    }

    /// `self + that`, leaving `self` untouched.
    pub fn plus<'a, I>(&self, that: I) -> Resources
    where
        I: IntoIterator<Item = &'a Resource>,
    {
        let mut x = self.clone();
        x.add(that);
        x
    }

    pub fn plus1(&self, that: &Resource) -> Resources {
        let mut x = self.clone();
        x.add1(that);
        x
    }

    /// `self - that`, leaving `self` untouched.
    pub fn minus<'a, I>(&self, that: I) -> Resources
    where
        I: IntoIterator<Item = &'a Resource>,
    {
        let mut x = self.clone();
        x.subtract(that);
        x
    }

    pub fn minus1(&self, that: &Resource) -> Resources {
        let mut x = self.clone();
        x.subtract1(that);
        x
    }

    /// True if a single entry contains `that`. Empty resources are trivially
    /// contained; invalid ones never are.
    pub fn contains(&self, that: &Resource) -> bool {
        if that.validate().is_err() {
            return false;
        }
        that.is_empty() || self.0.iter().any(|r| r.contains(that))
    }

    /// True if all of `that` fits in this ledger at once. Each resource is
    /// taken out of a working copy as it is matched, so the same capacity
    /// is never counted twice.
    pub fn contains_all<'a, I>(&self, that: I) -> bool
    where
        I: IntoIterator<Item = &'a Resource>,
    {
        let mut remaining = self.clone();
        for r in that {
            if !remaining.contains(r) {
                return false;
            }
            remaining.subtract1(r);
        }
        true
    }

    /// Entries matching `pred`, copied into a new ledger.
    pub fn filter<F>(&self, pred: F) -> Resources
    where
        F: Fn(&Resource) -> bool,
    {
        Resources(self.0.iter().filter(|&r| pred(r)).cloned().collect())
    }

    pub fn unreserved(&self) -> Resources {
        self.filter(Resource::is_unreserved)
    }

    /// See [`Resource::is_reserved`].
    pub fn reserved(&self, role: Option<&str>) -> Resources {
        self.filter(|r| r.is_reserved(role))
    }

    pub fn revocable(&self) -> Resources {
        self.filter(Resource::is_revocable)
    }

    pub fn persistent_volumes(&self) -> Resources {
        self.filter(Resource::is_persistent_volume)
    }

    /// Sum of all scalar entries named `name`, across roles. `None` if there
    /// are no such entries.
    pub fn scalar_sum(&self, name: &str) -> Option<f64> {
        self.0
            .iter()
            .filter(|r| r.name == name)
            .filter_map(|r| match &r.value {
                Value::Scalar(s) => Some(s.value()),
                _ => None,
            })
            .reduce(|a, b| a + b)
    }
}

impl<'de> Deserialize<'de> for Resources {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Vec::<RawResource>::deserialize(deserializer)?;
        Ok(Resources::from_raw(raw))
    }
}

/// Wraps entries verbatim, without merging or validation.
impl From<Vec<Resource>> for Resources {
    fn from(resources: Vec<Resource>) -> Self {
        Self(resources)
    }
}

/// Folds the items through [`Resources::add1`].
impl FromIterator<Resource> for Resources {
    fn from_iter<I: IntoIterator<Item = Resource>>(iter: I) -> Self {
        let mut ledger = Resources::new();
        for r in iter {
            ledger.add1(&r);
        }
        ledger
    }
}

impl<'a> IntoIterator for &'a Resources {
    type Item = &'a Resource;
    type IntoIter = std::slice::Iter<'a, Resource>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for Resources {
    type Item = Resource;
    type IntoIter = std::vec::IntoIter<Resource>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Semicolon-joined entries; an empty ledger renders as "".
impl fmt::Display for Resources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, r) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{r}")?;
        }
        Ok(())
    }
}
