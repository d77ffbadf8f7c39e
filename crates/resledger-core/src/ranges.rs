//! Closed integer intervals and interval collections (ports, ids).
//!
//! Arithmetic always produces the canonical form: sorted by `begin`, with no
//! overlapping and no adjacent (`end + 1 == next.begin`) pairs.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// An inclusive interval `[begin, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub begin: u64,
    pub end: u64,
}

impl Range {
    pub fn new(begin: u64, end: u64) -> Self {
        Self { begin, end }
    }

    /// True if `other` lies entirely within this interval.
    pub fn covers(&self, other: &Range) -> bool {
        self.begin <= other.begin && other.end <= self.end
    }

    pub fn overlaps(&self, other: &Range) -> bool {
        self.begin <= other.end && other.begin <= self.end
    }
}

impl From<(u64, u64)> for Range {
    fn from((begin, end): (u64, u64)) -> Self {
        Self { begin, end }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.begin, self.end)
    }
}

/// An ordered collection of [`Range`]s.
///
/// The derived `PartialEq` is structural. Use [`Ranges::equivalent`] for
/// set semantics, where `[1-5,6-10]` and `[1-10]` are the same quantity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ranges(Vec<Range>);

impl Ranges {
    pub fn new(ranges: Vec<Range>) -> Self {
        Self(ranges)
    }

    pub fn as_slice(&self) -> &[Range] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Range> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<Range> {
        self.0
    }

    /// The canonical form of this collection.
    pub fn squashed(&self) -> Ranges {
        Ranges(squash(self.0.clone()))
    }

    /// Union of both collections, in canonical form.
    pub fn add(&self, other: &Ranges) -> Ranges {
        let mut all = Vec::with_capacity(self.0.len() + other.0.len());
        all.extend_from_slice(&self.0);
        all.extend_from_slice(&other.0);
        Ranges(squash(all))
    }

    /// Removes every span of `other` from this collection, splitting
    /// partially covered ranges. Spans not present are ignored.
    pub fn subtract(&self, other: &Ranges) -> Ranges {
        let mut remaining = self.0.clone();
        for cut in &other.0 {
            if cut.begin > cut.end {
                continue;
            }
            let mut next = Vec::with_capacity(remaining.len() + 1);
            for r in remaining {
                if !r.overlaps(cut) {
                    next.push(r);
                    continue;
                }
                if r.begin < cut.begin {
                    next.push(Range::new(r.begin, cut.begin - 1));
                }
                if r.end > cut.end {
                    next.push(Range::new(cut.end + 1, r.end));
                }
            }
            remaining = next;
        }
        Ranges(squash(remaining))
    }

    /// Containment comparison.
    ///
    /// Returns `Equal` when both cover the same values, `Less` when every
    /// value of `self` is also in `other`, and `Greater` otherwise.
    pub fn compare(&self, other: &Ranges) -> Ordering {
        let left = squash(self.0.clone());
        let right = squash(other.0.clone());
        if left == right {
            return Ordering::Equal;
        }
        let contained = left.iter().all(|a| right.iter().any(|b| b.covers(a)));
        if contained { Ordering::Less } else { Ordering::Greater }
    }

    /// Set equality, ignoring order and fragmentation.
    pub fn equivalent(&self, other: &Ranges) -> bool {
        squash(self.0.clone()) == squash(other.0.clone())
    }

    /// Reason this collection is not a legal payload, if any. Adjacent
    /// ranges are legal; inverted or overlapping ones are not.
    pub(crate) fn defect(&self) -> Option<&'static str> {
        for (i, a) in self.0.iter().enumerate() {
            if a.begin > a.end {
                return Some("begin > end");
            }
            if self.0[i + 1..].iter().any(|b| a.overlaps(b)) {
                return Some("overlapping ranges");
            }
        }
        None
    }
}

impl From<Vec<Range>> for Ranges {
    fn from(ranges: Vec<Range>) -> Self {
        Self(ranges)
    }
}

impl FromIterator<Range> for Ranges {
    fn from_iter<I: IntoIterator<Item = Range>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Ranges {
    type Item = &'a Range;
    type IntoIter = std::slice::Iter<'a, Range>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Ranges {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sorted = self.0.clone();
        sorted.sort_by_key(|r| (r.begin, r.end));
        f.write_str("[")?;
        for (i, r) in sorted.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{r}")?;
        }
        f.write_str("]")
    }
}

/// Sort then coalesce overlapping or adjacent neighbours.
fn squash(mut ranges: Vec<Range>) -> Vec<Range> {
    ranges.sort_by_key(|r| (r.begin, r.end));
    let mut out: Vec<Range> = Vec::with_capacity(ranges.len());
    for r in ranges {
        match out.last_mut() {
            Some(last) if r.begin <= last.end.saturating_add(1) => {
                last.end = last.end.max(r.end);
            }
            _ => out.push(r),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranges(pairs: &[(u64, u64)]) -> Ranges {
        pairs.iter().copied().map(Range::from).collect()
    }

    #[test]
    fn add_coalesces_adjacent() {
        let merged = ranges(&[(1, 5)]).add(&ranges(&[(6, 10)]));
        assert_eq!(merged, ranges(&[(1, 10)]));
    }

    #[test]
    fn add_keeps_gaps() {
        let merged = ranges(&[(1, 5)]).add(&ranges(&[(7, 10)]));
        assert_eq!(merged, ranges(&[(1, 5), (7, 10)]));
    }

    #[test]
    fn add_is_order_independent_and_idempotent() {
        let a = ranges(&[(20, 30), (1, 3)]);
        let b = ranges(&[(4, 8), (25, 40)]);
        let ab = a.add(&b);
        assert_eq!(ab, b.add(&a));
        assert_eq!(ab, ranges(&[(1, 8), (20, 40)]));
        assert_eq!(ab.add(&ab), ab);
    }

    #[test]
    fn add_chains_through_bridging_range() {
        let merged = ranges(&[(1, 2), (10, 12)]).add(&ranges(&[(3, 9)]));
        assert_eq!(merged, ranges(&[(1, 12)]));
    }

    #[test]
    fn add_at_upper_bound_does_not_overflow() {
        let merged = ranges(&[(u64::MAX - 1, u64::MAX)]).add(&ranges(&[(5, u64::MAX)]));
        assert_eq!(merged, ranges(&[(5, u64::MAX)]));
    }

    #[test]
    fn subtract_splits_range() {
        let left = ranges(&[(1, 10)]).subtract(&ranges(&[(3, 5)]));
        assert_eq!(left, ranges(&[(1, 2), (6, 10)]));
    }

    #[test]
    fn subtract_drops_fully_covered() {
        let left = ranges(&[(1, 3), (5, 8), (10, 12)]).subtract(&ranges(&[(4, 9)]));
        assert_eq!(left, ranges(&[(1, 3), (10, 12)]));
    }

    #[test]
    fn subtract_trims_edges() {
        let left = ranges(&[(1, 10)]).subtract(&ranges(&[(0, 2), (9, 20)]));
        assert_eq!(left, ranges(&[(3, 8)]));
    }

    #[test]
    fn subtract_absent_span_is_noop() {
        let base = ranges(&[(1, 10)]);
        assert_eq!(base.subtract(&ranges(&[(20, 30)])), base);
        assert_eq!(base.subtract(&Ranges::default()), base);
    }

    #[test]
    fn subtract_at_bounds() {
        let left = ranges(&[(0, u64::MAX)]).subtract(&ranges(&[(0, 0), (u64::MAX, u64::MAX)]));
        assert_eq!(left, ranges(&[(1, u64::MAX - 1)]));
    }

    #[test]
    fn compare_containment() {
        let big = ranges(&[(1, 5), (6, 10)]);
        assert_eq!(ranges(&[(4, 7)]).compare(&big), Ordering::Less);
        assert_eq!(ranges(&[(1, 10)]).compare(&big), Ordering::Equal);
        assert_eq!(ranges(&[(9, 11)]).compare(&big), Ordering::Greater);
        assert_eq!(Ranges::default().compare(&big), Ordering::Less);
    }

    #[test]
    fn equivalent_ignores_order() {
        assert!(ranges(&[(7, 9), (1, 2)]).equivalent(&ranges(&[(1, 2), (7, 9)])));
        assert!(!ranges(&[(1, 2)]).equivalent(&ranges(&[(1, 3)])));
    }

    #[test]
    fn defects() {
        assert_eq!(ranges(&[(5, 1)]).defect(), Some("begin > end"));
        assert_eq!(ranges(&[(1, 5), (3, 8)]).defect(), Some("overlapping ranges"));
        assert_eq!(ranges(&[(3, 8), (1, 5)]).defect(), Some("overlapping ranges"));
        assert_eq!(ranges(&[(1, 5), (6, 8)]).defect(), None);
    }

    #[test]
    fn display_sorts_by_begin() {
        assert_eq!(ranges(&[(10, 10), (1, 5)]).to_string(), "[1-5,10-10]");
        assert_eq!(Ranges::default().to_string(), "[]");
    }
}
