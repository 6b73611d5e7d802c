// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Finite integer domains.
//!
//! A domain is the ordered set of values a variable may take. Domains are
//! immutable after construction: the search permutes assignments, never the
//! value sets themselves. Values are stored sorted and deduplicated so that
//! membership and position lookups can use binary search.

/// An immutable, ordered set of distinct `i32` values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Domain {
    values: Vec<i32>,
}

impl Domain {
    /// Creates a domain from an explicit list of values.
    ///
    /// The list is sorted and deduplicated; the input order does not matter.
    ///
    /// # Panics
    ///
    /// Panics if `values` is empty.
    pub fn new(values: impl Into<Vec<i32>>) -> Self {
        let mut values = values.into();
        assert!(
            !values.is_empty(),
            "called `Domain::new` with an empty value list, but a domain must contain at least one value"
        );
        values.sort_unstable();
        values.dedup();
        Self { values }
    }

    /// Creates the contiguous domain `[start, start + len)`.
    ///
    /// # Panics
    ///
    /// Panics if `len` is zero.
    pub fn range(start: i32, len: usize) -> Self {
        assert!(
            len > 0,
            "called `Domain::range` with len 0, but a domain must contain at least one value"
        );
        let values = (0..len).map(|offset| start + offset as i32).collect();
        Self { values }
    }

    /// Number of values in the domain.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// A domain is never empty; this exists for clippy symmetry with `len`.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns `true` iff `value` belongs to the domain.
    #[inline]
    pub fn contains(&self, value: i32) -> bool {
        self.values.binary_search(&value).is_ok()
    }

    /// Returns the position of `value` within the domain, if present.
    #[inline]
    pub fn position(&self, value: i32) -> Option<usize> {
        self.values.binary_search(&value).ok()
    }

    /// Returns the value stored at `position`.
    ///
    /// # Panics
    ///
    /// Panics if `position` is out of bounds.
    #[inline(always)]
    pub fn value_at(&self, position: usize) -> i32 {
        self.values[position]
    }

    /// The full ordered value sequence.
    #[inline(always)]
    pub fn values(&self) -> &[i32] {
        &self.values
    }

    /// Smallest value in the domain.
    #[inline(always)]
    pub fn min(&self) -> i32 {
        self.values[0]
    }

    /// Largest value in the domain.
    #[inline(always)]
    pub fn max(&self) -> i32 {
        self.values[self.values.len() - 1]
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Domain([{}, {}], {} values)", self.min(), self.max(), self.len())
    }
}
