//! Decode-time limits.
//!
//! Lengths and counts read from the wire are untrusted. Every size-prefixed and aggregate codec
//! carries a [LenRange] that a declared length must fall within before anything is allocated.

use crate::Error;
use core::ops::{Bound, RangeBounds};

/// An inclusive range of acceptable lengths or element counts.
///
/// # Examples
///
/// ```
/// use bufcodec::LenRange;
///
/// let limit = LenRange::from(..=1024);
/// assert!(limit.contains(1024));
/// assert!(!limit.contains(1025));
///
/// let non_empty = LenRange::from(1..);
/// assert!(!non_empty.contains(0));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LenRange {
    min: usize,
    max: usize,
}

impl LenRange {
    /// Accepts every length.
    pub const fn any() -> Self {
        Self {
            min: 0,
            max: usize::MAX,
        }
    }

    /// Accepts lengths in `0..=max`.
    pub const fn up_to(max: usize) -> Self {
        Self { min: 0, max }
    }

    /// Accepts exactly `len`.
    pub const fn exact(len: usize) -> Self {
        Self { min: len, max: len }
    }

    /// Converts any range expression over `usize`.
    ///
    /// Ranges that admit no value (e.g. `5..5`) reject every length.
    pub fn new(r: impl RangeBounds<usize>) -> Self {
        let min = match r.start_bound() {
            Bound::Included(&s) => Some(s),
            Bound::Excluded(&s) => s.checked_add(1),
            Bound::Unbounded => Some(0),
        };
        let max = match r.end_bound() {
            Bound::Included(&e) => Some(e),
            Bound::Excluded(&e) => e.checked_sub(1),
            Bound::Unbounded => Some(usize::MAX),
        };
        match (min, max) {
            (Some(min), Some(max)) => Self { min, max },
            _ => Self { min: 1, max: 0 },
        }
    }

    pub fn min(&self) -> usize {
        self.min
    }

    pub fn max(&self) -> usize {
        self.max
    }

    /// Returns true if `len` is within the range.
    pub fn contains(&self, len: usize) -> bool {
        self.min <= len && len <= self.max
    }

    /// Returns `len` if it is within the range, [Error::InvalidLength] otherwise.
    pub fn check(&self, len: usize) -> Result<usize, Error> {
        if !self.contains(len) {
            return Err(Error::InvalidLength(len));
        }
        Ok(len)
    }
}

impl Default for LenRange {
    fn default() -> Self {
        Self::any()
    }
}

macro_rules! impl_from_range {
    ($($range:ty),*) => {
        $(
            impl From<$range> for LenRange {
                fn from(r: $range) -> Self {
                    Self::new(r)
                }
            }
        )*
    };
}

impl_from_range!(
    core::ops::Range<usize>,
    core::ops::RangeInclusive<usize>,
    core::ops::RangeFrom<usize>,
    core::ops::RangeTo<usize>,
    core::ops::RangeToInclusive<usize>,
    core::ops::RangeFull
);

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(LenRange::from(..), 0, usize::MAX; "full")]
    #[test_case(LenRange::from(5..), 5, usize::MAX; "from")]
    #[test_case(LenRange::from(..10), 0, 9; "to exclusive")]
    #[test_case(LenRange::from(..=10), 0, 10; "to inclusive")]
    #[test_case(LenRange::from(5..10), 5, 9; "half open")]
    #[test_case(LenRange::from(5..=10), 5, 10; "closed")]
    #[test_case(LenRange::exact(7), 7, 7; "exact")]
    #[test_case(LenRange::up_to(3), 0, 3; "up to")]
    fn test_bounds(range: LenRange, min: usize, max: usize) {
        assert_eq!(range.min(), min);
        assert_eq!(range.max(), max);
        assert!(range.contains(min));
        assert!(range.contains(max));
        if min > 0 {
            assert!(!range.contains(min - 1));
        }
        if max < usize::MAX {
            assert!(!range.contains(max + 1));
        }
    }

    #[test]
    fn test_empty_ranges() {
        let empty = LenRange::from(5..5);
        assert!(!empty.contains(4));
        assert!(!empty.contains(5));

        let nothing_below_zero = LenRange::from(..0);
        assert!(!nothing_below_zero.contains(0));

        let excluded_max = LenRange::new((Bound::Excluded(usize::MAX), Bound::Unbounded));
        assert!(!excluded_max.contains(usize::MAX));
    }

    #[test]
    fn test_check() {
        let limit = LenRange::up_to(16);
        assert_eq!(limit.check(16).unwrap(), 16);
        assert!(matches!(limit.check(17), Err(Error::InvalidLength(17))));
    }
}
