use std::ops::RangeInclusive;

///
/// Range
///
/// Lazy contiguous integer interval `[low, high]`, inclusive on both ends.
/// A range with `high < low` is empty.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Range {
    low: i64,
    high: i64,
}

impl Range {
    #[must_use]
    pub const fn new(low: i64, high: i64) -> Self {
        Self { low, high }
    }

    #[must_use]
    pub const fn low(&self) -> i64 {
        self.low
    }

    #[must_use]
    pub const fn high(&self) -> i64 {
        self.high
    }

    /// Number of integers covered, saturating at `usize::MAX`.
    #[must_use]
    pub fn size(&self) -> usize {
        if self.high < self.low {
            return 0;
        }

        let span = i128::from(self.high) - i128::from(self.low) + 1;
        usize::try_from(span).unwrap_or(usize::MAX)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.high < self.low
    }

    /// The `index`-th integer of the range.
    #[must_use]
    pub fn at(&self, index: usize) -> Option<i64> {
        if index >= self.size() {
            return None;
        }

        self.low.checked_add(i64::try_from(index).ok()?)
    }

    #[must_use]
    pub const fn contains(&self, value: i64) -> bool {
        self.low <= value && value <= self.high
    }

    #[must_use]
    pub const fn iter(&self) -> RangeInclusive<i64> {
        self.low..=self.high
    }
}

impl IntoIterator for &Range {
    type Item = i64;
    type IntoIter = RangeInclusive<i64>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

///
/// TESTS
///
