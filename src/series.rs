//! Timestamped series and the visible windows cut from them.

use crate::dates::serde_timestamp;
use crate::error::AnalysisError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Named place a series was measured at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Descriptive metadata carried along with a series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesMeta {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub location: Option<Location>,
}

/// Ordered sequence of `(timestamp, value)` pairs stored as two aligned vectors.
///
/// Dates are expected to be non-decreasing. This is not enforced, but every
/// window lookup relies on it.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    dates: Vec<NaiveDateTime>,
    values: Vec<f64>,
    meta: SeriesMeta,
}

impl Series {
    /// Create a series from aligned dates and values.
    ///
    /// # Errors
    /// Returns [`AnalysisError::LengthMismatch`] if the vectors differ in length.
    pub fn new(
        dates: Vec<NaiveDateTime>,
        values: Vec<f64>,
        meta: SeriesMeta,
    ) -> Result<Self, AnalysisError> {
        if dates.len() != values.len() {
            return Err(AnalysisError::LengthMismatch {
                dates: dates.len(),
                values: values.len(),
            });
        }
        if !dates.is_sorted() {
            log::warn!(
                "dates of series {:?} are not in order, windows may be wrong",
                meta.title.as_deref().unwrap_or("<untitled>")
            );
        }
        Ok(Self { dates, values, meta })
    }

    pub fn dates(&self) -> &[NaiveDateTime] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn meta(&self) -> &SeriesMeta {
        &self.meta
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Smallest range covering every timestamp, `None` for an empty series.
    pub fn extent(&self) -> Option<TimeRange> {
        let lo = *self.dates.first()?;
        let hi = *self.dates.last()?;
        Some(TimeRange { lo, hi })
    }

    /// Window over `[range.lo, range.hi]`.
    pub fn window(&self, range: TimeRange) -> SeriesWindow<'_> {
        let start = self.dates.partition_point(|d| *d < range.lo);
        let end = self.dates.partition_point(|d| *d <= range.hi).max(start);
        SeriesWindow {
            series: self,
            range,
            slice: start..end,
        }
    }

    /// Window covering the whole series.
    pub fn full_window(&self) -> SeriesWindow<'_> {
        let range = self.extent().unwrap_or(TimeRange {
            lo: NaiveDateTime::MIN,
            hi: NaiveDateTime::MIN,
        });
        SeriesWindow {
            series: self,
            range,
            slice: 0..self.len(),
        }
    }
}

/// Inclusive timestamp range `[lo, hi]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRange", into = "RawRange")]
pub struct TimeRange {
    lo: NaiveDateTime,
    hi: NaiveDateTime,
}

impl TimeRange {
    /// # Errors
    /// Returns [`AnalysisError::InvalidRange`] if `lo > hi`.
    pub fn new(lo: NaiveDateTime, hi: NaiveDateTime) -> Result<Self, AnalysisError> {
        if lo > hi {
            return Err(AnalysisError::InvalidRange { lo, hi });
        }
        Ok(Self { lo, hi })
    }

    pub fn lo(&self) -> NaiveDateTime {
        self.lo
    }

    pub fn hi(&self) -> NaiveDateTime {
        self.hi
    }

    pub fn contains(&self, ts: &NaiveDateTime) -> bool {
        self.lo <= *ts && *ts <= self.hi
    }
}

#[derive(Serialize, Deserialize)]
struct RawRange {
    #[serde(with = "serde_timestamp")]
    lo: NaiveDateTime,
    #[serde(with = "serde_timestamp")]
    hi: NaiveDateTime,
}

impl TryFrom<RawRange> for TimeRange {
    type Error = AnalysisError;

    fn try_from(raw: RawRange) -> Result<Self, Self::Error> {
        TimeRange::new(raw.lo, raw.hi)
    }
}

impl From<TimeRange> for RawRange {
    fn from(range: TimeRange) -> Self {
        RawRange {
            lo: range.lo,
            hi: range.hi,
        }
    }
}

/// Read-only view of the part of a series that falls inside a time range.
#[derive(Debug, Clone)]
pub struct SeriesWindow<'a> {
    series: &'a Series,
    range: TimeRange,
    slice: Range<usize>,
}

impl<'a> SeriesWindow<'a> {
    pub fn series(&self) -> &'a Series {
        self.series
    }

    pub fn range(&self) -> TimeRange {
        self.range
    }

    /// Index range of the visible slice within the full series.
    pub fn index_range(&self) -> Range<usize> {
        self.slice.clone()
    }

    pub fn dates(&self) -> &'a [NaiveDateTime] {
        &self.series.dates[self.slice.clone()]
    }

    pub fn values(&self) -> &'a [f64] {
        &self.series.values[self.slice.clone()]
    }

    pub fn len(&self) -> usize {
        self.slice.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slice.is_empty()
    }

    /// Visible values paired with their 0-based rank inside the window.
    pub fn ranked_points(&self) -> Vec<(usize, f64)> {
        self.values().iter().copied().enumerate().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::parse_timestamp;

    fn ts(s: &str) -> NaiveDateTime {
        parse_timestamp(s).unwrap()
    }

    fn five_days() -> Series {
        let dates = (1..=5).map(|d| ts(&format!("2024-01-0{d}"))).collect();
        Series::new(dates, vec![1.0, 2.0, 3.0, 4.0, 5.0], SeriesMeta::default()).unwrap()
    }

    #[test]
    fn rejects_misaligned_vectors() {
        let err = Series::new(vec![ts("2024-01-01")], vec![], SeriesMeta::default()).unwrap_err();
        assert_eq!(err, AnalysisError::LengthMismatch { dates: 1, values: 0 });
    }

    #[test]
    fn rejects_reversed_range() {
        let err = TimeRange::new(ts("2024-01-03"), ts("2024-01-01")).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidRange { .. }));
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let series = five_days();
        let range = TimeRange::new(ts("2024-01-02"), ts("2024-01-04")).unwrap();
        let window = series.window(range);
        assert_eq!(window.values(), &[2.0, 3.0, 4.0]);
        assert_eq!(window.index_range(), 1..4);
    }

    #[test]
    fn window_between_samples_is_empty() {
        let series = five_days();
        let range = TimeRange::new(ts("2024-01-02 06:00:00"), ts("2024-01-02 18:00:00")).unwrap();
        assert!(series.window(range).is_empty());
    }

    #[test]
    fn ranked_points_restart_at_zero() {
        let series = five_days();
        let range = TimeRange::new(ts("2024-01-03"), ts("2024-01-05")).unwrap();
        assert_eq!(series.window(range).ranked_points(), vec![(0, 3.0), (1, 4.0), (2, 5.0)]);
    }

    #[test]
    fn full_window_covers_everything() {
        let series = five_days();
        let window = series.full_window();
        assert_eq!(window.len(), 5);
        assert_eq!(window.range(), series.extent().unwrap());
    }

    #[test]
    fn range_deserializes_from_strings() {
        let range: TimeRange = toml::from_str("lo = \"2024-01-01\"\nhi = \"2024-01-05\"").unwrap();
        assert_eq!(range.lo(), ts("2024-01-01"));
        let bad: Result<TimeRange, _> = toml::from_str("lo = \"2024-01-05\"\nhi = \"2024-01-01\"");
        assert!(bad.is_err());
    }
}
