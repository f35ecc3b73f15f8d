use chrono::NaiveDateTime;
use thiserror::Error;

/// Errors produced by the analysis core.
///
/// None of these are fatal: each one means "no result for this
/// sub-computation" and the caller decides how to present it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Statistics requested on a sample with no values.
    #[error("sample is empty")]
    EmptySample,

    /// Spectrum requested on a sequence with no values.
    #[error("input sequence is empty")]
    EmptyInput,

    /// Trend requested on fewer than two points or on points that share one position.
    #[error("window with {n_points} points has no usable trend")]
    DegenerateWindow { n_points: usize },

    /// Window range with its bounds in the wrong order.
    #[error("range start {lo} is after range end {hi}")]
    InvalidRange { lo: NaiveDateTime, hi: NaiveDateTime },

    /// Dates and values of a series are not aligned.
    #[error("series has {dates} dates but {values} values")]
    LengthMismatch { dates: usize, values: usize },

    /// View referring to a series that was never loaded.
    #[error("no series named {name:?}")]
    UnknownSeries { name: String },

    /// Segmentation that cannot produce a single spectrogram column.
    #[error("cannot split {len} samples into segments of {segment_len} with hop {hop}")]
    InvalidSegment {
        segment_len: usize,
        hop: usize,
        len: usize,
    },
}
