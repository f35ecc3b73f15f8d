//! Windowed analysis of time series for dashboard views.
//!
//! A [`Series`] is cut into a [`SeriesWindow`] by a time range, and the
//! [`Analyzer`] turns windows into statistics and trends and full series into
//! spectra. [`Dashboard`] keeps the current window of one series and pushes
//! each recomputed summary to its subscribers.

pub mod analysis;
pub mod config;
pub mod dashboard;
pub mod dates;
pub mod error;
pub mod gauge;
pub mod histogram;
pub mod loader;
pub mod manager;
pub mod series;
pub mod spectrum;
pub mod stats;
pub mod trend;

pub use analysis::{Analyzer, Catalog, Outcome, ViewReport, WindowTrend};
pub use config::{ChartKind, Config};
pub use dashboard::{Dashboard, WindowUpdate};
pub use error::AnalysisError;
pub use series::{Location, Series, SeriesMeta, SeriesWindow, TimeRange};
pub use spectrum::{FrequencyScale, Spectrum, SpectrumPoint};
pub use stats::DescriptiveStats;
pub use trend::TrendFit;
