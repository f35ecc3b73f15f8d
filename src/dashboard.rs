//! Window state of a single-series view and synchronous change notification.
//!
//! The dashboard owns the current visible range. Every range change
//! recomputes the window summary once and hands it to each subscriber before
//! returning, so display components never have to look the window up
//! themselves.

use crate::analysis::{Analyzer, Outcome, WindowTrend};
use crate::error::AnalysisError;
use crate::series::{Series, SeriesWindow, TimeRange};
use crate::spectrum::Spectrum;
use crate::stats::DescriptiveStats;
use serde::Serialize;

/// Summary of the visible window after a change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowUpdate {
    pub range: TimeRange,
    pub count: usize,
    pub stats: Outcome<DescriptiveStats>,
    pub trend: Option<WindowTrend>,
}

type Subscriber<'a> = Box<dyn FnMut(&WindowUpdate) + 'a>;

pub struct Dashboard<'a> {
    analyzer: &'a Analyzer,
    series: &'a Series,
    spectrum: Result<Spectrum, AnalysisError>,
    range: Option<TimeRange>,
    trendline: bool,
    subscribers: Vec<Subscriber<'a>>,
}

impl<'a> Dashboard<'a> {
    /// Load a series; its spectrum is computed here and never again.
    pub fn load(analyzer: &'a Analyzer, series: &'a Series) -> Self {
        let spectrum = analyzer.spectrum(series);
        if let Err(err) = &spectrum {
            log::warn!("no spectrum for loaded series: {err}");
        }
        Self {
            analyzer,
            series,
            spectrum,
            range: None,
            trendline: true,
            subscribers: Vec::new(),
        }
    }

    pub fn spectrum(&self) -> Result<&Spectrum, &AnalysisError> {
        self.spectrum.as_ref()
    }

    /// Current visible range, `None` until a window has been set.
    pub fn range(&self) -> Option<TimeRange> {
        self.range
    }

    pub fn set_trendline(&mut self, trendline: bool) {
        self.trendline = trendline;
    }

    /// Register a callback run on every window change.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&WindowUpdate) + 'a) {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Move the visible window to `range` and notify subscribers.
    pub fn set_window(&mut self, range: TimeRange) -> WindowUpdate {
        self.range = Some(range);
        let window = self.series.window(range);
        self.publish(&window)
    }

    /// Show the whole series again and notify subscribers.
    pub fn reset_window(&mut self) -> WindowUpdate {
        let window = self.series.full_window();
        self.range = self.series.extent();
        self.publish(&window)
    }

    fn publish(&mut self, window: &SeriesWindow) -> WindowUpdate {
        let update = WindowUpdate {
            range: window.range(),
            count: window.len(),
            stats: self.analyzer.summarize(window).into(),
            trend: if self.trendline {
                self.analyzer.fit_trend(window)
            } else {
                None
            },
        };
        for subscriber in &mut self.subscribers {
            subscriber(&update);
        }
        update
    }
}
