use crate::gauge::GaugeScale;
use crate::histogram::{DEFAULT_BINS, MAX_BINS};
use crate::series::TimeRange;
use crate::spectrum::{FrequencyScale, Taper};
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fmt::Debug, fs, ops::RangeBounds, path::Path, path::PathBuf};

/// Dashboard configuration.
///
/// Loaded from a TOML file and validated before use.
/// See [`Config::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Spectrum estimation settings.
    #[serde(default)]
    pub spectrum: SpectrumConfig,
    /// Band limits of gauge views.
    #[serde(default)]
    pub gauge: GaugeScale,

    /// Series files available to the views.
    pub series: Vec<SeriesConfig>,
    /// Views to compute, in output order.
    pub views: Vec<ChartKind>,
}

#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
pub struct SpectrumConfig {
    #[serde(default)]
    pub frequency_scale: FrequencyScale,
}

/// A named series file, relative to the work directory.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct SeriesConfig {
    pub name: String,
    pub file: PathBuf,
}

/// One dashboard view and the data it needs.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartKind {
    /// Single series with summary statistics per visible window.
    TimeSeries {
        series: String,
        #[serde(default = "default_trendline")]
        trendline: bool,
        /// Visible windows replayed in order; empty means the full extent.
        #[serde(default)]
        windows: Vec<TimeRange>,
    },
    /// Two series overlaid on a shared time axis.
    MultiSeries {
        series: [String; 2],
        #[serde(default = "default_trendline")]
        trendline: bool,
        #[serde(default)]
        windows: Vec<TimeRange>,
    },
    Periodogram {
        series: String,
    },
    Spectrogram {
        series: String,
        segment_len: usize,
        hop: usize,
        #[serde(default)]
        taper: Taper,
    },
    Histogram {
        series: String,
        #[serde(default = "default_bins")]
        bins: usize,
        #[serde(default)]
        window: Option<TimeRange>,
    },
    Gauge {
        series: String,
        #[serde(default)]
        window: Option<TimeRange>,
    },
}

fn default_trendline() -> bool {
    true
}

fn default_bins() -> usize {
    DEFAULT_BINS
}

impl ChartKind {
    pub fn label(&self) -> &'static str {
        match self {
            ChartKind::TimeSeries { .. } => "time series",
            ChartKind::MultiSeries { .. } => "multi series",
            ChartKind::Periodogram { .. } => "periodogram",
            ChartKind::Spectrogram { .. } => "spectrogram",
            ChartKind::Histogram { .. } => "histogram",
            ChartKind::Gauge { .. } => "gauge",
        }
    }

    /// Names of the series this view reads.
    pub fn series_names(&self) -> Vec<&str> {
        match self {
            ChartKind::MultiSeries { series, .. } => series.iter().map(String::as_str).collect(),
            ChartKind::TimeSeries { series, .. }
            | ChartKind::Periodogram { series }
            | ChartKind::Spectrogram { series, .. }
            | ChartKind::Histogram { series, .. }
            | ChartKind::Gauge { series, .. } => vec![series.as_str()],
        }
    }
}

impl Config {
    /// Load a [`Config`] from a file.
    ///
    /// The file must be TOML-encoded and contain a serialized [`Config`].
    /// Performs validation on all parameters before returning.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents = fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;

        let config: Config = toml::from_str(&contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        check_num(self.series.len(), 1..1_000).context("invalid number of series")?;
        check_num(self.views.len(), 1..1_000).context("invalid number of views")?;

        let mut names = HashSet::new();
        for series in &self.series {
            if series.name.is_empty() {
                bail!("series name must not be empty");
            }
            if !names.insert(series.name.as_str()) {
                bail!("series name {:?} is used more than once", series.name);
            }
        }

        check_gauge(&self.gauge).context("invalid gauge scale")?;

        for (i_view, view) in self.views.iter().enumerate() {
            check_view(view, &names)
                .with_context(|| format!("invalid {} view {i_view}", view.label()))?;
        }

        Ok(())
    }
}

fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}

fn check_gauge(gauge: &GaugeScale) -> Result<()> {
    if gauge.limits.iter().any(|limit| !limit.is_finite()) {
        bail!("limits must be finite");
    }
    if !gauge.limits.is_sorted_by(|a, b| a < b) {
        bail!("limits must be strictly ascending, but are {:?}", gauge.limits);
    }
    if !(gauge.scale_max > 0.0) {
        bail!("scale maximum must be positive, but is {}", gauge.scale_max);
    }
    Ok(())
}

fn check_view(view: &ChartKind, names: &HashSet<&str>) -> Result<()> {
    for name in view.series_names() {
        if !names.contains(name) {
            bail!("unknown series {name:?}");
        }
    }

    match view {
        ChartKind::TimeSeries { .. } | ChartKind::MultiSeries { .. } => {}
        ChartKind::Periodogram { .. } => {}
        ChartKind::Spectrogram {
            segment_len, hop, ..
        } => {
            check_num(*segment_len, 2..=1 << 20).context("invalid segment length")?;
            check_num(*hop, 1..=*segment_len).context("invalid hop")?;
        }
        ChartKind::Histogram { bins, .. } => {
            check_num(*bins, 1..=MAX_BINS).context("invalid number of bins")?;
        }
        ChartKind::Gauge { .. } => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC: &str = r#"
[spectrum]
frequency_scale = "original"

[[series]]
name = "a"
file = "a.json"

[[series]]
name = "b"
file = "b.csv"

[[views]]
kind = "time_series"
series = "a"
windows = [{ lo = "2024-01-02", hi = "2024-01-04" }]

[[views]]
kind = "multi_series"
series = ["a", "b"]
trendline = false

[[views]]
kind = "spectrogram"
series = "a"
segment_len = 8
hop = 4

[[views]]
kind = "histogram"
series = "b"

[[views]]
kind = "gauge"
series = "b"
"#;

    fn parse(contents: &str) -> Result<Config> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    #[test]
    fn parses_every_view_kind() {
        let config = parse(BASIC).unwrap();
        assert_eq!(config.spectrum.frequency_scale, FrequencyScale::Original);
        assert_eq!(config.gauge, GaugeScale::default());
        assert_eq!(config.views.len(), 5);
        match &config.views[0] {
            ChartKind::TimeSeries {
                trendline, windows, ..
            } => {
                assert!(*trendline);
                assert_eq!(windows.len(), 1);
            }
            other => panic!("unexpected view {other:?}"),
        }
        assert_eq!(
            config.views[2],
            ChartKind::Spectrogram {
                series: "a".to_string(),
                segment_len: 8,
                hop: 4,
                taper: Taper::Hann,
            }
        );
        assert!(matches!(config.views[3], ChartKind::Histogram { bins: 20, window: None, .. }));
    }

    #[test]
    fn rejects_unknown_series() {
        let contents = BASIC.replace("series = [\"a\", \"b\"]", "series = [\"a\", \"c\"]");
        let err = parse(&contents).unwrap_err();
        assert!(format!("{err:#}").contains("unknown series \"c\""));
    }

    #[test]
    fn rejects_duplicate_series() {
        let contents = BASIC.replace("name = \"b\"", "name = \"a\"");
        assert!(parse(&contents).is_err());
    }

    #[test]
    fn rejects_out_of_range_bins() {
        let contents = BASIC.replace("kind = \"histogram\"\nseries = \"b\"", "kind = \"histogram\"\nseries = \"b\"\nbins = 0");
        assert!(parse(&contents).is_err());
    }

    #[test]
    fn rejects_reversed_window() {
        let contents = BASIC.replace("hi = \"2024-01-04\"", "hi = \"2023-12-31\"");
        assert!(toml::from_str::<Config>(&contents).is_err());
    }

    #[test]
    fn rejects_unsorted_gauge_limits() {
        let contents = format!("[gauge]\nlimits = [72.0, 70.0, 80.0, 84.0]\n{BASIC}");
        let err = parse(&contents).unwrap_err();
        assert!(format!("{err:#}").contains("ascending"));
    }

    #[test]
    fn reads_config_file() {
        let dir = std::env::temp_dir().join("tsdash_config_reads_file");
        fs::create_dir_all(&dir).unwrap();
        let file = dir.join("config.toml");
        fs::write(&file, BASIC).unwrap();
        assert_eq!(Config::from_file(&file).unwrap(), parse(BASIC).unwrap());
        assert!(Config::from_file(dir.join("missing.toml")).is_err());
    }
}
