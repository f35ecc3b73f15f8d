use crate::analysis::{Analyzer, Catalog};
use crate::config::Config;
use crate::loader::load_series;
use anyhow::{Context, Result, bail};
use glob::glob;
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

/// Runs the configured views of a work directory.
///
/// The work directory holds `config.toml`, the series files it names and a
/// `results` directory with one report per view.
pub struct Manager {
    work_dir: PathBuf,
    cfg: Config,
}

impl Manager {
    pub fn new<P: AsRef<Path>>(work_dir: P) -> Result<Self> {
        let work_dir = work_dir.as_ref().to_path_buf();

        let cfg =
            Config::from_file(work_dir.join("config.toml")).context("failed to construct cfg")?;
        log::info!("{cfg:#?}");

        Ok(Self { work_dir, cfg })
    }

    /// Compute every view and write its report.
    pub fn analyze(&self) -> Result<()> {
        let catalog = self.load_catalog().context("failed to load series")?;
        let analyzer = self.analyzer();

        for view_idx in 0..self.cfg.views.len() {
            self.write_view(&analyzer, &catalog, view_idx)
                .with_context(|| format!("failed to write view {view_idx}"))?;
        }

        Ok(())
    }

    /// Compute a single view and write its report.
    pub fn analyze_view(&self, view_idx: usize) -> Result<()> {
        let n_views = self.cfg.views.len();
        if view_idx >= n_views {
            bail!("view index must be below {n_views}, but is {view_idx}");
        }

        let catalog = self.load_catalog().context("failed to load series")?;
        let analyzer = self.analyzer();

        self.write_view(&analyzer, &catalog, view_idx)
            .with_context(|| format!("failed to write view {view_idx}"))
    }

    /// Remove every written report.
    pub fn clean(&self) -> Result<()> {
        for file in self.result_files().context("failed to list result files")? {
            fs::remove_file(&file).with_context(|| format!("failed to remove {file:?}"))?;
            log::info!("removed {file:?}");
        }
        Ok(())
    }

    fn analyzer(&self) -> Analyzer {
        Analyzer::new(self.cfg.spectrum.frequency_scale, self.cfg.gauge.clone())
    }

    fn load_catalog(&self) -> Result<Catalog> {
        let mut catalog = Catalog::new();
        for series_cfg in &self.cfg.series {
            let series = load_series(self.work_dir.join(&series_cfg.file))
                .with_context(|| format!("failed to load series {:?}", series_cfg.name))?;
            catalog.insert(series_cfg.name.clone(), series);
        }
        Ok(catalog)
    }

    fn write_view(&self, analyzer: &Analyzer, catalog: &Catalog, view_idx: usize) -> Result<()> {
        let view = &self.cfg.views[view_idx];
        let report = analyzer
            .run_view(view, catalog)
            .with_context(|| format!("failed to run {} view", view.label()))?;

        let results_dir = self.results_dir();
        fs::create_dir_all(&results_dir)
            .with_context(|| format!("failed to create {results_dir:?}"))?;

        let file = self.result_file(view_idx);
        let writer = File::create(&file).with_context(|| format!("failed to create {file:?}"))?;
        let mut writer = BufWriter::new(writer);
        serde_json::to_writer_pretty(&mut writer, &report).context("failed to serialize report")?;
        writer.flush().context("failed to flush writer stream")?;

        log::info!("wrote {} view to {file:?}", view.label());
        Ok(())
    }

    fn result_files(&self) -> Result<Vec<PathBuf>> {
        let pattern = self.results_dir().join("view-*.json");
        let pattern = pattern.to_str().context("pattern is not valid UTF-8")?;
        let files = glob(pattern)
            .context("failed to glob result files")?
            .filter_map(Result::ok)
            .filter(|p| p.is_file())
            .collect();
        Ok(files)
    }

    fn results_dir(&self) -> PathBuf {
        self.work_dir.join("results")
    }

    fn result_file(&self, view_idx: usize) -> PathBuf {
        self.results_dir().join(format!("view-{view_idx:04}.json"))
    }
}
