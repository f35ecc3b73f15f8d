//! Reading series from JSON and CSV files.

use crate::dates::parse_timestamp;
use crate::series::{Location, Series, SeriesMeta};
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::{fs::File, io::BufReader, path::Path};

/// Layout of a JSON series file.
#[derive(Deserialize)]
struct SeriesFile {
    dates: Vec<String>,
    values: Vec<f64>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    unit: Option<String>,
    #[serde(default)]
    location: Option<Location>,
}

const DATE_COLUMNS: &[&str] = &["date", "dates", "time", "timestamp"];
const VALUE_COLUMNS: &[&str] = &["value", "values"];

/// Rows searched for a header line.
const HEADER_SCAN_ROWS: usize = 50;

/// Load a series from a `.json` or `.csv` file.
pub fn load_series<P: AsRef<Path>>(file: P) -> Result<Series> {
    let file = file.as_ref();
    let ext = file
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let series = match ext.as_str() {
        "json" => load_json(file),
        "csv" => load_csv(file),
        _ => bail!("unsupported file format: .{ext}"),
    }
    .with_context(|| format!("failed to load {file:?}"))?;

    log::info!("loaded {} points from {file:?}", series.len());
    Ok(series)
}

fn load_json(file: &Path) -> Result<Series> {
    let reader = BufReader::new(File::open(file).context("failed to open file")?);
    let raw: SeriesFile = serde_json::from_reader(reader).context("failed to deserialize series")?;

    let dates = raw
        .dates
        .iter()
        .enumerate()
        .map(|(i, s)| parse_timestamp(s).with_context(|| format!("invalid date at index {i}")))
        .collect::<Result<Vec<_>>>()?;

    let meta = SeriesMeta {
        title: raw.title,
        unit: raw.unit,
        location: raw.location,
    };
    Ok(Series::new(dates, raw.values, meta)?)
}

fn load_csv(file: &Path) -> Result<Series> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(file)
        .context("failed to open file")?;

    let rows = reader
        .records()
        .enumerate()
        .map(|(i_row, record)| record.with_context(|| format!("failed to read row {i_row}")))
        .collect::<Result<Vec<_>>>()?;

    let (i_date, i_value, title, first_row) = match detect_header(&rows) {
        Some(i_header) => {
            let headers = &rows[i_header];
            let find = |names: &[&str], fallback: usize| {
                headers
                    .iter()
                    .position(|h| names.iter().any(|name| name.eq_ignore_ascii_case(h)))
                    .unwrap_or(fallback)
            };
            let i_value = find(VALUE_COLUMNS, 1);
            let title = headers.get(i_value).map(str::to_string);
            (find(DATE_COLUMNS, 0), i_value, title, i_header + 1)
        }
        None => {
            log::debug!("no header row in {file:?}, reading the first two columns");
            (0, 1, None, 0)
        }
    };
    if i_date == i_value {
        bail!("file needs a date column and a value column");
    }

    let mut dates = Vec::new();
    let mut values = Vec::new();
    for (i_row, record) in rows.iter().enumerate().skip(first_row) {
        let (Some(date), Some(value)) = (record.get(i_date), record.get(i_value)) else {
            log::warn!("skipping short row {i_row}");
            continue;
        };
        let Ok(value) = value.parse::<f64>() else {
            log::warn!("skipping row {i_row} with non-numeric value {value:?}");
            continue;
        };
        if !value.is_finite() {
            log::warn!("skipping row {i_row} with non-finite value {value}");
            continue;
        }
        dates.push(parse_timestamp(date).with_context(|| format!("invalid date in row {i_row}"))?);
        values.push(value);
    }

    let meta = SeriesMeta {
        title,
        ..SeriesMeta::default()
    };
    Ok(Series::new(dates, values, meta)?)
}

/// Index of the first of the leading rows that holds only column labels.
///
/// A label cell is non-empty and reads neither as a number nor as a
/// timestamp, so a file without a header row yields `None` and lines of
/// preamble above the header are skipped.
fn detect_header(rows: &[csv::StringRecord]) -> Option<usize> {
    rows.iter().take(HEADER_SCAN_ROWS).position(|row| {
        row.len() >= 2
            && row.iter().all(|cell| {
                !cell.is_empty() && cell.parse::<f64>().is_err() && parse_timestamp(cell).is_err()
            })
    })
}
