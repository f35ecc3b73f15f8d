use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GaugeBand {
    Safe,
    Caution,
    Warning,
    Danger,
    Extreme,
}

impl GaugeBand {
    pub const ALL: [GaugeBand; 5] = [
        GaugeBand::Safe,
        GaugeBand::Caution,
        GaugeBand::Warning,
        GaugeBand::Danger,
        GaugeBand::Extreme,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            GaugeBand::Safe => "Safe",
            GaugeBand::Caution => "Caution",
            GaugeBand::Warning => "Warning",
            GaugeBand::Danger => "Danger",
            GaugeBand::Extreme => "Extreme",
        }
    }
}

/// Band limits and dial range of a gauge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaugeScale {
    /// Ascending upper limits of every band but the last.
    pub limits: [f64; 4],
    /// Value at which the needle is fully deflected.
    pub scale_max: f64,
}

impl Default for GaugeScale {
    fn default() -> Self {
        Self {
            limits: [72.0, 76.0, 80.0, 84.0],
            scale_max: 90.0,
        }
    }
}

impl GaugeScale {
    /// First band whose upper limit lies above `value`.
    pub fn classify(&self, value: f64) -> GaugeBand {
        self.limits
            .iter()
            .position(|&limit| value < limit)
            .map_or(GaugeBand::Extreme, |i_band| GaugeBand::ALL[i_band])
    }

    /// Needle deflection in `[0, 1]`.
    pub fn fraction(&self, value: f64) -> f64 {
        value.clamp(0.0, self.scale_max) / self.scale_max
    }

    /// Read the last value of `values`.
    ///
    /// # Errors
    /// Returns [`AnalysisError::EmptySample`] if `values` is empty.
    pub fn read(&self, values: &[f64]) -> Result<GaugeReading, AnalysisError> {
        let &value = values.last().ok_or(AnalysisError::EmptySample)?;
        Ok(GaugeReading {
            value,
            band: self.classify(value),
            fraction: self.fraction(value),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaugeReading {
    pub value: f64,
    pub band: GaugeBand,
    pub fraction: f64,
}
