use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LassoError;

/// All session parameters in one struct.
/// Serializable so presets can be saved and loaded as JSON,
/// and overridable field by field from the command line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    // -- Display --
    /// Screen size the viewer window is fitted to (half scale).
    pub screen_width: u32,
    pub screen_height: u32,

    // -- Load stage --
    /// Uniform downsample factor applied right after decode. Must be >= 1.
    pub downsample: f64,

    // -- Edge search --
    pub edges: EdgeConfig,

    // -- Scale / export --
    /// Real-world units per pixel. Overrides calibration when set.
    pub scale_factor: Option<f64>,
    /// Real-world length between the two calibration points.
    pub known_distance: Option<f64>,
    /// Signed inset (< 0) or outset (> 0) in real-world units.
    pub tolerance: f64,
    /// Unit written to the point file. Distances above are millimetres.
    pub output_unit: OutputUnit,

    // -- Host import --
    /// Fit a closed spline through the points instead of placing them raw.
    pub spline: bool,
    /// Add horizontal/vertical dimensions from every point to the origin.
    pub constrain: bool,
    /// Keep every Nth point on import.
    pub import_every: usize,
    /// Uniform scale the host applies on import, e.g. 1.024 to allow
    /// for 2.4% shrinkage.
    pub import_scale: f64,

    // -- Event loop --
    /// Upper bound on how long one poll waits for input.
    pub poll_interval_ms: u64,
}

/// Thresholds for the gradient edge filter used by the snap search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeConfig {
    pub low_threshold: f32,
    pub high_threshold: f32,
}

/// Unit of the coordinates written to the exported point file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputUnit {
    Millimeters,
    /// The CAD host's internal unit; its import script reads values as-is.
    #[default]
    Centimeters,
}

impl OutputUnit {
    /// Multiplier from millimetres to this unit.
    pub fn factor(self) -> f64 {
        match self {
            OutputUnit::Millimeters => 1.0,
            OutputUnit::Centimeters => 0.1,
        }
    }
}

impl FromStr for OutputUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mm" | "millimeters" => Ok(OutputUnit::Millimeters),
            "cm" | "centimeters" => Ok(OutputUnit::Centimeters),
            other => Err(format!("unknown unit {other:?} (use mm or cm)")),
        }
    }
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            low_threshold: 30.0,
            high_threshold: 200.0,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            screen_width: 1920,
            screen_height: 1080,
            downsample: 1.0,
            edges: EdgeConfig::default(),
            scale_factor: None,
            known_distance: None,
            tolerance: 0.0,
            output_unit: OutputUnit::Centimeters,
            spline: true,
            constrain: false,
            import_every: 1,
            import_scale: 1.0,
            poll_interval_ms: 10,
        }
    }
}

impl SessionConfig {
    /// Load a JSON preset. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, LassoError> {
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|e| LassoError::Config(e.to_string()))
    }

    /// Save the preset as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), LassoError> {
        let text =
            serde_json::to_string_pretty(self).map_err(|e| LassoError::Config(e.to_string()))?;
        std::fs::write(path, text)?;
        Ok(())
    }

    /// The downsample factor to actually use.
    ///
    /// Anything below 1 or non-finite is reported and replaced by 1 so a
    /// bad entry never blocks the load.
    pub fn effective_downsample(&self) -> f64 {
        match validate_downsample(self.downsample) {
            Ok(d) => d,
            Err(e) => {
                log::warn!("{e}; using 1");
                1.0
            }
        }
    }
}

/// Parse an operator-entered downsample factor.
pub fn parse_downsample(text: &str) -> Result<f64, LassoError> {
    let value: f64 = text
        .trim()
        .parse()
        .map_err(|_| LassoError::InvalidDownsample(text.to_string()))?;
    validate_downsample(value)
}

fn validate_downsample(value: f64) -> Result<f64, LassoError> {
    if value.is_finite() && value >= 1.0 {
        Ok(value)
    } else {
        Err(LassoError::InvalidDownsample(value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downsample_below_one_falls_back() {
        let config = SessionConfig {
            downsample: 0.5,
            ..SessionConfig::default()
        };
        assert_eq!(config.effective_downsample(), 1.0);
    }

    #[test]
    fn parse_downsample_rejects_text() {
        assert!(matches!(
            parse_downsample("abc"),
            Err(LassoError::InvalidDownsample(_))
        ));
        assert_eq!(parse_downsample(" 2.5 ").unwrap(), 2.5);
    }

    #[test]
    fn preset_round_trips_through_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preset.json");
        let config = SessionConfig {
            downsample: 2.0,
            tolerance: -0.5,
            output_unit: OutputUnit::Millimeters,
            ..SessionConfig::default()
        };
        config.save(&path).unwrap();
        assert_eq!(SessionConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn partial_preset_uses_defaults() {
        let config: SessionConfig = serde_json::from_str(r#"{"downsample": 3}"#).unwrap();
        assert_eq!(config.downsample, 3.0);
        assert_eq!(config.edges, EdgeConfig::default());
        assert!(config.spline);
        assert_eq!(config.output_unit, OutputUnit::Centimeters);
    }

    #[test]
    fn unit_names() {
        assert_eq!("cm".parse::<OutputUnit>(), Ok(OutputUnit::Centimeters));
        assert_eq!("Millimeters".parse::<OutputUnit>(), Ok(OutputUnit::Millimeters));
        assert!("inch".parse::<OutputUnit>().is_err());
    }
}
