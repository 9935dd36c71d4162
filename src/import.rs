//! Host-side reading of exported point files.
//!
//! Turns the `x,y` lines written by [`crate::export`] into the sketch
//! geometry the CAD host builds: sampled points lifted to the sketch plane,
//! optionally closed into a fitted spline and dimensioned to the origin.

use std::io::BufRead;

use crate::config::SessionConfig;
use crate::error::LassoError;

/// How an exported file is brought into a sketch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImportSettings {
    /// Keep every Nth sample. Values below 1 behave as 1.
    pub every: usize,
    /// Uniform scale applied to both axes.
    pub scale: f64,
    /// Fit a closed spline instead of placing loose points.
    pub spline: bool,
    /// Dimension every point to the origin.
    pub constrain: bool,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            every: 1,
            scale: 1.0,
            spline: true,
            constrain: false,
        }
    }
}

impl From<&SessionConfig> for ImportSettings {
    fn from(config: &SessionConfig) -> Self {
        Self {
            every: config.import_every,
            scale: config.import_scale,
            spline: config.spline,
            constrain: config.constrain,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// A distance dimension from `points[point]` to the sketch origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimension {
    pub point: usize,
    pub axis: Axis,
}

/// Sketch geometry to create.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportPlan {
    /// Points on the sketch plane (`z = 0`). A closed spline repeats its
    /// first point at the end.
    pub points: Vec<[f64; 3]>,
    pub closed_spline: bool,
    pub dimensions: Vec<Dimension>,
}

impl ImportPlan {
    /// Nothing to import.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Distinct sampled points, without the spline's closing repeat.
    pub fn sample_count(&self) -> usize {
        if self.closed_spline {
            self.points.len().saturating_sub(1)
        } else {
            self.points.len()
        }
    }
}

/// Read an exported point file and plan the sketch geometry.
///
/// Lines that do not hold exactly two fields are skipped; a field that is
/// not a number is an error.
pub fn read_points<R: BufRead>(reader: R, settings: &ImportSettings) -> Result<ImportPlan, LassoError> {
    let every = settings.every.max(1);
    let mut samples = Vec::new();
    let mut count = 0usize;

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let fields: Vec<&str> = line.trim().split(',').collect();
        let [x, y] = fields.as_slice() else {
            continue;
        };
        let parse = |s: &str| {
            s.trim().parse::<f64>().map_err(|e| LassoError::ParsePoint {
                line: i + 1,
                message: format!("{s:?}: {e}"),
            })
        };
        let (x, y) = (parse(*x)?, parse(*y)?);
        count += 1;
        if count % every == 0 {
            samples.push([x * settings.scale, y * settings.scale, 0.0]);
        }
    }

    if samples.is_empty() {
        log::warn!("no points found");
        return Ok(ImportPlan::default());
    }

    let dimensions = if settings.constrain {
        (0..samples.len())
            .flat_map(|point| {
                [Axis::Horizontal, Axis::Vertical]
                    .into_iter()
                    .map(move |axis| Dimension { point, axis })
            })
            .collect()
    } else {
        Vec::new()
    };

    let mut points = samples;
    if settings.spline {
        points.push(points[0]);
    }
    log::debug!("import plan: {count} lines read, {} kept", points.len());
    Ok(ImportPlan {
        points,
        closed_spline: settings.spline,
        dimensions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const FILE: &str = "0,0\n1,0\n1,1\n0,1\n2,2\n3,3\n";

    #[test]
    fn spline_is_closed_on_first_point() {
        let plan = read_points(Cursor::new(FILE), &ImportSettings::default()).unwrap();
        assert!(plan.closed_spline);
        assert_eq!(plan.points.len(), 7);
        assert_eq!(plan.points.first(), plan.points.last());
        assert_eq!(plan.sample_count(), 6);
        assert!(plan.dimensions.is_empty());
    }

    #[test]
    fn every_nth_sample_counts_from_one() {
        let settings = ImportSettings {
            every: 2,
            spline: false,
            ..ImportSettings::default()
        };
        let plan = read_points(Cursor::new(FILE), &settings).unwrap();
        assert_eq!(plan.points, vec![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [3.0, 3.0, 0.0]]);
    }

    #[test]
    fn scale_and_constraints() {
        let settings = ImportSettings {
            scale: 1.5,
            constrain: true,
            ..ImportSettings::default()
        };
        let plan = read_points(Cursor::new("2,-4\n4,2\n"), &settings).unwrap();
        assert_eq!(plan.points[0], [3.0, -6.0, 0.0]);
        assert_eq!(plan.dimensions.len(), 4);
        assert_eq!(plan.dimensions[1], Dimension { point: 0, axis: Axis::Vertical });
        assert_eq!(plan.dimensions[2], Dimension { point: 1, axis: Axis::Horizontal });
    }

    #[test]
    fn malformed_lines() {
        let plan = read_points(Cursor::new("1,2,3\n\n5,6\n"), &ImportSettings::default()).unwrap();
        assert_eq!(plan.sample_count(), 1);

        let err = read_points(Cursor::new("1,2\nx,3\n"), &ImportSettings::default()).unwrap_err();
        assert!(matches!(err, LassoError::ParsePoint { line: 2, .. }));
    }

    #[test]
    fn empty_file_gives_empty_plan() {
        let plan = read_points(Cursor::new(""), &ImportSettings::default()).unwrap();
        assert!(plan.is_empty());
        assert!(!plan.closed_spline);
    }

    #[test]
    fn reads_back_what_export_wrote() {
        use crate::config::OutputUnit;
        use crate::export::write_points;
        use kurbo::Point;

        let mut buf = Vec::new();
        let pts = [Point::new(-0.5, 1.25), Point::new(3.0, -2.0)];
        write_points(&mut buf, &pts, OutputUnit::Millimeters).unwrap();
        let settings = ImportSettings {
            spline: false,
            ..ImportSettings::default()
        };
        let plan = read_points(Cursor::new(buf), &settings).unwrap();
        assert_eq!(plan.points, vec![[-0.5, 1.25, 0.0], [3.0, -2.0, 0.0]]);
    }
}
