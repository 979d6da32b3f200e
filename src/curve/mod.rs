//! Temperature/resistance curves for resistance wire alloys
//!
//! Curves come from delimited text exported by wire vendors. Only two columns
//! are read: `Temperature (degF)` and `Electrical Resistivity` (the resistance
//! ratio relative to room temperature). Anything unreadable is dropped, so a
//! bad file gives an empty curve rather than an error.

use serde::Serialize;
use std::path::Path;

pub const TEMPERATURE_HEADER: &str = "Temperature (degF)";
pub const RESISTIVITY_HEADER: &str = "Electrical Resistivity";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurvePoint {
    /// Degrees F
    pub temp: f64,
    /// Resistance ratio
    pub tcr: f64,
}

/// Points sorted by temperature
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResistanceCurve {
    points: Vec<CurvePoint>,
}

fn detect_delimiter(text: &str) -> u8 {
    let header = text.lines().next().unwrap_or_default();
    [b'\t', b';', b',']
        .into_iter()
        .max_by_key(|&d| header.bytes().filter(|&b| b == d).count())
        .unwrap_or(b',')
}

impl ResistanceCurve {
    pub fn parse(text: &str) -> Self {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(detect_delimiter(text))
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(text.as_bytes());

        let (temp_idx, tcr_idx) = match reader.headers() {
            Ok(headers) => {
                let find = |name: &str| headers.iter().position(|h| h == name);
                match (find(TEMPERATURE_HEADER), find(RESISTIVITY_HEADER)) {
                    (Some(t), Some(r)) => (t, r),
                    _ => {
                        tracing::warn!("curve file is missing its temperature or resistivity column");
                        return Self::default();
                    }
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "unreadable curve header");
                return Self::default();
            }
        };

        let mut skipped = 0usize;
        let points = reader
            .records()
            .filter_map(|record| {
                let point = record.ok().and_then(|r| {
                    let temp = r.get(temp_idx)?.parse::<f64>().ok()?;
                    let tcr = r.get(tcr_idx)?.parse::<f64>().ok()?;
                    (temp.is_finite() && tcr.is_finite()).then_some(CurvePoint { temp, tcr })
                });
                if point.is_none() {
                    skipped += 1;
                }
                point
            })
            .collect();
        if skipped > 0 {
            tracing::debug!(skipped, "dropped unparseable curve rows");
        }

        Self::from_points(points)
    }

    /// Read a curve file. Only I/O failures are errors.
    pub fn load(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::parse(&text))
    }

    pub fn from_points(mut points: Vec<CurvePoint>) -> Self {
        points.sort_by(|a, b| a.temp.total_cmp(&b.temp));
        Self { points }
    }

    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Resistance ratio at `temp`, linear between points and held flat past
    /// either end. `None` for an empty curve or a non-finite `temp`.
    pub fn tcr_at(&self, temp: f64) -> Option<f64> {
        if !temp.is_finite() {
            return None;
        }
        let first = self.points.first()?;
        let last = self.points.last()?;
        if temp <= first.temp {
            return Some(first.tcr);
        }
        if temp >= last.temp {
            return Some(last.tcr);
        }

        let upper = self.points.partition_point(|p| p.temp <= temp);
        let (lo, hi) = (self.points[upper - 1], self.points[upper]);
        let pct = (temp - lo.temp) / (hi.temp - lo.temp);
        Some(lo.tcr + (hi.tcr - lo.tcr) * pct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SS316L: &str = "\
Temperature (degF),Electrical Resistivity,Notes
68,1.000,
200,1.059,
400,1.136,
300,1.098,out of order
";

    #[test]
    fn test_parse_sorts_by_temperature() {
        let curve = ResistanceCurve::parse(SS316L);
        let temps: Vec<f64> = curve.points().iter().map(|p| p.temp).collect();
        assert_eq!(temps, vec![68.0, 200.0, 300.0, 400.0]);
    }

    #[test]
    fn test_tab_delimited() {
        let text = "Electrical Resistivity\tTemperature (degF)\n1.0\t68\n1.2\t500\n";
        let curve = ResistanceCurve::parse(text);
        assert_eq!(
            curve.points(),
            &[
                CurvePoint { temp: 68.0, tcr: 1.0 },
                CurvePoint { temp: 500.0, tcr: 1.2 }
            ]
        );
    }

    #[test]
    fn test_bad_rows_skipped() {
        let text = "Temperature (degF),Electrical Resistivity\n68,1.0\nhot,1.1\n200\n400,1.136\n";
        assert_eq!(ResistanceCurve::parse(text).points().len(), 2);
    }

    #[test]
    fn test_missing_columns_give_empty_curve() {
        assert!(ResistanceCurve::parse("temp,tcr\n68,1.0\n").is_empty());
        assert!(ResistanceCurve::parse("").is_empty());
        assert!(ResistanceCurve::parse("\u{0}\u{1}garbage").is_empty());
    }

    #[test]
    fn test_interpolation() {
        let curve = ResistanceCurve::parse(SS316L);
        assert_eq!(curve.tcr_at(68.0), Some(1.0));
        // halfway between 200 and 300
        assert!((curve.tcr_at(250.0).unwrap() - 1.0785).abs() < 1e-12);
        assert_eq!(curve.tcr_at(300.0), Some(1.098));
        // clamped
        assert_eq!(curve.tcr_at(-40.0), Some(1.0));
        assert_eq!(curve.tcr_at(900.0), Some(1.136));
        assert_eq!(ResistanceCurve::default().tcr_at(100.0), None);
    }

    #[test]
    fn test_non_finite_temperature() {
        let curve = ResistanceCurve::parse(SS316L);
        assert_eq!(curve.tcr_at(f64::NAN), None);
        assert_eq!(curve.tcr_at(f64::INFINITY), None);
        assert_eq!(curve.tcr_at(f64::NEG_INFINITY), None);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ni80.csv");
        std::fs::write(&path, SS316L).unwrap();
        assert_eq!(ResistanceCurve::load(&path).unwrap().points().len(), 4);
        assert!(ResistanceCurve::load(dir.path().join("missing.csv")).is_err());
    }
}
