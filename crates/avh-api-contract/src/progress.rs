//! Progress values in one canonical unit
//!
//! Resource kinds disagree on how they report progress: test runs send a
//! percentage, crawler jobs send a fraction in `[0, 1]` and spider jobs send
//! either. Inside the hub every progress value is a [`Progress`], an integer
//! percentage in `[0, 100]`. Conversion happens only while (de)serializing;
//! a field uses the default impls for percentages,
//! `#[serde(with = "progress::fraction")]` for fractions and
//! `#[serde(with = "progress::auto")]` when the unit is not fixed.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Completion percentage, always within `0..=100`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Progress(u8);

impl Progress {
    pub const ZERO: Progress = Progress(0);
    pub const COMPLETE: Progress = Progress(100);

    /// Create a progress value, clamping anything above 100.
    pub fn new(percent: u8) -> Self {
        Self(percent.min(100))
    }

    /// Build from a percentage, rounding to the nearest integer.
    pub fn from_percent(value: f64) -> Self {
        if !value.is_finite() {
            return Self::ZERO;
        }
        Self(value.round().clamp(0.0, 100.0) as u8)
    }

    /// Build from a fraction in `[0, 1]`.
    pub fn from_fraction(value: f64) -> Self {
        if !value.is_finite() {
            return Self::ZERO;
        }
        Self::from_percent(value * 100.0)
    }

    pub fn percent(self) -> u8 {
        self.0
    }

    pub fn as_fraction(self) -> f64 {
        f64::from(self.0) / 100.0
    }

    pub fn is_complete(self) -> bool {
        self.0 >= 100
    }

    /// Add `step` percentage points, stopping at 100.
    pub fn saturating_add(self, step: u8) -> Self {
        Self::new(self.0.saturating_add(step))
    }

    /// Render a fixed-width bar such as `[#####-----]`.
    pub fn render_bar(self, width: usize) -> String {
        let filled = (usize::from(self.0) * width + 50) / 100;
        let filled = filled.min(width);
        format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl From<u8> for Progress {
    fn from(percent: u8) -> Self {
        Self::new(percent)
    }
}

impl Serialize for Progress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.0)
    }
}

impl<'de> Deserialize<'de> for Progress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = f64::deserialize(deserializer)?;
        Ok(Self::from_percent(raw))
    }
}

/// Serde adapter for progress carried as a fraction in `[0, 1]`.
pub mod fraction {
    use super::Progress;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(progress: &Progress, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(progress.as_fraction())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Progress, D::Error> {
        let raw = f64::deserialize(deserializer)?;
        Ok(Progress::from_fraction(raw))
    }
}

/// Serde adapter for progress whose unit is decided by the value.
///
/// Integers are percentages. A float up to `1.0` is a fraction and anything
/// larger is a percentage, so `0.5` and `50` both decode to 50%. Values are
/// written back as integer percentages.
pub mod auto {
    use super::Progress;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(u64),
        Float(f64),
    }

    pub fn serialize<S: Serializer>(progress: &Progress, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(progress.percent())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Progress, D::Error> {
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Int(percent) => Progress::new(percent.min(100) as u8),
            Raw::Float(value) if value <= 1.0 => Progress::from_fraction(value),
            Raw::Float(value) => Progress::from_percent(value),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    struct Percent {
        progress: Progress,
    }

    #[derive(Serialize, Deserialize)]
    struct Fraction {
        #[serde(with = "crate::progress::fraction")]
        progress: Progress,
    }

    #[derive(Serialize, Deserialize)]
    struct Either {
        #[serde(with = "crate::progress::auto")]
        progress: Progress,
    }

    #[test]
    fn test_percent_values_are_clamped_and_rounded() {
        assert_eq!(Progress::from_percent(42.4).percent(), 42);
        assert_eq!(Progress::from_percent(42.5).percent(), 43);
        assert_eq!(Progress::from_percent(180.0).percent(), 100);
        assert_eq!(Progress::from_percent(-3.0).percent(), 0);
        assert_eq!(Progress::from_percent(f64::NAN).percent(), 0);
        assert_eq!(Progress::new(250).percent(), 100);
    }

    #[test]
    fn test_fraction_values_map_to_percent() {
        assert_eq!(Progress::from_fraction(0.0).percent(), 0);
        assert_eq!(Progress::from_fraction(0.375).percent(), 38);
        assert_eq!(Progress::from_fraction(1.0).percent(), 100);
        assert_eq!(Progress::from_fraction(1.7).percent(), 100);
    }

    #[test]
    fn test_wire_units_do_not_leak_past_the_boundary() {
        // A percentage of 1 must stay 1%, not be mistaken for a full fraction.
        let run: Percent = serde_json::from_str(r#"{"progress": 1}"#).unwrap();
        assert_eq!(run.progress.percent(), 1);

        let crawl: Fraction = serde_json::from_str(r#"{"progress": 0.01}"#).unwrap();
        assert_eq!(crawl.progress.percent(), 1);

        let crawl: Fraction = serde_json::from_str(r#"{"progress": 1}"#).unwrap();
        assert_eq!(crawl.progress, Progress::COMPLETE);
    }

    #[test]
    fn test_fraction_serializes_back_as_fraction() {
        let json = serde_json::to_value(Fraction {
            progress: Progress::new(25),
        })
        .unwrap();
        assert_eq!(json["progress"], serde_json::json!(0.25));

        let json = serde_json::to_value(Percent {
            progress: Progress::new(25),
        })
        .unwrap();
        assert_eq!(json["progress"], serde_json::json!(25));
    }

    #[test]
    fn test_auto_unit_accepts_fraction_and_percent() {
        let half: Either = serde_json::from_str(r#"{"progress": 0.5}"#).unwrap();
        assert_eq!(half.progress.percent(), 50);

        let half: Either = serde_json::from_str(r#"{"progress": 50}"#).unwrap();
        assert_eq!(half.progress.percent(), 50);

        let nearly: Either = serde_json::from_str(r#"{"progress": 0.95}"#).unwrap();
        assert_eq!(nearly.progress.percent(), 95);

        let percent: Either = serde_json::from_str(r#"{"progress": 37.6}"#).unwrap();
        assert_eq!(percent.progress.percent(), 38);

        // An integer 1 is a percentage, only a float can be a fraction.
        let one: Either = serde_json::from_str(r#"{"progress": 1}"#).unwrap();
        assert_eq!(one.progress.percent(), 1);

        let over: Either = serde_json::from_str(r#"{"progress": 400}"#).unwrap();
        assert_eq!(over.progress, Progress::COMPLETE);

        let json = serde_json::to_value(Either {
            progress: Progress::new(50),
        })
        .unwrap();
        assert_eq!(json["progress"], serde_json::json!(50));
    }

    #[test]
    fn test_saturating_add_stops_at_complete() {
        let p = Progress::new(95).saturating_add(20);
        assert_eq!(p, Progress::COMPLETE);
        assert!(p.is_complete());
        assert_eq!(Progress::new(250).saturating_add(255), Progress::COMPLETE);
    }

    #[test]
    fn test_render_bar() {
        assert_eq!(Progress::ZERO.render_bar(10), "[----------]");
        assert_eq!(Progress::new(50).render_bar(10), "[#####-----]");
        assert_eq!(Progress::COMPLETE.render_bar(4), "[####]");
        assert_eq!(Progress::new(7).to_string(), "7%");
    }
}
