//! Real-world equivalents for an emissions quantity.

use crate::error::{EngineError, EngineResult};
use serde::Serialize;

/// Everyday activities with a fixed CO₂eq rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    DrivingPetrolCar,
    BoilingKettle,
    StreamingVideo,
    HumanBreathing,
}

impl Activity {
    pub const ALL: [Self; 4] = [Self::DrivingPetrolCar, Self::BoilingKettle, Self::StreamingVideo, Self::HumanBreathing];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::DrivingPetrolCar => "driving a petrol car",
            Self::BoilingKettle => "boiling a kettle",
            Self::StreamingVideo => "streaming video (HD)",
            Self::HumanBreathing => "breathing (human, per day)",
        }
    }

    /// Grams of CO₂eq per unit of activity (km, cup, minute, day).
    #[must_use]
    pub fn grams_per_unit(self) -> f64 {
        match self {
            Self::DrivingPetrolCar => 120.0,
            Self::BoilingKettle => 10.0,
            Self::StreamingVideo => 4.0,
            Self::HumanBreathing => 1000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Equivalent {
    pub activity: Activity,
    pub label: &'static str,
    /// `emissions_g / rate`, before display quantization.
    pub units: f64,
    pub formatted: String,
}

/// Activity label to formatted duration, in [`Activity::ALL`] order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquivalenceReport {
    pub emissions_g: f64,
    pub entries: Vec<Equivalent>,
}

impl EquivalenceReport {
    #[must_use]
    pub fn get(&self, activity: Activity) -> Option<&str> {
        self.entries.iter().find(|e| e.activity == activity).map(|e| e.formatted.as_str())
    }

    /// Lookup by label, e.g. `"boiling a kettle"`.
    #[must_use]
    pub fn by_label(&self, label: &str) -> Option<&str> {
        self.entries.iter().find(|e| e.label == label).map(|e| e.formatted.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.entries.iter().map(|e| (e.label, e.formatted.as_str()))
    }
}

/// Display quantization for equivalent units.
///
/// Below 1 the value is multiplied by 1000 and labelled seconds; from 1 up to
/// (not including) 1000 it is labelled minutes; from 1000 it is divided by 1000
/// and labelled hours. The boundaries 1 and 1000 belong to the upper branch.
#[must_use]
pub fn format_units(units: f64) -> String {
    if units < 1.0 {
        format!("{:.2} seconds", units * 1000.0)
    } else if units < 1000.0 {
        format!("{:.2} minutes", units)
    } else {
        format!("{:.2} hours", units / 1000.0)
    }
}

fn check_emissions(emissions_g: f64) -> EngineResult<()> {
    if emissions_g.is_finite() && emissions_g >= 0.0 {
        Ok(())
    } else {
        Err(EngineError::InvalidEmissions(emissions_g))
    }
}

pub fn to_equivalents(emissions_g: f64) -> EngineResult<EquivalenceReport> {
    check_emissions(emissions_g)?;

    let entries = Activity::ALL
        .into_iter()
        .map(|activity| {
            let units = emissions_g / activity.grams_per_unit();
            Equivalent { activity, label: activity.label(), units, formatted: format_units(units) }
        })
        .collect();

    Ok(EquivalenceReport { emissions_g, entries })
}

/// Extra detail shown for the latest run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatestRunFootprint {
    /// HD video streaming at 4 g/minute.
    pub streaming_seconds: f64,
    /// Human breathing at 1000 g/day.
    pub breathing_seconds: f64,
    /// Walking at 100 g per unit.
    pub walking_meters: f64,
    /// Petrol car at 120 g/km.
    pub driving_km: f64,
}

pub fn latest_footprint(emissions_g: f64) -> EngineResult<LatestRunFootprint> {
    check_emissions(emissions_g)?;
    Ok(LatestRunFootprint {
        streaming_seconds: emissions_g / 4.0 * 60.0,
        breathing_seconds: emissions_g / 1000.0 * 86_400.0,
        walking_meters: emissions_g / 100.0,
        driving_km: emissions_g / 120.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_emissions_are_zero_seconds() {
        let report = to_equivalents(0.0).unwrap();
        assert_eq!(report.entries.len(), 4);
        for (_, formatted) in report.iter() {
            assert_eq!(formatted, "0.00 seconds");
        }
    }

    #[test]
    fn test_boundaries_belong_to_upper_branch() {
        assert_eq!(format_units(1.0), "1.00 minutes");
        assert_eq!(format_units(1000.0), "1.00 hours");
        assert_eq!(format_units(0.999), "999.00 seconds");
        assert_eq!(format_units(999.994), "999.99 minutes");
    }

    #[test]
    fn test_five_grams() {
        let report = to_equivalents(5.0).unwrap();
        assert_eq!(report.get(Activity::DrivingPetrolCar), Some("41.67 seconds"));
        assert_eq!(report.get(Activity::BoilingKettle), Some("500.00 seconds"));
        assert_eq!(report.get(Activity::StreamingVideo), Some("1.25 minutes"));
        assert_eq!(report.get(Activity::HumanBreathing), Some("5.00 seconds"));
        assert_eq!(report.by_label("boiling a kettle"), Some("500.00 seconds"));
    }

    #[test]
    fn test_exact_boundaries_through_rates() {
        // 10 g / 10 g-per-cup = exactly 1 unit; 4000 g / 4 g-per-minute = exactly 1000.
        assert_eq!(to_equivalents(10.0).unwrap().get(Activity::BoilingKettle), Some("1.00 minutes"));
        assert_eq!(to_equivalents(4000.0).unwrap().get(Activity::StreamingVideo), Some("1.00 hours"));
    }

    #[test]
    fn test_negative_emissions_are_rejected() {
        assert!(matches!(to_equivalents(-1.0), Err(EngineError::InvalidEmissions(_))));
        assert!(to_equivalents(f64::INFINITY).is_err());
        assert!(latest_footprint(-0.5).is_err());
    }

    #[test]
    fn test_latest_footprint() {
        let fp = latest_footprint(2.0).unwrap();
        assert!((fp.streaming_seconds - 30.0).abs() < 1e-9);
        assert!((fp.breathing_seconds - 172.8).abs() < 1e-9);
        assert!((fp.walking_meters - 0.02).abs() < 1e-12);
        assert!((fp.driving_km - 2.0 / 120.0).abs() < 1e-12);
    }
}
