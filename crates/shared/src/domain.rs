use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(MarkerId);
id_newtype!(RegionId);

/// A monitored measurement location, keyed by its survey name (e.g. `"P1"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PositionId(pub String);

impl PositionId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<&str> for PositionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for PositionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Named acoustic metrics computed by the data layer (e.g. `LAeq`, `LAFmax`).
pub type Metrics = BTreeMap<String, f64>;

/// Metric maps compared bitwise, so a NaN reading (no samples in the span)
/// equals itself.
pub fn metrics_eq(a: &Metrics, b: &Metrics) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b)
            .all(|((ka, va), (kb, vb))| ka == kb && va.to_bits() == vb.to_bits())
}

/// One contiguous time span in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub start: f64,
    pub end: f64,
}

impl Area {
    /// Builds an area from two bounds in either order.
    pub fn new(a: f64, b: f64) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }

    pub fn contains(&self, timestamp: f64) -> bool {
        self.start <= timestamp && timestamp <= self.end
    }

    pub fn is_valid(&self) -> bool {
        self.start.is_finite() && self.end.is_finite() && self.end > self.start
    }
}

/// Sorts areas by start, drops invalid ones and merges overlapping or touching spans.
pub fn normalize_areas(areas: impl IntoIterator<Item = Area>) -> Vec<Area> {
    let mut sorted: Vec<Area> = areas.into_iter().filter(Area::is_valid).collect();
    sorted.sort_by(|a, b| a.start.total_cmp(&b.start));

    let mut merged: Vec<Area> = Vec::with_capacity(sorted.len());
    for area in sorted {
        match merged.last_mut() {
            Some(last) if area.start <= last.end => {
                last.end = last.end.max(area.end);
            }
            _ => merged.push(area),
        }
    }
    merged
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub id: MarkerId,
    pub timestamp: f64,
    pub position_id: PositionId,
    #[serde(default)]
    pub note: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Metrics>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub id: RegionId,
    pub position_id: PositionId,
    pub areas: Vec<Area>,
    #[serde(default)]
    pub note: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Metrics>,
}

impl Region {
    /// Earliest start across all areas.
    pub fn start(&self) -> f64 {
        self.areas
            .iter()
            .map(|area| area.start)
            .fold(f64::INFINITY, f64::min)
    }

    /// Latest end across all areas.
    pub fn end(&self) -> f64 {
        self.areas
            .iter()
            .map(|area| area.end)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn contains(&self, timestamp: f64) -> bool {
        self.areas.iter().any(|area| area.contains(timestamp))
    }

    pub fn total_duration(&self) -> f64 {
        self.areas.iter().map(Area::width).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_eq_treats_nan_as_equal() {
        let nan: Metrics = [("LAeq".to_string(), f64::NAN)].into_iter().collect();
        let level: Metrics = [("LAeq".to_string(), 55.0)].into_iter().collect();
        let renamed: Metrics = [("LAFmax".to_string(), 55.0)].into_iter().collect();

        assert!(metrics_eq(&nan, &nan.clone()));
        assert!(!metrics_eq(&nan, &level));
        assert!(!metrics_eq(&level, &renamed));
        assert!(!metrics_eq(&level, &Metrics::new()));
    }

    #[test]
    fn normalize_merges_overlapping_and_drops_degenerate_areas() {
        let areas = normalize_areas([
            Area::new(5000.0, 6000.0),
            Area::new(1000.0, 2000.0),
            Area::new(1500.0, 2500.0),
            Area::new(3000.0, 3000.0),
            Area {
                start: f64::NAN,
                end: 10.0,
            },
        ]);

        assert_eq!(
            areas,
            vec![Area::new(1000.0, 2500.0), Area::new(5000.0, 6000.0)]
        );
    }

    #[test]
    fn region_bounds_span_all_areas() {
        let region = Region {
            id: RegionId(1),
            position_id: PositionId::from("P1"),
            areas: vec![Area::new(4000.0, 5000.0), Area::new(1000.0, 2000.0)],
            note: String::new(),
            color: None,
            metrics: None,
        };

        assert_eq!(region.start(), 1000.0);
        assert_eq!(region.end(), 5000.0);
        assert!(region.contains(1500.0));
        assert!(!region.contains(3000.0));
        assert_eq!(region.total_duration(), 2000.0);
    }

    #[test]
    fn id_maps_serialize_with_string_keys() {
        let mut map = BTreeMap::new();
        map.insert(MarkerId(7), "seven");
        let raw = serde_json::to_string(&map).expect("serialize");
        assert_eq!(raw, r#"{"7":"seven"}"#);
        let back: BTreeMap<MarkerId, String> = serde_json::from_str(&raw).expect("deserialize");
        assert_eq!(back.get(&MarkerId(7)).map(String::as_str), Some("seven"));
    }
}
