use std::fs;
use std::path::{Path, PathBuf};

use foundation::math::great_circle_distance_km;
use foundation::{GeoBounds, LatLng};
use layers::DEFAULT_GREAT_CIRCLE_SAMPLES;
use serde::{Deserialize, Serialize};
use trip::{Segment, TransportClass};

pub const DEFAULT_INTERCONTINENTAL_KM: f64 = 3000.0;
const MAX_ZOOM_LEVEL: u8 = 22;

/// A fixed map view: center `[lat, lng]` and zoom.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewPreset {
    pub center: [f64; 2],
    pub zoom: u8,
}

impl ViewPreset {
    pub const fn new(lat: f64, lng: f64, zoom: u8) -> Self {
        Self {
            center: [lat, lng],
            zoom,
        }
    }

    pub fn center(&self) -> LatLng {
        LatLng::from_array(self.center)
    }
}

/// Application-supplied regional window used by `region` mode.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionPreset {
    pub center: [f64; 2],
    pub zoom: u8,
    /// `[[south, west], [north, east]]`.
    pub bounds: [[f64; 2]; 2],
}

impl RegionPreset {
    pub fn japan() -> Self {
        Self {
            center: [36.5, 138.5],
            zoom: 6,
            bounds: [[24.0, 122.0], [46.0, 154.0]],
        }
    }

    pub fn center(&self) -> LatLng {
        LatLng::from_array(self.center)
    }

    pub fn bounds(&self) -> GeoBounds {
        GeoBounds::new(
            LatLng::from_array(self.bounds[0]),
            LatLng::from_array(self.bounds[1]),
        )
    }
}

impl Default for RegionPreset {
    fn default() -> Self {
        Self::japan()
    }
}

/// Decides which flights count as intercontinental.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum IntercontinentalRule {
    /// Great-circle distance strictly above the threshold.
    Distance { threshold_km: f64 },
    /// Unordered airport-code pairs, e.g. `[["ORD", "NRT"]]`.
    AirportPairs { pairs: Vec<[String; 2]> },
}

impl Default for IntercontinentalRule {
    fn default() -> Self {
        IntercontinentalRule::Distance {
            threshold_km: DEFAULT_INTERCONTINENTAL_KM,
        }
    }
}

impl IntercontinentalRule {
    /// Only flights qualify; other classes always return `false`.
    pub fn matches(&self, segment: &Segment) -> bool {
        if segment.class != TransportClass::Flight {
            return false;
        }
        match self {
            IntercontinentalRule::Distance { threshold_km } => segment
                .endpoints()
                .is_some_and(|(a, b)| a.is_valid() && b.is_valid() && great_circle_distance_km(a, b) > *threshold_km),
            IntercontinentalRule::AirportPairs { pairs } => {
                let code = |p: &Option<trip::Place>| p.as_ref().and_then(|p| p.code.clone());
                let (Some(o), Some(d)) = (code(&segment.origin), code(&segment.destination)) else {
                    return false;
                };
                pairs
                    .iter()
                    .any(|[a, b]| (*a == o && *b == d) || (*a == d && *b == o))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub region: RegionPreset,
    pub intercontinental: IntercontinentalRule,
    pub great_circle_samples: usize,
    /// Used for padding when the host has no laid-out viewport yet.
    pub viewport_px: [f64; 2],
    pub world_view: ViewPreset,
    pub intercontinental_view: ViewPreset,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            region: RegionPreset::japan(),
            intercontinental: IntercontinentalRule::default(),
            great_circle_samples: DEFAULT_GREAT_CIRCLE_SAMPLES,
            viewport_px: layers::DEFAULT_VIEWPORT_PX,
            world_view: ViewPreset::new(30.0, 0.0, 2),
            intercontinental_view: ViewPreset::new(30.0, 0.0, 3),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "failed to read config {}: {source}", path.display())
            }
            ConfigError::Parse(e) => write!(f, "failed to parse config: {e}"),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl EngineConfig {
    pub fn with_region(region: RegionPreset) -> Self {
        Self {
            region,
            ..Self::default()
        }
    }

    pub fn from_json_str(payload: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(payload).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let payload = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json_str(&payload)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        let b = self.region.bounds();
        if !b.south_west.is_valid() || !b.north_east.is_valid() {
            return invalid("region bounds must be finite with latitudes in [-90, 90]".into());
        }
        if b.south() > b.north() || b.west() > b.east() {
            return invalid("region bounds must be [[south, west], [north, east]]".into());
        }
        for (name, center, zoom) in [
            ("region", self.region.center(), self.region.zoom),
            ("world_view", self.world_view.center(), self.world_view.zoom),
            (
                "intercontinental_view",
                self.intercontinental_view.center(),
                self.intercontinental_view.zoom,
            ),
        ] {
            if !center.is_valid() {
                return invalid(format!("{name} center is not a valid position"));
            }
            if zoom > MAX_ZOOM_LEVEL {
                return invalid(format!("{name} zoom {zoom} exceeds {MAX_ZOOM_LEVEL}"));
            }
        }
        if self.great_circle_samples == 0 {
            return invalid("great_circle_samples must be at least 1".into());
        }
        if !self.viewport_px.iter().all(|v| v.is_finite() && *v > 0.0) {
            return invalid("viewport_px must be positive".into());
        }
        if let IntercontinentalRule::Distance { threshold_km } = self.intercontinental
            && !(threshold_km.is_finite() && threshold_km > 0.0)
        {
            return invalid("intercontinental threshold_km must be positive".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use trip::{Place, SegmentId};

    fn flight(from: Place, to: Place) -> Segment {
        Segment {
            id: SegmentId::from("f"),
            date: NaiveDate::from_ymd_opt(2024, 4, 1).expect("valid date"),
            class: TransportClass::Flight,
            transport: "flight".into(),
            origin: Some(from),
            destination: Some(to),
        }
    }

    fn ord() -> Place {
        Place::new("O'Hare", Some("ORD"), 41.9786, -87.9048)
    }

    fn nrt() -> Place {
        Place::new("Narita", Some("NRT"), 35.7653, 140.3856)
    }

    fn itm() -> Place {
        Place::new("Itami", Some("ITM"), 34.7855, 135.4382)
    }

    #[test]
    fn defaults_match_documented_values() {
        let c = EngineConfig::default();
        assert_eq!(c.region, RegionPreset::japan());
        assert_eq!(c.great_circle_samples, 200);
        assert_eq!(c.world_view, ViewPreset::new(30.0, 0.0, 2));
        assert_eq!(c.intercontinental_view, ViewPreset::new(30.0, 0.0, 3));
        assert!(c.validate().is_ok());
    }

    #[test]
    fn distance_rule_only_accepts_long_flights() {
        let rule = IntercontinentalRule::default();
        assert!(rule.matches(&flight(ord(), nrt())));
        assert!(!rule.matches(&flight(nrt(), itm())));

        let mut train = flight(ord(), nrt());
        train.class = TransportClass::Train;
        assert!(!rule.matches(&train));
    }

    #[test]
    fn airport_pair_rule_is_unordered() {
        let rule = IntercontinentalRule::AirportPairs {
            pairs: vec![["ORD".into(), "NRT".into()]],
        };
        assert!(rule.matches(&flight(nrt(), ord())));
        assert!(!rule.matches(&flight(nrt(), itm())));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let c = EngineConfig::from_json_str(
            r#"{ "intercontinental": { "rule": "airport_pairs", "pairs": [["HND", "ORD"]] } }"#,
        )
        .expect("parse");
        assert_eq!(c.region, RegionPreset::japan());
        assert!(matches!(c.intercontinental, IntercontinentalRule::AirportPairs { .. }));
    }

    #[test]
    fn rejects_inverted_region_bounds() {
        let err = EngineConfig::from_json_str(
            r#"{ "region": { "center": [0, 0], "zoom": 5, "bounds": [[10, 0], [-10, 5]] } }"#,
        )
        .expect_err("inverted bounds");
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_zero_samples() {
        let err = EngineConfig::from_json_str(r#"{ "great_circle_samples": 0 }"#)
            .expect_err("zero samples");
        assert!(err.to_string().contains("great_circle_samples"));
    }
}
