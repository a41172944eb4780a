use chrono::NaiveDate;
use foundation::LatLng;
use serde::{Deserialize, Serialize};

/// Closed set of transport classes a segment can carry.
///
/// Declaration order is the draw order of the per-class layer groups.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportClass {
    Flight,
    Train,
    Shuttle,
    Walk,
    Bus,
}

impl TransportClass {
    pub const ALL: [TransportClass; 5] = [
        TransportClass::Flight,
        TransportClass::Train,
        TransportClass::Shuttle,
        TransportClass::Walk,
        TransportClass::Bus,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TransportClass::Flight => "flight",
            TransportClass::Train => "train",
            TransportClass::Shuttle => "shuttle",
            TransportClass::Walk => "walk",
            TransportClass::Bus => "bus",
        }
    }
}

impl std::fmt::Display for TransportClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Segment identifier. Trip files use either strings or integers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawSegmentId", into = "String")]
pub struct SegmentId(pub String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSegmentId {
    Text(String),
    Number(i64),
}

impl From<RawSegmentId> for SegmentId {
    fn from(raw: RawSegmentId) -> Self {
        match raw {
            RawSegmentId::Text(s) => SegmentId(s),
            RawSegmentId::Number(n) => SegmentId(n.to_string()),
        }
    }
}

impl From<SegmentId> for String {
    fn from(id: SegmentId) -> Self {
        id.0
    }
}

impl From<&str> for SegmentId {
    fn from(s: &str) -> Self {
        SegmentId(s.to_string())
    }
}

impl std::fmt::Display for SegmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stays have no id in trip files; they are addressed by position.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StayId(pub usize);

impl std::fmt::Display for StayId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "stay-{}", self.0)
    }
}

/// Named location with `[lat, lng]` coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub coordinates: [f64; 2],
}

impl Place {
    pub fn new(name: impl Into<String>, code: Option<&str>, lat: f64, lng: f64) -> Self {
        Self {
            name: name.into(),
            code: code.map(str::to_string),
            coordinates: [lat, lng],
        }
    }

    pub fn position(&self) -> LatLng {
        LatLng::from_array(self.coordinates)
    }

    /// `"name (code)"`, or just the name when there is no code.
    pub fn label(&self) -> String {
        match &self.code {
            Some(code) => format!("{} ({code})", self.name),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: SegmentId,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub class: TransportClass,
    pub transport: String,
    #[serde(default)]
    pub origin: Option<Place>,
    #[serde(default)]
    pub destination: Option<Place>,
}

impl Segment {
    /// Both endpoint positions, if the segment has them.
    pub fn endpoints(&self) -> Option<(LatLng, LatLng)> {
        let origin = self.origin.as_ref()?;
        let destination = self.destination.as_ref()?;
        Some((origin.position(), destination.position()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stay {
    pub location: String,
    pub coordinates: [f64; 2],
    pub date_start: NaiveDate,
    pub date_end: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Stay {
    pub fn position(&self) -> LatLng {
        LatLng::from_array(self.coordinates)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripData {
    #[serde(default)]
    pub segments: Vec<Segment>,
    #[serde(default)]
    pub stays: Vec<Stay>,
}

impl TripData {
    pub fn segment(&self, id: &SegmentId) -> Option<&Segment> {
        self.segments.iter().find(|s| &s.id == id)
    }

    pub fn stay(&self, id: StayId) -> Option<&Stay> {
        self.stays.get(id.0)
    }

    pub fn stays_with_ids(&self) -> impl Iterator<Item = (StayId, &Stay)> {
        self.stays.iter().enumerate().map(|(i, s)| (StayId(i), s))
    }
}
