use serde::Serialize;
use trip::TransportClass;

/// Named layer groups, declared in draw order (later draws on top).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKey {
    Flights,
    Trains,
    Shuttles,
    Walks,
    Buses,
    Stays,
    Active,
}

impl LayerKey {
    pub const ALL: [LayerKey; 7] = [
        LayerKey::Flights,
        LayerKey::Trains,
        LayerKey::Shuttles,
        LayerKey::Walks,
        LayerKey::Buses,
        LayerKey::Stays,
        LayerKey::Active,
    ];

    pub fn for_class(class: TransportClass) -> Self {
        match class {
            TransportClass::Flight => LayerKey::Flights,
            TransportClass::Train => LayerKey::Trains,
            TransportClass::Shuttle => LayerKey::Shuttles,
            TransportClass::Walk => LayerKey::Walks,
            TransportClass::Bus => LayerKey::Buses,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            LayerKey::Flights => "flights",
            LayerKey::Trains => "trains",
            LayerKey::Shuttles => "shuttles",
            LayerKey::Walks => "walks",
            LayerKey::Buses => "buses",
            LayerKey::Stays => "stays",
            LayerKey::Active => "active",
        }
    }
}

impl std::fmt::Display for LayerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
