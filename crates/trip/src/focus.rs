use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::{SegmentId, StayId};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    World,
    Region,
    Local,
}

impl ViewMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ViewMode::World => "world",
            ViewMode::Region => "region",
            ViewMode::Local => "local",
        }
    }
}

impl std::fmt::Display for ViewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "world" => Ok(ViewMode::World),
            "region" => Ok(ViewMode::Region),
            "local" => Ok(ViewMode::Local),
            other => Err(format!("unknown view mode: {other}")),
        }
    }
}

/// Reference to a single segment or stay, e.g. the focused item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum ItemRef {
    Segment(SegmentId),
    Stay(StayId),
}

impl ItemRef {
    pub fn segment(id: impl Into<SegmentId>) -> Self {
        ItemRef::Segment(id.into())
    }
}

impl std::fmt::Display for ItemRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemRef::Segment(id) => write!(f, "segment:{id}"),
            ItemRef::Stay(id) => write!(f, "stay:{}", id.0),
        }
    }
}

/// Parses `segment:<id>` or `stay:<index>`. A bare value is a segment id.
impl FromStr for ItemRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(rest) = s.strip_prefix("stay:") {
            let index = rest
                .parse::<usize>()
                .map_err(|e| format!("invalid stay index {rest:?}: {e}"))?;
            return Ok(ItemRef::Stay(StayId(index)));
        }
        let id = s.strip_prefix("segment:").unwrap_or(s);
        if id.is_empty() {
            return Err("empty segment id".to_string());
        }
        Ok(ItemRef::Segment(SegmentId::from(id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_mode_parses_case_insensitively() {
        assert_eq!("Region".parse::<ViewMode>(), Ok(ViewMode::Region));
        assert!("orbit".parse::<ViewMode>().is_err());
    }

    #[test]
    fn focused_item_parses_prefixed_forms() {
        assert_eq!(
            "segment:7".parse::<ItemRef>(),
            Ok(ItemRef::segment("7"))
        );
        assert_eq!("7".parse::<ItemRef>(), Ok(ItemRef::segment("7")));
        assert_eq!(
            "stay:2".parse::<ItemRef>(),
            Ok(ItemRef::Stay(StayId(2)))
        );
        assert!("stay:x".parse::<ItemRef>().is_err());
        assert!("segment:".parse::<ItemRef>().is_err());
    }

    #[test]
    fn focused_item_display_round_trips() {
        let f = ItemRef::Stay(StayId(3));
        assert_eq!(f.to_string().parse::<ItemRef>(), Ok(f));
    }
}
