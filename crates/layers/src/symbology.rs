use serde::Serialize;
use trip::TransportClass;

pub const STAY_COLOR: &str = "#8800ff";
pub const STAY_GLYPH: char = 'H';

const BORDER_INACTIVE_PX: u32 = 2;
const BORDER_ACTIVE_PX: u32 = 3;
const WEIGHT_INACTIVE: f64 = 2.0;
const WEIGHT_ACTIVE: f64 = 4.0;
const OPACITY_INACTIVE: f64 = 0.7;
const OPACITY_ACTIVE: f64 = 0.8;

pub fn class_color(class: TransportClass) -> &'static str {
    match class {
        TransportClass::Flight => "#3388ff",
        TransportClass::Train => "#ff3333",
        TransportClass::Shuttle => "#33cc33",
        TransportClass::Walk => "#ff9900",
        TransportClass::Bus => "#9933cc",
    }
}

/// Dash pattern (dash, gap) in pixels; only flights are dashed.
pub fn class_dash(class: TransportClass) -> Option<[u32; 2]> {
    match class {
        TransportClass::Flight => Some([10, 10]),
        _ => None,
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerIcon {
    Transport(TransportClass),
    Stay,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerStyle {
    pub icon: MarkerIcon,
    pub color: &'static str,
    pub border_px: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glyph: Option<char>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolylineStyle {
    pub color: &'static str,
    pub weight: f64,
    pub opacity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash: Option<[u32; 2]>,
}

pub fn marker_style(icon: MarkerIcon, active: bool) -> MarkerStyle {
    let border_px = if active {
        BORDER_ACTIVE_PX
    } else {
        BORDER_INACTIVE_PX
    };
    match icon {
        MarkerIcon::Transport(class) => MarkerStyle {
            icon,
            color: class_color(class),
            border_px,
            glyph: None,
        },
        MarkerIcon::Stay => MarkerStyle {
            icon,
            color: STAY_COLOR,
            border_px,
            glyph: Some(STAY_GLYPH),
        },
    }
}

pub fn polyline_style(class: TransportClass, active: bool) -> PolylineStyle {
    PolylineStyle {
        color: class_color(class),
        weight: if active { WEIGHT_ACTIVE } else { WEIGHT_INACTIVE },
        opacity: if active {
            OPACITY_ACTIVE
        } else {
            OPACITY_INACTIVE
        },
        dash: class_dash(class),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flight_lines_are_dashed_blue() {
        let style = polyline_style(TransportClass::Flight, false);
        assert_eq!(style.color, "#3388ff");
        assert_eq!(style.dash, Some([10, 10]));
        assert_eq!(style.weight, 2.0);
        assert_eq!(style.opacity, 0.7);
    }

    #[test]
    fn active_lines_are_heavier() {
        let style = polyline_style(TransportClass::Train, true);
        assert_eq!(style.color, "#ff3333");
        assert_eq!(style.dash, None);
        assert_eq!(style.weight, 4.0);
        assert_eq!(style.opacity, 0.8);
    }

    #[test]
    fn stay_marker_carries_glyph() {
        let inactive = marker_style(MarkerIcon::Stay, false);
        let active = marker_style(MarkerIcon::Stay, true);
        assert_eq!(inactive.color, STAY_COLOR);
        assert_eq!(inactive.glyph, Some('H'));
        assert_eq!(inactive.border_px, 2);
        assert_eq!(active.border_px, 3);
    }

    #[test]
    fn transport_markers_use_class_color() {
        let m = marker_style(MarkerIcon::Transport(TransportClass::Bus), false);
        assert_eq!(m.color, "#9933cc");
        assert_eq!(m.glyph, None);
    }
}
