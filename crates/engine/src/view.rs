use foundation::math::normalize_lng;
use foundation::{GeoBounds, LatLng};
use layers::{FitOptions, HostError, HostMap};
use serde::Serialize;
use trip::{Segment, Stay, TransportClass, ViewMode};

use crate::config::{EngineConfig, IntercontinentalRule, RegionPreset, ViewPreset};

/// Endpoints closer than this (degrees) are framed as a small box instead.
pub const COINCIDENT_EPS_DEG: f64 = 1e-3;
/// Half-size of the box used for coincident endpoints and stays.
pub const POINT_BOX_MARGIN_DEG: f64 = 0.005;
pub const DEFAULT_MAX_ZOOM: u8 = 14;
pub const WALK_MAX_ZOOM: u8 = 16;

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct FixedView {
    pub center: LatLng,
    pub zoom: u8,
}

impl From<ViewPreset> for FixedView {
    fn from(p: ViewPreset) -> Self {
        Self {
            center: p.center(),
            zoom: p.zoom,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct FitView {
    pub bounds: GeoBounds,
    pub padding_px: [f64; 2],
    pub max_zoom: u8,
}

/// Where the camera should end up after a render pass.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetView {
    Fixed(FixedView),
    Fit(FitView),
}

impl TargetView {
    pub fn apply<M: HostMap>(&self, host: &mut M) -> Result<(), HostError> {
        match *self {
            TargetView::Fixed(v) => host.set_view(v.center, v.zoom),
            TargetView::Fit(v) => host.fit_bounds(
                v.bounds,
                FitOptions {
                    padding_px: v.padding_px,
                    max_zoom: v.max_zoom,
                },
            ),
        }
    }

    pub fn as_fixed(&self) -> Option<&FixedView> {
        match self {
            TargetView::Fixed(v) => Some(v),
            TargetView::Fit(_) => None,
        }
    }

    pub fn as_fit(&self) -> Option<&FitView> {
        match self {
            TargetView::Fit(v) => Some(v),
            TargetView::Fixed(_) => None,
        }
    }
}

/// The focused item, already resolved against the trip.
#[derive(Debug, Copy, Clone)]
pub enum Focus<'a> {
    Segment(&'a Segment),
    Stay(&'a Stay),
}

/// Padding per side as a fraction of the viewport.
pub fn padding_fraction(class: Option<TransportClass>) -> f64 {
    match class {
        Some(TransportClass::Flight) => 0.15,
        Some(TransportClass::Train) => 0.20,
        Some(TransportClass::Shuttle | TransportClass::Walk) => 0.30,
        _ => 0.25,
    }
}

pub fn max_zoom_for(class: Option<TransportClass>) -> u8 {
    match class {
        Some(TransportClass::Walk) => WALK_MAX_ZOOM,
        _ => DEFAULT_MAX_ZOOM,
    }
}

/// Picks the target view for a mode and focus. Pure; touches no map.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSelector {
    region: RegionPreset,
    rule: IntercontinentalRule,
    world: ViewPreset,
    intercontinental: ViewPreset,
}

impl ViewSelector {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            region: config.region,
            rule: config.intercontinental.clone(),
            world: config.world_view,
            intercontinental: config.intercontinental_view,
        }
    }

    pub fn select(&self, mode: ViewMode, focus: Option<Focus<'_>>, viewport_px: [f64; 2]) -> TargetView {
        match mode {
            ViewMode::Region => TargetView::Fixed(FixedView {
                center: self.region.center(),
                zoom: self.region.zoom,
            }),
            ViewMode::World => match focus {
                Some(Focus::Segment(s)) if self.rule.matches(s) => {
                    TargetView::Fixed(self.intercontinental.into())
                }
                _ => TargetView::Fixed(self.world.into()),
            },
            ViewMode::Local => match focus {
                Some(Focus::Segment(s)) if self.rule.matches(s) => {
                    TargetView::Fixed(self.intercontinental.into())
                }
                Some(Focus::Segment(s)) => match s.endpoints() {
                    Some((a, b)) if a.is_valid() && b.is_valid() => {
                        frame(a, b, Some(s.class), viewport_px)
                    }
                    _ => TargetView::Fixed(self.world.into()),
                },
                Some(Focus::Stay(stay)) if stay.position().is_valid() => {
                    let p = stay.position();
                    frame(p, p, None, viewport_px)
                }
                _ => TargetView::Fixed(self.world.into()),
            },
        }
    }
}

fn frame(a: LatLng, b: LatLng, class: Option<TransportClass>, viewport_px: [f64; 2]) -> TargetView {
    let a = LatLng::new(a.lat, normalize_lng(a.lng));
    let b = LatLng::new(b.lat, normalize_lng(b.lng));
    let mut bounds = GeoBounds::spanning(a, b);
    if bounds.lat_span() < COINCIDENT_EPS_DEG && bounds.lng_span() < COINCIDENT_EPS_DEG {
        bounds = bounds.inflated(POINT_BOX_MARGIN_DEG);
    }
    let fraction = padding_fraction(class);
    TargetView::Fit(FitView {
        bounds,
        padding_px: [viewport_px[0] * fraction, viewport_px[1] * fraction],
        max_zoom: max_zoom_for(class),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use trip::{Place, SegmentId};

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    fn segment(class: TransportClass, from: Place, to: Place) -> Segment {
        Segment {
            id: SegmentId::from("s"),
            date: NaiveDate::from_ymd_opt(2024, 4, 2).expect("valid date"),
            class,
            transport: class.as_str().into(),
            origin: Some(from),
            destination: Some(to),
        }
    }

    fn hnd() -> Place {
        Place::new("Haneda", Some("HND"), 35.5494, 139.7798)
    }

    fn maihama() -> Place {
        Place::new("Maihama", None, 35.6329, 139.8804)
    }

    fn selector() -> ViewSelector {
        ViewSelector::new(&EngineConfig::default())
    }

    #[test]
    fn region_mode_uses_preset_regardless_of_focus() {
        let s = segment(TransportClass::Train, hnd(), maihama());
        let view = selector().select(ViewMode::Region, Some(Focus::Segment(&s)), [1000.0, 800.0]);
        assert_eq!(
            view,
            TargetView::Fixed(FixedView {
                center: LatLng::new(36.5, 138.5),
                zoom: 6
            })
        );
    }

    #[test]
    fn world_mode_without_focus_is_zoom_two() {
        let view = selector().select(ViewMode::World, None, [1000.0, 800.0]);
        assert_eq!(view.as_fixed().map(|v| v.zoom), Some(2));
    }

    #[test]
    fn intercontinental_focus_uses_fixed_view() {
        let ord = Place::new("O'Hare", Some("ORD"), 41.9786, -87.9048);
        let s = segment(TransportClass::Flight, ord, hnd());
        for mode in [ViewMode::World, ViewMode::Local] {
            let view = selector().select(mode, Some(Focus::Segment(&s)), [1000.0, 800.0]);
            assert_eq!(
                view,
                TargetView::Fixed(FixedView {
                    center: LatLng::new(30.0, 0.0),
                    zoom: 3
                })
            );
        }
    }

    #[test]
    fn shuttle_frames_endpoints_with_thirty_percent_padding() {
        let s = segment(TransportClass::Shuttle, hnd(), maihama());
        let view = selector().select(ViewMode::Local, Some(Focus::Segment(&s)), [1000.0, 800.0]);
        let fit = view.as_fit().expect("fit view");
        assert_close(fit.bounds.south(), 35.5494);
        assert_close(fit.bounds.north(), 35.6329);
        assert_close(fit.bounds.west(), 139.7798);
        assert_close(fit.bounds.east(), 139.8804);
        assert_close(fit.padding_px[0], 300.0);
        assert_close(fit.padding_px[1], 240.0);
        assert_eq!(fit.max_zoom, 14);
    }

    #[test]
    fn walk_allows_deeper_zoom_and_inflates_coincident_endpoints() {
        let a = Place::new("Gate", None, 35.0, 135.0);
        let b = Place::new("Shrine", None, 35.0002, 135.0003);
        let s = segment(TransportClass::Walk, a, b);
        let fit = *selector()
            .select(ViewMode::Local, Some(Focus::Segment(&s)), [1000.0, 800.0])
            .as_fit()
            .expect("fit view");
        assert_eq!(fit.max_zoom, 16);
        assert_close(fit.bounds.south(), 35.0 - POINT_BOX_MARGIN_DEG);
        assert_close(fit.bounds.east(), 135.0003 + POINT_BOX_MARGIN_DEG);
    }

    #[test]
    fn stay_focus_frames_small_box() {
        let stay = Stay {
            location: "Ryokan".into(),
            coordinates: [35.0116, 135.7681],
            date_start: NaiveDate::from_ymd_opt(2024, 4, 3).expect("valid date"),
            date_end: NaiveDate::from_ymd_opt(2024, 4, 5).expect("valid date"),
            notes: None,
        };
        let fit = *selector()
            .select(ViewMode::Local, Some(Focus::Stay(&stay)), [800.0, 600.0])
            .as_fit()
            .expect("fit view");
        assert_close(fit.bounds.lat_span(), 2.0 * POINT_BOX_MARGIN_DEG);
        assert_close(fit.padding_px[0], 200.0);
        assert_eq!(fit.max_zoom, 14);
    }

    #[test]
    fn local_without_focus_falls_back_to_world() {
        let view = selector().select(ViewMode::Local, None, [1000.0, 800.0]);
        assert_eq!(view.as_fixed().map(|v| v.zoom), Some(2));
    }

    #[test]
    fn padding_table() {
        assert_close(padding_fraction(Some(TransportClass::Flight)), 0.15);
        assert_close(padding_fraction(Some(TransportClass::Train)), 0.20);
        assert_close(padding_fraction(Some(TransportClass::Walk)), 0.30);
        assert_close(padding_fraction(Some(TransportClass::Bus)), 0.25);
        assert_close(padding_fraction(None), 0.25);
    }
}
