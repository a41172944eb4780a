use std::rc::Rc;

use foundation::LatLng;
use foundation::math::{normalize_lng, sample_great_circle};
use tracing::debug;
use trip::{ItemRef, Place, Segment, Stay, StayId, TransportClass};

use crate::layer::LayerKey;
use crate::primitive::{Marker, MarkerRole, Polyline, Popup, Primitive, WorldCopy};
use crate::split::{is_degenerate, split_at_antimeridian};
use crate::symbology::{MarkerIcon, marker_style, polyline_style};

pub const DEFAULT_GREAT_CIRCLE_SAMPLES: usize = 200;

/// Why an item could not be turned into primitives.
#[derive(Debug, Clone, PartialEq)]
pub enum InvalidInput {
    MissingEndpoint { item: ItemRef, role: MarkerRole },
    NonFinite { item: ItemRef, role: MarkerRole },
    LatitudeOutOfRange { item: ItemRef, role: MarkerRole, lat: f64 },
    /// Referenced item does not exist in the trip.
    UnknownItem { item: ItemRef },
    /// A later item reusing an id already seen in the same trip.
    DuplicateItem { item: ItemRef },
}

impl InvalidInput {
    pub fn item(&self) -> &ItemRef {
        match self {
            InvalidInput::MissingEndpoint { item, .. }
            | InvalidInput::NonFinite { item, .. }
            | InvalidInput::LatitudeOutOfRange { item, .. }
            | InvalidInput::UnknownItem { item }
            | InvalidInput::DuplicateItem { item } => item,
        }
    }
}

impl std::fmt::Display for InvalidInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidInput::MissingEndpoint { item, role } => {
                write!(f, "{item}: missing {role:?} endpoint")
            }
            InvalidInput::NonFinite { item, role } => {
                write!(f, "{item}: non-finite {role:?} coordinate")
            }
            InvalidInput::LatitudeOutOfRange { item, role, lat } => {
                write!(f, "{item}: {role:?} latitude {lat} outside [-90, 90]")
            }
            InvalidInput::UnknownItem { item } => write!(f, "{item}: not found in trip"),
            InvalidInput::DuplicateItem { item } => write!(f, "{item}: id used more than once"),
        }
    }
}

impl std::error::Error for InvalidInput {}

/// Turns segments and stays into primitives.
///
/// Output is deterministic: same item and `active` flag, same list. Active
/// items go to [`LayerKey::Active`]; everything else to its class group.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PrimitiveBuilder {
    great_circle_samples: usize,
}

impl Default for PrimitiveBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_GREAT_CIRCLE_SAMPLES)
    }
}

impl PrimitiveBuilder {
    pub fn new(great_circle_samples: usize) -> Self {
        Self {
            great_circle_samples: great_circle_samples.max(1),
        }
    }

    pub fn great_circle_samples(&self) -> usize {
        self.great_circle_samples
    }

    /// Route polylines followed by the origin and destination markers.
    pub fn build_segment(
        &self,
        segment: &Segment,
        active: bool,
    ) -> Result<Vec<Primitive>, InvalidInput> {
        let item = ItemRef::Segment(segment.id.clone());
        let origin = checked_place(&item, MarkerRole::Origin, segment.origin.as_ref())?;
        let destination =
            checked_place(&item, MarkerRole::Destination, segment.destination.as_ref())?;
        let from = wrapped(origin.position());
        let to = wrapped(destination.position());

        let layer = if active {
            LayerKey::Active
        } else {
            LayerKey::for_class(segment.class)
        };

        let path = match segment.class {
            TransportClass::Flight => sample_great_circle(from, to, self.great_circle_samples),
            _ => vec![from, to],
        };

        let mut out = Vec::new();
        let line_style = Rc::new(polyline_style(segment.class, active));
        let route = Rc::new(Popup::Route {
            transport: segment.transport.clone(),
            from: origin.label(),
            to: destination.label(),
        });
        for points in split_at_antimeridian(&path) {
            if is_degenerate(&points) {
                debug!(segment = %segment.id, "skipping zero-length route");
                continue;
            }
            out.push(Primitive::Polyline(Polyline {
                item: item.clone(),
                points,
                layer,
                copy: WorldCopy::Home,
                no_wrap: false,
                style: Rc::clone(&line_style),
                popup: Rc::clone(&route),
            }));
        }

        let pin_style = Rc::new(marker_style(MarkerIcon::Transport(segment.class), active));
        for (role, place, position) in [
            (MarkerRole::Origin, origin, from),
            (MarkerRole::Destination, destination, to),
        ] {
            out.push(Primitive::Marker(Marker {
                item: item.clone(),
                role,
                position,
                layer,
                copy: WorldCopy::Home,
                no_wrap: false,
                style: Rc::clone(&pin_style),
                popup: Rc::new(Popup::Place {
                    label: place.label(),
                }),
            }));
        }

        Ok(out)
    }

    /// A single stay marker.
    pub fn build_stay(
        &self,
        id: StayId,
        stay: &Stay,
        active: bool,
    ) -> Result<Vec<Primitive>, InvalidInput> {
        let item = ItemRef::Stay(id);
        let position = checked_position(&item, MarkerRole::Stay, stay.position())?;
        Ok(vec![Primitive::Marker(Marker {
            item,
            role: MarkerRole::Stay,
            position: wrapped(position),
            layer: if active {
                LayerKey::Active
            } else {
                LayerKey::Stays
            },
            copy: WorldCopy::Home,
            no_wrap: false,
            style: Rc::new(marker_style(MarkerIcon::Stay, active)),
            popup: Rc::new(Popup::Stay {
                location: stay.location.clone(),
                date_start: stay.date_start,
                date_end: stay.date_end,
                notes: stay.notes.clone(),
            }),
        })])
    }
}

fn checked_place<'a>(
    item: &ItemRef,
    role: MarkerRole,
    place: Option<&'a Place>,
) -> Result<&'a Place, InvalidInput> {
    let place = place.ok_or_else(|| InvalidInput::MissingEndpoint {
        item: item.clone(),
        role,
    })?;
    checked_position(item, role, place.position())?;
    Ok(place)
}

fn checked_position(item: &ItemRef, role: MarkerRole, p: LatLng) -> Result<LatLng, InvalidInput> {
    if !p.is_finite() {
        return Err(InvalidInput::NonFinite {
            item: item.clone(),
            role,
        });
    }
    if !p.is_valid() {
        return Err(InvalidInput::LatitudeOutOfRange {
            item: item.clone(),
            role,
            lat: p.lat,
        });
    }
    Ok(p)
}

fn wrapped(p: LatLng) -> LatLng {
    LatLng::new(p.lat, normalize_lng(p.lng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::split::crosses_antimeridian;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use trip::SegmentId;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, d).expect("valid date")
    }

    fn segment(id: &str, class: TransportClass, from: Place, to: Place) -> Segment {
        Segment {
            id: SegmentId::from(id),
            date: date(1),
            class,
            transport: "UA 881".into(),
            origin: Some(from),
            destination: Some(to),
        }
    }

    fn ord() -> Place {
        Place::new("Chicago O'Hare", Some("ORD"), 41.9786, -87.9048)
    }

    fn nrt() -> Place {
        Place::new("Narita", Some("NRT"), 35.7653, 140.3856)
    }

    #[test]
    fn flight_becomes_split_great_circle_plus_two_markers() {
        let seg = segment("1", TransportClass::Flight, ord(), nrt());
        let prims = PrimitiveBuilder::default()
            .build_segment(&seg, false)
            .expect("valid segment");

        let lines: Vec<_> = prims.iter().filter_map(Primitive::as_polyline).collect();
        let markers: Vec<_> = prims.iter().filter_map(Primitive::as_marker).collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].role, MarkerRole::Origin);
        assert_eq!(markers[1].role, MarkerRole::Destination);
        assert!(prims.iter().all(|p| p.layer() == LayerKey::Flights));

        // 201 samples plus one boundary point on each side of the cut.
        let total: usize = lines.iter().map(|l| l.points.len()).sum();
        assert_eq!(total, 203);
        for line in &lines {
            assert!(line.points.windows(2).all(|w| !crosses_antimeridian(w[0], w[1])));
            assert_eq!(line.style.dash, Some([10, 10]));
        }
        assert_eq!(
            *lines[0].popup,
            Popup::Route {
                transport: "UA 881".into(),
                from: "Chicago O'Hare (ORD)".into(),
                to: "Narita (NRT)".into(),
            }
        );
        assert_eq!(
            *markers[1].popup,
            Popup::Place {
                label: "Narita (NRT)".into()
            }
        );
    }

    #[test]
    fn ground_transport_is_a_straight_two_point_line() {
        let seg = segment(
            "2",
            TransportClass::Shuttle,
            Place::new("Haneda", Some("HND"), 35.5494, 139.7798),
            Place::new("Maihama", None, 35.6329, 139.8836),
        );
        let prims = PrimitiveBuilder::default()
            .build_segment(&seg, false)
            .expect("valid segment");
        assert_eq!(prims.len(), 3);
        let line = prims[0].as_polyline().expect("polyline first");
        assert_eq!(
            line.points,
            vec![LatLng::new(35.5494, 139.7798), LatLng::new(35.6329, 139.8836)]
        );
        assert_eq!(line.layer, LayerKey::Shuttles);
    }

    #[test]
    fn active_items_go_to_active_layer_with_heavier_style() {
        let seg = segment("3", TransportClass::Train, ord(), ord());
        let prims = PrimitiveBuilder::default()
            .build_segment(&seg, true)
            .expect("valid segment");
        assert!(prims.iter().all(|p| p.layer() == LayerKey::Active));
        for m in prims.iter().filter_map(Primitive::as_marker) {
            assert_eq!(m.style.border_px, 3);
        }
    }

    #[test]
    fn zero_length_route_keeps_markers_only() {
        let spot = Place::new("Park", None, 35.6762, 139.6503);
        let seg = segment("4", TransportClass::Walk, spot.clone(), spot);
        let prims = PrimitiveBuilder::default()
            .build_segment(&seg, false)
            .expect("valid segment");
        assert_eq!(prims.len(), 2);
        assert!(prims.iter().all(|p| p.as_marker().is_some()));
    }

    #[test]
    fn build_is_deterministic() {
        let seg = segment("1", TransportClass::Flight, ord(), nrt());
        let b = PrimitiveBuilder::default();
        assert_eq!(
            b.build_segment(&seg, false).expect("valid"),
            b.build_segment(&seg, false).expect("valid")
        );
    }

    #[test]
    fn invalid_endpoints_are_reported() {
        let mut seg = segment("5", TransportClass::Bus, ord(), nrt());
        seg.destination = None;
        assert_eq!(
            PrimitiveBuilder::default().build_segment(&seg, false),
            Err(InvalidInput::MissingEndpoint {
                item: ItemRef::segment("5"),
                role: MarkerRole::Destination,
            })
        );

        let seg = segment(
            "6",
            TransportClass::Bus,
            Place::new("Nowhere", None, f64::NAN, 0.0),
            nrt(),
        );
        assert!(matches!(
            PrimitiveBuilder::default().build_segment(&seg, false),
            Err(InvalidInput::NonFinite { .. })
        ));

        let seg = segment("7", TransportClass::Bus, ord(), Place::new("Up", None, 91.0, 0.0));
        assert!(matches!(
            PrimitiveBuilder::default().build_segment(&seg, false),
            Err(InvalidInput::LatitudeOutOfRange { lat, .. }) if lat == 91.0
        ));
    }

    #[test]
    fn stay_becomes_single_glyph_marker() {
        let stay = Stay {
            location: "Ryokan".into(),
            coordinates: [35.0116, 135.7681],
            date_start: date(2),
            date_end: date(4),
            notes: Some("Onsen".into()),
        };
        let prims = PrimitiveBuilder::default()
            .build_stay(StayId(0), &stay, false)
            .expect("valid stay");
        assert_eq!(prims.len(), 1);
        let m = prims[0].as_marker().expect("marker");
        assert_eq!(m.layer, LayerKey::Stays);
        assert_eq!(m.role, MarkerRole::Stay);
        assert_eq!(m.style.glyph, Some('H'));
        assert_eq!(
            *m.popup,
            Popup::Stay {
                location: "Ryokan".into(),
                date_start: date(2),
                date_end: date(4),
                notes: Some("Onsen".into()),
            }
        );
    }
}
