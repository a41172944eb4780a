//! World-wrap replication.
//!
//! The host shows several copies of the world side by side but only draws a
//! primitive in the copy its coordinates fall in. Every primitive is therefore
//! emitted three times, shifted by -360°, 0° and +360°, and flagged `no_wrap`
//! so the host keeps the shifted coordinates as given.

use std::rc::Rc;

use crate::primitive::{Marker, Polyline, Primitive, WorldCopy};

/// Copy of `primitive` (assumed to be in the home copy) moved into `copy`.
///
/// Coordinates are fresh; style and popup are shared with the source.
pub fn in_world_copy(primitive: &Primitive, copy: WorldCopy) -> Primitive {
    let delta = copy.offset_deg();
    match primitive {
        Primitive::Marker(m) => Primitive::Marker(Marker {
            item: m.item.clone(),
            role: m.role,
            position: m.position.shifted(delta),
            layer: m.layer,
            copy,
            no_wrap: true,
            style: Rc::clone(&m.style),
            popup: Rc::clone(&m.popup),
        }),
        Primitive::Polyline(p) => Primitive::Polyline(Polyline {
            item: p.item.clone(),
            points: p.points.iter().map(|pt| pt.shifted(delta)).collect(),
            layer: p.layer,
            copy,
            no_wrap: true,
            style: Rc::clone(&p.style),
            popup: Rc::clone(&p.popup),
        }),
    }
}

/// The west, home and east replicas of `primitive`, in that order.
pub fn replicate(primitive: &Primitive) -> [Primitive; 3] {
    WorldCopy::ALL.map(|copy| in_world_copy(primitive, copy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::LayerKey;
    use crate::primitive::{MarkerRole, Popup};
    use crate::symbology::{MarkerIcon, marker_style, polyline_style};
    use foundation::LatLng;
    use trip::{ItemRef, TransportClass};

    fn marker() -> Primitive {
        Primitive::Marker(Marker {
            item: ItemRef::segment("1"),
            role: MarkerRole::Origin,
            position: LatLng::new(41.9786, -87.9048),
            layer: LayerKey::Flights,
            copy: WorldCopy::Home,
            no_wrap: false,
            style: Rc::new(marker_style(MarkerIcon::Transport(TransportClass::Flight), false)),
            popup: Rc::new(Popup::Place {
                label: "O'Hare (ORD)".into(),
            }),
        })
    }

    fn polyline() -> Primitive {
        Primitive::Polyline(Polyline {
            item: ItemRef::segment("2"),
            points: vec![LatLng::new(35.0, 170.0), LatLng::new(36.0, 180.0)],
            layer: LayerKey::Trains,
            copy: WorldCopy::Home,
            no_wrap: false,
            style: Rc::new(polyline_style(TransportClass::Train, false)),
            popup: Rc::new(Popup::Route {
                transport: "Ferry train".into(),
                from: "A".into(),
                to: "B".into(),
            }),
        })
    }

    #[test]
    fn emits_three_shifted_non_wrapping_replicas() {
        let replicas = replicate(&marker());
        let lngs: Vec<f64> = replicas.iter().map(|r| r.positions()[0].lng).collect();
        assert_eq!(lngs, vec![-87.9048 - 360.0, -87.9048, -87.9048 + 360.0]);
        let copies: Vec<_> = replicas.iter().map(Primitive::copy).collect();
        assert_eq!(copies, WorldCopy::ALL.to_vec());
        assert!(replicas.iter().all(Primitive::no_wrap));
    }

    #[test]
    fn replica_ranges_cover_neighbouring_worlds() {
        let [west, home, east] = replicate(&polyline());
        assert!(west.positions().iter().all(|p| (-540.0..=-180.0).contains(&p.lng)));
        assert!(home.positions().iter().all(|p| (-180.0..=180.0).contains(&p.lng)));
        assert!(east.positions().iter().all(|p| (180.0..=540.0).contains(&p.lng)));
    }

    #[test]
    fn replicas_share_style_and_popup_but_not_coordinates() {
        let mut replicas = replicate(&polyline());
        let (Primitive::Polyline(a), Primitive::Polyline(b)) = (&replicas[0], &replicas[1]) else {
            panic!("expected polylines");
        };
        assert!(Rc::ptr_eq(&a.style, &b.style));
        assert!(Rc::ptr_eq(&a.popup, &b.popup));

        let before = replicas[1].clone();
        if let Primitive::Polyline(p) = &mut replicas[0] {
            p.points[0].lat = 0.0;
        }
        assert_eq!(replicas[1], before);
    }
}
