use crate::latlng::LatLng;

/// Axis-aligned box in (lat, lng) degrees.
///
/// `east` may exceed 180 when the box was built across the antimeridian;
/// `east - west` is always in `[0, 360]`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl GeoBounds {
    pub fn new(south_west: LatLng, north_east: LatLng) -> Self {
        GeoBounds {
            south_west,
            north_east,
        }
    }

    /// Smallest box containing both points, taken literally (no wrap handling).
    pub fn from_corners(a: LatLng, b: LatLng) -> Self {
        GeoBounds {
            south_west: LatLng::new(a.lat.min(b.lat), a.lng.min(b.lng)),
            north_east: LatLng::new(a.lat.max(b.lat), a.lng.max(b.lng)),
        }
    }

    /// Box around two points that takes the short way across the antimeridian.
    ///
    /// When the longitudes are more than 180° apart, the smaller one is moved
    /// up by 360° before the box is formed.
    pub fn spanning(a: LatLng, b: LatLng) -> Self {
        let (mut a_lng, mut b_lng) = (a.lng, b.lng);
        if (a_lng - b_lng).abs() > 180.0 {
            if a_lng < b_lng {
                a_lng += 360.0;
            } else {
                b_lng += 360.0;
            }
        }
        Self::from_corners(LatLng::new(a.lat, a_lng), LatLng::new(b.lat, b_lng))
    }

    pub fn south(&self) -> f64 {
        self.south_west.lat
    }

    pub fn west(&self) -> f64 {
        self.south_west.lng
    }

    pub fn north(&self) -> f64 {
        self.north_east.lat
    }

    pub fn east(&self) -> f64 {
        self.north_east.lng
    }

    pub fn lat_span(&self) -> f64 {
        self.north() - self.south()
    }

    pub fn lng_span(&self) -> f64 {
        self.east() - self.west()
    }

    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south() + self.north()) * 0.5,
            (self.west() + self.east()) * 0.5,
        )
    }

    /// Grows every edge outward by `margin_deg`.
    pub fn inflated(&self, margin_deg: f64) -> Self {
        GeoBounds {
            south_west: LatLng::new(self.south() - margin_deg, self.west() - margin_deg),
            north_east: LatLng::new(self.north() + margin_deg, self.east() + margin_deg),
        }
    }

    /// Inclusive containment test, no longitude wrapping.
    pub fn contains(&self, p: LatLng) -> bool {
        p.lat >= self.south() && p.lat <= self.north() && p.lng >= self.west() && p.lng <= self.east()
    }
}

#[cfg(test)]
mod tests {
    use super::GeoBounds;
    use crate::latlng::LatLng;

    #[test]
    fn spanning_takes_short_way_across_antimeridian() {
        let b = GeoBounds::spanning(LatLng::new(35.0, 170.0), LatLng::new(40.0, -170.0));
        assert_eq!(b.west(), 170.0);
        assert_eq!(b.east(), 190.0);
        assert!(b.lng_span() > 0.0 && b.lng_span() <= 360.0);
        assert_eq!(b.south(), 35.0);
        assert_eq!(b.north(), 40.0);
    }

    #[test]
    fn spanning_without_crossing_is_plain_box() {
        let a = LatLng::new(35.5494, 139.7798);
        let b = LatLng::new(35.6329, 139.8836);
        assert_eq!(GeoBounds::spanning(a, b), GeoBounds::from_corners(b, a));
    }

    #[test]
    fn inflated_and_contains() {
        let p = LatLng::new(35.6762, 139.6503);
        let b = GeoBounds::from_corners(p, p).inflated(0.005);
        assert!((b.lat_span() - 0.01).abs() < 1e-12);
        assert!(b.contains(p));
        assert!(!b.contains(LatLng::new(35.7, 139.6503)));
    }
}
