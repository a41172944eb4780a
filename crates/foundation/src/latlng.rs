/// Geographic position in degrees.
///
/// Latitude is expected in `[-90, 90]`. Longitude is left unconstrained so
/// world-copy shifts (±360°) can be represented without a separate type.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn from_array(pair: [f64; 2]) -> Self {
        Self::new(pair[0], pair[1])
    }

    pub fn is_finite(self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// Finite, with latitude inside `[-90, 90]`.
    pub fn is_valid(self) -> bool {
        self.is_finite() && (-90.0..=90.0).contains(&self.lat)
    }

    /// Same point with `delta_deg` added to the longitude.
    pub fn shifted(self, delta_deg: f64) -> Self {
        Self::new(self.lat, self.lng + delta_deg)
    }
}

#[cfg(test)]
mod tests {
    use super::LatLng;

    #[test]
    fn validity_checks_latitude_range_and_finiteness() {
        assert!(LatLng::new(90.0, 540.0).is_valid());
        assert!(!LatLng::new(90.5, 0.0).is_valid());
        assert!(!LatLng::new(f64::NAN, 0.0).is_valid());
        assert!(!LatLng::new(0.0, f64::INFINITY).is_valid());
    }

    #[test]
    fn shifted_only_moves_longitude() {
        let p = LatLng::new(35.0, 139.0).shifted(-360.0);
        assert_eq!(p, LatLng::new(35.0, -221.0));
    }
}
