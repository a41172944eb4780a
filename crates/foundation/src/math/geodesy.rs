//! Spherical geometry on (lat, lng) degree pairs.
//!
//! Everything here is pure. Distances are angular (radians on the unit
//! sphere) unless the function name says otherwise.

use super::Vec3;
use crate::latlng::LatLng;

/// Mean Earth radius (kilometres).
pub const EARTH_RADIUS_KM: f64 = 6_371.0;

/// Below this `sin(d)` the endpoints are treated as antipodal and slerp is
/// replaced by linear interpolation in degree space.
const ANTIPODAL_SIN_EPS: f64 = 1e-12;

pub fn to_radians(deg: f64) -> f64 {
    deg * std::f64::consts::PI / 180.0
}

pub fn to_degrees(rad: f64) -> f64 {
    rad * 180.0 / std::f64::consts::PI
}

/// Wraps a longitude into `[-180, 180]`.
///
/// Values already in range, including exactly ±180, are returned unchanged.
pub fn normalize_lng(lng: f64) -> f64 {
    if (-180.0..=180.0).contains(&lng) {
        return lng;
    }
    (lng + 180.0).rem_euclid(360.0) - 180.0
}

/// Haversine angular distance in radians. Exactly `0.0` for equal points.
pub fn great_circle_distance(a: LatLng, b: LatLng) -> f64 {
    if a == b {
        return 0.0;
    }
    let phi1 = to_radians(a.lat);
    let phi2 = to_radians(b.lat);
    let d_phi = phi2 - phi1;
    let d_lambda = to_radians(b.lng - a.lng);

    let s_phi = (d_phi * 0.5).sin();
    let s_lambda = (d_lambda * 0.5).sin();
    let h = s_phi * s_phi + phi1.cos() * phi2.cos() * s_lambda * s_lambda;
    2.0 * h.clamp(0.0, 1.0).sqrt().asin()
}

pub fn great_circle_distance_km(a: LatLng, b: LatLng) -> f64 {
    great_circle_distance(a, b) * EARTH_RADIUS_KM
}

pub fn to_unit_vector(p: LatLng) -> Vec3 {
    let phi = to_radians(p.lat);
    let lambda = to_radians(p.lng);
    Vec3::new(phi.cos() * lambda.cos(), phi.cos() * lambda.sin(), phi.sin())
}

/// Inverse of [`to_unit_vector`]. The input does not need to be normalized.
pub fn from_unit_vector(v: Vec3) -> LatLng {
    let lat = v.z.atan2((v.x * v.x + v.y * v.y).sqrt());
    let lng = v.y.atan2(v.x);
    LatLng::new(to_degrees(lat), to_degrees(lng))
}

/// Moves the smaller longitude up by 360° when the pair is more than 180° apart.
fn unwrap_pair(a: LatLng, b: LatLng) -> (LatLng, LatLng) {
    if (a.lng - b.lng).abs() <= 180.0 {
        return (a, b);
    }
    if a.lng < b.lng {
        (a.shifted(360.0), b)
    } else {
        (a, b.shifted(360.0))
    }
}

/// Samples the great circle from `a` to `b` at `n` equal angular steps.
///
/// Returns `n + 1` points including both endpoints, every longitude wrapped
/// into `[-180, 180]`. Consecutive outputs may therefore jump across the
/// antimeridian; see the path splitter in the `layers` crate.
pub fn sample_great_circle(a: LatLng, b: LatLng, n: usize) -> Vec<LatLng> {
    let wrap = |p: LatLng| LatLng::new(p.lat, normalize_lng(p.lng));
    if n == 0 {
        return vec![wrap(a)];
    }

    let (a, b) = unwrap_pair(a, b);
    let d = great_circle_distance(a, b);
    if d == 0.0 {
        return vec![wrap(a); n + 1];
    }

    let sin_d = d.sin();
    let va = to_unit_vector(a);
    let vb = to_unit_vector(b);

    let mut out = Vec::with_capacity(n + 1);
    for i in 0..=n {
        let f = i as f64 / n as f64;
        let p = if i == 0 {
            a
        } else if i == n {
            b
        } else if sin_d.abs() < ANTIPODAL_SIN_EPS {
            LatLng::new(a.lat + (b.lat - a.lat) * f, a.lng + (b.lng - a.lng) * f)
        } else {
            let wa = ((1.0 - f) * d).sin() / sin_d;
            let wb = (f * d).sin() / sin_d;
            from_unit_vector(va * wa + vb * wb)
        };
        out.push(wrap(p));
    }
    out
}
