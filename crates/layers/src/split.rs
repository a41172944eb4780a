//! Splitting sampled paths at the antimeridian.
//!
//! Input longitudes are expected in `[-180, 180]`. Any adjacent pair more
//! than 180° apart is taken to cross ±180 and is cut there, with a boundary
//! point closing one part and its mirror opening the next.

use foundation::LatLng;

pub fn crosses_antimeridian(a: LatLng, b: LatLng) -> bool {
    (b.lng - a.lng).abs() > 180.0
}

/// Splits `points` into parts that each stay inside one world copy.
///
/// A path without crossings comes back as a single part equal to the input.
/// Parts left with fewer than two points (two consecutive points sitting on
/// opposite signs of ±180) are dropped.
pub fn split_at_antimeridian(points: &[LatLng]) -> Vec<Vec<LatLng>> {
    if points.len() < 2 {
        if points.is_empty() {
            return Vec::new();
        }
        return vec![points.to_vec()];
    }

    let mut parts: Vec<Vec<LatLng>> = Vec::new();
    let mut current = vec![points[0]];

    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if crosses_antimeridian(a, b) {
            let edge = if a.lng > 0.0 { 180.0 } else { -180.0 };
            // Continue `b` past the edge so the interpolation runs one way.
            let b_lng = if a.lng > 0.0 { b.lng + 360.0 } else { b.lng - 360.0 };
            let span = b_lng - a.lng;
            let t = if span == 0.0 {
                0.0
            } else {
                ((edge - a.lng) / span).clamp(0.0, 1.0)
            };
            let lat = a.lat + (b.lat - a.lat) * t;

            push_distinct(&mut current, LatLng::new(lat, edge));
            let closed = std::mem::replace(&mut current, vec![LatLng::new(lat, -edge)]);
            parts.push(closed);
        }
        push_distinct(&mut current, b);
    }
    parts.push(current);

    parts.retain(|part| part.len() >= 2);
    parts
}

fn push_distinct(part: &mut Vec<LatLng>, p: LatLng) {
    if part.last() != Some(&p) {
        part.push(p);
    }
}

/// True when every point of the path is the same position.
pub fn is_degenerate(points: &[LatLng]) -> bool {
    match points.first() {
        Some(first) => points.iter().all(|p| p == first),
        None => true,
    }
}
