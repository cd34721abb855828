//! Great-circle distance on the WGS84 sphere approximation.

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine great-circle distance between two lat/lon pairs, in kilometers.
///
/// Coordinates are decimal degrees. No input validation: out-of-range
/// values produce geometrically meaningless but finite results, which is
/// the caller's problem. Identical points yield exactly 0.0 (the haversine
/// term is exactly zero and `atan2(0, 1) == 0`).
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_points_are_zero() {
        assert_eq!(haversine_km(0.0, 0.0, 0.0, 0.0), 0.0);
        assert_eq!(haversine_km(-6.2, 106.8, -6.2, 106.8), 0.0);
        assert_eq!(haversine_km(89.9, -179.9, 89.9, -179.9), 0.0);
    }

    #[test]
    fn symmetric() {
        let pairs = [
            ((-6.2, 106.8), (-7.25, 112.75)),
            ((0.0, 0.0), (45.0, 90.0)),
            ((51.5, -0.1), (-33.9, 151.2)),
        ];
        for ((lat1, lon1), (lat2, lon2)) in pairs {
            let forward = haversine_km(lat1, lon1, lat2, lon2);
            let backward = haversine_km(lat2, lon2, lat1, lon1);
            assert!((forward - backward).abs() < 1e-9);
        }
    }

    #[test]
    fn jakarta_to_surabaya() {
        // Known reference distance, ~663 km.
        let d = haversine_km(-6.2, 106.8, -7.25, 112.75);
        assert!((d - 663.0).abs() < 5.0, "got {d}");
    }

    #[test]
    fn antipodal_is_half_circumference() {
        let d = haversine_km(0.0, 0.0, 0.0, 180.0);
        assert!((d - 20015.0).abs() < 5.0, "got {d}");
    }
}
