// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Radius-based venue admission check.
//!
//! Distances use the haversine formula on a sphere with the IUGG mean earth
//! radius. Against the WGS-84 ellipsoid the error stays below 0.5% of the
//! distance, i.e. under a meter at venue radii of a few hundred meters.

use serde::{Deserialize, Serialize};

use crate::types::{Coordinates, Location};

/// IUGG mean earth radius in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// Outcome of a geofence evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeofenceResult {
    pub inside: bool,
    /// Great-circle distance from the venue center. Infinite when either the
    /// coordinates or the location are invalid.
    pub distance_meters: f64,
}

impl GeofenceResult {
    fn rejected() -> Self {
        Self {
            inside: false,
            distance_meters: f64::INFINITY,
        }
    }
}

/// Great-circle distance in meters between two valid points.
pub fn haversine_meters(a: Coordinates, b: Coordinates) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let d_phi = (b.latitude - a.latitude).to_radians();
    let d_lambda = (b.longitude - a.longitude).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_METERS * h.sqrt().min(1.0).asin()
}

/// Evaluate whether `(latitude, longitude)` lies within the location's radius.
///
/// Pure and total: invalid input yields `inside = false` instead of an error.
/// The boundary is inclusive.
pub fn evaluate(latitude: f64, longitude: f64, location: &Location) -> GeofenceResult {
    let point = Coordinates::new(latitude, longitude);
    if !point.is_valid()
        || !location.center.is_valid()
        || !location.radius_meters.is_finite()
        || location.radius_meters < 0.0
    {
        return GeofenceResult::rejected();
    }

    let distance_meters = haversine_meters(point, location.center);
    GeofenceResult {
        inside: distance_meters <= location.radius_meters,
        distance_meters,
    }
}

/// Latitude offset in degrees that corresponds to `meters` due north.
///
/// Handy for placing test points and for operator tooling.
pub fn meters_to_latitude_degrees(meters: f64) -> f64 {
    (meters / EARTH_RADIUS_METERS).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn venue(radius_meters: f64) -> Location {
        Location {
            id: "bar".into(),
            name: "The Den".into(),
            center: Coordinates::new(34.0522, -118.2437),
            radius_meters,
        }
    }

    #[test]
    fn center_is_inside() {
        let loc = venue(100.0);
        let result = evaluate(loc.center.latitude, loc.center.longitude, &loc);
        assert!(result.inside);
        assert!(result.distance_meters.abs() < 1e-6);
    }

    #[test]
    fn distance_equal_to_radius_is_inside() {
        let probe = venue(100.0);
        let lat = probe.center.latitude + meters_to_latitude_degrees(100.0);
        let measured = evaluate(lat, probe.center.longitude, &probe).distance_meters;

        let loc = venue(measured);
        let result = evaluate(lat, loc.center.longitude, &loc);
        assert!(result.inside, "boundary must be inclusive");
    }

    #[test]
    fn one_meter_past_radius_is_outside() {
        let loc = venue(100.0);
        let lat = loc.center.latitude + meters_to_latitude_degrees(101.0);
        let result = evaluate(lat, loc.center.longitude, &loc);
        assert!(!result.inside);
        assert!((result.distance_meters - 101.0).abs() < 0.01);
    }

    #[test]
    fn invalid_coordinates_are_outside_not_errors() {
        let loc = venue(100.0);
        for (lat, lon) in [
            (f64::NAN, 0.0),
            (0.0, f64::INFINITY),
            (91.0, 0.0),
            (0.0, -181.0),
        ] {
            let result = evaluate(lat, lon, &loc);
            assert!(!result.inside);
            assert!(result.distance_meters.is_infinite());
        }
    }

    #[test]
    fn invalid_radius_is_outside() {
        let loc = venue(-5.0);
        assert!(!evaluate(loc.center.latitude, loc.center.longitude, &loc).inside);
    }

    #[test]
    fn known_distance_is_accurate() {
        // Los Angeles City Hall to Santa Monica Pier is roughly 23.9 km.
        let a = Coordinates::new(34.0537, -118.2428);
        let b = Coordinates::new(34.0094, -118.4973);
        let d = haversine_meters(a, b);
        assert!((d - 23_900.0).abs() < 500.0, "got {d}");
    }

    proptest! {
        #[test]
        fn inside_iff_within_radius(
            dlat in -0.01f64..0.01,
            dlon in -0.01f64..0.01,
            radius in 0.0f64..2_000.0,
        ) {
            let loc = venue(radius);
            let result = evaluate(loc.center.latitude + dlat, loc.center.longitude + dlon, &loc);
            prop_assert_eq!(result.inside, result.distance_meters <= radius);
        }

        #[test]
        fn distance_is_symmetric(
            lat1 in -80.0f64..80.0, lon1 in -179.0f64..179.0,
            lat2 in -80.0f64..80.0, lon2 in -179.0f64..179.0,
        ) {
            let a = Coordinates::new(lat1, lon1);
            let b = Coordinates::new(lat2, lon2);
            prop_assert!((haversine_meters(a, b) - haversine_meters(b, a)).abs() < 1e-6);
        }
    }
}
