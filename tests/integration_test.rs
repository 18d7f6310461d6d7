// Copyright (c) 2024-2025 Ken Barker

// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"),
// to deal in the Software without restriction, including without limitation the
// rights to use, copy, modify, merge, publish, distribute, sublicense, and/or
// sell copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:

// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.

// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN
// THE SOFTWARE.

// extern crate we're testing, same as any other code would do.
extern crate ellipsoid_geodesy;

use angle_sc::{is_within_tolerance, Degrees};
use csv::ReaderBuilder;
use ellipsoid_geodesy::{
    Ellipsoid, Geodesic, Metres, PolygonArea, WGS84_ELLIPSOID, WGS84_GEODESIC,
};
use std::env;
use std::path::Path;

/// The difference between two angles in degrees, in [-180, 180).
fn angle_difference(a: f64, b: f64) -> f64 {
    let d = (a - b) % 360.0;
    if d < -180.0 {
        d + 360.0
    } else if d >= 180.0 {
        d - 360.0
    } else {
        d
    }
}

#[test]
#[ignore]
fn test_geodesic_examples() {
    // Read GEODTEST_DIR/GeodTest.dat file and run tests
    let filename = "GeodTest.dat";
    let dir_key = "GEODTEST_DIR";

    let p = env::var(dir_key).expect("Environment variable not found: GEODTEST_DIR");
    let path = Path::new(&p);
    let file_path = path.join(filename);
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(false)
        .delimiter(b' ')
        .from_path(file_path)
        .expect("Could not read file: GeodTest.dat");
    for (index, result) in csv_reader.records().enumerate() {
        let line_number = index + 1;
        let record = result.expect("Could not read record");
        let value = |i: usize| record[i].parse::<f64>().expect("Could not parse value");

        let lat1 = value(0);
        let lon1 = value(1);
        let azi1 = value(2);
        let lat2 = value(3);
        let lon2 = value(4);
        let azi2 = value(5);
        let s12 = value(6);
        let a12 = value(7);
        let m12 = value(8);
        let area = value(9);

        let result = WGS84_GEODESIC
            .inverse(Degrees(lat1), Degrees(lon1), Degrees(lat2), Degrees(lon2))
            .unwrap_or_else(|e| panic!("line: {line_number} inverse error: {e}"));
        let delta_length = (s12 - result.distance.0).abs();
        assert!(
            delta_length < 1e-6,
            "inverse length, line: {line_number} delta: {delta_length}"
        );

        let result = WGS84_GEODESIC
            .direct(Degrees(lat1), Degrees(lon1), Degrees(azi1), Metres(s12))
            .unwrap_or_else(|e| panic!("line: {line_number} direct error: {e}"));
        let delta_lat = (lat2 - result.lat2.0).abs();
        assert!(
            delta_lat < 1e-9,
            "direct latitude, line: {line_number} delta: {delta_lat}"
        );
        let delta_lon = angle_difference(lon2, result.lon2.0).abs();
        assert!(
            delta_lon < 1e-9 || lat2.abs() > 89.999,
            "direct longitude, line: {line_number} delta: {delta_lon}"
        );
        let delta_azimuth = angle_difference(azi2, result.azi2.0).abs();
        assert!(
            delta_azimuth < 1e-9 || lat2.abs() > 89.999,
            "direct azimuth, line: {line_number} delta: {delta_azimuth}"
        );
        let delta_arc = (a12 - result.arc_length.0).abs();
        assert!(
            delta_arc < 1e-10,
            "direct arc length, line: {line_number} delta: {delta_arc}"
        );
        let delta_m12 = (m12 - result.reduced_length.0).abs();
        assert!(
            delta_m12 < 1e-6,
            "direct reduced length, line: {line_number} delta: {delta_m12}"
        );
        let delta_area = (area - result.area).abs();
        assert!(
            delta_area < 1.0,
            "direct area, line: {line_number} delta: {delta_area}"
        );
    }
}

/// A grid of start latitudes, azimuths and distances.
fn direct_cases() -> Vec<(f64, f64, f64)> {
    let mut cases = Vec::new();
    for lat1 in [-80.0, -45.0, -10.0, 0.0, 30.0, 60.0, 85.0] {
        for azi1 in [-170.0, -90.0, -30.0, 0.0, 45.0, 120.0, 180.0] {
            for s12 in [1e3, 1e6, 5e6, 1.5e7] {
                cases.push((lat1, azi1, s12));
            }
        }
    }
    cases
}

#[test]
fn test_direct_inverse_round_trip() {
    for (lat1, azi1, s12) in direct_cases() {
        let direct = WGS84_GEODESIC
            .direct(Degrees(lat1), Degrees(25.0), Degrees(azi1), Metres(s12))
            .expect("valid direct");
        let inverse = WGS84_GEODESIC
            .inverse(direct.lat1, direct.lon1, direct.lat2, direct.lon2)
            .expect("valid inverse");

        assert!(
            is_within_tolerance(s12, inverse.distance.0, 1e-9 * s12),
            "distance: {lat1}, {azi1}, {s12}: {}",
            inverse.distance.0
        );
        let delta = angle_difference(azi1, inverse.azi1.0);
        assert!(delta.abs() < 1e-8, "azimuth: {lat1}, {azi1}, {s12}: {delta}");
        // the area of a meridian through a pole depends upon the side taken
        if azi1 % 180.0 != 0.0 {
            assert!(
                is_within_tolerance(direct.area, inverse.area, 1e-3 + 1e-12 * direct.area.abs()),
                "area: {lat1}, {azi1}, {s12}"
            );
        }
    }
}

#[test]
fn test_inverse_symmetry() {
    let positions = [
        (40.6, -73.8),
        (49.01666667, 2.55),
        (-33.9, 151.2),
        (1.35, 103.8),
        (-54.8, -68.3),
        (64.1, -21.9),
    ];
    for (i, &(lat1, lon1)) in positions.iter().enumerate() {
        for &(lat2, lon2) in positions.iter().skip(i + 1) {
            let forward = WGS84_GEODESIC
                .inverse(Degrees(lat1), Degrees(lon1), Degrees(lat2), Degrees(lon2))
                .expect("valid inverse");
            let backward = WGS84_GEODESIC
                .inverse(Degrees(lat2), Degrees(lon2), Degrees(lat1), Degrees(lon1))
                .expect("valid inverse");
            assert!(is_within_tolerance(
                forward.distance.0,
                backward.distance.0,
                1e-9 * forward.distance.0
            ));
            let delta = angle_difference(forward.azi2.0 + 180.0, backward.azi1.0);
            assert!(delta.abs() < 1e-9, "azimuths: {delta}");
            let delta = angle_difference(forward.azi1.0 + 180.0, backward.azi2.0);
            assert!(delta.abs() < 1e-9, "azimuths: {delta}");
        }
    }
}

#[test]
fn test_sphere_limit() {
    let radius = 6_371_000.0;
    let sphere = Ellipsoid::sphere(Metres(radius)).expect("valid sphere");
    let geodesic = Geodesic::new(&sphere);
    for (lat1, lon1, lat2, lon2) in [
        (10.0, 20.0, -30.0, 40.0),
        (51.5, 0.0, 40.7, -74.0),
        (-80.0, 170.0, 80.0, -170.0),
        (0.0, 0.0, 0.0, 179.0),
    ] {
        let result = geodesic
            .inverse(Degrees(lat1), Degrees(lon1), Degrees(lat2), Degrees(lon2))
            .expect("valid inverse");

        // haversine formula
        let (phi1, phi2) = (f64::to_radians(lat1), f64::to_radians(lat2));
        let dphi = phi2 - phi1;
        let dlambda = f64::to_radians(lon2 - lon1);
        let h = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
        let sigma = 2.0 * h.sqrt().asin();

        assert!(is_within_tolerance(radius * sigma, result.distance.0, 1e-6));
        assert!(is_within_tolerance(
            sigma.to_degrees(),
            result.arc_length.0,
            1e-11
        ));
        assert!(is_within_tolerance(
            radius * sigma.sin(),
            result.reduced_length.0,
            1e-6
        ));
        assert!(is_within_tolerance(sigma.cos(), result.geodesic_scale12, 1e-12));
    }
}

#[test]
fn test_polygon_closure() {
    // a small polygon traced by vertices and by edges has the same area
    let vertices = [(-1.0, -1.0), (-1.0, 1.0), (1.5, 1.0), (1.0, -0.5)];
    let mut by_points = PolygonArea::new(&*WGS84_GEODESIC, false);
    let mut by_edges = PolygonArea::new(&*WGS84_GEODESIC, false);
    by_edges
        .add_point(Degrees(vertices[0].0), Degrees(vertices[0].1))
        .expect("valid point");
    for (i, &(lat, lon)) in vertices.iter().enumerate() {
        by_points
            .add_point(Degrees(lat), Degrees(lon))
            .expect("valid point");
        if i > 0 {
            let (lat0, lon0) = vertices[i - 1];
            let edge = WGS84_GEODESIC
                .inverse(Degrees(lat0), Degrees(lon0), Degrees(lat), Degrees(lon))
                .expect("valid inverse");
            by_edges
                .add_edge(edge.azi1, edge.distance)
                .expect("valid edge");
        }
    }
    let points_result = by_points.compute(false, true).expect("valid polygon");
    let edges_result = by_edges.compute(false, true).expect("valid polygon");
    assert!(points_result.area > 0.0);
    assert!(is_within_tolerance(points_result.area, edges_result.area, 1e-2));
    assert!(is_within_tolerance(
        points_result.perimeter.0,
        edges_result.perimeter.0,
        1e-6
    ));

    // the same polygon straddling the antimeridian
    let mut shifted = PolygonArea::new(&*WGS84_GEODESIC, false);
    for &(lat, lon) in &vertices {
        shifted
            .add_point(Degrees(lat), Degrees(lon + 180.0))
            .expect("valid point");
    }
    let shifted_result = shifted.compute(false, true).expect("valid polygon");
    assert!(is_within_tolerance(points_result.area, shifted_result.area, 1e-2));

    // reversing the vertices negates the area
    let reversed_result = shifted.compute(true, true).expect("valid polygon");
    assert!(is_within_tolerance(-shifted_result.area, reversed_result.area, 1e-9));
}

#[test]
fn test_direct_from_pole() {
    let quarter_meridian = WGS84_ELLIPSOID.quarter_meridian();
    for lon1 in [-180.0, -90.0, 0.0, 45.0, 179.0] {
        for azi1 in [-135.0, -90.0, 0.0, 30.0, 90.0, 180.0] {
            let result = WGS84_GEODESIC
                .direct(Degrees(90.0), Degrees(lon1), Degrees(azi1), quarter_meridian)
                .expect("valid direct");
            assert!(result.lat2.0.abs() < 1e-9, "{lon1}, {azi1}: {}", result.lat2.0);
            assert!(result.lon2.0.is_finite());
            assert!(result.azi2.0.is_finite());
            // leaving the north pole, every geodesic heads south
            assert!(
                is_within_tolerance(180.0, result.azi2.0.abs(), 1e-9),
                "{lon1}, {azi1}: {}",
                result.azi2.0
            );
        }
    }
}
