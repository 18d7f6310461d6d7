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
use ellipsoid_geodesy::{Metres, WGS84_GEODESIC, WGS84_RHUMB};
use serde_json::Value;
use std::fs;

const FILENAME: &str = "tests/data/reference_cases.json";

fn read_cases() -> Value {
    let text = fs::read_to_string(FILENAME).expect("Could not read file: reference_cases.json");
    serde_json::from_str(&text).expect("Invalid JSON: reference_cases.json")
}

fn cases<'a>(root: &'a Value, key: &str) -> &'a Vec<Value> {
    root[key]
        .as_array()
        .unwrap_or_else(|| panic!("missing array: {key}"))
}

fn field(case: &Value, key: &str) -> f64 {
    case[key]
        .as_f64()
        .unwrap_or_else(|| panic!("{}: missing field: {key}", case["name"]))
}

fn optional(case: &Value, key: &str) -> Option<f64> {
    case[key].as_f64()
}

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
fn test_geodesic_inverse_reference_cases() {
    let root = read_cases();
    for case in cases(&root, "geodesic_inverse") {
        let name = &case["name"];
        let result = WGS84_GEODESIC
            .inverse(
                Degrees(field(case, "lat1")),
                Degrees(field(case, "lon1")),
                Degrees(field(case, "lat2")),
                Degrees(field(case, "lon2")),
            )
            .expect("valid inverse");

        let azimuth_tolerance = field(case, "azimuth_tolerance");
        let delta = angle_difference(field(case, "azi1"), result.azi1.0);
        assert!(delta.abs() <= azimuth_tolerance, "{name}: azi1 delta: {delta}");
        if let Some(azi2) = optional(case, "azi2") {
            let delta = angle_difference(azi2, result.azi2.0);
            assert!(delta.abs() <= azimuth_tolerance, "{name}: azi2 delta: {delta}");
        }

        let distance = field(case, "distance");
        assert!(
            is_within_tolerance(distance, result.distance.0, field(case, "distance_tolerance")),
            "{name}: distance: {}",
            result.distance.0
        );
        if let Some(arc_length) = optional(case, "arc_length") {
            assert!(
                is_within_tolerance(arc_length, result.arc_length.0, 1e-10),
                "{name}: arc_length: {}",
                result.arc_length.0
            );
        }
        if let Some(area) = optional(case, "area") {
            assert!(
                is_within_tolerance(area, result.area, 1.0),
                "{name}: area: {}",
                result.area
            );
        }
    }
}

#[test]
fn test_geodesic_direct_reference_cases() {
    let root = read_cases();
    for case in cases(&root, "geodesic_direct") {
        let name = &case["name"];
        let result = WGS84_GEODESIC
            .direct(
                Degrees(field(case, "lat1")),
                Degrees(field(case, "lon1")),
                Degrees(field(case, "azi1")),
                Metres(field(case, "distance")),
            )
            .expect("valid direct");

        let tolerance = field(case, "tolerance");
        assert!(
            is_within_tolerance(field(case, "lat2"), result.lat2.0, tolerance),
            "{name}: lat2: {}",
            result.lat2.0
        );
        let delta = angle_difference(field(case, "lon2"), result.lon2.0);
        assert!(delta.abs() <= tolerance, "{name}: lon2 delta: {delta}");
        let delta = angle_difference(field(case, "azi2"), result.azi2.0);
        assert!(delta.abs() <= tolerance, "{name}: azi2 delta: {delta}");
    }
}

#[test]
fn test_rhumb_reference_cases() {
    let root = read_cases();
    for case in cases(&root, "rhumb_inverse") {
        let name = &case["name"];
        let result = WGS84_RHUMB
            .inverse(
                Degrees(field(case, "lat1")),
                Degrees(field(case, "lon1")),
                Degrees(field(case, "lat2")),
                Degrees(field(case, "lon2")),
            )
            .expect("valid inverse");
        let delta = angle_difference(field(case, "azimuth"), result.azimuth.0);
        assert!(
            delta.abs() <= field(case, "azimuth_tolerance"),
            "{name}: azimuth delta: {delta}"
        );
        assert!(
            is_within_tolerance(
                field(case, "distance"),
                result.distance.0,
                field(case, "distance_tolerance")
            ),
            "{name}: distance: {}",
            result.distance.0
        );
    }

    for case in cases(&root, "rhumb_direct") {
        let name = &case["name"];
        let result = WGS84_RHUMB
            .direct(
                Degrees(field(case, "lat1")),
                Degrees(field(case, "lon1")),
                Degrees(field(case, "azimuth")),
                Metres(field(case, "distance")),
            )
            .expect("valid direct");
        let tolerance = field(case, "tolerance");
        assert!(
            is_within_tolerance(field(case, "lat2"), result.lat2.0, tolerance),
            "{name}: lat2: {}",
            result.lat2.0
        );
        let delta = angle_difference(field(case, "lon2"), result.lon2.0);
        assert!(delta.abs() <= tolerance, "{name}: lon2 delta: {delta}");
    }
}
