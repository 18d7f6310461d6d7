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

//! ellipsoid-geodesy
//!
//! A library for solving the geodesic and rhumb line problems on an
//! ellipsoid of revolution, such as the
//! [WGS-84](https://www.icao.int/NACC/Documents/Meetings/2014/ECARAIM/REF08-Doc9674.pdf)
//! ellipsoid.
//!
//! ## Geodesics
//!
//! The shortest path between two points on the surface of an ellipsoid is a
//! [geodesic](https://en.wikipedia.org/wiki/Geodesics_on_an_ellipsoid).
//!
//! - The *direct* problem: given a start position, an azimuth and a
//!   distance, find the end position and azimuth, see `Geodesic::direct`.
//! - The *inverse* problem: given two positions, find the distance between
//!   them and the azimuths at each end, see `Geodesic::inverse`.
//!
//! Both problems also return the arc length on the auxiliary sphere, the
//! reduced length, the geodesic scales and the area between the geodesic
//! and the equator.
//!
//! A `GeodesicLine` evaluates many positions along one geodesic without
//! recalculating the series coefficients of the line.
//!
//! ## Rhumb lines
//!
//! A [rhumb line](https://en.wikipedia.org/wiki/Rhumb_line) is a path of
//! constant azimuth, a straight line on a Mercator projection.
//! `Rhumb` solves the direct and inverse rhumb line problems, using either
//! elliptic integrals (`LatitudeConverter::Exact`) or series in the third
//! flattening (`LatitudeConverter::SeriesApproximation`) to convert between
//! the rectifying and isometric latitudes.
//!
//! ## Polygon areas
//!
//! `PolygonArea` calculates the perimeter and area of polygons whose edges
//! are geodesics or rhumb lines, counting the crossings of the
//! antimeridian so that polygons which encircle a pole have the correct area.
//!
//! ## Design
//!
//! The library is based on Charles Karney's [GeographicLib](https://geographiclib.sourceforge.io/) library,
//! see CFF Karney, [Algorithms for geodesics](https://arxiv.org/pdf/1109.4448.pdf)
//! and [The area of rhumb polygons](https://arxiv.org/abs/2303.03219).
//!
//! The `Ellipsoid` struct represents an ellipsoid of revolution.
//! The statics `WGS84_ELLIPSOID`, `WGS84_GEODESIC` and `WGS84_RHUMB` are
//! the WGS-84 `Ellipsoid` and its solvers.
//!
//! All angles are in degrees; longitudes and azimuths are returned in the
//! range [-180, 180). Invalid inputs are reported by `Error`, NaN inputs
//! produce NaN outputs.
//!
//! The library depends upon the following crates:
//!
//! - [angle-sc](https://crates.io/crates/angle-sc) - to define `Degrees`;
//! - [unit-sphere](https://crates.io/crates/unit-sphere) - to define `LatLong`;
//! - [icao_units](https://crates.io/crates/icao-units) - to define `Metres`;
//! - [thiserror](https://crates.io/crates/thiserror) - to define `Error`;
//! - [tracing](https://crates.io/crates/tracing) - to log diagnostics.

pub mod elliptic;
pub mod ellipsoid;
pub mod error;
pub mod geodesic;
pub mod geodesic_line;
pub mod math;
pub mod polygon;
pub mod rhumb;
pub mod series;

pub use angle_sc::{Degrees, Validate};
pub use error::{Error, Result};
pub use geodesic::{Geodesic, GeodesicResult};
pub use geodesic_line::GeodesicLine;
pub use icao_units::si::Metres;
pub use polygon::{Edge, EdgeSolver, PolygonArea, PolygonResult};
pub use rhumb::{LatitudeConverter, Rhumb, RhumbLine, RhumbResult};
pub use unit_sphere::LatLong;

use elliptic::EllipticFunction;
use lazy_static::lazy_static;

/// The parameters of an `Ellipsoid`.
#[derive(Clone, Debug, PartialEq)]
pub struct Ellipsoid {
    /// The Semimajor axis of the ellipsoid.
    a: Metres,
    /// The flattening of the ellipsoid, a ratio.
    f: f64,

    /// The Semiminor axis of the ellipsoid.
    b: Metres,
    /// One minus the flattening ratio.
    one_minus_f: f64,
    /// The square of the Eccentricity of the ellipsoid.
    e_2: f64,
    /// The square of the second Eccentricity of the ellipsoid.
    ep_2: f64,
    /// The third flattening of the ellipsoid.
    n: f64,
    /// The signed Eccentricity of the ellipsoid.
    es: f64,
    /// The square of the authalic radius.
    c_2: f64,

    /// The elliptic integral of the meridian, with k² = -ep_2.
    elliptic: EllipticFunction,
    /// The series coefficients from conformal to rectifying latitude.
    alpha: [f64; 7],
    /// The series coefficients from rectifying to conformal latitude.
    beta: [f64; 7],
}

impl Ellipsoid {
    /// Constructor.
    /// * `a` - the Semimajor axis of the `Ellipsoid`, positive.
    /// * `f` - the flattening of the `Ellipsoid`, a ratio less than one.
    ///   Negative values give a prolate ellipsoid.
    ///
    /// # Errors
    ///
    /// `Error::InvalidParameter` if `a` is not finite and positive, or `f` is
    /// not finite or not less than one.
    ///
    /// # Examples
    /// ```
    /// use ellipsoid_geodesy::{Ellipsoid, Error, Metres};
    ///
    /// let ellipsoid = Ellipsoid::new(Metres(6.4e6), -1.0 / 150.0);
    /// assert!(ellipsoid.is_ok());
    ///
    /// let ellipsoid = Ellipsoid::new(Metres(6.4e6), 1.0);
    /// assert!(matches!(ellipsoid, Err(Error::InvalidParameter(_))));
    /// ```
    pub fn new(a: Metres, f: f64) -> Result<Self> {
        if !(a.0.is_finite() && a.0 > 0.0) {
            tracing::debug!(a = a.0, "invalid Semimajor axis");
            return Err(Error::InvalidParameter(format!(
                "a: {} is not finite and positive",
                a.0
            )));
        }
        if !(f.is_finite() && f < 1.0) {
            tracing::debug!(f, "invalid flattening");
            return Err(Error::InvalidParameter(format!(
                "f: {f} is not finite and less than 1"
            )));
        }
        Ok(Self::from_valid_parameters(a, f))
    }

    /// Construct an `Ellipsoid` from parameters known to be valid.
    fn from_valid_parameters(a: Metres, f: f64) -> Self {
        let n = ellipsoid::calculate_3rd_flattening(f);
        let ep_2 = ellipsoid::calculate_sq_2nd_eccentricity(f);
        Self {
            a,
            f,
            b: ellipsoid::calculate_minor_axis(a, f),
            one_minus_f: 1.0 - f,
            e_2: ellipsoid::calculate_sq_eccentricity(f),
            ep_2,
            n,
            es: ellipsoid::calculate_signed_eccentricity(f),
            c_2: ellipsoid::calculate_sq_authalic_radius(a, f),
            elliptic: EllipticFunction::new(-ep_2),
            alpha: ellipsoid::coefficients::evaluate_coeffs_conformal_to_rectifying(n),
            beta: ellipsoid::coefficients::evaluate_coeffs_rectifying_to_conformal(n),
        }
    }

    /// Construct an `Ellipsoid` with the WGS-84 parameters.
    #[must_use]
    pub fn wgs84() -> Self {
        Self::from_valid_parameters(ellipsoid::wgs84::A, ellipsoid::wgs84::F)
    }

    /// Construct a sphere.
    /// * `radius` - the radius of the sphere.
    ///
    /// # Errors
    ///
    /// `Error::InvalidParameter` if `radius` is not finite and positive.
    pub fn sphere(radius: Metres) -> Result<Self> {
        Self::new(radius, 0.0)
    }

    /// The Semimajor axis of the ellipsoid.
    #[must_use]
    pub const fn a(&self) -> Metres {
        self.a
    }

    /// The flattening of the ellipsoid, a ratio.
    #[must_use]
    pub const fn f(&self) -> f64 {
        self.f
    }

    /// The Semiminor axis of the ellipsoid.
    #[must_use]
    pub const fn b(&self) -> Metres {
        self.b
    }

    /// One minus the flattening ratio.
    #[must_use]
    pub const fn one_minus_f(&self) -> f64 {
        self.one_minus_f
    }

    /// The square of the Eccentricity of the ellipsoid.
    #[must_use]
    pub const fn e_2(&self) -> f64 {
        self.e_2
    }

    /// The square of the second Eccentricity of the ellipsoid.
    #[must_use]
    pub const fn ep_2(&self) -> f64 {
        self.ep_2
    }

    /// The third flattening of the ellipsoid.
    #[must_use]
    pub const fn n(&self) -> f64 {
        self.n
    }

    /// The signed Eccentricity: negative for a prolate ellipsoid.
    #[must_use]
    pub const fn es(&self) -> f64 {
        self.es
    }

    /// The square of the authalic radius, in square metres.
    #[must_use]
    pub const fn c_2(&self) -> f64 {
        self.c_2
    }

    /// The surface area of the ellipsoid, in square metres.
    /// # Examples
    /// ```
    /// use ellipsoid_geodesy::Ellipsoid;
    ///
    /// let area = Ellipsoid::wgs84().area();
    /// assert!((510_065_621_724_088.5 - area).abs() < 1.0);
    /// ```
    #[must_use]
    pub fn area(&self) -> f64 {
        4.0 * core::f64::consts::PI * self.c_2
    }

    /// The elliptic integral of the meridian.
    #[must_use]
    pub const fn elliptic(&self) -> &EllipticFunction {
        &self.elliptic
    }

    /// The series coefficients from conformal to rectifying latitude.
    #[must_use]
    pub const fn conformal_to_rectifying_coeffs(&self) -> &[f64; 7] {
        &self.alpha
    }

    /// The series coefficients from rectifying to conformal latitude.
    #[must_use]
    pub const fn rectifying_to_conformal_coeffs(&self) -> &[f64; 7] {
        &self.beta
    }
}

lazy_static! {
    /// A static instance of the WGS-84 `Ellipsoid`.
    pub static ref WGS84_ELLIPSOID: Ellipsoid = Ellipsoid::wgs84();

    /// A static instance of the geodesic solver on the WGS-84 `Ellipsoid`.
    pub static ref WGS84_GEODESIC: Geodesic<'static> = Geodesic::new(&WGS84_ELLIPSOID);

    /// A static instance of the rhumb line solver on the WGS-84 `Ellipsoid`,
    /// using the series latitude conversions.
    pub static ref WGS84_RHUMB: Rhumb<'static> =
        Rhumb::new(&WGS84_ELLIPSOID, LatitudeConverter::SeriesApproximation);
}

#[cfg(test)]
mod tests {
    use super::*;
    use angle_sc::is_within_tolerance;

    #[test]
    fn test_ellipsoid_wgs84() {
        let ellipsoid = Ellipsoid::wgs84();
        assert_eq!(ellipsoid::wgs84::A, ellipsoid.a());
        assert_eq!(ellipsoid::wgs84::F, ellipsoid.f());
        assert_eq!(Metres(6_356_752.314_245_179), ellipsoid.b());
        assert_eq!(1.0 - ellipsoid::wgs84::F, ellipsoid.one_minus_f());
        assert_eq!(0.006_694_379_990_141_316_5, ellipsoid.e_2());
        assert_eq!(0.006_739_496_742_276_434, ellipsoid.ep_2());
        assert_eq!(0.001_679_220_386_383_704_7, ellipsoid.n());
        assert!(is_within_tolerance(
            0.081_819_190_842_622,
            ellipsoid.es(),
            1e-15
        ));
        assert_eq!(-ellipsoid.ep_2(), ellipsoid.elliptic().k2());

        assert!(is_within_tolerance(
            510_065_621_724_088.5,
            ellipsoid.area(),
            1.0
        ));
        assert_eq!(ellipsoid, *WGS84_ELLIPSOID);
    }

    #[test]
    fn test_ellipsoid_new_invalid() {
        assert!(matches!(
            Ellipsoid::new(Metres(0.0), 0.0),
            Err(Error::InvalidParameter(_))
        ));
        assert!(Ellipsoid::new(Metres(-1.0), 0.0).is_err());
        assert!(Ellipsoid::new(Metres(f64::NAN), 0.0).is_err());
        assert!(Ellipsoid::new(Metres(f64::INFINITY), 0.0).is_err());
        assert!(Ellipsoid::new(Metres(6.4e6), 1.0).is_err());
        assert!(Ellipsoid::new(Metres(6.4e6), f64::NAN).is_err());
        assert!(Ellipsoid::new(Metres(6.4e6), f64::NEG_INFINITY).is_err());
        assert!(Ellipsoid::sphere(Metres(-6.4e6)).is_err());
    }

    #[test]
    fn test_ellipsoid_sphere_and_prolate() {
        let sphere = Ellipsoid::sphere(Metres(6.4e6)).expect("valid sphere");
        assert_eq!(0.0, sphere.e_2());
        assert_eq!(0.0, sphere.n());
        assert_eq!(0.0, sphere.es());
        assert_eq!(sphere.a(), sphere.b());
        assert!(is_within_tolerance(
            4.0 * core::f64::consts::PI * 6.4e6 * 6.4e6,
            sphere.area(),
            1.0
        ));
        assert!(sphere.conformal_to_rectifying_coeffs().iter().all(|c| *c == 0.0));

        let prolate = Ellipsoid::new(Metres(6.4e6), -1.0 / 150.0).expect("valid prolate");
        assert!(prolate.e_2() < 0.0);
        assert!(prolate.n() < 0.0);
        assert!(prolate.es() < 0.0);
        assert!(prolate.b().0 > prolate.a().0);
        assert!(prolate.quarter_meridian().0 > sphere.quarter_meridian().0);
    }
}
