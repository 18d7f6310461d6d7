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

//! The ellipsoid module contains types and functions for defining an ellipsoid
//! given its Semimajor axis (the equivalent of its radius) and flattening ratio.
//!
//! It also contains the conversions between the geodetic latitude and the
//! auxiliary latitudes used by the geodesic and rhumb line solvers:
//! - the parametric (reduced) latitude, β;
//! - the rectifying latitude, μ, proportional to the meridian distance;
//! - the conformal latitude, χ;
//! - and the isometric latitude, ψ, the Mercator northing.
//!
//! All latitudes are in degrees.

#![allow(clippy::float_cmp)]
#![allow(clippy::suboptimal_flops)]

pub mod coefficients;
pub mod wgs84;

use crate::math::{atand, eatanhe, sq, tand, tauf, taupf, DEGREE};
use crate::{Degrees, Ellipsoid, Metres};

/// Calculate the Semiminor axis of an ellipsoid.
/// * `a` - the Semimajor axis of an ellipsoid.
/// * `f` - the flattening ratio.
/// # Examples
/// ```
/// use ellipsoid_geodesy::Metres;
/// use ellipsoid_geodesy::ellipsoid::{calculate_minor_axis, wgs84};
///
/// // The WGS 84 Semiminor axis measured in metres.
/// let b : Metres = Metres(6_356_752.314_245_179);
/// assert_eq!(b, calculate_minor_axis(wgs84::A, wgs84::F));
/// ```
#[must_use]
pub fn calculate_minor_axis(a: Metres, f: f64) -> Metres {
    Metres(a.0 * (1.0 - f))
}

/// Calculate the square of the Eccentricity of an ellipsoid.
///
/// It is negative for a prolate ellipsoid.
/// * `f` - the flattening ratio.
#[must_use]
pub fn calculate_sq_eccentricity(f: f64) -> f64 {
    f * (2.0 - f)
}

/// Calculate the square of the second Eccentricity of an ellipsoid.
/// * `f` - the flattening ratio.
#[must_use]
pub fn calculate_sq_2nd_eccentricity(f: f64) -> f64 {
    calculate_sq_eccentricity(f) / sq(1.0 - f)
}

/// Calculate the third flattening of an ellipsoid.
/// * `f` - the flattening ratio.
/// # Examples
/// ```
/// use ellipsoid_geodesy::ellipsoid::{calculate_3rd_flattening, wgs84};
///
/// // The WGS 84 3rd flattening.
/// assert_eq!(0.0016792203863837047, calculate_3rd_flattening(wgs84::F));
/// ```
#[must_use]
pub fn calculate_3rd_flattening(f: f64) -> f64 {
    f / (2.0 - f)
}

/// Calculate the signed Eccentricity of an ellipsoid: the square root of
/// the magnitude of `e_2`, negative for a prolate ellipsoid.
/// * `f` - the flattening ratio.
#[must_use]
pub fn calculate_signed_eccentricity(f: f64) -> f64 {
    let e = calculate_sq_eccentricity(f).abs().sqrt();
    if f < 0.0 {
        -e
    } else {
        e
    }
}

/// Calculate the square of the authalic radius of an ellipsoid: the radius
/// of the sphere with the same surface area.
/// * `a` - the Semimajor axis of an ellipsoid.
/// * `f` - the flattening ratio.
#[must_use]
pub fn calculate_sq_authalic_radius(a: Metres, f: f64) -> f64 {
    let b = calculate_minor_axis(a, f).0;
    let e_2 = calculate_sq_eccentricity(f);
    let ratio = if e_2 == 0.0 {
        1.0
    } else {
        eatanhe(1.0, calculate_signed_eccentricity(f)) / e_2
    };
    (sq(a.0) + sq(b) * ratio) / 2.0
}

impl Ellipsoid {
    /// Convert a geodetic latitude to a parametric latitude.
    /// * `lat` - the geodetic latitude.
    #[must_use]
    pub fn parametric_latitude(&self, lat: Degrees) -> Degrees {
        Degrees(atand(self.one_minus_f * tand(lat.0)))
    }

    /// Convert a parametric latitude to a geodetic latitude.
    /// * `beta` - the parametric latitude.
    #[must_use]
    pub fn inverse_parametric_latitude(&self, beta: Degrees) -> Degrees {
        Degrees(atand(tand(beta.0) / self.one_minus_f))
    }

    /// The distance along the meridian from the equator to a latitude.
    /// * `lat` - the geodetic latitude.
    #[must_use]
    pub fn meridian_distance(&self, lat: Degrees) -> Metres {
        Metres(self.b.0 * self.elliptic.ed(self.parametric_latitude(lat).0))
    }

    /// The distance along the meridian from the equator to a pole.
    /// # Examples
    /// ```
    /// use ellipsoid_geodesy::Ellipsoid;
    ///
    /// let quarter_meridian = Ellipsoid::wgs84().quarter_meridian();
    /// assert!((10_001_965.729 - quarter_meridian.0).abs() < 1e-3);
    /// ```
    #[must_use]
    pub fn quarter_meridian(&self) -> Metres {
        Metres(self.b.0 * self.elliptic.complete())
    }

    /// Convert a geodetic latitude to a rectifying latitude.
    ///
    /// The rectifying latitude is proportional to the meridian distance,
    /// with 90° at the poles.
    /// * `lat` - the geodetic latitude.
    #[must_use]
    pub fn rectifying_latitude(&self, lat: Degrees) -> Degrees {
        if lat.0.abs() == 90.0 {
            lat
        } else {
            Degrees(90.0 * self.meridian_distance(lat).0 / self.quarter_meridian().0)
        }
    }

    /// Convert a rectifying latitude to a geodetic latitude.
    /// * `mu` - the rectifying latitude.
    #[must_use]
    pub fn inverse_rectifying_latitude(&self, mu: Degrees) -> Degrees {
        if mu.0.abs() == 90.0 {
            mu
        } else {
            let beta = self.elliptic.einv(mu.0 * self.elliptic.complete() / 90.0) / DEGREE;
            self.inverse_parametric_latitude(Degrees(beta))
        }
    }

    /// Convert a geodetic latitude to a conformal latitude.
    /// * `lat` - the geodetic latitude.
    #[must_use]
    pub fn conformal_latitude(&self, lat: Degrees) -> Degrees {
        Degrees(atand(taupf(tand(lat.0), self.es)))
    }

    /// Convert a conformal latitude to a geodetic latitude.
    /// * `chi` - the conformal latitude.
    #[must_use]
    pub fn inverse_conformal_latitude(&self, chi: Degrees) -> Degrees {
        Degrees(atand(tauf(tand(chi.0), self.es)))
    }

    /// Convert a geodetic latitude to an isometric latitude, in degrees.
    ///
    /// At the poles the tangent of the latitude saturates at ±1/epsilon²,
    /// so the isometric latitude is large but finite.
    /// * `lat` - the geodetic latitude.
    #[must_use]
    pub fn isometric_latitude(&self, lat: Degrees) -> Degrees {
        Degrees(libm::asinh(taupf(tand(lat.0), self.es)) / DEGREE)
    }

    /// Convert an isometric latitude, in degrees, to a geodetic latitude.
    /// * `psi` - the isometric latitude.
    #[must_use]
    pub fn inverse_isometric_latitude(&self, psi: Degrees) -> Degrees {
        Degrees(atand(tauf(libm::sinh(psi.0 * DEGREE), self.es)))
    }

    /// The radius of the circle of latitude.
    /// * `lat` - the geodetic latitude.
    #[must_use]
    pub fn circle_radius(&self, lat: Degrees) -> Metres {
        if lat.0.abs() == 90.0 {
            Metres(0.0)
        } else {
            Metres(self.a.0 / libm::hypot(1.0, self.one_minus_f * tand(lat.0)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::sin_cos_series;
    use angle_sc::is_within_tolerance;

    #[test]
    fn test_signed_eccentricity() {
        assert!(calculate_signed_eccentricity(wgs84::F) > 0.0);
        assert!(calculate_signed_eccentricity(-1.0 / 150.0) < 0.0);
        assert_eq!(0.0, calculate_signed_eccentricity(0.0));
    }

    #[test]
    fn test_sq_authalic_radius() {
        let c_2 = calculate_sq_authalic_radius(wgs84::A, wgs84::F);
        assert!(is_within_tolerance(6_371_007.180_9, c_2.sqrt(), 1e-4));

        // a sphere
        let c_2 = calculate_sq_authalic_radius(Metres(6.4e6), 0.0);
        assert_eq!(6.4e6 * 6.4e6, c_2);

        // a prolate ellipsoid has an authalic radius between a and b
        let c_2 = calculate_sq_authalic_radius(Metres(6.4e6), -1.0 / 150.0);
        assert!(c_2.sqrt() > 6.4e6);
        assert!(c_2.sqrt() < 6.4e6 * (1.0 + 1.0 / 150.0));
    }

    #[test]
    fn test_parametric_and_geodetic_latitude() {
        let ellipsoid = Ellipsoid::wgs84();
        for i in -90..=90 {
            let lat = Degrees(f64::from(i));
            let beta = ellipsoid.parametric_latitude(lat);
            assert!(beta.0.abs() <= lat.0.abs());
            let result = ellipsoid.inverse_parametric_latitude(beta);
            assert!(is_within_tolerance(lat.0, result.0, 1e-13));
        }
    }

    #[test]
    fn test_rectifying_latitude() {
        let ellipsoid = Ellipsoid::wgs84();
        assert_eq!(90.0, ellipsoid.rectifying_latitude(Degrees(90.0)).0);
        assert_eq!(-90.0, ellipsoid.rectifying_latitude(Degrees(-90.0)).0);
        assert_eq!(0.0, ellipsoid.rectifying_latitude(Degrees(0.0)).0);
        assert!(is_within_tolerance(
            ellipsoid.quarter_meridian().0,
            ellipsoid.meridian_distance(Degrees(90.0)).0,
            1e-8
        ));

        // the exact conversion agrees with Kruger's series from the
        // conformal latitude
        let alpha = ellipsoid.conformal_to_rectifying_coeffs();
        for i in -18..=18 {
            let lat = Degrees(5.0 * f64::from(i));
            let mu = ellipsoid.rectifying_latitude(lat);
            let chi = ellipsoid.conformal_latitude(lat).0 * DEGREE;
            let (s, c) = libm::sincos(chi);
            let mu_series = (chi + sin_cos_series(true, s, c, alpha)) / DEGREE;
            assert!(is_within_tolerance(mu_series, mu.0, 1e-12));

            let result = ellipsoid.inverse_rectifying_latitude(mu);
            assert!(is_within_tolerance(lat.0, result.0, 1e-12));
        }
    }

    #[test]
    fn test_conformal_and_isometric_latitude() {
        let ellipsoid = Ellipsoid::wgs84();
        for i in -89..=89 {
            let lat = Degrees(f64::from(i));
            let chi = ellipsoid.conformal_latitude(lat);
            assert!(chi.0.abs() <= lat.0.abs());
            let result = ellipsoid.inverse_conformal_latitude(chi);
            assert!(is_within_tolerance(lat.0, result.0, 1e-12));

            let psi = ellipsoid.isometric_latitude(lat);
            let result = ellipsoid.inverse_isometric_latitude(psi);
            assert!(is_within_tolerance(lat.0, result.0, 1e-12));
        }
        let psi_pole = ellipsoid.isometric_latitude(Degrees(90.0));
        assert!(psi_pole.0 > 4000.0);
        assert_eq!(90.0, ellipsoid.inverse_isometric_latitude(psi_pole).0);
        assert_eq!(-psi_pole.0, ellipsoid.isometric_latitude(Degrees(-90.0)).0);

        // on a sphere psi = asinh(tan(lat))
        let sphere = Ellipsoid::sphere(Metres(6.4e6)).expect("valid sphere");
        let psi = sphere.isometric_latitude(Degrees(45.0)).0 * DEGREE;
        assert!(is_within_tolerance(1.0_f64.asinh(), psi, 1e-15));
    }

    #[test]
    fn test_circle_radius() {
        let ellipsoid = Ellipsoid::wgs84();
        assert_eq!(wgs84::A, ellipsoid.circle_radius(Degrees(0.0)));
        assert_eq!(0.0, ellipsoid.circle_radius(Degrees(90.0)).0);
        assert!(is_within_tolerance(
            4_517_590.878_8,
            ellipsoid.circle_radius(Degrees(45.0)).0,
            1e-3
        ));
    }
}
