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

//! The geodesic module contains the `Geodesic` solver for the direct and
//! inverse geodesic problems on an ellipsoid of revolution.
//!
//! The solutions follow CFF Karney,
//! [Algorithms for geodesics](https://arxiv.org/pdf/1109.4448.pdf):
//! a geodesic on the ellipsoid is mapped onto a great circle on an auxiliary
//! sphere and the differences between them are evaluated with series in the
//! third flattening of the ellipsoid.

#![allow(clippy::float_cmp)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::similar_names)]
#![allow(clippy::suboptimal_flops)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::too_many_lines)]

use crate::ellipsoid::coefficients::{
    evaluate_a1, evaluate_a2, evaluate_coeffs_a3, evaluate_coeffs_c1, evaluate_coeffs_c2,
    evaluate_coeffs_c3x, evaluate_coeffs_c3y, evaluate_coeffs_c4x, evaluate_coeffs_c4y,
    evaluate_polynomial, ORDER,
};
use crate::error::{check_latitude, check_longitude, Error, Result};
use crate::geodesic_line::GeodesicLine;
use crate::math::{
    ang_canonical, ang_diff, ang_round, atan2d, lat_fix, norm, sincosd, sq, DEGREE,
};
use crate::series::sin_cos_series;
use crate::Ellipsoid;
use angle_sc::Degrees;
use core::f64::consts::PI;
use icao_units::si::Metres;
use unit_sphere::LatLong;

/// The square root of the smallest positive normal `f64`.
pub(crate) const TINY: f64 = 1.491_668_146_240_041_3e-154;
/// The convergence tolerance of the Newton iteration.
const TOL0: f64 = f64::EPSILON;
/// The tolerance of the antipodal starting estimate.
const TOL1: f64 = 200.0 * TOL0;
/// The square root of `f64::EPSILON`.
const TOL2: f64 = 1.490_116_119_384_765_6e-8;
/// The termination tolerance of the bisection.
const TOLB: f64 = TOL0 * TOL2;
/// The threshold of the antipodal starting estimate for `x`.
const XTHRESH: f64 = 1000.0 * TOL2;
/// The number of Newton iterations before falling back to bisection.
const MAXIT1: u32 = 20;
/// The maximum number of iterations of the inverse solution.
pub const MAX_ITERATIONS: u32 = MAXIT1 + f64::MANTISSA_DIGITS + 10;

/// The epsilon integration variable derived from Clairaut's constant.
/// * `k2` - the square of cos alpha0 times the second eccentricity squared.
#[must_use]
pub(crate) fn epsilon(k2: f64) -> f64 {
    k2 / (2.0 * (1.0 + libm::sqrt(1.0 + k2)) + k2)
}

/// Solve the astroid equation for its positive root:
/// k^4 + 2*k^3 - (x^2 + y^2 - 1)*k^2 - 2*y^2*k - y^2 = 0.
/// See CFF Karney, section 7.
/// * `x`, `y` - the scaled positions relative to the antipode.
#[must_use]
fn astroid(x: f64, y: f64) -> f64 {
    let p = sq(x);
    let q = sq(y);
    let r = (p + q - 1.0) / 6.0;

    // y = 0 with |x| <= 1
    if q == 0.0 && r <= 0.0 {
        return 0.0;
    }

    let s = p * q / 4.0;
    let r2 = sq(r);
    let r3 = r * r2;
    // zero on the evolute curve p^(1/3) + q^(1/3) = 1
    let discriminant = s * (s + 2.0 * r3);
    let mut u = r;
    if discriminant >= 0.0 {
        let mut t3 = s + r3;
        // take the sign of the root which maximizes |t3|
        t3 += libm::sqrt(discriminant).copysign(t3);
        let t = libm::cbrt(t3);
        u += t + if t == 0.0 { 0.0 } else { r2 / t };
    } else {
        // t is complex but u is real; discriminant < 0 implies r < 0
        let angle = libm::atan2(libm::sqrt(-discriminant), -(s + r3));
        u += 2.0 * r * libm::cos(angle / 3.0);
    }

    let v = libm::sqrt(sq(u) + q);
    // u + v, positive
    let uv = if u < 0.0 { q / (v - u) } else { u + v };
    let w = (uv - q) / (2.0 * v);
    uv / (libm::sqrt(uv + sq(w)) + w)
}

/// The solution of a geodesic problem.
///
/// Every field is calculated by both the direct and inverse solutions.
/// Longitudes and azimuths are in the range [-180, 180) unless the
/// longitude was unrolled.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeodesicResult {
    /// The latitude of the start point.
    pub lat1: Degrees,
    /// The longitude of the start point.
    pub lon1: Degrees,
    /// The azimuth at the start point.
    pub azi1: Degrees,
    /// The latitude of the end point.
    pub lat2: Degrees,
    /// The longitude of the end point.
    pub lon2: Degrees,
    /// The azimuth at the end point.
    pub azi2: Degrees,
    /// The length of the geodesic.
    pub distance: Metres,
    /// The arc length on the auxiliary sphere.
    pub arc_length: Degrees,
    /// The reduced length of the geodesic, m12.
    pub reduced_length: Metres,
    /// The geodesic scale of the end point relative to the start point, M12.
    pub geodesic_scale12: f64,
    /// The geodesic scale of the start point relative to the end point, M21.
    pub geodesic_scale21: f64,
    /// The area between the geodesic and the equator, in square metres.
    pub area: f64,
}

/// The lengths of a geodesic, scaled by the Semiminor axis.
#[derive(Clone, Copy, Debug)]
struct Lengths {
    /// The distance / b.
    s12b: f64,
    /// The reduced length / b.
    m12b: f64,
    /// The coefficient of the secular term of the reduced length.
    m0: f64,
    /// The geodesic scale M12.
    scale12: f64,
    /// The geodesic scale M21.
    scale21: f64,
}

/// The end points of an inverse problem on the auxiliary sphere, after the
/// points have been swapped so that the start point is furthest from the
/// equator and in the southern hemisphere.
#[derive(Clone, Copy, Debug)]
struct EndPoints {
    sbet1: f64,
    cbet1: f64,
    dn1: f64,
    sbet2: f64,
    cbet2: f64,
    dn2: f64,
}

/// The starting estimate of the inverse solution.
#[derive(Clone, Copy, Debug)]
struct InverseStart {
    /// The arc length in radians, negative unless the short line estimate
    /// is accurate enough to be the solution.
    sig12: f64,
    salp1: f64,
    calp1: f64,
    salp2: f64,
    calp2: f64,
    /// The mean value of dn along a short line.
    dnm: f64,
}

/// The longitude difference of a trial start azimuth.
#[derive(Clone, Copy, Debug)]
struct Lambda12 {
    /// The longitude difference error in radians.
    lam12: f64,
    salp2: f64,
    calp2: f64,
    sig12: f64,
    ssig1: f64,
    csig1: f64,
    ssig2: f64,
    csig2: f64,
    eps: f64,
    domg12: f64,
    /// The derivative of lam12 with respect to the start azimuth.
    dlam12: f64,
}

/// A solved geodesic arc between the swapped end points.
#[derive(Clone, Copy, Debug)]
struct Arc {
    /// The arc length in degrees.
    a12: f64,
    s12: f64,
    m12: f64,
    scale12: f64,
    scale21: f64,
    salp1: f64,
    calp1: f64,
    salp2: f64,
    calp2: f64,
    /// The sine and cosine of the longitude difference on the auxiliary
    /// sphere.
    somg12: f64,
    comg12: f64,
    meridian: bool,
}

/// The solution of the inverse problem in the caller's point order.
#[derive(Clone, Copy, Debug)]
pub(crate) struct InverseSolution {
    pub(crate) a12: f64,
    pub(crate) s12: f64,
    pub(crate) m12: f64,
    pub(crate) scale12: f64,
    pub(crate) scale21: f64,
    pub(crate) area: f64,
    pub(crate) salp1: f64,
    pub(crate) calp1: f64,
    pub(crate) salp2: f64,
    pub(crate) calp2: f64,
}

/// A geodesic solver on an `Ellipsoid`.
///
/// It holds the series coefficients in the third flattening of the
/// `Ellipsoid`, so it is constructed once and shared by every query.
#[derive(Clone, Debug, PartialEq)]
pub struct Geodesic<'a> {
    /// A reference to the underlying `Ellipsoid`.
    ellipsoid: &'a Ellipsoid,
    /// The coefficients of A3, lowest order first.
    a3x: [f64; ORDER],
    /// The polynomial coefficients of C3.
    c3x: [f64; 15],
    /// The polynomial coefficients of C4.
    c4x: [f64; 21],
    /// The short line tolerance of the inverse solution.
    etol2: f64,
}

impl<'a> Geodesic<'a> {
    /// Constructor.
    /// * `ellipsoid` - a reference to the `Ellipsoid`.
    #[must_use]
    pub fn new(ellipsoid: &'a Ellipsoid) -> Self {
        let f = ellipsoid.f();
        let n = ellipsoid.n();
        // scaled so that the short line estimate is accurate for |f| < 0.01
        let etol2 =
            0.1 * TOL2 / libm::sqrt(f.abs().max(0.001) * (1.0 - f / 2.0).min(1.0) / 2.0);
        Self {
            ellipsoid,
            a3x: evaluate_coeffs_a3(n),
            c3x: evaluate_coeffs_c3x(n),
            c4x: evaluate_coeffs_c4x(n),
            etol2,
        }
    }

    /// Accessor for the underlying `Ellipsoid`.
    #[must_use]
    pub const fn ellipsoid(&self) -> &'a Ellipsoid {
        self.ellipsoid
    }

    /// The total area of the ellipsoid in square metres.
    #[must_use]
    pub fn ellipsoid_area(&self) -> f64 {
        self.ellipsoid.area()
    }

    /// The scale factor A3 of the longitude integral.
    #[must_use]
    pub(crate) fn a3f(&self, eps: f64) -> f64 {
        evaluate_polynomial(&self.a3x, eps)
    }

    /// The coefficients of the longitude integral.
    #[must_use]
    pub(crate) fn c3f(&self, eps: f64) -> [f64; ORDER] {
        evaluate_coeffs_c3y(&self.c3x, eps)
    }

    /// The coefficients of the area integral.
    #[must_use]
    pub(crate) fn c4f(&self, eps: f64) -> [f64; ORDER] {
        evaluate_coeffs_c4y(&self.c4x, eps)
    }

    /// Solve the direct geodesic problem.
    /// * `lat1`, `lon1` - the start position.
    /// * `azi1` - the azimuth at the start position.
    /// * `distance` - the distance along the geodesic, may be negative.
    ///
    /// # Errors
    ///
    /// `Error::DomainError` if `lat1` is outside [-90, 90] or `lon1` or
    /// `azi1` is outside [-540, 540).
    ///
    /// # Examples
    /// ```
    /// use ellipsoid_geodesy::{Degrees, Metres, WGS84_GEODESIC};
    ///
    /// // JFK towards Paris
    /// let result = WGS84_GEODESIC
    ///     .direct(Degrees(40.639_722_22), Degrees(-73.778_888_89), Degrees(53.5), Metres(5_850e3))
    ///     .unwrap();
    /// assert!((49.014_67 - result.lat2.0).abs() < 0.5e-5);
    /// assert!((2.561_06 - result.lon2.0).abs() < 0.5e-5);
    /// assert!((111.629_47 - result.azi2.0).abs() < 0.5e-5);
    /// ```
    pub fn direct(
        &self,
        lat1: Degrees,
        lon1: Degrees,
        azi1: Degrees,
        distance: Metres,
    ) -> Result<GeodesicResult> {
        self.gen_direct(lat1, lon1, azi1, false, distance.0, false)
    }

    /// Solve the direct geodesic problem with the length given as an arc
    /// length on the auxiliary sphere.
    /// * `lat1`, `lon1` - the start position.
    /// * `azi1` - the azimuth at the start position.
    /// * `arc_length` - the arc length on the auxiliary sphere.
    ///
    /// # Errors
    ///
    /// `Error::DomainError` if an input is out of range, see `direct`.
    pub fn arc_direct(
        &self,
        lat1: Degrees,
        lon1: Degrees,
        azi1: Degrees,
        arc_length: Degrees,
    ) -> Result<GeodesicResult> {
        self.gen_direct(lat1, lon1, azi1, true, arc_length.0, false)
    }

    /// The general direct geodesic problem.
    /// * `lat1`, `lon1` - the start position.
    /// * `azi1` - the azimuth at the start position.
    /// * `arc_mode` - whether `s12_a12` is an arc length in degrees rather
    ///   than a distance in metres.
    /// * `s12_a12` - the distance or arc length.
    /// * `unroll` - whether to return the end longitude as the start
    ///   longitude plus the longitude travelled, rather than reduced.
    ///
    /// # Errors
    ///
    /// `Error::DomainError` if an input is out of range, see `direct`.
    pub fn gen_direct(
        &self,
        lat1: Degrees,
        lon1: Degrees,
        azi1: Degrees,
        arc_mode: bool,
        s12_a12: f64,
        unroll: bool,
    ) -> Result<GeodesicResult> {
        Ok(self
            .line(lat1, lon1, azi1)?
            .gen_position(arc_mode, s12_a12, unroll))
    }

    /// Construct a `GeodesicLine` from a start position and azimuth.
    /// * `lat1`, `lon1` - the start position.
    /// * `azi1` - the azimuth at the start position.
    ///
    /// # Errors
    ///
    /// `Error::DomainError` if an input is out of range, see `direct`.
    pub fn line(&self, lat1: Degrees, lon1: Degrees, azi1: Degrees) -> Result<GeodesicLine<'a>> {
        check_latitude("lat1", lat1.0)?;
        check_longitude("lon1", lon1.0)?;
        check_longitude("azi1", azi1.0)?;
        Ok(GeodesicLine::new(self, lat1.0, lon1.0, azi1.0))
    }

    /// Construct a `GeodesicLine` from a start position and azimuth with
    /// its reference point 3 at the given distance.
    /// * `lat1`, `lon1` - the start position.
    /// * `azi1` - the azimuth at the start position.
    /// * `distance` - the distance to reference point 3.
    ///
    /// # Errors
    ///
    /// `Error::DomainError` if an input is out of range, see `direct`.
    pub fn direct_line(
        &self,
        lat1: Degrees,
        lon1: Degrees,
        azi1: Degrees,
        distance: Metres,
    ) -> Result<GeodesicLine<'a>> {
        let mut line = self.line(lat1, lon1, azi1)?;
        line.set_distance(distance);
        Ok(line)
    }

    /// Construct the `GeodesicLine` between a pair of positions, with its
    /// reference point 3 at the second position.
    /// * `lat1`, `lon1` - the start position.
    /// * `lat2`, `lon2` - the end position.
    ///
    /// # Errors
    ///
    /// `Error::DomainError` if an input is out of range, see `inverse`.
    /// `Error::ConvergenceFailure` if the inverse solution failed.
    pub fn inverse_line(
        &self,
        lat1: Degrees,
        lon1: Degrees,
        lat2: Degrees,
        lon2: Degrees,
    ) -> Result<GeodesicLine<'a>> {
        check_positions(lat1, lon1, lat2, lon2)?;
        let solution = self.gen_inverse(lat1.0, lon1.0, lat2.0, lon2.0)?;
        let azi1 = atan2d(solution.salp1, solution.calp1);
        let mut line = GeodesicLine::from_azimuth_components(
            self,
            lat1.0,
            lon1.0,
            azi1,
            solution.salp1,
            solution.calp1,
        );
        line.set_arc_length(Degrees(solution.a12));
        Ok(line)
    }

    /// Solve the inverse geodesic problem.
    /// * `lat1`, `lon1` - the start position.
    /// * `lat2`, `lon2` - the end position.
    ///
    /// # Errors
    ///
    /// `Error::DomainError` if a latitude is outside [-90, 90] or a
    /// longitude is outside [-540, 540).
    /// `Error::ConvergenceFailure` if the iteration failed to converge.
    ///
    /// # Examples
    /// ```
    /// use ellipsoid_geodesy::{Degrees, WGS84_GEODESIC};
    ///
    /// // JFK to Paris
    /// let result = WGS84_GEODESIC
    ///     .inverse(Degrees(40.6), Degrees(-73.8), Degrees(49.016_666_67), Degrees(2.55))
    ///     .unwrap();
    /// assert!((53.470_22 - result.azi1.0).abs() < 0.5e-5);
    /// assert!((111.593_67 - result.azi2.0).abs() < 0.5e-5);
    /// assert!((5_853_226.0 - result.distance.0).abs() < 0.5);
    /// ```
    pub fn inverse(
        &self,
        lat1: Degrees,
        lon1: Degrees,
        lat2: Degrees,
        lon2: Degrees,
    ) -> Result<GeodesicResult> {
        check_positions(lat1, lon1, lat2, lon2)?;
        let solution = self.gen_inverse(lat1.0, lon1.0, lat2.0, lon2.0)?;
        Ok(GeodesicResult {
            lat1: Degrees(lat_fix(lat1.0)),
            lon1: Degrees(ang_canonical(lon1.0)),
            azi1: Degrees(ang_canonical(atan2d(solution.salp1, solution.calp1))),
            lat2: Degrees(lat_fix(lat2.0)),
            lon2: Degrees(ang_canonical(lon2.0)),
            azi2: Degrees(ang_canonical(atan2d(solution.salp2, solution.calp2))),
            distance: Metres(solution.s12),
            arc_length: Degrees(solution.a12),
            reduced_length: Metres(solution.m12),
            geodesic_scale12: solution.scale12,
            geodesic_scale21: solution.scale21,
            area: solution.area,
        })
    }

    /// Solve the inverse geodesic problem between a pair of `LatLong`s.
    /// * `a`, `b` - the start and end positions.
    ///
    /// # Errors
    ///
    /// See `inverse`.
    pub fn inverse_lat_long(&self, a: &LatLong, b: &LatLong) -> Result<GeodesicResult> {
        self.inverse(a.lat(), a.lon(), b.lat(), b.lon())
    }

    /// The distance, reduced length and geodesic scales of an arc on the
    /// auxiliary sphere, divided by the Semiminor axis.
    #[must_use]
    fn lengths(
        &self,
        eps: f64,
        sig12: f64,
        ssig1: f64,
        csig1: f64,
        dn1: f64,
        ssig2: f64,
        csig2: f64,
        dn2: f64,
        cbet1: f64,
        cbet2: f64,
    ) -> Lengths {
        let a1 = evaluate_a1(eps);
        let a2 = evaluate_a2(eps);
        let m0 = a1 - a2;
        let a1p1 = 1.0 + a1;
        let a2p1 = 1.0 + a2;

        let c1 = evaluate_coeffs_c1(eps);
        let c2 = evaluate_coeffs_c2(eps);
        let b1 = sin_cos_series(true, ssig2, csig2, &c1) - sin_cos_series(true, ssig1, csig1, &c1);
        let b2 = sin_cos_series(true, ssig2, csig2, &c2) - sin_cos_series(true, ssig1, csig1, &c2);
        let s12b = a1p1 * (sig12 + b1);
        let j12 = m0 * sig12 + (a1p1 * b1 - a2p1 * b2);

        // the brackets around (csig1 * ssig2) and (ssig1 * csig2) ensure
        // accurate cancellation for coincident points
        let m12b = dn2 * (csig1 * ssig2) - dn1 * (ssig1 * csig2) - csig1 * csig2 * j12;

        let csig12 = csig1 * csig2 + ssig1 * ssig2;
        let t = self.ellipsoid.ep_2() * (cbet1 - cbet2) * (cbet1 + cbet2) / (dn1 + dn2);
        Lengths {
            s12b,
            m12b,
            m0,
            scale12: csig12 + (t * ssig2 - csig2 * j12) * ssig1 / dn1,
            scale21: csig12 - (t * ssig1 - csig1 * j12) * ssig2 / dn2,
        }
    }

    /// Estimate the start azimuth of the inverse problem.
    ///
    /// Short lines are solved on a sphere of the mean radius of curvature;
    /// if the short line is accurate enough, its solution is returned with a
    /// non-negative `sig12`. Nearly antipodal points are estimated by
    /// solving the astroid problem.
    /// * `p` - the end points on the auxiliary sphere.
    /// * `lam12`, `slam12`, `clam12` - the longitude difference and its
    ///   sine and cosine.
    #[must_use]
    fn inverse_start(&self, p: &EndPoints, lam12: f64, slam12: f64, clam12: f64) -> InverseStart {
        let f = self.ellipsoid.f();
        let n = self.ellipsoid.n();
        let ep2 = self.ellipsoid.ep_2();
        let f1 = self.ellipsoid.one_minus_f();
        let EndPoints {
            sbet1,
            cbet1,
            dn1,
            sbet2,
            cbet2,
            dn2,
        } = *p;

        // bet12 = bet2 - bet1 in [0, pi); bet12a = bet2 + bet1 in (-pi, 0]
        let sbet12 = sbet2 * cbet1 - cbet2 * sbet1;
        let cbet12 = cbet2 * cbet1 + sbet2 * sbet1;
        let sbet12a = sbet2 * cbet1 + cbet2 * sbet1;

        let shortline = cbet12 >= 0.0 && sbet12 < 0.5 && cbet2 * lam12 < 0.5;
        let mut dnm = f64::NAN;
        let (somg12, comg12) = if shortline {
            let sbetm2 = sq(sbet1 + sbet2);
            let sbetm2 = sbetm2 / (sbetm2 + sq(cbet1 + cbet2));
            dnm = libm::sqrt(1.0 + ep2 * sbetm2);
            libm::sincos(lam12 / (f1 * dnm))
        } else {
            (slam12, clam12)
        };

        let mut salp1 = cbet2 * somg12;
        let mut calp1 = if comg12 >= 0.0 {
            sbet12 + cbet2 * sbet1 * sq(somg12) / (1.0 + comg12)
        } else {
            sbet12a - cbet2 * sbet1 * sq(somg12) / (1.0 - comg12)
        };

        let ssig12 = libm::hypot(salp1, calp1);
        let csig12 = sbet1 * sbet2 + cbet1 * cbet2 * comg12;

        if shortline && ssig12 < self.etol2 {
            // really short lines
            let salp2 = cbet1 * somg12;
            let calp2 = sbet12
                - cbet1
                    * sbet2
                    * if comg12 >= 0.0 {
                        sq(somg12) / (1.0 + comg12)
                    } else {
                        1.0 - comg12
                    };
            let (salp2, calp2) = norm(salp2, calp2);
            let (salp1, calp1) = norm(salp1, calp1);
            return InverseStart {
                sig12: libm::atan2(ssig12, csig12),
                salp1,
                calp1,
                salp2,
                calp2,
                dnm,
            };
        }

        // the spherical estimate is good enough unless the points are
        // nearly antipodal
        if n.abs() <= 0.1 && csig12 < 0.0 && ssig12 < 6.0 * n.abs() * PI * sq(cbet1) {
            // lam12 - pi
            let lam12x = libm::atan2(-slam12, -clam12);
            let (x, y, lamscale) = if f >= 0.0 {
                // x = dlong, y = dlat
                let eps = epsilon(sq(sbet1) * ep2);
                let lamscale = f * cbet1 * self.a3f(eps) * PI;
                let betscale = lamscale * cbet1;
                (lam12x / lamscale, sbet12a / betscale, lamscale)
            } else {
                // x = dlat, y = dlong
                let cbet12a = cbet2 * cbet1 - sbet2 * sbet1;
                let bet12a = libm::atan2(sbet12a, cbet12a);
                let lengths = self.lengths(
                    n,
                    PI + bet12a,
                    sbet1,
                    -cbet1,
                    dn1,
                    sbet2,
                    cbet2,
                    dn2,
                    cbet1,
                    cbet2,
                );
                let x = -1.0 + lengths.m12b / (cbet1 * cbet2 * lengths.m0 * PI);
                let betscale = if x < -0.01 {
                    sbet12a / x
                } else {
                    -f * sq(cbet1) * PI
                };
                let lamscale = betscale / cbet1;
                (x, lam12x / lamscale, lamscale)
            };

            if y > -TOL1 && x > -1.0 - XTHRESH {
                if f >= 0.0 {
                    salp1 = (-x).min(1.0);
                    calp1 = -libm::sqrt(1.0 - sq(salp1));
                } else {
                    calp1 = x.max(if x > -TOL1 { 0.0 } else { -1.0 });
                    salp1 = libm::sqrt(1.0 - sq(calp1));
                }
            } else {
                let k = astroid(x, y);
                let omg12a = lamscale
                    * if f >= 0.0 {
                        -x * k / (1.0 + k)
                    } else {
                        -y * (1.0 + k) / k
                    };
                let (somg12, comg12) = libm::sincos(omg12a);
                let comg12 = -comg12;
                salp1 = cbet2 * somg12;
                calp1 = sbet12a - cbet2 * sbet1 * sq(somg12) / (1.0 - comg12);
            }
        }

        // a NaN salp1 is normalized so that it propagates
        let (salp1, calp1) = if salp1 <= 0.0 {
            (1.0, 0.0)
        } else {
            norm(salp1, calp1)
        };
        InverseStart {
            sig12: -1.0,
            salp1,
            calp1,
            salp2: f64::NAN,
            calp2: f64::NAN,
            dnm,
        }
    }

    /// The error in the longitude difference of a trial start azimuth and,
    /// if `diffp`, its derivative with respect to the azimuth.
    /// * `p` - the end points on the auxiliary sphere.
    /// * `salp1`, `calp1` - the trial start azimuth.
    /// * `slam120`, `clam120` - the sine and cosine of the longitude
    ///   difference.
    /// * `diffp` - whether to calculate the derivative.
    #[must_use]
    fn lambda12(
        &self,
        p: &EndPoints,
        salp1: f64,
        calp1: f64,
        slam120: f64,
        clam120: f64,
        diffp: bool,
    ) -> Lambda12 {
        let f = self.ellipsoid.f();
        let f1 = self.ellipsoid.one_minus_f();
        let EndPoints {
            sbet1,
            cbet1,
            dn1,
            sbet2,
            cbet2,
            dn2,
        } = *p;

        // break the degeneracy of equatorial lines
        let calp1 = if sbet1 == 0.0 && calp1 == 0.0 {
            -TINY
        } else {
            calp1
        };

        // sin(alp1) * cos(bet1) = sin(alp0)
        let salp0 = salp1 * cbet1;
        let calp0 = libm::hypot(calp1, salp1 * sbet1);

        // tan(bet1) = tan(sig1) * cos(alp1), tan(omg1) = sin(alp0) * tan(sig1)
        let somg1 = salp0 * sbet1;
        let comg1 = calp1 * cbet1;
        let (ssig1, csig1) = norm(sbet1, comg1);

        // Clairaut's relation: sin(alp2) * cos(bet2) = sin(alp0)
        let salp2 = if cbet2 == cbet1 { salp1 } else { salp0 / cbet2 };
        let calp2 = if cbet2 != cbet1 || sbet2.abs() != -sbet1 {
            libm::sqrt(
                sq(calp1 * cbet1)
                    + if cbet1 < -sbet1 {
                        (cbet2 - cbet1) * (cbet1 + cbet2)
                    } else {
                        (sbet1 - sbet2) * (sbet1 + sbet2)
                    },
            ) / cbet2
        } else {
            calp1.abs()
        };

        let somg2 = salp0 * sbet2;
        let comg2 = calp2 * cbet2;
        let (ssig2, csig2) = norm(sbet2, comg2);

        // sig12 = sig2 - sig1, limited to [0, pi]
        let sig12 = libm::atan2(
            (csig1 * ssig2 - ssig1 * csig2).max(0.0),
            csig1 * csig2 + ssig1 * ssig2,
        );
        // omg12 = omg2 - omg1, limited to [0, pi]
        let somg12 = (comg1 * somg2 - somg1 * comg2).max(0.0);
        let comg12 = comg1 * comg2 + somg1 * somg2;
        // eta = omg12 - lam120
        let eta = libm::atan2(
            somg12 * clam120 - comg12 * slam120,
            comg12 * clam120 + somg12 * slam120,
        );

        let eps = epsilon(sq(calp0) * self.ellipsoid.ep_2());
        let c3 = self.c3f(eps);
        let b312 = sin_cos_series(true, ssig2, csig2, &c3) - sin_cos_series(true, ssig1, csig1, &c3);
        let domg12 = -f * self.a3f(eps) * salp0 * (sig12 + b312);
        let lam12 = eta + domg12;

        let dlam12 = match (diffp, calp2 == 0.0) {
            (false, _) => f64::NAN,
            (true, true) => -2.0 * f1 * dn1 / sbet1,
            (true, false) => {
                let lengths =
                    self.lengths(eps, sig12, ssig1, csig1, dn1, ssig2, csig2, dn2, cbet1, cbet2);
                lengths.m12b * f1 / (calp2 * cbet2)
            }
        };

        Lambda12 {
            lam12,
            salp2,
            calp2,
            sig12,
            ssig1,
            csig1,
            ssig2,
            csig2,
            eps,
            domg12,
            dlam12,
        }
    }

    /// Solve a meridional arc, returns None if the meridian is not the
    /// shortest path.
    #[must_use]
    fn meridian_arc(&self, p: &EndPoints, slam12: f64, clam12: f64) -> Option<Arc> {
        let b = self.ellipsoid.b().0;
        // head to the target longitude, at the target end the azimuth is
        // north
        let (salp1, calp1) = (slam12, clam12);
        let (salp2, calp2) = (0.0, 1.0);

        // tan(bet) = tan(sig) * cos(alp)
        let (ssig1, csig1) = (p.sbet1, calp1 * p.cbet1);
        let (ssig2, csig2) = (p.sbet2, calp2 * p.cbet2);
        let sig12 = libm::atan2(
            (csig1 * ssig2 - ssig1 * csig2).max(0.0),
            csig1 * csig2 + ssig1 * ssig2,
        );
        let lengths = self.lengths(
            self.ellipsoid.n(),
            sig12,
            ssig1,
            csig1,
            p.dn1,
            ssig2,
            csig2,
            p.dn2,
            p.cbet1,
            p.cbet2,
        );

        // sig12 > pi/2 with m12 < 0 on a prolate ellipsoid is not a
        // shortest path
        if !(sig12 < 1.0 || lengths.m12b >= 0.0) {
            return None;
        }

        // zero length geodesics must not yield negative lengths
        let (sig12, s12b, m12b) =
            if sig12 < 3.0 * TINY || (sig12 < TOL0 && (lengths.s12b < 0.0 || lengths.m12b < 0.0)) {
                (0.0, 0.0, 0.0)
            } else {
                (sig12, lengths.s12b, lengths.m12b)
            };

        Some(Arc {
            a12: sig12 / DEGREE,
            s12: b * s12b,
            m12: b * m12b,
            scale12: lengths.scale12,
            scale21: lengths.scale21,
            salp1,
            calp1,
            salp2,
            calp2,
            somg12: f64::NAN,
            comg12: f64::NAN,
            meridian: true,
        })
    }

    /// Solve an arc along the equator.
    #[must_use]
    fn equatorial_arc(&self, lam12: f64, lon12: f64) -> Arc {
        let f1 = self.ellipsoid.one_minus_f();
        let b = self.ellipsoid.b().0;
        let sig12 = lam12 / f1;
        let (ssig12, csig12) = libm::sincos(sig12);
        Arc {
            a12: lon12 / f1,
            s12: self.ellipsoid.a().0 * lam12,
            m12: b * ssig12,
            scale12: csig12,
            scale21: csig12,
            salp1: 1.0,
            calp1: 0.0,
            salp2: 1.0,
            calp2: 0.0,
            somg12: ssig12,
            comg12: csig12,
            meridian: false,
        }
    }

    /// Solve a general arc: a short line directly, otherwise by Newton's
    /// method on the start azimuth, with bisection when Newton's method
    /// fails to improve the bracket of the solution.
    ///
    /// # Errors
    ///
    /// `Error::ConvergenceFailure` if the iteration failed to converge.
    fn general_arc(&self, p: &EndPoints, lam12: f64, slam12: f64, clam12: f64) -> Result<Arc> {
        let b = self.ellipsoid.b().0;
        let f1 = self.ellipsoid.one_minus_f();

        let start = self.inverse_start(p, lam12, slam12, clam12);
        if start.sig12 >= 0.0 {
            let dnm = start.dnm;
            let (ssig, csig) = libm::sincos(start.sig12 / dnm);
            let (somg12, comg12) = libm::sincos(lam12 / (f1 * dnm));
            return Ok(Arc {
                a12: start.sig12 / DEGREE,
                s12: start.sig12 * b * dnm,
                m12: sq(dnm) * b * ssig,
                scale12: csig,
                scale21: csig,
                salp1: start.salp1,
                calp1: start.calp1,
                salp2: start.salp2,
                calp2: start.calp2,
                somg12,
                comg12,
                meridian: false,
            });
        }

        let (mut salp1, mut calp1) = (start.salp1, start.calp1);
        // the bracket of the solution: alp1 in [alp1a, alp1b]
        let (mut salp1a, mut calp1a) = (TINY, 1.0);
        let (mut salp1b, mut calp1b) = (TINY, -1.0);
        let mut tripn = false;
        let mut tripb = false;
        let mut solution = None;
        for numit in 0..=MAX_ITERATIONS {
            let trial = self.lambda12(p, salp1, calp1, slam12, clam12, numit < MAXIT1);
            let v = trial.lam12;
            let tolerance = if tripn { 8.0 * TOL0 } else { TOL0 };
            // the reversed test allows NaNs to escape
            if tripb || !(v.abs() >= tolerance) {
                solution = Some(trial);
                break;
            }

            // update the bracket
            if v > 0.0 && (numit > MAXIT1 || calp1 / salp1 > calp1b / salp1b) {
                salp1b = salp1;
                calp1b = calp1;
            } else if v < 0.0 && (numit > MAXIT1 || calp1 / salp1 < calp1a / salp1a) {
                salp1a = salp1;
                calp1a = calp1;
            }

            if numit < MAXIT1 && trial.dlam12 > 0.0 {
                let dalp1 = -v / trial.dlam12;
                if dalp1.abs() < PI {
                    let (sdalp1, cdalp1) = libm::sincos(dalp1);
                    let nsalp1 = salp1 * cdalp1 + calp1 * sdalp1;
                    if nsalp1 > 0.0 {
                        (salp1, calp1) = norm(nsalp1, calp1 * cdalp1 - salp1 * sdalp1);
                        // convergence may be linear where the slope tends
                        // to zero
                        tripn = v.abs() <= 16.0 * TOL0;
                        continue;
                    }
                }
            }

            // bisect the bracket
            (salp1, calp1) = norm((salp1a + salp1b) / 2.0, (calp1a + calp1b) / 2.0);
            tripn = false;
            tripb = (salp1a - salp1).abs() + (calp1a - calp1) < TOLB
                || (salp1 - salp1b).abs() + (calp1 - calp1b) < TOLB;
            tracing::trace!(numit, error = v, "inverse geodesic bisection");
        }

        let trial = solution.ok_or_else(|| {
            tracing::warn!(
                iterations = MAX_ITERATIONS,
                "inverse geodesic failed to converge"
            );
            Error::ConvergenceFailure {
                iterations: MAX_ITERATIONS,
            }
        })?;

        let lengths = self.lengths(
            trial.eps,
            trial.sig12,
            trial.ssig1,
            trial.csig1,
            p.dn1,
            trial.ssig2,
            trial.csig2,
            p.dn2,
            p.cbet1,
            p.cbet2,
        );

        // omg12 = lam12 - domg12
        let (sdomg12, cdomg12) = libm::sincos(trial.domg12);
        Ok(Arc {
            a12: trial.sig12 / DEGREE,
            s12: b * lengths.s12b,
            m12: b * lengths.m12b,
            scale12: lengths.scale12,
            scale21: lengths.scale21,
            salp1,
            calp1,
            salp2: trial.salp2,
            calp2: trial.calp2,
            somg12: slam12 * cdomg12 - clam12 * sdomg12,
            comg12: clam12 * cdomg12 + slam12 * sdomg12,
            meridian: false,
        })
    }

    /// The area between an arc and the equator, before the sign of the
    /// swapped end points is restored.
    #[must_use]
    fn arc_area(&self, p: &EndPoints, arc: &Arc) -> f64 {
        let EndPoints {
            sbet1,
            cbet1,
            sbet2,
            cbet2,
            ..
        } = *p;
        let Arc {
            salp1,
            calp1,
            salp2,
            calp2,
            ..
        } = *arc;

        // sin(alp1) * cos(bet1) = sin(alp0)
        let salp0 = salp1 * cbet1;
        let calp0 = libm::hypot(calp1, salp1 * sbet1);
        let s12 = if calp0 != 0.0 && salp0 != 0.0 {
            let (ssig1, csig1) = norm(sbet1, calp1 * cbet1);
            let (ssig2, csig2) = norm(sbet2, calp2 * cbet2);
            let eps = epsilon(sq(calp0) * self.ellipsoid.ep_2());
            // a^2 * e^2 * cos(alpha0) * sin(alpha0)
            let a4 = sq(self.ellipsoid.a().0) * calp0 * salp0 * self.ellipsoid.e_2();
            let c4 = self.c4f(eps);
            a4 * (sin_cos_series(false, ssig2, csig2, &c4)
                - sin_cos_series(false, ssig1, csig1, &c4))
        } else {
            // sig1 and sig2 are indeterminate on the equator
            0.0
        };

        let alp12 = if !arc.meridian && arc.comg12 > -0.7071 && sbet2 - sbet1 < 1.75 {
            // omg12 < 3/4 pi and the latitude difference is not too big:
            // tan(alp12/2) = tan(omg12/2) * (tan(bet1/2) + tan(bet2/2))
            //                / (1 + tan(bet1/2) * tan(bet2/2))
            let domg12 = 1.0 + arc.comg12;
            let dbet1 = 1.0 + cbet1;
            let dbet2 = 1.0 + cbet2;
            2.0 * libm::atan2(
                arc.somg12 * (sbet1 * dbet2 + sbet2 * dbet1),
                domg12 * (sbet1 * sbet2 + dbet1 * dbet2),
            )
        } else {
            // alp12 = alp2 - alp1
            let mut salp12 = salp2 * calp1 - calp2 * salp1;
            let mut calp12 = calp2 * calp1 + salp2 * salp1;
            // alp12 = -180 when alp1 = +/-180 and alp2 = 0
            if salp12 == 0.0 && calp12 < 0.0 {
                salp12 = TINY * calp1;
                calp12 = -1.0;
            }
            libm::atan2(salp12, calp12)
        };

        s12 + self.ellipsoid.c_2() * alp12
    }

    /// Solve the inverse problem for positions in degrees.
    ///
    /// # Errors
    ///
    /// `Error::ConvergenceFailure` if the iteration failed to converge.
    pub(crate) fn gen_inverse(
        &self,
        lat1: f64,
        lon1: f64,
        lat2: f64,
        lon2: f64,
    ) -> Result<InverseSolution> {
        let f = self.ellipsoid.f();
        let f1 = self.ellipsoid.one_minus_f();
        let ep2 = self.ellipsoid.ep_2();

        // make the longitude difference positive
        let (lon12, lon12s) = ang_diff(lon1, lon2);
        let mut lonsign = if lon12 >= 0.0 { 1.0 } else { -1.0 };
        // points very close to the same half meridian are placed on it
        let lon12 = lonsign * ang_round(lon12);
        let lon12s = ang_round((180.0 - lon12) - lonsign * lon12s);
        let lam12 = lon12 * DEGREE;
        let (slam12, clam12) = if lon12 > 90.0 {
            let (s, c) = sincosd(lon12s);
            (s, -c)
        } else {
            sincosd(lon12)
        };

        // swap the points so that |lat1| >= |lat2|
        let mut lat1 = ang_round(lat_fix(lat1));
        let mut lat2 = ang_round(lat_fix(lat2));
        let swapp = if lat1.abs() < lat2.abs() { -1.0 } else { 1.0 };
        if swapp < 0.0 {
            lonsign = -lonsign;
            core::mem::swap(&mut lat1, &mut lat2);
        }
        // make lat1 <= 0
        let latsign = if lat1 < 0.0 { 1.0 } else { -1.0 };
        lat1 *= latsign;
        lat2 *= latsign;

        let parametric = |lat: f64| {
            let (sbet, cbet) = sincosd(lat);
            let (sbet, cbet) = norm(f1 * sbet, cbet);
            // cbet is +epsilon at the poles
            (sbet, cbet.max(TINY))
        };
        let (sbet1, cbet1) = parametric(lat1);
        let (mut sbet2, mut cbet2) = parametric(lat2);

        // make the latitudes of points equidistant from the equator exactly
        // equal or opposite
        if cbet1 < -sbet1 {
            if cbet2 == cbet1 {
                sbet2 = if sbet2 < 0.0 { sbet1 } else { -sbet1 };
            }
        } else if sbet2.abs() == -sbet1 {
            cbet2 = cbet1;
        }

        let p = EndPoints {
            sbet1,
            cbet1,
            dn1: libm::sqrt(1.0 + ep2 * sq(sbet1)),
            sbet2,
            cbet2,
            dn2: libm::sqrt(1.0 + ep2 * sq(sbet2)),
        };

        let meridian = if lat1 == -90.0 || slam12 == 0.0 {
            self.meridian_arc(&p, slam12, clam12)
        } else {
            None
        };
        let arc = match meridian {
            Some(arc) => arc,
            // the equator is the shortest path unless the points are nearly
            // antipodal on an oblate ellipsoid
            None if sbet1 == 0.0 && (f <= 0.0 || lon12s >= f * 180.0) => {
                self.equatorial_arc(lam12, lon12)
            }
            None => self.general_arc(&p, lam12, slam12, clam12)?,
        };

        let area = self.arc_area(&p, &arc) * swapp * lonsign * latsign + 0.0;

        // restore the order and signs of the points
        let mut arc = arc;
        if swapp < 0.0 {
            core::mem::swap(&mut arc.salp1, &mut arc.salp2);
            core::mem::swap(&mut arc.calp1, &mut arc.calp2);
            core::mem::swap(&mut arc.scale12, &mut arc.scale21);
        }
        Ok(InverseSolution {
            a12: arc.a12,
            s12: arc.s12,
            m12: arc.m12,
            scale12: arc.scale12,
            scale21: arc.scale21,
            area,
            salp1: arc.salp1 * swapp * lonsign,
            calp1: arc.calp1 * swapp * latsign,
            salp2: arc.salp2 * swapp * lonsign,
            calp2: arc.calp2 * swapp * latsign,
        })
    }
}

/// Check the latitudes and longitudes of a pair of positions.
///
/// # Errors
///
/// `Error::DomainError` if a value is out of range.
pub(crate) fn check_positions(
    lat1: Degrees,
    lon1: Degrees,
    lat2: Degrees,
    lon2: Degrees,
) -> Result<()> {
    check_latitude("lat1", lat1.0)?;
    check_longitude("lon1", lon1.0)?;
    check_latitude("lat2", lat2.0)?;
    check_longitude("lon2", lon2.0)
}
