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

//! The geodesic_line module contains the `GeodesicLine` type: a geodesic
//! defined by a start position and azimuth, which evaluates positions along
//! the geodesic without recalculating the series coefficients of the line.

#![allow(clippy::float_cmp)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::similar_names)]
#![allow(clippy::suboptimal_flops)]

use crate::ellipsoid::coefficients::{
    evaluate_a1, evaluate_a2, evaluate_coeffs_c1, evaluate_coeffs_c1p, evaluate_coeffs_c2,
    ORDER,
};
use crate::geodesic::{epsilon, Geodesic, GeodesicResult, TINY};
use crate::math::{
    ang_canonical, ang_normalize, ang_round, atan2d, lat_fix, norm, sincosd, sq, DEGREE,
};
use crate::series::sin_cos_series;
use crate::Ellipsoid;
use angle_sc::{Degrees, Validate};
use icao_units::si::Metres;

/// A geodesic from a start position and azimuth.
///
/// The series coefficients of the geodesic are calculated on construction,
/// so positions along it are calculated with only the trigonometric terms
/// that depend upon the position.
/// A `GeodesicLine` may also hold a reference point 3, e.g. the end point of
/// an inverse solution, see `distance_13` and `arc_length_13`.
#[derive(Clone, Debug, PartialEq)]
pub struct GeodesicLine<'a> {
    /// A reference to the underlying `Ellipsoid`.
    ellipsoid: &'a Ellipsoid,
    /// The start latitude in degrees.
    lat1: f64,
    /// The start longitude in degrees.
    lon1: f64,
    /// The start azimuth in degrees.
    azi1: f64,
    salp1: f64,
    calp1: f64,
    dn1: f64,
    /// The azimuth at the Equator.
    salp0: f64,
    calp0: f64,
    /// The square of calp0 times the second eccentricity squared.
    k2: f64,
    /// The arc length from the northward Equator crossing to the start.
    ssig1: f64,
    csig1: f64,
    /// The longitude on the auxiliary sphere from the Equator crossing.
    somg1: f64,
    comg1: f64,
    /// tau1 = sig1 + B11
    stau1: f64,
    ctau1: f64,
    a1m1: f64,
    a2m1: f64,
    a3c: f64,
    a4: f64,
    b11: f64,
    b21: f64,
    b31: f64,
    b41: f64,
    c1a: [f64; ORDER + 1],
    c1pa: [f64; ORDER + 1],
    c2a: [f64; ORDER + 1],
    c3a: [f64; ORDER],
    c4a: [f64; ORDER],
    /// The arc length to reference point 3 in degrees.
    a13: f64,
    /// The distance to reference point 3 in metres.
    s13: f64,
}

impl Validate for GeodesicLine<'_> {
    /// Test whether a `GeodesicLine` is valid.
    /// Whether the start latitude is in [-90, 90] and the start longitude
    /// and azimuth are finite.
    fn is_valid(&self) -> bool {
        self.lat1.abs() <= 90.0 && self.lon1.is_finite() && self.azi1.is_finite()
    }
}

impl<'a> GeodesicLine<'a> {
    /// Construct a `GeodesicLine` from a start position and azimuth.
    /// * `geodesic` - the `Geodesic` solver.
    /// * `lat1`, `lon1` - the start position in degrees.
    /// * `azi1` - the start azimuth in degrees.
    #[must_use]
    pub(crate) fn new(geodesic: &Geodesic<'a>, lat1: f64, lon1: f64, azi1: f64) -> Self {
        let azi1 = ang_normalize(azi1);
        // guard against underflow in salp0, -0 is converted to +0
        let (salp1, calp1) = sincosd(ang_round(azi1));
        Self::from_azimuth_components(geodesic, lat1, lon1, azi1, salp1, calp1)
    }

    /// Construct a `GeodesicLine` from a start position and the sine and
    /// cosine of the start azimuth.
    #[must_use]
    pub(crate) fn from_azimuth_components(
        geodesic: &Geodesic<'a>,
        lat1: f64,
        lon1: f64,
        azi1: f64,
        salp1: f64,
        calp1: f64,
    ) -> Self {
        let ellipsoid = geodesic.ellipsoid();
        let lat1 = lat_fix(lat1);

        let (sbet1, cbet1) = sincosd(ang_round(lat1));
        let (sbet1, cbet1) = norm(ellipsoid.one_minus_f() * sbet1, cbet1);
        // cbet1 is +epsilon at the poles
        let cbet1 = cbet1.max(TINY);
        let dn1 = libm::sqrt(1.0 + ellipsoid.ep_2() * sq(sbet1));

        // sin(alp1) * cos(bet1) = sin(alp0)
        let salp0 = salp1 * cbet1;
        let calp0 = libm::hypot(calp1, salp1 * sbet1);

        // tan(bet1) = tan(sig1) * cos(alp1), tan(omg1) = sin(alp0) * tan(sig1)
        // sig1 = 0 is the northward crossing of the Equator
        let somg1 = salp0 * sbet1;
        let comg1 = if sbet1 != 0.0 || calp1 != 0.0 {
            cbet1 * calp1
        } else {
            1.0
        };
        let (ssig1, csig1) = norm(sbet1, comg1);

        let k2 = sq(calp0) * ellipsoid.ep_2();
        let eps = epsilon(k2);

        let c1a = evaluate_coeffs_c1(eps);
        let b11 = sin_cos_series(true, ssig1, csig1, &c1a);
        let (s, c) = libm::sincos(b11);
        let c2a = evaluate_coeffs_c2(eps);
        let c3a = geodesic.c3f(eps);
        let c4a = geodesic.c4f(eps);

        Self {
            ellipsoid,
            lat1,
            lon1,
            azi1,
            salp1,
            calp1,
            dn1,
            salp0,
            calp0,
            k2,
            ssig1,
            csig1,
            somg1,
            comg1,
            stau1: ssig1 * c + csig1 * s,
            ctau1: csig1 * c - ssig1 * s,
            a1m1: evaluate_a1(eps),
            a2m1: evaluate_a2(eps),
            a3c: -ellipsoid.f() * salp0 * geodesic.a3f(eps),
            // a^2 * e^2 * cos(alpha0) * sin(alpha0)
            a4: sq(ellipsoid.a().0) * calp0 * salp0 * ellipsoid.e_2(),
            b11,
            b21: sin_cos_series(true, ssig1, csig1, &c2a),
            b31: sin_cos_series(true, ssig1, csig1, &c3a),
            b41: sin_cos_series(false, ssig1, csig1, &c4a),
            c1a,
            c1pa: evaluate_coeffs_c1p(eps),
            c2a,
            c3a,
            c4a,
            a13: f64::NAN,
            s13: f64::NAN,
        }
    }

    /// Set the distance to reference point 3, also sets its arc length.
    /// * `distance` - the distance from the start point.
    pub fn set_distance(&mut self, distance: Metres) {
        self.s13 = distance.0;
        self.a13 = self.gen_position(false, distance.0, false).arc_length.0;
    }

    /// Set the arc length to reference point 3, also sets its distance.
    /// * `arc_length` - the arc length on the auxiliary sphere from the
    ///   start point.
    pub fn set_arc_length(&mut self, arc_length: Degrees) {
        self.a13 = arc_length.0;
        self.s13 = self.gen_position(true, arc_length.0, false).distance.0;
    }

    /// Accessor for the start latitude.
    #[must_use]
    pub const fn lat1(&self) -> Degrees {
        Degrees(self.lat1)
    }

    /// Accessor for the start longitude.
    #[must_use]
    pub const fn lon1(&self) -> Degrees {
        Degrees(self.lon1)
    }

    /// Accessor for the start azimuth.
    #[must_use]
    pub fn azi1(&self) -> Degrees {
        Degrees(ang_canonical(self.azi1))
    }

    /// The azimuth of the geodesic where it crosses the Equator northward.
    #[must_use]
    pub fn azimuth_at_equator(&self) -> Degrees {
        Degrees(atan2d(self.salp0, self.calp0))
    }

    /// The distance to reference point 3, NaN if it has not been set.
    #[must_use]
    pub const fn distance_13(&self) -> Metres {
        Metres(self.s13)
    }

    /// The arc length to reference point 3, NaN if it has not been set.
    #[must_use]
    pub const fn arc_length_13(&self) -> Degrees {
        Degrees(self.a13)
    }

    /// Accessor for the underlying `Ellipsoid`.
    #[must_use]
    pub const fn ellipsoid(&self) -> &'a Ellipsoid {
        self.ellipsoid
    }

    /// The position at a distance along the `GeodesicLine`.
    /// * `distance` - the distance from the start point, may be negative.
    ///
    /// # Examples
    /// ```
    /// use ellipsoid_geodesy::{Degrees, Metres, WGS84_GEODESIC};
    ///
    /// let line = WGS84_GEODESIC
    ///     .direct_line(Degrees(1.0), Degrees(2.0), Degrees(45.0), Metres(1e7))
    ///     .unwrap();
    /// let result = line.position(Metres(line.distance_13().0 / 2.0));
    /// assert!((30.926_25 - result.lat2.0).abs() < 0.5e-5);
    /// assert!((37.546_40 - result.lon2.0).abs() < 0.5e-5);
    /// assert!((55.431_04 - result.azi2.0).abs() < 0.5e-5);
    /// ```
    #[must_use]
    pub fn position(&self, distance: Metres) -> GeodesicResult {
        self.gen_position(false, distance.0, false)
    }

    /// The position at an arc length along the `GeodesicLine`.
    /// * `arc_length` - the arc length on the auxiliary sphere from the
    ///   start point, may be negative.
    #[must_use]
    pub fn arc_position(&self, arc_length: Degrees) -> GeodesicResult {
        self.gen_position(true, arc_length.0, false)
    }

    /// The positions at a sequence of distances along the `GeodesicLine`.
    /// * `distances` - the distances from the start point.
    #[must_use]
    pub fn positions<I>(&self, distances: I) -> Vec<GeodesicResult>
    where
        I: IntoIterator<Item = Metres>,
    {
        distances
            .into_iter()
            .map(|distance| self.position(distance))
            .collect()
    }

    /// Equally spaced positions from the start point to reference point 3.
    ///
    /// The first position is the start point and the last is reference
    /// point 3. If reference point 3 has not been set, the positions are
    /// NaN.
    /// * `count` - the number of positions.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn waypoints(&self, count: usize) -> Vec<GeodesicResult> {
        match count {
            0 => Vec::new(),
            1 => vec![self.position(Metres(0.0))],
            _ => {
                let spacing = self.s13 / (count - 1) as f64;
                self.positions((0..count).map(|i| Metres(spacing * i as f64)))
            }
        }
    }

    /// The general position along the `GeodesicLine`.
    /// * `arc_mode` - whether `s12_a12` is an arc length in degrees rather
    ///   than a distance in metres.
    /// * `s12_a12` - the distance or arc length from the start point.
    /// * `unroll` - whether to return the end longitude as the start
    ///   longitude plus the longitude travelled, rather than reduced.
    ///
    /// returns the `GeodesicResult` from the start point to the position.
    #[must_use]
    #[allow(clippy::too_many_lines)]
    pub fn gen_position(&self, arc_mode: bool, s12_a12: f64, unroll: bool) -> GeodesicResult {
        let f = self.ellipsoid.f();
        let b = self.ellipsoid.b().0;

        // sig12 and, for a distance, the B1 term at sig2
        let (sig12, ssig12, csig12, b12) = if arc_mode {
            let (ssig12, csig12) = sincosd(s12_a12);
            (s12_a12 * DEGREE, ssig12, csig12, None)
        } else {
            let tau12 = s12_a12 / (b * (1.0 + self.a1m1));
            let (s, c) = libm::sincos(tau12);
            // tau2 = tau1 + tau12
            let b12 = -sin_cos_series(
                true,
                self.stau1 * c + self.ctau1 * s,
                self.ctau1 * c - self.stau1 * s,
                &self.c1pa,
            );
            let sig12 = tau12 - (b12 - self.b11);
            if f.abs() > 0.01 {
                // the reverted distance series is inaccurate for |f| > 0.01,
                // so correct sig12 with one Newton iteration
                let (ssig12, csig12) = libm::sincos(sig12);
                let ssig2 = self.ssig1 * csig12 + self.csig1 * ssig12;
                let csig2 = self.csig1 * csig12 - self.ssig1 * ssig12;
                let b12 = sin_cos_series(true, ssig2, csig2, &self.c1a);
                let serr = (1.0 + self.a1m1) * (sig12 + (b12 - self.b11)) - s12_a12 / b;
                let sig12 = sig12 - serr / libm::sqrt(1.0 + self.k2 * sq(ssig2));
                let (ssig12, csig12) = libm::sincos(sig12);
                (sig12, ssig12, csig12, None)
            } else {
                let (ssig12, csig12) = libm::sincos(sig12);
                (sig12, ssig12, csig12, Some(b12))
            }
        };

        // sig2 = sig1 + sig12
        let ssig2 = self.ssig1 * csig12 + self.csig1 * ssig12;
        let mut csig2 = self.csig1 * csig12 - self.ssig1 * ssig12;
        let dn2 = libm::sqrt(1.0 + self.k2 * sq(ssig2));
        let b12 = b12.unwrap_or_else(|| sin_cos_series(true, ssig2, csig2, &self.c1a));
        let ab1 = (1.0 + self.a1m1) * (b12 - self.b11);

        // sin(bet2) = cos(alp0) * sin(sig2)
        let sbet2 = self.calp0 * ssig2;
        let mut cbet2 = libm::hypot(self.salp0, self.calp0 * csig2);
        if cbet2 == 0.0 {
            // salp0 = 0 and csig2 = 0, break the degeneracy
            cbet2 = TINY;
            csig2 = TINY;
        }
        // tan(alp0) = cos(sig2) * tan(alp2)
        let salp2 = self.salp0;
        let calp2 = self.calp0 * csig2;

        let s12 = if arc_mode {
            b * ((1.0 + self.a1m1) * sig12 + ab1)
        } else {
            s12_a12
        };

        // tan(omg2) = sin(alp0) * tan(sig2)
        let somg2 = self.salp0 * ssig2;
        let comg2 = csig2;
        let omg12 = if unroll {
            // east going?
            let e = 1.0_f64.copysign(self.salp0);
            e * (sig12 - (libm::atan2(ssig2, csig2) - libm::atan2(self.ssig1, self.csig1))
                + (libm::atan2(e * somg2, comg2) - libm::atan2(e * self.somg1, self.comg1)))
        } else {
            libm::atan2(
                somg2 * self.comg1 - comg2 * self.somg1,
                comg2 * self.comg1 + somg2 * self.somg1,
            )
        };
        let lam12 = omg12
            + self.a3c * (sig12 + (sin_cos_series(true, ssig2, csig2, &self.c3a) - self.b31));
        let lon12 = lam12 / DEGREE;
        let (lon1, lon2) = if unroll {
            (self.lon1, self.lon1 + lon12)
        } else {
            (
                ang_canonical(self.lon1),
                ang_canonical(ang_normalize(self.lon1) + ang_normalize(lon12)),
            )
        };

        let b22 = sin_cos_series(true, ssig2, csig2, &self.c2a);
        let ab2 = (1.0 + self.a2m1) * (b22 - self.b21);
        let j12 = (self.a1m1 - self.a2m1) * sig12 + (ab1 - ab2);
        // the brackets around (csig1 * ssig2) and (ssig1 * csig2) ensure
        // accurate cancellation for coincident points
        let m12 = b
            * ((dn2 * (self.csig1 * ssig2) - self.dn1 * (self.ssig1 * csig2))
                - self.csig1 * csig2 * j12);
        let t = self.k2 * (ssig2 - self.ssig1) * (ssig2 + self.ssig1) / (self.dn1 + dn2);
        let scale12 = csig12 + (t * ssig2 - csig2 * j12) * self.ssig1 / self.dn1;
        let scale21 = csig12 - (t * self.ssig1 - self.csig1 * j12) * ssig2 / dn2;

        let b42 = sin_cos_series(false, ssig2, csig2, &self.c4a);
        let (salp12, calp12) = if self.calp0 == 0.0 || self.salp0 == 0.0 {
            // alp12 = alp2 - alp1
            (
                salp2 * self.calp1 - calp2 * self.salp1,
                calp2 * self.calp1 + salp2 * self.salp1,
            )
        } else {
            // tan(alp2 - alp1) = calp0 * salp0 * (csig1 - csig2)
            //                    / (salp0^2 + calp0^2 * csig1 * csig2)
            let dcsig = if csig12 <= 0.0 {
                self.csig1 * (1.0 - csig12) + ssig12 * self.ssig1
            } else {
                ssig12 * (self.csig1 * ssig12 / (1.0 + csig12) + self.ssig1)
            };
            (
                self.calp0 * self.salp0 * dcsig,
                sq(self.salp0) + sq(self.calp0) * self.csig1 * csig2,
            )
        };
        let area =
            self.ellipsoid.c_2() * libm::atan2(salp12, calp12) + self.a4 * (b42 - self.b41);

        GeodesicResult {
            lat1: Degrees(self.lat1),
            lon1: Degrees(lon1),
            azi1: Degrees(ang_canonical(self.azi1)),
            lat2: Degrees(atan2d(sbet2, self.ellipsoid.one_minus_f() * cbet2)),
            lon2: Degrees(lon2),
            azi2: Degrees(ang_canonical(atan2d(salp2, calp2))),
            distance: Metres(s12),
            arc_length: Degrees(if arc_mode { s12_a12 } else { sig12 / DEGREE }),
            reduced_length: Metres(m12),
            geodesic_scale12: scale12,
            geodesic_scale21: scale21,
            area,
        }
    }
}
