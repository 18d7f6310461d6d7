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

//! The rhumb module contains types for solving the direct and inverse
//! [rhumb line](https://en.wikipedia.org/wiki/Rhumb_line) problems on an
//! ellipsoid of revolution.
//!
//! A rhumb line (loxodrome) crosses every meridian at the same azimuth.
//! Its length is found from divided differences of the rectifying and
//! isometric latitudes, which are evaluated either exactly with elliptic
//! integrals or with series in the third flattening of the ellipsoid,
//! see `LatitudeConverter`.
//!
//! See CFF Karney, [The area of rhumb polygons](https://arxiv.org/abs/2303.03219).

#![allow(clippy::float_cmp)]
#![allow(clippy::similar_names)]
#![allow(clippy::suboptimal_flops)]

use crate::ellipsoid::coefficients::{evaluate_coeffs_rhumb_area, ORDER};
use crate::geodesic::check_positions;
use crate::math::differences::{
    d_asinh, d_atan, d_cosh, d_eatanhe, d_gd, d_gdinv, d_log, d_sin, d_sn, gd,
};
use crate::math::{ang_canonical, ang_diff, ang_normalize, atan2d, lat_fix, sincosd, tand, DEGREE};
use crate::series::sin_cos_series_mean_slope;
use crate::error::{check_latitude, check_longitude};
use crate::{Ellipsoid, Result, WGS84_ELLIPSOID};
use angle_sc::{Degrees, Validate};
use core::f64::consts::FRAC_PI_2;
use icao_units::si::Metres;

/// The method used to convert between the rectifying and isometric
/// latitudes of a rhumb line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LatitudeConverter {
    /// Elliptic integrals, accurate for any flattening.
    Exact,
    /// Series of order 6 in the third flattening, accurate for |n| <= 0.01.
    #[default]
    SeriesApproximation,
}

/// The solution of a rhumb line problem.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RhumbResult {
    /// The start latitude.
    pub lat1: Degrees,
    /// The start longitude.
    pub lon1: Degrees,
    /// The end latitude.
    pub lat2: Degrees,
    /// The end longitude, NaN if the rhumb line passes through a pole.
    pub lon2: Degrees,
    /// The azimuth of the rhumb line.
    pub azimuth: Degrees,
    /// The length of the rhumb line.
    pub distance: Metres,
    /// The area between the rhumb line and the Equator in square metres.
    pub area: f64,
}

/// The rhumb line solver for an `Ellipsoid`.
#[derive(Clone, Debug, PartialEq)]
pub struct Rhumb<'a> {
    /// A reference to the underlying `Ellipsoid`.
    ellipsoid: &'a Ellipsoid,
    converter: LatitudeConverter,
    /// The area series coefficients in the conformal latitude.
    area_coeffs: [f64; ORDER + 1],
}

impl Rhumb<'static> {
    /// A rhumb line solver on the WGS-84 `Ellipsoid`, using series.
    #[must_use]
    pub fn wgs84() -> Self {
        Self::new(&WGS84_ELLIPSOID, LatitudeConverter::SeriesApproximation)
    }
}

impl<'a> Rhumb<'a> {
    /// Constructor.
    /// * `ellipsoid` - the `Ellipsoid`.
    /// * `converter` - the latitude conversion method.
    #[must_use]
    pub fn new(ellipsoid: &'a Ellipsoid, converter: LatitudeConverter) -> Self {
        if converter == LatitudeConverter::SeriesApproximation && ellipsoid.n().abs() > 0.01 {
            tracing::warn!(
                n = ellipsoid.n(),
                "rhumb line series are inaccurate for |n| > 0.01, use LatitudeConverter::Exact"
            );
        }
        Self {
            ellipsoid,
            converter,
            area_coeffs: evaluate_coeffs_rhumb_area(ellipsoid.n()),
        }
    }

    /// Accessor for the underlying `Ellipsoid`.
    #[must_use]
    pub const fn ellipsoid(&self) -> &'a Ellipsoid {
        self.ellipsoid
    }

    /// Accessor for the latitude conversion method.
    #[must_use]
    pub const fn converter(&self) -> LatitudeConverter {
        self.converter
    }

    /// Solve the inverse rhumb line problem.
    /// * `lat1`, `lon1` - the start position.
    /// * `lat2`, `lon2` - the end position.
    ///
    /// returns the `RhumbResult` with the azimuth and distance from the
    /// start to the end position, the shorter way around the Earth.
    ///
    /// # Errors
    ///
    /// `Error::DomainError` if a latitude is outside [-90, 90] or a
    /// longitude is outside [-540, 540).
    ///
    /// # Examples
    /// ```
    /// use ellipsoid_geodesy::{Degrees, WGS84_RHUMB};
    ///
    /// // JFK to LHR
    /// let result = WGS84_RHUMB
    ///     .inverse(Degrees(40.6), Degrees(-73.8), Degrees(51.6), Degrees(-0.5))
    ///     .unwrap();
    /// assert!((77.768_389_71 - result.azimuth.0).abs() < 1e-7);
    /// assert!((5_771_083.383 - result.distance.0).abs() < 1e-2);
    /// ```
    pub fn inverse(
        &self,
        lat1: Degrees,
        lon1: Degrees,
        lat2: Degrees,
        lon2: Degrees,
    ) -> Result<RhumbResult> {
        check_positions(lat1, lon1, lat2, lon2)?;
        let (lon12, _) = ang_diff(lon1.0, lon2.0);
        let psi1 = self.ellipsoid.isometric_latitude(lat1).0;
        let psi2 = self.ellipsoid.isometric_latitude(lat2).0;
        let psi12 = psi2 - psi1;
        let h = libm::hypot(lon12, psi12);
        let dmudpsi = self.d_isometric_to_rectifying(lat2.0, lat1.0);
        let distance = h * dmudpsi * self.ellipsoid.quarter_meridian().0 / 90.0;
        let area = self.ellipsoid.c_2()
            * lon12
            * DEGREE
            * self.mean_sin_xi(psi2 * DEGREE, psi1 * DEGREE);
        Ok(RhumbResult {
            lat1: Degrees(lat_fix(lat1.0)),
            lon1: Degrees(ang_canonical(lon1.0)),
            lat2: Degrees(lat_fix(lat2.0)),
            lon2: Degrees(ang_canonical(lon2.0)),
            azimuth: Degrees(ang_canonical(atan2d(lon12, psi12))),
            distance: Metres(distance),
            area,
        })
    }

    /// Solve the direct rhumb line problem.
    /// * `lat1`, `lon1` - the start position.
    /// * `azimuth` - the azimuth of the rhumb line.
    /// * `distance` - the distance along the rhumb line, may be negative.
    ///
    /// # Errors
    ///
    /// `Error::DomainError` if the latitude is outside [-90, 90] or the
    /// longitude or azimuth is outside [-540, 540).
    ///
    /// # Examples
    /// ```
    /// use ellipsoid_geodesy::{Degrees, Metres, WGS84_RHUMB};
    ///
    /// // About north east from JFK
    /// let result = WGS84_RHUMB
    ///     .direct(Degrees(40.6), Degrees(-73.8), Degrees(51.0), Metres(5.5e6))
    ///     .unwrap();
    /// assert!((71.688_899_88 - result.lat2.0).abs() < 1e-7);
    /// assert!((0.255_519_82 - result.lon2.0).abs() < 1e-7);
    /// ```
    pub fn direct(
        &self,
        lat1: Degrees,
        lon1: Degrees,
        azimuth: Degrees,
        distance: Metres,
    ) -> Result<RhumbResult> {
        Ok(self.line(lat1, lon1, azimuth)?.position(distance))
    }

    /// Construct a `RhumbLine` from a start position and azimuth.
    /// * `lat1`, `lon1` - the start position.
    /// * `azimuth` - the azimuth of the rhumb line.
    ///
    /// # Errors
    ///
    /// `Error::DomainError` if an input is out of range, see `direct`.
    pub fn line(&self, lat1: Degrees, lon1: Degrees, azimuth: Degrees) -> Result<RhumbLine<'a>> {
        check_latitude("lat1", lat1.0)?;
        check_longitude("lon1", lon1.0)?;
        check_longitude("azimuth", azimuth.0)?;
        Ok(RhumbLine::new(self.clone(), lat1.0, lon1.0, azimuth.0))
    }

    /// The divided difference of the incomplete elliptic integral of the
    /// second kind, (E(x) - E(y)) / (x - y), x and y in radians.
    fn d_e(&self, x: f64, y: f64) -> f64 {
        let ei = self.ellipsoid.elliptic();
        let d = x - y;
        if x * y <= 0.0 {
            return if d == 0.0 {
                1.0
            } else {
                (ei.e_angle(x) - ei.e_angle(y)) / d
            };
        }
        // E(x) - E(y) = E(z) - k2 * sin(x) * sin(y) * sin(z), where
        // z is given by the addition theorem for E
        let (sx, cx) = libm::sincos(x);
        let (sy, cy) = libm::sincos(y);
        let dt = d_sin(x, y) * (sx + sy)
            / ((cx + cy) * (sx * ei.delta(sy, cy) + sy * ei.delta(sx, cx)));
        let t = d * dt;
        let dsz = 2.0 * dt / (1.0 + t * t);
        let sz = d * dsz;
        let cz = (1.0 - t) * (1.0 + t) / (1.0 + t * t);
        let ez = if sz == 0.0 {
            1.0
        } else {
            ei.e(sz, cz, ei.delta(sz, cz)) / sz
        };
        (ez - ei.k2() * sx * sy) * dsz
    }

    /// The divided difference of the rectifying latitude, in radians, with
    /// respect to the tangent of the geodetic latitude.
    fn d_rectifying(&self, tx: f64, ty: f64) -> f64 {
        let f1 = self.ellipsoid.one_minus_f();
        let tbetx = f1 * tx;
        let tbety = f1 * ty;
        FRAC_PI_2 * self.ellipsoid.b().0 * f1
            * self.d_e(libm::atan(tbetx), libm::atan(tbety))
            * d_atan(tbetx, tbety)
            / self.ellipsoid.quarter_meridian().0
    }

    /// The divided difference of the isometric latitude, in radians, with
    /// respect to the tangent of the geodetic latitude.
    fn d_isometric(&self, tx: f64, ty: f64) -> f64 {
        let sx = tx / libm::hypot(1.0, tx);
        let sy = ty / libm::hypot(1.0, ty);
        d_asinh(tx, ty)
            - d_eatanhe(sx, sy, self.ellipsoid.e_2(), self.ellipsoid.es()) * d_sn(tx, ty)
    }

    /// The tangent of the geodetic latitude at a rectifying latitude.
    /// * `mu` - the rectifying latitude in degrees.
    fn rectifying_to_tan(&self, mu: f64) -> f64 {
        if mu.abs() == 90.0 {
            tand(mu)
        } else {
            let ei = self.ellipsoid.elliptic();
            libm::tan(ei.einv(mu * ei.complete() / 90.0)) / self.ellipsoid.one_minus_f()
        }
    }

    /// The divided difference of the rectifying latitude with respect to the
    /// conformal latitude, in radians.
    fn d_conformal_to_rectifying(&self, chix: f64, chiy: f64) -> f64 {
        1.0 + sin_cos_series_mean_slope(
            true,
            chix,
            chiy,
            self.ellipsoid.conformal_to_rectifying_coeffs(),
        )
        .slope
    }

    /// The divided difference of the conformal latitude with respect to the
    /// rectifying latitude, in radians.
    fn d_rectifying_to_conformal(&self, mux: f64, muy: f64) -> f64 {
        1.0 - sin_cos_series_mean_slope(
            true,
            mux,
            muy,
            self.ellipsoid.rectifying_to_conformal_coeffs(),
        )
        .slope
    }

    /// The divided difference of the rectifying latitude with respect to the
    /// isometric latitude.
    /// * `latx`, `laty` - geodetic latitudes in degrees.
    fn d_isometric_to_rectifying(&self, latx: f64, laty: f64) -> f64 {
        match self.converter {
            LatitudeConverter::Exact => {
                // tangents are finite at the poles, where tand saturates
                let tx = tand(latx);
                let ty = tand(laty);
                self.d_rectifying(tx, ty) / self.d_isometric(tx, ty)
            }
            LatitudeConverter::SeriesApproximation => {
                let psix = self.ellipsoid.isometric_latitude(Degrees(latx)).0 * DEGREE;
                let psiy = self.ellipsoid.isometric_latitude(Degrees(laty)).0 * DEGREE;
                self.d_conformal_to_rectifying(gd(psix), gd(psiy)) * d_gd(psix, psiy)
            }
        }
    }

    /// The divided difference of the isometric latitude with respect to the
    /// rectifying latitude.
    /// * `mux`, `muy` - rectifying latitudes in degrees.
    fn d_rectifying_to_isometric(&self, mux: f64, muy: f64) -> f64 {
        match self.converter {
            LatitudeConverter::Exact => {
                let tx = self.rectifying_to_tan(mux);
                let ty = self.rectifying_to_tan(muy);
                self.d_isometric(tx, ty) / self.d_rectifying(tx, ty)
            }
            LatitudeConverter::SeriesApproximation => {
                let latx = self.ellipsoid.inverse_rectifying_latitude(Degrees(mux));
                let laty = self.ellipsoid.inverse_rectifying_latitude(Degrees(muy));
                let chix = self.ellipsoid.conformal_latitude(latx).0 * DEGREE;
                let chiy = self.ellipsoid.conformal_latitude(laty).0 * DEGREE;
                d_gdinv(chix, chiy) * self.d_rectifying_to_conformal(mux * DEGREE, muy * DEGREE)
            }
        }
    }

    /// The mean of the sine of the authalic latitude over an interval of
    /// isometric latitude.
    /// * `psix`, `psiy` - isometric latitudes in radians.
    fn mean_sin_xi(&self, psix: f64, psiy: f64) -> f64 {
        d_log(libm::cosh(psix), libm::cosh(psiy)) * d_cosh(psix, psiy)
            + sin_cos_series_mean_slope(false, gd(psix), gd(psiy), &self.area_coeffs).slope
                * d_gd(psix, psiy)
    }
}

/// A rhumb line from a start position with a constant azimuth.
#[derive(Clone, Debug, PartialEq)]
pub struct RhumbLine<'a> {
    rhumb: Rhumb<'a>,
    lat1: f64,
    lon1: f64,
    azimuth: f64,
    salp: f64,
    calp: f64,
    /// The rectifying latitude of the start position, in degrees.
    mu1: f64,
    /// The isometric latitude of the start position, in degrees.
    psi1: f64,
    /// The radius of the circle of latitude of the start position.
    r1: f64,
}

impl Validate for RhumbLine<'_> {
    /// Test whether a `RhumbLine` is valid.
    /// Whether the start latitude is in [-90, 90] and the start longitude
    /// and azimuth are finite.
    fn is_valid(&self) -> bool {
        self.lat1.abs() <= 90.0 && self.lon1.is_finite() && self.azimuth.is_finite()
    }
}

impl<'a> RhumbLine<'a> {
    #[must_use]
    fn new(rhumb: Rhumb<'a>, lat1: f64, lon1: f64, azimuth: f64) -> Self {
        let lat1 = lat_fix(lat1);
        let azimuth = ang_normalize(azimuth);
        let (salp, calp) = sincosd(azimuth);
        let ellipsoid = rhumb.ellipsoid;
        Self {
            lat1,
            lon1,
            azimuth,
            salp,
            calp,
            mu1: ellipsoid.rectifying_latitude(Degrees(lat1)).0,
            psi1: ellipsoid.isometric_latitude(Degrees(lat1)).0,
            r1: ellipsoid.circle_radius(Degrees(lat1)).0,
            rhumb,
        }
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

    /// Accessor for the azimuth.
    #[must_use]
    pub fn azimuth(&self) -> Degrees {
        Degrees(ang_canonical(self.azimuth))
    }

    /// The position at a distance along the `RhumbLine`.
    /// * `distance` - the distance from the start point, may be negative.
    #[must_use]
    pub fn position(&self, distance: Metres) -> RhumbResult {
        self.gen_position(distance.0, false)
    }

    /// The general position along the `RhumbLine`.
    /// * `s12` - the distance from the start point in metres.
    /// * `unroll` - whether to return the end longitude as the start
    ///   longitude plus the longitude travelled, rather than reduced.
    ///
    /// If the rhumb line passes through a pole, the end latitude is
    /// folded back into [-90, 90] and the end longitude and area are NaN.
    #[must_use]
    pub fn gen_position(&self, s12: f64, unroll: bool) -> RhumbResult {
        let ellipsoid = self.rhumb.ellipsoid;
        let mu12 = s12 * self.calp * 90.0 / ellipsoid.quarter_meridian().0;
        let mu2 = self.mu1 + mu12;

        let (lat2, lon2, area) = if mu2.abs() <= 90.0 {
            let (lat2, lon12, psi2) = if self.calp == 0.0 {
                // along a parallel
                (self.lat1, self.salp * s12 / (self.r1 * DEGREE), self.psi1)
            } else {
                let lat2 = ellipsoid.inverse_rectifying_latitude(Degrees(mu2)).0;
                let psi12 = self
                    .rhumb
                    .d_rectifying_to_isometric(mu2, self.mu1)
                    * mu12;
                (lat2, self.salp * psi12 / self.calp, self.psi1 + psi12)
            };
            let area = ellipsoid.c_2()
                * lon12
                * DEGREE
                * self.rhumb.mean_sin_xi(self.psi1 * DEGREE, psi2 * DEGREE);
            let lon2 = if unroll {
                self.lon1 + lon12
            } else {
                ang_canonical(ang_normalize(self.lon1) + lon12)
            };
            (lat2, lon2, area)
        } else {
            // past a pole
            let mut mu2 = ang_normalize(mu2);
            if mu2.abs() > 90.0 {
                mu2 = ang_normalize(180.0 - mu2);
            }
            let lat2 = ellipsoid.inverse_rectifying_latitude(Degrees(mu2)).0;
            (lat2, f64::NAN, f64::NAN)
        };

        RhumbResult {
            lat1: Degrees(self.lat1),
            lon1: Degrees(if unroll {
                self.lon1
            } else {
                ang_canonical(self.lon1)
            }),
            lat2: Degrees(lat2),
            lon2: Degrees(lon2),
            azimuth: self.azimuth(),
            distance: Metres(s12),
            area,
        }
    }
}
