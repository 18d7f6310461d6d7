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

//! The elliptic module contains Carlson's symmetric elliptic integrals and
//! the incomplete elliptic integral of the second kind, E(φ, k), with its
//! inverse.
//!
//! These give the exact meridian distance on an ellipsoid of any flattening:
//! the meridian distance to parametric latitude β is b E(β, ik'), where
//! k'² is the square of the second eccentricity.
//!
//! See BC Carlson, [Computing elliptic integrals by duplication](https://doi.org/10.1007/BF01396491)
//! and [DLMF Chapter 19](https://dlmf.nist.gov/19).

#![allow(clippy::float_cmp)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::suboptimal_flops)]

use crate::math::sincosd;
use core::f64::consts::{FRAC_PI_2, PI};

/// The maximum number of Newton iterations in `EllipticFunction::einv`.
const MAX_INVERSE_ITERATIONS: usize = 13;

/// One step of Carlson's duplication: returns lambda.
fn duplication_lambda(x: f64, y: f64, z: f64) -> f64 {
    let (sx, sy, sz) = (x.sqrt(), y.sqrt(), z.sqrt());
    sx * sy + sy * sz + sz * sx
}

/// Carlson's symmetric elliptic integral of the first kind, RF(x, y, z).
///
/// At most one of x, y, z may be zero; none may be negative.
/// * `x`, `y`, `z` - the arguments.
#[must_use]
pub fn rf(x: f64, y: f64, z: f64) -> f64 {
    let tol = (3.0 * f64::EPSILON * 0.01).powf(1.0 / 8.0);
    let a0 = (x + y + z) / 3.0;
    let mut an = a0;
    let q = (a0 - x).abs().max((a0 - y).abs()).max((a0 - z).abs()) / tol;
    let (mut x0, mut y0, mut z0) = (x, y, z);
    let mut mul = 1.0;
    // at most 6 iterations
    while q >= mul * an.abs() {
        let lam = duplication_lambda(x0, y0, z0);
        an = (an + lam) / 4.0;
        x0 = (x0 + lam) / 4.0;
        y0 = (y0 + lam) / 4.0;
        z0 = (z0 + lam) / 4.0;
        mul *= 4.0;
    }
    let xx = (a0 - x) / (mul * an);
    let yy = (a0 - y) / (mul * an);
    let zz = -(xx + yy);
    let e2 = xx * yy - zz * zz;
    let e3 = xx * yy * zz;
    // DLMF 19.36.E1 in Horner form
    (e3 * (6930.0 * e3 + e2 * (15015.0 * e2 - 16380.0) + 17160.0)
        + e2 * ((10010.0 - 5775.0 * e2) * e2 - 24024.0)
        + 240_240.0)
        / (240_240.0 * an.sqrt())
}

/// Carlson's degenerate elliptic integral of the third kind, RD(x, y, z).
///
/// At most one of x, y may be zero; z must be positive.
/// * `x`, `y`, `z` - the arguments.
#[must_use]
pub fn rd(x: f64, y: f64, z: f64) -> f64 {
    let tol = (0.2 * (f64::EPSILON * 0.01)).powf(1.0 / 8.0);
    let a0 = (x + y + 3.0 * z) / 5.0;
    let mut an = a0;
    let q = (a0 - x).abs().max((a0 - y).abs()).max((a0 - z).abs()) / tol;
    let (mut x0, mut y0, mut z0) = (x, y, z);
    let mut mul = 1.0;
    let mut s = 0.0;
    // at most 7 iterations
    while q >= mul * an.abs() {
        let lam = duplication_lambda(x0, y0, z0);
        s += 1.0 / (mul * z0.sqrt() * (z0 + lam));
        an = (an + lam) / 4.0;
        x0 = (x0 + lam) / 4.0;
        y0 = (y0 + lam) / 4.0;
        z0 = (z0 + lam) / 4.0;
        mul *= 4.0;
    }
    let xx = (a0 - x) / (mul * an);
    let yy = (a0 - y) / (mul * an);
    let zz = -(xx + yy) / 3.0;
    let e2 = xx * yy - 6.0 * zz * zz;
    let e3 = (3.0 * xx * yy - 8.0 * zz * zz) * zz;
    let e4 = 3.0 * (xx * yy - zz * zz) * zz * zz;
    let e5 = xx * yy * zz * zz * zz;
    // DLMF 19.36.E2 in Horner form
    ((471_240.0 - 540_540.0 * e2) * e5
        + (612_612.0 * e2 - 540_540.0 * e3 - 556_920.0) * e4
        + e3 * (306_306.0 * e3 + e2 * (675_675.0 * e2 - 706_860.0) + 680_680.0)
        + e2 * ((417_690.0 - 255_255.0 * e2) * e2 - 875_160.0)
        + 4_084_080.0)
        / (4_084_080.0 * mul * an * an.sqrt())
        + 3.0 * s
}

/// The elliptic integral of the second kind for a given parameter k².
///
/// k² may be negative, as it is for the meridian of an oblate ellipsoid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EllipticFunction {
    /// The parameter, k².
    k2: f64,
    /// The complementary parameter, k'² = 1 - k².
    kp2: f64,
    /// The complete integral, E(k).
    ec: f64,
    /// The first order term of the inverse series.
    eps: f64,
}

impl EllipticFunction {
    /// Construct an `EllipticFunction`.
    /// * `k2` - the parameter k², must not exceed 1.
    #[must_use]
    pub fn new(k2: f64) -> Self {
        let kp2 = 1.0 - k2;
        let ec = if kp2 == 0.0 {
            1.0
        } else {
            rf(0.0, kp2, 1.0) - k2 * rd(0.0, kp2, 1.0) / 3.0
        };
        let eps = k2 / (kp2.sqrt() + 1.0).powi(2);
        Self { k2, kp2, ec, eps }
    }

    /// The parameter, k².
    #[must_use]
    pub const fn k2(&self) -> f64 {
        self.k2
    }

    /// The complementary parameter, k'².
    #[must_use]
    pub const fn kp2(&self) -> f64 {
        self.kp2
    }

    /// The complete integral of the second kind, E(k).
    #[must_use]
    pub const fn complete(&self) -> f64 {
        self.ec
    }

    /// The function Δ = sqrt(1 - k² sin²φ).
    /// * `sn`, `cn` - sin φ and cos φ.
    #[must_use]
    pub fn delta(&self, sn: f64, cn: f64) -> f64 {
        if self.k2 < 0.0 {
            (1.0 - self.k2 * sn * sn).sqrt()
        } else {
            (self.kp2 + self.k2 * cn * cn).sqrt()
        }
    }

    /// The incomplete integral E(φ, k) in terms of Jacobi elliptic
    /// functions.
    ///
    /// E is odd in sn and satisfies E(π - φ) = 2E(k) - E(φ).
    /// * `sn`, `cn`, `dn` - sin φ, cos φ and Δ(φ).
    #[must_use]
    pub fn e(&self, sn: f64, cn: f64, dn: f64) -> f64 {
        let cn2 = cn * cn;
        let dn2 = dn * dn;
        let sn2 = sn * sn;
        let mut ei = if cn2 == 0.0 {
            self.ec
        } else if self.k2 <= 0.0 {
            // Carlson, eq. 4.6 and DLMF 19.25.E9
            sn.abs() * (rf(cn2, dn2, 1.0) - self.k2 * sn2 * rd(cn2, dn2, 1.0) / 3.0)
        } else if self.kp2 >= 0.0 {
            // DLMF 19.25.E10
            sn.abs()
                * (self.kp2 * rf(cn2, dn2, 1.0)
                    + self.k2 * self.kp2 * sn2 * rd(cn2, 1.0, dn2) / 3.0
                    + self.k2 * cn.abs() / dn)
        } else {
            // DLMF 19.25.E11
            sn.abs() * (-self.kp2 * sn2 * rd(dn2, 1.0, cn2) / 3.0 + dn / cn.abs())
        };
        if cn < 0.0 {
            ei = 2.0 * self.ec - ei;
        }
        ei.copysign(sn)
    }

    /// The incomplete integral E(φ, k) for φ in radians.
    #[must_use]
    pub fn e_angle(&self, phi: f64) -> f64 {
        if phi.abs() < PI {
            let (sn, cn) = libm::sincos(phi);
            self.e(sn, cn, self.delta(sn, cn))
        } else {
            // E(φ + nπ) = E(φ) + 2nE(k)
            let n = (phi / PI).round();
            let phi = phi - n * PI;
            let (sn, cn) = libm::sincos(phi);
            self.e(sn, cn, self.delta(sn, cn)) + 2.0 * n * self.ec
        }
    }

    /// The incomplete integral E(φ, k) for φ in degrees.
    #[must_use]
    pub fn ed(&self, ang: f64) -> f64 {
        // ang - ang_normalize(ang) is an exact multiple of 360
        let n = ((ang - crate::math::ang_normalize(ang)) / 360.0).round();
        let (sn, cn) = sincosd(ang);
        self.e(sn, cn, self.delta(sn, cn)) + 4.0 * self.ec * n
    }

    /// The inverse of E: the angle φ in radians such that E(φ, k) = x.
    #[must_use]
    pub fn einv(&self, x: f64) -> f64 {
        let tol = (f64::EPSILON * 0.01).sqrt();
        let n = (x / (2.0 * self.ec) + 0.5).floor();
        // x in [-E(k), E(k))
        let x = x - 2.0 * self.ec * n;
        // linear approximation, with first order correction
        let mut phi = FRAC_PI_2 * x / self.ec;
        phi -= self.eps * (2.0 * phi).sin() / 2.0;
        for _ in 0..MAX_INVERSE_ITERATIONS {
            let (sn, cn) = libm::sincos(phi);
            let dn = self.delta(sn, cn);
            let err = (self.e(sn, cn, dn) - x) / dn;
            phi -= err;
            if !(err.abs() > tol) {
                break;
            }
        }
        n * PI + phi
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use angle_sc::is_within_tolerance;

    #[test]
    fn test_carlson_rf_rd() {
        // Carlson (1995), Table 1 & 2
        assert!(is_within_tolerance(1.311_028_777_146_1, rf(1.0, 2.0, 0.0), 1e-13));
        assert!(is_within_tolerance(1.797_210_352_103_4, rd(0.0, 2.0, 1.0), 1e-13));

        // RF(x, x, x) = 1/sqrt(x) and RD(x, x, x) = 1/x^1.5
        assert!(is_within_tolerance(0.5, rf(4.0, 4.0, 4.0), f64::EPSILON));
        assert!(is_within_tolerance(0.125, rd(4.0, 4.0, 4.0), f64::EPSILON));

        assert!(rf(f64::NAN, 1.0, 2.0).is_nan());
    }

    #[test]
    fn test_complete_integral() {
        // E(k^2 = 0) = pi / 2
        let ef = EllipticFunction::new(0.0);
        assert!(is_within_tolerance(FRAC_PI_2, ef.complete(), 2.0 * f64::EPSILON));

        let ef = EllipticFunction::new(0.5);
        assert!(is_within_tolerance(1.350_643_881_047_675_5, ef.complete(), 1e-15));
        assert_eq!(0.5, ef.k2());
        assert_eq!(0.5, ef.kp2());

        // E(k^2 = 1) = 1
        let ef = EllipticFunction::new(1.0);
        assert_eq!(1.0, ef.complete());
    }

    #[test]
    fn test_incomplete_integral() {
        // on a circle E(phi) = phi
        let ef = EllipticFunction::new(0.0);
        for phi in [-3.0, -1.0, 0.0, 0.5, 1.5, 2.5, 7.0] {
            assert!(is_within_tolerance(phi, ef.e_angle(phi), 1e-14));
        }

        let ef = EllipticFunction::new(0.5);
        // quadrant symmetries
        assert!(is_within_tolerance(ef.complete(), ef.e_angle(FRAC_PI_2), 1e-15));
        assert!(is_within_tolerance(2.0 * ef.complete(), ef.e_angle(PI), 1e-15));
        assert!(is_within_tolerance(-ef.e_angle(0.7), ef.e_angle(-0.7), 1e-15));
        assert!(is_within_tolerance(
            2.0 * ef.complete() - ef.e_angle(0.7),
            ef.e_angle(PI - 0.7),
            1e-15
        ));

        // degrees and radians agree, including beyond one revolution
        for deg in [-400.0, -90.0, 30.0, 135.0, 370.0] {
            assert!(is_within_tolerance(
                ef.e_angle(deg * crate::math::DEGREE),
                ef.ed(deg),
                1e-14
            ));
        }
    }

    #[test]
    fn test_negative_parameter() {
        // the meridian of an oblate ellipsoid has k^2 = -ep^2
        let ep2 = 0.006_739_496_742_276_434;
        let ef = EllipticFunction::new(-ep2);
        assert!(ef.complete() > FRAC_PI_2);
        assert!(is_within_tolerance(ef.complete(), ef.ed(90.0), 1e-15));

        // E(phi) by Simpson's rule on sqrt(1 - k^2 sin^2)
        let phi: f64 = 1.0;
        let steps = 1000;
        let h = phi / f64::from(steps);
        let integrand = |t: f64| (1.0 + ep2 * t.sin() * t.sin()).sqrt();
        let mut sum = integrand(0.0) + integrand(phi);
        for i in 1..steps {
            let weight = if i % 2 == 1 { 4.0 } else { 2.0 };
            sum += weight * integrand(f64::from(i) * h);
        }
        assert!(is_within_tolerance(sum * h / 3.0, ef.e_angle(phi), 1e-13));
    }

    #[test]
    fn test_einv() {
        for k2 in [-0.0067, 0.0, 0.5] {
            let ef = EllipticFunction::new(k2);
            for phi in [-4.0, -1.2, 0.0, 0.3, 1.0, 1.5, 2.0, 6.5] {
                let x = ef.e_angle(phi);
                assert!(is_within_tolerance(phi, ef.einv(x), 1e-14));
            }
        }
    }
}
