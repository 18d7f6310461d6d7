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

//! Divided differences of elementary functions.
//!
//! Each function returns (f(x) - f(y)) / (x - y), evaluated so that it
//! stays accurate as x approaches y and takes the value of the derivative
//! f'(x) when x == y.
//!
//! The rhumb line solver uses these to divide the change in one latitude
//! by the change in another without cancellation.

#![allow(clippy::float_cmp)]
#![allow(clippy::suboptimal_flops)]

use super::eatanhe;

/// The Gudermannian function, gd(x) = atan(sinh x).
#[must_use]
pub fn gd(x: f64) -> f64 {
    libm::atan(libm::sinh(x))
}

/// The divided difference of tan.
/// * `x`, `y` - angles in radians.
#[must_use]
pub fn d_tan(x: f64, y: f64) -> f64 {
    let d = x - y;
    let tx = libm::tan(x);
    let ty = libm::tan(y);
    let txy = tx * ty;
    if d == 0.0 {
        1.0 + txy
    } else if 2.0 * txy > -1.0 {
        (1.0 + txy) * libm::tan(d) / d
    } else {
        (tx - ty) / d
    }
}

/// The divided difference of atan.
#[must_use]
pub fn d_atan(x: f64, y: f64) -> f64 {
    let d = x - y;
    let xy = x * y;
    if d == 0.0 {
        1.0 / (1.0 + xy)
    } else if 2.0 * xy > -1.0 {
        libm::atan(d / (1.0 + xy)) / d
    } else {
        (libm::atan(x) - libm::atan(y)) / d
    }
}

/// The ratio sinh(d) / d, which is 1 at d == 0.
fn sinhc(d: f64) -> f64 {
    if d == 0.0 {
        1.0
    } else {
        libm::sinh(d) / d
    }
}

/// The divided difference of sin.
#[must_use]
pub fn d_sin(x: f64, y: f64) -> f64 {
    let d = (x - y) / 2.0;
    let s = if d == 0.0 { 1.0 } else { libm::sin(d) / d };
    libm::cos((x + y) / 2.0) * s
}

/// The divided difference of sinh.
#[must_use]
pub fn d_sinh(x: f64, y: f64) -> f64 {
    let d = (x - y) / 2.0;
    libm::cosh((x + y) / 2.0) * sinhc(d)
}

/// The divided difference of cosh.
#[must_use]
pub fn d_cosh(x: f64, y: f64) -> f64 {
    let d = (x - y) / 2.0;
    libm::sinh((x + y) / 2.0) * sinhc(d)
}

/// The divided difference of asinh.
#[must_use]
pub fn d_asinh(x: f64, y: f64) -> f64 {
    let d = x - y;
    let hx = libm::hypot(1.0, x);
    let hy = libm::hypot(1.0, y);
    if d == 0.0 {
        1.0 / hx
    } else {
        let t = if x * y > 0.0 {
            d * (x + y) / (x * hy + y * hx)
        } else {
            x * hy - y * hx
        };
        libm::asinh(t) / d
    }
}

/// The divided difference of sn(x) = x / sqrt(1 + x²), the sine of an
/// angle in terms of its tangent.
#[must_use]
pub fn d_sn(x: f64, y: f64) -> f64 {
    let hx = libm::hypot(1.0, x);
    let hy = libm::hypot(1.0, y);
    if x * y > 0.0 {
        (x + y) / ((x * hy + y * hx) * hx * hy)
    } else if x == y {
        1.0
    } else {
        (x / hx - y / hy) / (x - y)
    }
}

/// The divided difference of the Gudermannian function.
#[must_use]
pub fn d_gd(x: f64, y: f64) -> f64 {
    d_atan(libm::sinh(x), libm::sinh(y)) * d_sinh(x, y)
}

/// The divided difference of the inverse Gudermannian function,
/// gd⁻¹(x) = asinh(tan x).
#[must_use]
pub fn d_gdinv(x: f64, y: f64) -> f64 {
    d_asinh(libm::tan(x), libm::tan(y)) * d_tan(x, y)
}

/// The divided difference of the natural logarithm, for positive x and y.
#[must_use]
pub fn d_log(x: f64, y: f64) -> f64 {
    let t = x - y;
    if t == 0.0 {
        1.0 / x
    } else {
        2.0 * libm::atanh(t / (x + y)) / t
    }
}

/// The divided difference of e * atanh(e * x).
/// * `x`, `y` - the arguments.
/// * `e2` - the square of the eccentricity.
/// * `es` - the signed eccentricity.
#[must_use]
pub fn d_eatanhe(x: f64, y: f64, e2: f64, es: f64) -> f64 {
    let t = x - y;
    let d = 1.0 - e2 * x * y;
    if t == 0.0 {
        e2 / d
    } else {
        eatanhe(t / d, es) / t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use angle_sc::is_within_tolerance;

    /// The naive divided difference, accurate when x and y are well apart.
    fn naive(f: fn(f64) -> f64, x: f64, y: f64) -> f64 {
        (f(x) - f(y)) / (x - y)
    }

    #[test]
    fn test_gd() {
        assert_eq!(0.0, gd(0.0));
        assert!(is_within_tolerance(
            core::f64::consts::FRAC_PI_4,
            gd(1.0_f64.asinh()),
            f64::EPSILON
        ));
    }

    #[test]
    fn test_divided_differences_separated() {
        let pairs = [(0.3, 0.1), (-0.5, 0.7), (1.2, -1.3), (0.9, 0.2)];
        for (x, y) in pairs {
            assert!(is_within_tolerance(naive(f64::tan, x, y), d_tan(x, y), 1e-14));
            assert!(is_within_tolerance(naive(f64::atan, x, y), d_atan(x, y), 1e-14));
            assert!(is_within_tolerance(naive(f64::sin, x, y), d_sin(x, y), 1e-14));
            assert!(is_within_tolerance(naive(f64::sinh, x, y), d_sinh(x, y), 1e-14));
            assert!(is_within_tolerance(naive(f64::cosh, x, y), d_cosh(x, y), 1e-14));
            assert!(is_within_tolerance(naive(f64::asinh, x, y), d_asinh(x, y), 1e-14));
            assert!(is_within_tolerance(naive(gd, x, y), d_gd(x, y), 1e-14));
        }

        assert!(is_within_tolerance(naive(f64::ln, 2.0, 3.0), d_log(2.0, 3.0), 1e-15));
        assert!(is_within_tolerance(
            naive(|x| x.tan().asinh(), 0.4, 1.1),
            d_gdinv(0.4, 1.1),
            1e-14
        ));
    }

    #[test]
    fn test_divided_differences_coincident() {
        // the derivatives
        let x: f64 = 0.6;
        assert!(is_within_tolerance(1.0 / (x.cos() * x.cos()), d_tan(x, x), 1e-15));
        assert!(is_within_tolerance(1.0 / (1.0 + x * x), d_atan(x, x), 1e-15));
        assert!(is_within_tolerance(x.cos(), d_sin(x, x), 1e-15));
        assert!(is_within_tolerance(x.cosh(), d_sinh(x, x), 1e-15));
        assert!(is_within_tolerance(x.sinh(), d_cosh(x, x), 1e-15));
        assert!(is_within_tolerance(1.0 / x.hypot(1.0), d_asinh(x, x), 1e-15));
        assert!(is_within_tolerance(1.0 / x, d_log(x, x), 1e-15));
        assert!(is_within_tolerance(1.0 / x.cosh(), d_gd(x, x), 1e-15));
        assert!(is_within_tolerance(1.0 / x.cos(), d_gdinv(x, x), 1e-15));
    }

    #[test]
    fn test_divided_differences_nearly_coincident() {
        // the naive form loses about half the digits here
        let x: f64 = 0.6;
        let y = x + 1e-9;
        assert!(is_within_tolerance(x.cos(), d_sin(x, y), 1e-9));
        assert!(is_within_tolerance(1.0 / x.hypot(1.0), d_asinh(x, y), 1e-9));
    }

    #[test]
    fn test_d_sn() {
        let sn = |x: f64| x / x.hypot(1.0);
        assert!(is_within_tolerance(naive(sn, 0.3, 2.5), d_sn(0.3, 2.5), 1e-15));
        assert!(is_within_tolerance(naive(sn, -0.7, 1.5), d_sn(-0.7, 1.5), 1e-15));
        assert_eq!(1.0, d_sn(0.0, 0.0));
        let x: f64 = 0.6;
        assert!(is_within_tolerance(1.0 / x.hypot(1.0).powi(3), d_sn(x, x), 1e-15));

        // stays finite for the tangent of a pole
        let t = 1.0 / (f64::EPSILON * f64::EPSILON);
        let d = d_sn(t, 0.0);
        assert!(is_within_tolerance(1.0 / t, d, 1e-15 / t));
        assert!(d_sn(t, t).is_finite());
    }

    #[test]
    fn test_d_eatanhe() {
        let f: f64 = 1.0 / 298.257_223_563;
        let e2 = f * (2.0 - f);
        let es = e2.sqrt();
        let x = 0.5;
        let y = 0.2;
        assert!(is_within_tolerance(
            (eatanhe(x, es) - eatanhe(y, es)) / (x - y),
            d_eatanhe(x, y, e2, es),
            1e-14
        ));
        assert!(is_within_tolerance(
            e2 / (1.0 - e2 * x * x),
            d_eatanhe(x, x, e2, es),
            1e-17
        ));
    }
}
