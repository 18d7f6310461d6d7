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

//! The math module contains the angle kernel used by the geodesic and
//! rhumb line solvers.
//!
//! Angles are held as raw `f64` degrees. The trigonometric functions reduce
//! their arguments by exact quarter turns before converting to radians, so
//! that multiples of 90° give exact results and the round trip between
//! degrees and sine/cosine pairs loses no precision.

#![allow(clippy::float_cmp)]

pub mod accumulator;
pub mod differences;

/// The number of radians in a degree.
pub const DEGREE: f64 = core::f64::consts::PI / 180.0;

/// The square of a value.
#[must_use]
pub fn sq(x: f64) -> f64 {
    x * x
}

/// Normalize a pair of values so that they are a unit vector.
/// * `x`, `y` - the vector components.
///
/// returns the normalized (x, y) pair.
#[must_use]
pub fn norm(x: f64, y: f64) -> (f64, f64) {
    let r = libm::hypot(x, y);
    (x / r, y / r)
}

/// An error free sum of two values.
/// * `u`, `v` - the values to add.
///
/// returns (s, t) where s = round(u + v) and t is the rounding error,
/// so that s + t == u + v exactly.
#[must_use]
pub fn sum(u: f64, v: f64) -> (f64, f64) {
    let s = u + v;
    let up = s - v;
    let vpp = s - up;
    let up = up - u;
    let vpp = vpp - v;
    (s, -(up + vpp))
}

/// Evaluate a polynomial by Horner's method.
/// * `n` - the order of the polynomial.
/// * `p` - the coefficients, highest order first; `p` must hold `n + 1`
///   values.
/// * `x` - the variable.
///
/// A negative order is represented by passing an empty slice, which
/// evaluates to zero.
#[must_use]
pub fn polyval(n: usize, p: &[f64], x: f64) -> f64 {
    p.iter().take(n + 1).fold(0.0, |y, c| y * x + c)
}

/// Round an angle so that small values are represented exactly.
///
/// The smallest gap in the result is 1/2^57 degrees, about 0.7pm on the
/// Earth's surface. This removes near singular cases where an angle is
/// non-zero but tiny, e.g. 1.0e-200.
#[must_use]
pub fn ang_round(x: f64) -> f64 {
    const Z: f64 = 1.0 / 16.0;
    let mut y = x.abs();
    // z - (z - y) must not be simplified to y
    if y < Z {
        y = Z - (Z - y);
    }
    if x == 0.0 {
        0.0
    } else {
        y.copysign(x)
    }
}

/// Normalize an angle to the range (-180, 180] degrees.
#[must_use]
pub fn ang_normalize(x: f64) -> f64 {
    let y = libm::remainder(x, 360.0);
    if y == -180.0 {
        180.0
    } else {
        y
    }
}

/// Normalize an angle to the range [-180, 180) degrees.
///
/// This is the range of the longitudes and azimuths returned by the
/// solvers.
#[must_use]
pub fn ang_canonical(x: f64) -> f64 {
    let y = ang_normalize(x);
    if y >= 180.0 {
        y - 360.0
    } else {
        y
    }
}

/// Replace latitudes outside [-90, 90] degrees by NaN.
#[must_use]
pub fn lat_fix(x: f64) -> f64 {
    if x.abs() > 90.0 {
        f64::NAN
    } else {
        x
    }
}

/// The exact difference between two angles, y - x, reduced to (-180, 180].
/// * `x`, `y` - the angles in degrees.
///
/// returns (d, e) where d is the rounded difference and e is its error.
/// When the difference is ±180° its sign is taken from e, so a difference
/// of exactly 180° is positive.
#[must_use]
pub fn ang_diff(x: f64, y: f64) -> (f64, f64) {
    let (d, t) = sum(ang_normalize(-x), ang_normalize(y));
    let d = ang_normalize(d);
    if d == 180.0 && t > 0.0 {
        sum(-180.0, t)
    } else {
        sum(d, t)
    }
}

/// The sine and cosine of an angle in degrees.
///
/// The angle is reduced by quarter turns before conversion to radians, so
/// the results are exact for multiples of 90°.
/// * `x` - the angle in degrees.
///
/// returns (sin x, cos x).
#[must_use]
pub fn sincosd(x: f64) -> (f64, f64) {
    let (r, q) = libm::remquo(x, 90.0);
    let (s, c) = libm::sincos(r * DEGREE);
    let (mut sinx, mut cosx) = match q & 3 {
        0 => (s, c),
        1 => (c, -s),
        2 => (-s, -c),
        _ => (-c, s),
    };
    // replace -0 by +0
    cosx += 0.0;
    if sinx == 0.0 {
        sinx = sinx.copysign(x);
    }
    (sinx, cosx)
}

/// The two argument arc tangent in degrees.
///
/// The result is in the range [-180, 180] and is exact for the
/// axis-aligned and diagonal cases.
/// * `y`, `x` - the sine and cosine components.
#[must_use]
pub fn atan2d(y: f64, x: f64) -> f64 {
    let (mut y, mut x) = (y, x);
    let mut q = 0;
    if y.abs() > x.abs() {
        core::mem::swap(&mut x, &mut y);
        q = 2;
    }
    if x.is_sign_negative() {
        x = -x;
        q += 1;
    }
    let ang = libm::atan2(y, x) / DEGREE;
    match q {
        1 => 180.0_f64.copysign(y) - ang,
        2 => 90.0 - ang,
        3 => -90.0 + ang,
        _ => ang,
    }
}

/// The tangent of an angle in degrees.
///
/// The result is clamped to ±1/epsilon² at ±90°.
#[must_use]
pub fn tand(x: f64) -> f64 {
    let overflow = 1.0 / sq(f64::EPSILON);
    let (s, c) = sincosd(x);
    if c == 0.0 {
        overflow.copysign(s)
    } else {
        (s / c).clamp(-overflow, overflow)
    }
}

/// The arc tangent in degrees.
#[must_use]
pub fn atand(x: f64) -> f64 {
    atan2d(x, 1.0)
}

/// The function e * atanh(e * x) for a signed eccentricity.
///
/// For a prolate ellipsoid `es` is negative and the function is evaluated
/// as -e * atan(e * x).
/// * `x` - the argument.
/// * `es` - the signed eccentricity: sign(f) * sqrt(|e²|).
#[must_use]
pub fn eatanhe(x: f64, es: f64) -> f64 {
    if es > 0.0 {
        es * libm::atanh(es * x)
    } else {
        -es * libm::atan(es * x)
    }
}

/// Convert the tangent of a geodetic latitude to the tangent of the
/// corresponding conformal latitude.
/// * `tau` - tan φ.
/// * `es` - the signed eccentricity.
///
/// returns tan χ.
#[must_use]
pub fn taupf(tau: f64, es: f64) -> f64 {
    if !tau.is_finite() {
        return tau;
    }
    let tau1 = libm::hypot(1.0, tau);
    let sig = libm::sinh(eatanhe(tau / tau1, es));
    libm::hypot(1.0, sig) * tau - sig * tau1
}

/// Convert the tangent of a conformal latitude to the tangent of the
/// corresponding geodetic latitude, by Newton's method.
///
/// Converges in at most two iterations for the Earth's eccentricity; the
/// iteration count is capped at five.
/// * `taup` - tan χ.
/// * `es` - the signed eccentricity.
///
/// returns tan φ.
#[must_use]
pub fn tauf(taup: f64, es: f64) -> f64 {
    const MAX_ITERATIONS: usize = 5;
    let tol = f64::EPSILON.sqrt() / 10.0;
    let taumax = 2.0 / f64::EPSILON.sqrt();
    let e2m = 1.0 - es * es.abs();

    // for large taup, tau = exp(eatanhe(1)) * taup gives full precision
    let mut tau = if taup.abs() > 70.0 {
        taup * libm::exp(eatanhe(1.0, es))
    } else {
        taup / e2m
    };
    let stol = tol * taup.abs().max(1.0);
    if !(tau.abs() < taumax) {
        return tau;
    }
    for _ in 0..MAX_ITERATIONS {
        let taupa = taupf(tau, es);
        let dtau = (taup - taupa) * (1.0 + e2m * sq(tau))
            / (e2m * libm::hypot(1.0, tau) * libm::hypot(1.0, taupa));
        tau += dtau;
        if !(dtau.abs() >= stol) {
            break;
        }
    }
    tau
}
