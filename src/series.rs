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

//! The series module evaluates trigonometric series by Clenshaw summation.
//!
//! Two forms are provided:
//! - `sin_cos_series` evaluates a sine or cosine series at a single angle,
//!   given the sine and cosine of the angle. It is used by the geodesic
//!   solver.
//! - `sin_cos_series_mean_slope` evaluates the mean value and the average
//!   slope of a series between two angles. It is used by the rhumb line
//!   solver to take divided differences of the auxiliary latitudes.
//!
//! See Clenshaw, [A note on the summation of Chebyshev series](https://doi.org/10.1090/S0025-5718-1955-0071856-0)
//! and CFF Karney, [The area of rhumb polygons](https://arxiv.org/abs/2303.03219).

#![allow(clippy::many_single_char_names)]
#![allow(clippy::suboptimal_flops)]

/// Evaluate a trigonometric series at a single angle, x.
///
/// If `sinp` is true, returns sum(c\[k\] * sin(2kx), k = 1..n) where n is
/// `c.len() - 1` and `c[0]` is not used.
/// Otherwise returns sum(c\[k\] * cos((2k+1)x), k = 0..n-1) where n is
/// `c.len()`.
/// * `sinp` - true for a sine series, false for a cosine series.
/// * `sinx`, `cosx` - the sine and cosine of x.
/// * `c` - the series coefficients.
#[must_use]
pub fn sin_cos_series(sinp: bool, sinx: f64, cosx: f64, c: &[f64]) -> f64 {
    let mut k = c.len();
    let mut n = k - usize::from(sinp && k > 0);
    // 2 * cos(2x)
    let ar = 2.0 * (cosx - sinx) * (cosx + sinx);
    let mut y1 = 0.0;
    let mut y0 = if n & 1 == 1 {
        k -= 1;
        c[k]
    } else {
        0.0
    };
    n /= 2;
    while n > 0 {
        n -= 1;
        k -= 1;
        y1 = ar * y0 - y1 + c[k];
        k -= 1;
        y0 = ar * y1 - y0 + c[k];
    }
    if sinp {
        // sin(2x) * y0
        2.0 * sinx * cosx * y0
    } else {
        // cos(x) * (y0 - y1)
        cosx * (y0 - y1)
    }
}

/// The mean value and average slope of a function between two arguments.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeanSlope {
    /// (g(x) + g(y)) / 2
    pub mean: f64,
    /// (g(x) - g(y)) / (x - y), or g'(x) when x == y.
    pub slope: f64,
}

/// Evaluate the mean value and average slope of a trigonometric series
/// between two angles, x and y.
///
/// The series is g(x) = sum(c\[j\] * sin(2jx), j = 1..n) if `sinp` is true,
/// otherwise g(x) = c\[0\] + sum(c\[j\] * cos(2jx), j = 1..n), where n is
/// `c.len() - 1`.
///
/// Both terms are evaluated by a single Clenshaw recurrence on 2x2
/// matrices, so the slope remains accurate as y approaches x and equals the
/// derivative g'(x) when x == y.
/// * `sinp` - true for a sine series, false for a cosine series.
/// * `x`, `y` - the angles in radians.
/// * `c` - the series coefficients.
#[must_use]
pub fn sin_cos_series_mean_slope(sinp: bool, x: f64, y: f64, c: &[f64]) -> MeanSlope {
    let n = c.len().saturating_sub(1);
    let p = x + y;
    let d = x - y;
    let (sp, cp) = libm::sincos(p);
    let cd = libm::cos(d);
    let sd = if d == 0.0 { 1.0 } else { libm::sin(d) / d };
    let m = 2.0 * cp * cd;
    let s = sp * sd;

    // 2x2 matrices in row major order
    let a = [m, -s * d * d, -4.0 * s, m];
    let mut b0 = [0.0; 4];
    let mut b1 = [0.0; 4];
    if n > 0 {
        b0[0] = c[n];
        b0[3] = c[n];
    }
    for &cj in c.iter().take(n).skip(1).rev() {
        core::mem::swap(&mut b0, &mut b1);
        // b0 = A * b1 - b0 + c[j] * I
        b0 = [
            a[0] * b1[0] + a[1] * b1[2] - b0[0] + cj,
            a[0] * b1[1] + a[1] * b1[3] - b0[1],
            a[2] * b1[0] + a[3] * b1[2] - b0[2],
            a[2] * b1[1] + a[3] * b1[3] - b0[3] + cj,
        ];
    }

    // t = (c[0] * I - b[2]) * f[0] + b[1] * f[1], where b[1] is b0 and
    // b[2] is b1
    if sinp {
        // f[0] = [0, 0]
        let f11 = sp * cd;
        let f12 = 2.0 * sd * cp;
        MeanSlope {
            mean: b0[0] * f11 + b0[1] * f12,
            slope: b0[2] * f11 + b0[3] * f12,
        }
    } else {
        // f[0] = [1, 0]
        let c0 = c.first().copied().unwrap_or_default();
        let f11 = cp * cd;
        let f12 = -2.0 * sd * sp;
        MeanSlope {
            mean: c0 - b1[0] + b0[0] * f11 + b0[1] * f12,
            slope: -b1[2] + b0[2] * f11 + b0[3] * f12,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use angle_sc::is_within_tolerance;

    const COEFFS: [f64; 5] = [0.25, 0.5, -0.125, 0.0625, 0.03125];

    fn sin_series(x: f64) -> f64 {
        (1..COEFFS.len())
            .map(|j| COEFFS[j] * (2.0 * j as f64 * x).sin())
            .sum()
    }

    fn cos_series(x: f64) -> f64 {
        COEFFS[0]
            + (1..COEFFS.len())
                .map(|j| COEFFS[j] * (2.0 * j as f64 * x).cos())
                .sum::<f64>()
    }

    #[test]
    fn test_sin_cos_series_sine() {
        for x in [-1.2_f64, -0.3, 0.0, 0.4, 1.0, 2.5] {
            let (s, c) = x.sin_cos();
            assert!(is_within_tolerance(
                sin_series(x),
                sin_cos_series(true, s, c, &COEFFS),
                1e-15
            ));
        }
    }

    #[test]
    fn test_sin_cos_series_cosine() {
        for x in [-1.2, -0.3, 0.0, 0.4, 1.0, 2.5] {
            let expected: f64 = COEFFS
                .iter()
                .enumerate()
                .map(|(k, ck)| ck * ((2 * k + 1) as f64 * x).cos())
                .sum();
            let (s, c) = x.sin_cos();
            assert!(is_within_tolerance(
                expected,
                sin_cos_series(false, s, c, &COEFFS),
                1e-15
            ));
        }

        // an empty series
        assert_eq!(0.0, sin_cos_series(false, 0.5, 0.75_f64.sqrt(), &[]));
    }

    #[test]
    fn test_mean_slope_separated() {
        let pairs = [(0.7, 0.2), (-0.4, 1.1), (1.5, -1.5), (0.3, 0.0)];
        for (x, y) in pairs {
            let result = sin_cos_series_mean_slope(true, x, y, &COEFFS);
            assert!(is_within_tolerance(
                (sin_series(x) + sin_series(y)) / 2.0,
                result.mean,
                1e-15
            ));
            assert!(is_within_tolerance(
                (sin_series(x) - sin_series(y)) / (x - y),
                result.slope,
                1e-14
            ));

            let result = sin_cos_series_mean_slope(false, x, y, &COEFFS);
            assert!(is_within_tolerance(
                (cos_series(x) + cos_series(y)) / 2.0,
                result.mean,
                1e-15
            ));
            assert!(is_within_tolerance(
                (cos_series(x) - cos_series(y)) / (x - y),
                result.slope,
                1e-14
            ));
        }
    }

    #[test]
    fn test_mean_slope_coincident() {
        let x: f64 = 0.6;
        let sin_derivative: f64 = (1..COEFFS.len())
            .map(|j| 2.0 * j as f64 * COEFFS[j] * (2.0 * j as f64 * x).cos())
            .sum();
        let cos_derivative: f64 = (1..COEFFS.len())
            .map(|j| -2.0 * j as f64 * COEFFS[j] * (2.0 * j as f64 * x).sin())
            .sum();

        let result = sin_cos_series_mean_slope(true, x, x, &COEFFS);
        assert!(is_within_tolerance(sin_series(x), result.mean, 1e-15));
        assert!(is_within_tolerance(sin_derivative, result.slope, 1e-15));

        let result = sin_cos_series_mean_slope(false, x, x, &COEFFS);
        assert!(is_within_tolerance(cos_series(x), result.mean, 1e-15));
        assert!(is_within_tolerance(cos_derivative, result.slope, 1e-15));

        // nearly coincident: the slope tends smoothly to the derivative
        let result = sin_cos_series_mean_slope(true, x + 1e-10, x, &COEFFS);
        assert!(is_within_tolerance(sin_derivative, result.slope, 1e-9));
    }

    #[test]
    fn test_mean_slope_short_series() {
        // only c[0]
        let result = sin_cos_series_mean_slope(false, 0.7, 0.2, &[0.5]);
        assert_eq!(0.5, result.mean);
        assert_eq!(0.0, result.slope);

        let result = sin_cos_series_mean_slope(true, 0.7, 0.2, &[]);
        assert_eq!(0.0, result.mean);
        assert_eq!(0.0, result.slope);
    }
}
