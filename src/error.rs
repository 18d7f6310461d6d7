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

//! The error module contains the errors reported by the ellipsoid, geodesic
//! and rhumb line solvers, together with the input range checks made at the
//! public API boundary.

use thiserror::Error;

/// The errors reported by this crate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// An ellipsoid was constructed with an invalid Semimajor axis or
    /// flattening.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A latitude, longitude or azimuth was outside its permitted range.
    #[error("Domain error: {0}")]
    DomainError(String),

    /// The inverse geodesic iteration failed to converge.
    #[error("Convergence failure after {iterations} iterations")]
    ConvergenceFailure { iterations: u32 },
}

/// A `Result` with this crate's `Error` type.
pub type Result<T> = core::result::Result<T, Error>;

/// The lower bound of accepted longitudes and azimuths in degrees.
pub const MIN_LONGITUDE: f64 = -540.0;

/// The upper bound (exclusive) of accepted longitudes and azimuths in degrees.
pub const MAX_LONGITUDE: f64 = 540.0;

/// Check that a latitude lies in [-90, 90] degrees.
///
/// NaN is accepted so that it propagates to the results.
/// * `name` - the name of the parameter, used in the error message.
/// * `value` - the latitude in degrees.
///
/// # Errors
///
/// `Error::DomainError` if the latitude is outside the range.
pub fn check_latitude(name: &str, value: f64) -> Result<()> {
    if value.abs() > 90.0 {
        tracing::debug!(name, value, "latitude out of range");
        Err(Error::DomainError(format!(
            "{name}: {value} is outside [-90, 90]"
        )))
    } else {
        Ok(())
    }
}

/// Check that a longitude or azimuth lies in [-540, 540) degrees.
///
/// NaN is accepted so that it propagates to the results.
/// * `name` - the name of the parameter, used in the error message.
/// * `value` - the angle in degrees.
///
/// # Errors
///
/// `Error::DomainError` if the angle is outside the range.
pub fn check_longitude(name: &str, value: f64) -> Result<()> {
    if value < MIN_LONGITUDE || value >= MAX_LONGITUDE {
        tracing::debug!(name, value, "angle out of range");
        Err(Error::DomainError(format!(
            "{name}: {value} is outside [-540, 540)"
        )))
    } else {
        Ok(())
    }
}
