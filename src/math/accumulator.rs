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

//! An accumulator that keeps a running sum to roughly twice the precision
//! of `f64`.
//!
//! The sum is held as an unevaluated pair s + t, where t is the rounding
//! error of s. This is used for the perimeter and area of polygons, where
//! many terms of mixed sign are added.

#![allow(clippy::float_cmp)]

use super::sum;

/// A compensated sum.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Accumulator {
    s: f64,
    t: f64,
}

impl Accumulator {
    /// Construct an `Accumulator` holding a value.
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Self { s: value, t: 0.0 }
    }

    /// The current value of the sum.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.s
    }

    /// Add a value to the sum.
    pub fn add(&mut self, y: f64) {
        // add y to t, then s to the result
        let (y, u) = sum(y, self.t);
        let (s, t) = sum(y, self.s);
        self.s = s;
        self.t = t;
        // with s == 0, u can be exactly represented in s
        if self.s == 0.0 {
            self.s = u;
        } else {
            self.t += u;
        }
    }

    /// The value of the sum plus `y`, without modifying the sum.
    #[must_use]
    pub fn sum_with(&self, y: f64) -> f64 {
        let mut b = *self;
        b.add(y);
        b.s
    }

    /// Reduce the sum to the range [-y/2, y/2].
    pub fn remainder(&mut self, y: f64) {
        self.s = libm::remainder(self.s, y);
        self.add(0.0);
    }

    /// Negate the sum.
    pub fn negate(&mut self) {
        self.s = -self.s;
        self.t = -self.t;
    }
}
