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

//! The polygon module contains the `PolygonArea` type, which calculates the
//! perimeter and area of a polygon on an ellipsoid.
//!
//! The edges of the polygon are either geodesics or rhumb lines, depending
//! upon the `EdgeSolver` that the `PolygonArea` is constructed with.
//! The area is the sum of the areas between each edge and the Equator.
//! The crossings of the prime meridian are counted, so that the area of a
//! polygon which encircles a pole is corrected by half the area of the
//! ellipsoid.

#![allow(clippy::float_cmp)]

use crate::error::{check_latitude, check_longitude};
use crate::math::accumulator::Accumulator;
use crate::math::{ang_diff, ang_normalize};
use crate::{Geodesic, Result, Rhumb};
use angle_sc::Degrees;
use icao_units::si::Metres;

/// An edge of a polygon, calculated by an `EdgeSolver`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    /// The end latitude.
    pub lat2: Degrees,
    /// The end longitude. Unrolled for a direct edge.
    pub lon2: Degrees,
    /// The length of the edge.
    pub distance: Metres,
    /// The area between the edge and the Equator in square metres.
    pub area: f64,
}

/// A solver for the edges of a polygon.
pub trait EdgeSolver {
    /// The total area of the ellipsoid in square metres.
    fn ellipsoid_area(&self) -> f64;

    /// The edge between a pair of positions.
    ///
    /// # Errors
    ///
    /// If the positions are invalid or the solver fails.
    fn inverse_edge(&self, lat1: Degrees, lon1: Degrees, lat2: Degrees, lon2: Degrees)
        -> Result<Edge>;

    /// The edge from a position along an azimuth for a distance, with the end
    /// longitude unrolled.
    ///
    /// # Errors
    ///
    /// If the inputs are invalid.
    fn direct_edge(
        &self,
        lat1: Degrees,
        lon1: Degrees,
        azimuth: Degrees,
        distance: Metres,
    ) -> Result<Edge>;
}

impl EdgeSolver for Geodesic<'_> {
    fn ellipsoid_area(&self) -> f64 {
        Geodesic::ellipsoid_area(self)
    }

    fn inverse_edge(
        &self,
        lat1: Degrees,
        lon1: Degrees,
        lat2: Degrees,
        lon2: Degrees,
    ) -> Result<Edge> {
        let result = self.inverse(lat1, lon1, lat2, lon2)?;
        Ok(Edge {
            lat2: result.lat2,
            lon2: result.lon2,
            distance: result.distance,
            area: result.area,
        })
    }

    fn direct_edge(
        &self,
        lat1: Degrees,
        lon1: Degrees,
        azimuth: Degrees,
        distance: Metres,
    ) -> Result<Edge> {
        let result = self.gen_direct(lat1, lon1, azimuth, false, distance.0, true)?;
        Ok(Edge {
            lat2: result.lat2,
            lon2: result.lon2,
            distance: result.distance,
            area: result.area,
        })
    }
}

impl EdgeSolver for Rhumb<'_> {
    fn ellipsoid_area(&self) -> f64 {
        self.ellipsoid().area()
    }

    fn inverse_edge(
        &self,
        lat1: Degrees,
        lon1: Degrees,
        lat2: Degrees,
        lon2: Degrees,
    ) -> Result<Edge> {
        let result = self.inverse(lat1, lon1, lat2, lon2)?;
        Ok(Edge {
            lat2: result.lat2,
            lon2: result.lon2,
            distance: result.distance,
            area: result.area,
        })
    }

    fn direct_edge(
        &self,
        lat1: Degrees,
        lon1: Degrees,
        azimuth: Degrees,
        distance: Metres,
    ) -> Result<Edge> {
        let result = self.line(lat1, lon1, azimuth)?.gen_position(distance.0, true);
        Ok(Edge {
            lat2: result.lat2,
            lon2: result.lon2,
            distance: result.distance,
            area: result.area,
        })
    }
}

/// The perimeter and area of a polygon.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PolygonResult {
    /// The number of vertices.
    pub number: usize,
    /// The perimeter of the polygon, or the length of a polyline.
    pub perimeter: Metres,
    /// The area of the polygon in square metres, NaN for a polyline.
    pub area: f64,
}

/// Whether an inverse edge crosses the prime meridian: 1 eastward,
/// -1 westward, otherwise 0.
fn transit(lon1: f64, lon2: f64) -> i32 {
    let (lon12, _) = ang_diff(lon1, lon2);
    let lon1 = ang_normalize(lon1);
    let lon2 = ang_normalize(lon2);
    if lon12 > 0.0 && ((lon1 < 0.0 && lon2 >= 0.0) || (lon1 > 0.0 && lon2 == 0.0)) {
        1
    } else if lon12 < 0.0 && lon1 >= 0.0 && lon2 < 0.0 {
        -1
    } else {
        0
    }
}

/// The parity of the number of prime meridian crossings of a direct edge,
/// where `lon2` is unrolled from `lon1`.
fn transit_direct(lon1: f64, lon2: f64) -> i32 {
    // the parity of floor(lon2 / 360) - floor(lon1 / 360)
    let lon1 = libm::remainder(lon1, 720.0);
    let lon2 = libm::remainder(lon2, 720.0);
    i32::from(lon2 <= 0.0 && lon2 > -360.0) - i32::from(lon1 <= 0.0 && lon1 > -360.0)
}

/// Reduce a polygon area to the required range.
/// * `area` - the sum of the edge areas, clockwise positive.
/// * `crossings` - the count of prime meridian crossings.
/// * `reverse` - whether clockwise traversal is positive.
/// * `sign` - whether to return a signed area in (-area0/2, area0/2],
///   otherwise the area is in [0, area0).
/// * `area0` - the area of the ellipsoid.
fn reduce_area(mut area: Accumulator, crossings: i32, reverse: bool, sign: bool, area0: f64) -> f64 {
    area.remainder(area0);
    if crossings & 1 == 1 {
        let half_area = area0 / 2.0;
        area.add(if area.value() < 0.0 {
            half_area
        } else {
            -half_area
        });
    }
    if !reverse {
        area.negate();
    }
    if sign {
        if area.value() > area0 / 2.0 {
            area.add(-area0);
        } else if area.value() <= -area0 / 2.0 {
            area.add(area0);
        }
    } else if area.value() >= area0 {
        area.add(-area0);
    } else if area.value() < 0.0 {
        area.add(area0);
    }
    // convert -0 to 0
    0.0 + area.value()
}

/// The perimeter and area of a polygon, or the length of a polyline.
///
/// Vertices are added with `add_point`, or edges with `add_edge`.
/// The polygon is closed implicitly by `compute`, so the first vertex
/// should not be repeated.
///
/// # Examples
/// ```
/// use ellipsoid_geodesy::{Degrees, PolygonArea, WGS84_GEODESIC};
///
/// // the area inside the geodesics between three points
/// let mut polygon = PolygonArea::new(&*WGS84_GEODESIC, false);
/// polygon.add_point(Degrees(90.0), Degrees(0.0)).unwrap();
/// polygon.add_point(Degrees(0.0), Degrees(0.0)).unwrap();
/// polygon.add_point(Degrees(0.0), Degrees(90.0)).unwrap();
/// let result = polygon.compute(false, true).unwrap();
/// assert_eq!(3, result.number);
/// assert!((63_758_202_715_511.0 - result.area).abs() < 1.0);
/// ```
#[derive(Clone, Debug)]
pub struct PolygonArea<'a, S: EdgeSolver> {
    solver: &'a S,
    polyline: bool,
    /// The area of the ellipsoid.
    area0: f64,
    num: usize,
    crossings: i32,
    area_sum: Accumulator,
    perimeter_sum: Accumulator,
    lat0: f64,
    lon0: f64,
    lat1: f64,
    lon1: f64,
}

impl<'a, S: EdgeSolver> PolygonArea<'a, S> {
    /// Constructor.
    /// * `solver` - the edge solver, a `Geodesic` or a `Rhumb`.
    /// * `polyline` - whether the points define a polyline instead of a
    ///   polygon, so that only its length is calculated.
    #[must_use]
    pub fn new(solver: &'a S, polyline: bool) -> Self {
        Self {
            solver,
            polyline,
            area0: solver.ellipsoid_area(),
            num: 0,
            crossings: 0,
            area_sum: Accumulator::default(),
            perimeter_sum: Accumulator::default(),
            lat0: f64::NAN,
            lon0: f64::NAN,
            lat1: f64::NAN,
            lon1: f64::NAN,
        }
    }

    /// Remove all the vertices.
    pub fn clear(&mut self) {
        self.num = 0;
        self.crossings = 0;
        self.area_sum = Accumulator::default();
        self.perimeter_sum = Accumulator::default();
        self.lat0 = f64::NAN;
        self.lon0 = f64::NAN;
        self.lat1 = f64::NAN;
        self.lon1 = f64::NAN;
    }

    /// The number of vertices.
    #[must_use]
    pub const fn number_of_points(&self) -> usize {
        self.num
    }

    /// The latitude and longitude of the last vertex, if any.
    #[must_use]
    pub const fn current_point(&self) -> Option<(Degrees, Degrees)> {
        if self.num == 0 {
            None
        } else {
            Some((Degrees(self.lat1), Degrees(self.lon1)))
        }
    }

    /// Add a vertex.
    /// * `lat`, `lon` - the position of the vertex.
    ///
    /// # Errors
    ///
    /// `Error::DomainError` if the position is invalid, or an error from the
    /// edge solver.
    pub fn add_point(&mut self, lat: Degrees, lon: Degrees) -> Result<()> {
        if self.num == 0 {
            check_latitude("lat", lat.0)?;
            check_longitude("lon", lon.0)?;
            self.lat0 = lat.0;
            self.lon0 = lon.0;
        } else {
            let edge = self.solver.inverse_edge(
                Degrees(self.lat1),
                Degrees(self.lon1),
                lat,
                lon,
            )?;
            self.perimeter_sum.add(edge.distance.0);
            if !self.polyline {
                self.area_sum.add(edge.area);
                self.crossings += transit(self.lon1, lon.0);
            }
        }
        self.lat1 = lat.0;
        self.lon1 = lon.0;
        self.num += 1;
        Ok(())
    }

    /// Add an edge from the last vertex.
    ///
    /// Does nothing if there are no vertices.
    /// * `azimuth` - the azimuth at the last vertex.
    /// * `distance` - the length of the edge.
    ///
    /// # Errors
    ///
    /// `Error::DomainError` if the azimuth is invalid.
    pub fn add_edge(&mut self, azimuth: Degrees, distance: Metres) -> Result<()> {
        if self.num > 0 {
            let edge = self.solver.direct_edge(
                Degrees(self.lat1),
                Degrees(self.lon1),
                azimuth,
                distance,
            )?;
            self.perimeter_sum.add(distance.0);
            if !self.polyline {
                self.area_sum.add(edge.area);
                self.crossings += transit_direct(self.lon1, edge.lon2.0);
            }
            self.lat1 = edge.lat2.0;
            // the unrolled longitude may be outside the valid input range
            self.lon1 = ang_normalize(edge.lon2.0);
            self.num += 1;
        }
        Ok(())
    }

    /// Calculate the perimeter and area of the polygon.
    /// * `reverse` - whether clockwise traversal counts as a positive area.
    /// * `sign` - whether to return a signed area for a polygon traversed
    ///   in the "wrong" direction, instead of the area of the rest of the
    ///   ellipsoid.
    ///
    /// # Errors
    ///
    /// An error from the edge solver for the closing edge.
    pub fn compute(&self, reverse: bool, sign: bool) -> Result<PolygonResult> {
        if self.num < 2 {
            return Ok(self.result(self.num, 0.0, 0.0));
        }
        if self.polyline {
            return Ok(self.result(self.num, self.perimeter_sum.value(), f64::NAN));
        }

        let edge = self.solver.inverse_edge(
            Degrees(self.lat1),
            Degrees(self.lon1),
            Degrees(self.lat0),
            Degrees(self.lon0),
        )?;
        let perimeter = self.perimeter_sum.sum_with(edge.distance.0);
        let mut area = self.area_sum;
        area.add(edge.area);
        let crossings = self.crossings + transit(self.lon1, self.lon0);
        let area = reduce_area(area, crossings, reverse, sign, self.area0);
        Ok(self.result(self.num, perimeter, area))
    }

    /// Calculate the perimeter and area of the polygon with a tentative
    /// extra vertex, without adding it.
    /// * `lat`, `lon` - the position of the tentative vertex.
    /// * `reverse`, `sign` - see `compute`.
    ///
    /// # Errors
    ///
    /// `Error::DomainError` if the position is invalid, or an error from the
    /// edge solver.
    pub fn test_point(
        &self,
        lat: Degrees,
        lon: Degrees,
        reverse: bool,
        sign: bool,
    ) -> Result<PolygonResult> {
        if self.num == 0 {
            check_latitude("lat", lat.0)?;
            check_longitude("lon", lon.0)?;
            return Ok(self.result(1, 0.0, 0.0));
        }

        let mut perimeter = self.perimeter_sum.value();
        let mut area = Accumulator::new(self.area_sum.value());
        let mut crossings = self.crossings;

        let edge = self
            .solver
            .inverse_edge(Degrees(self.lat1), Degrees(self.lon1), lat, lon)?;
        perimeter += edge.distance.0;
        if self.polyline {
            return Ok(self.result(self.num + 1, perimeter, f64::NAN));
        }
        area.add(edge.area);
        crossings += transit(self.lon1, lon.0);

        let edge = self
            .solver
            .inverse_edge(lat, lon, Degrees(self.lat0), Degrees(self.lon0))?;
        perimeter += edge.distance.0;
        area.add(edge.area);
        crossings += transit(lon.0, self.lon0);

        let area = reduce_area(area, crossings, reverse, sign, self.area0);
        Ok(self.result(self.num + 1, perimeter, area))
    }

    /// Calculate the perimeter and area of the polygon with a tentative
    /// extra edge, without adding it.
    ///
    /// The perimeter and area are NaN if there are no vertices.
    /// * `azimuth` - the azimuth at the last vertex.
    /// * `distance` - the length of the edge.
    /// * `reverse`, `sign` - see `compute`.
    ///
    /// # Errors
    ///
    /// `Error::DomainError` if the azimuth is invalid, or an error from the
    /// edge solver.
    pub fn test_edge(
        &self,
        azimuth: Degrees,
        distance: Metres,
        reverse: bool,
        sign: bool,
    ) -> Result<PolygonResult> {
        if self.num == 0 {
            return Ok(self.result(0, f64::NAN, f64::NAN));
        }

        let mut perimeter = self.perimeter_sum.value() + distance.0;
        if self.polyline {
            return Ok(self.result(self.num + 1, perimeter, f64::NAN));
        }

        let mut area = Accumulator::new(self.area_sum.value());
        let mut crossings = self.crossings;

        let edge = self.solver.direct_edge(
            Degrees(self.lat1),
            Degrees(self.lon1),
            azimuth,
            distance,
        )?;
        area.add(edge.area);
        crossings += transit_direct(self.lon1, edge.lon2.0);

        let lon = ang_normalize(edge.lon2.0);
        let closing = self.solver.inverse_edge(
            edge.lat2,
            Degrees(lon),
            Degrees(self.lat0),
            Degrees(self.lon0),
        )?;
        perimeter += closing.distance.0;
        area.add(closing.area);
        crossings += transit(lon, self.lon0);

        let area = reduce_area(area, crossings, reverse, sign, self.area0);
        Ok(self.result(self.num + 1, perimeter, area))
    }

    const fn result(&self, number: usize, perimeter: f64, area: f64) -> PolygonResult {
        PolygonResult {
            number,
            perimeter: Metres(perimeter),
            area: if self.polyline { f64::NAN } else { area },
        }
    }
}
