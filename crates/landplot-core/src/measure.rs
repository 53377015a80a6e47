//! Measurement Engine
//!
//! Geodesic area and great-circle path distance, computed on demand from the
//! current vertices. Nothing here depends on screen state or prior calls.

use geo::orient::Direction;
use geo::{Coord, Distance, GeodesicArea, Haversine, LineString, Orient, Point, Polygon};
use serde::{Deserialize, Serialize};

use crate::error::{ShapeError, ShapeResult};
use crate::point::GeoPoint;
use crate::ring::Ring;
use crate::shape::{Shape, ShapeKind};

/// Square meters per hectare
pub const SQUARE_METERS_PER_HECTARE: f64 = 10_000.0;

/// Derived area figures for a shape; never persisted
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MeasurementSnapshot {
    pub area_square_meters: f64,
    pub hectares: f64,
}

impl MeasurementSnapshot {
    pub fn of(shape: &Shape) -> Self {
        let area_square_meters = area(shape);
        Self {
            area_square_meters,
            hectares: hectares(area_square_meters),
        }
    }
}

/// Unsigned geodesic area of a single ring in m²
pub fn ring_area(ring: &Ring) -> f64 {
    let exterior: LineString<f64> = ring
        .vertices()
        .iter()
        .map(|p| Coord { x: p.lng, y: p.lat })
        .collect::<Vec<_>>()
        .into();
    Polygon::new(exterior, vec![])
        .orient(Direction::Default)
        .geodesic_area_unsigned()
}

/// Area of a shape in m²
///
/// Polygons subtract their holes from the outer ring; multipolygons sum their
/// members. Winding never affects the result.
pub fn area(shape: &Shape) -> f64 {
    let total = match shape.kind() {
        ShapeKind::Polygon => {
            let holes: f64 = shape.holes().iter().map(ring_area).sum();
            ring_area(shape.outer()) - holes
        }
        ShapeKind::MultiPolygon => shape.rings().iter().map(ring_area).sum(),
    };
    total.max(0.0)
}

pub fn hectares(area_square_meters: f64) -> f64 {
    area_square_meters / SQUARE_METERS_PER_HECTARE
}

/// Great-circle distance between two points in meters
pub fn distance(a: GeoPoint, b: GeoPoint) -> f64 {
    Haversine.distance(Point::new(a.lng, a.lat), Point::new(b.lng, b.lat))
}

/// Cumulative great-circle distance along `points` in meters
pub fn path_distance(points: &[GeoPoint]) -> ShapeResult<f64> {
    if points.len() < 2 {
        return Err(ShapeError::InsufficientPoints {
            required: 2,
            actual: points.len(),
        });
    }
    Ok(points.windows(2).map(|w| distance(w[0], w[1])).sum())
}

/// Render meters as kilometers with a fixed number of decimals
pub fn format_kilometers(meters: f64, decimals: usize) -> String {
    format!("{:.*} km", decimals, meters / 1000.0)
}

/// Points collected while distance measuring is active
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasurePath {
    points: Vec<GeoPoint>,
}

impl MeasurePath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, point: GeoPoint) -> ShapeResult<()> {
        if !point.is_finite() {
            return Err(ShapeError::non_finite("measure point"));
        }
        self.points.push(point);
        Ok(())
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Running distance; `InsufficientPoints` until two points exist
    pub fn distance(&self) -> ShapeResult<f64> {
        path_distance(&self.points)
    }
}
