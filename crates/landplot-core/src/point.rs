//! Coordinate value types

use std::ops::Sub;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::{ShapeError, ShapeResult};

/// A geographic coordinate in degrees (WGS84-like)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Create a point, rejecting NaN and infinite coordinates
    pub fn try_new(lat: f64, lng: f64) -> ShapeResult<Self> {
        let point = Self::new(lat, lng);
        if point.is_finite() {
            Ok(point)
        } else {
            Err(ShapeError::non_finite("coordinate"))
        }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// Shift by a (lat, lng) delta in degrees
    pub fn offset(&self, d_lat: f64, d_lng: f64) -> Self {
        Self::new(self.lat + d_lat, self.lng + d_lng)
    }

    /// Planar (lat, lng) view used by the rotation math
    pub fn to_dvec2(self) -> DVec2 {
        DVec2::new(self.lat, self.lng)
    }

    pub fn from_dvec2(v: DVec2) -> Self {
        Self::new(v.x, v.y)
    }

    /// Component-wise comparison within `epsilon` degrees
    pub fn approx_eq(&self, other: &GeoPoint, epsilon: f64) -> bool {
        (self.lat - other.lat).abs() <= epsilon && (self.lng - other.lng).abs() <= epsilon
    }
}

/// Difference between two points, as a (lat, lng) delta in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GeoDelta {
    pub d_lat: f64,
    pub d_lng: f64,
}

impl Sub for GeoPoint {
    type Output = GeoDelta;

    fn sub(self, rhs: GeoPoint) -> GeoDelta {
        GeoDelta {
            d_lat: self.lat - rhs.lat,
            d_lng: self.lng - rhs.lng,
        }
    }
}

/// Axis-aligned box in (lat, lng) space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: GeoPoint,
    pub max: GeoPoint,
}

impl BoundingBox {
    /// Smallest box holding every point, or None for an empty input
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a GeoPoint>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut bounds = Self {
            min: first,
            max: first,
        };
        for p in iter {
            bounds.min.lat = bounds.min.lat.min(p.lat);
            bounds.min.lng = bounds.min.lng.min(p.lng);
            bounds.max.lat = bounds.max.lat.max(p.lat);
            bounds.max.lng = bounds.max.lng.max(p.lng);
        }
        Some(bounds)
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.min.lat + self.max.lat) / 2.0,
            (self.min.lng + self.max.lng) / 2.0,
        )
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min: GeoPoint::new(
                self.min.lat.min(other.min.lat),
                self.min.lng.min(other.min.lng),
            ),
            max: GeoPoint::new(
                self.max.lat.max(other.max.lat),
                self.max.lng.max(other.max.lng),
            ),
        }
    }

    pub fn contains(&self, point: GeoPoint) -> bool {
        point.lat >= self.min.lat
            && point.lat <= self.max.lat
            && point.lng >= self.min.lng
            && point.lng <= self.max.lng
    }
}
