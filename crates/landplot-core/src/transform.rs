//! Transform Engine
//!
//! Pure translate/rotate operations on rings and shapes. Every operation
//! returns a new ring; callers swap it in as a whole.
//!
//! Rotation is planar: (lat, lng) offsets from the pivot are treated as
//! Cartesian (x, y). This is a small-area approximation, not a rotation on
//! the sphere.

use glam::DMat2;
use serde::{Deserialize, Serialize};

use crate::error::{ShapeError, ShapeResult};
use crate::point::GeoPoint;
use crate::ring::Ring;
use crate::shape::{Shape, ShapeKind};

/// Pivot used for rotation gestures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PivotMode {
    /// Center of the ring's bounding box
    #[default]
    BoundingBoxCenter,
    /// Arithmetic mean of the ring's vertices
    Centroid,
}

impl PivotMode {
    /// Resolve the pivot point for a ring
    pub fn pivot(&self, ring: &Ring) -> ShapeResult<GeoPoint> {
        match self {
            PivotMode::BoundingBoxCenter => Ok(bounds_center(ring)),
            PivotMode::Centroid => centroid(ring),
        }
    }

    /// Resolve the pivot for a whole shape
    ///
    /// Polygons pivot on their outer ring; multipolygons on all members.
    pub fn shape_pivot(&self, shape: &Shape) -> ShapeResult<GeoPoint> {
        match (shape.kind(), self) {
            (ShapeKind::Polygon, _) => self.pivot(shape.outer()),
            (ShapeKind::MultiPolygon, PivotMode::BoundingBoxCenter) => {
                Ok(shape.bounds().center())
            }
            (ShapeKind::MultiPolygon, PivotMode::Centroid) => {
                let vertices: Vec<GeoPoint> = shape
                    .rings()
                    .iter()
                    .flat_map(|r| r.vertices().iter().copied())
                    .collect();
                centroid_of(&vertices)
            }
        }
    }
}

/// Shift every vertex by (`d_lat`, `d_lng`) degrees
pub fn translate(ring: &Ring, d_lat: f64, d_lng: f64) -> ShapeResult<Ring> {
    if !d_lat.is_finite() || !d_lng.is_finite() {
        return Err(ShapeError::non_finite("translation delta"));
    }
    ring.map_vertices(|p| p.offset(d_lat, d_lng))
}

/// Rotate every vertex about `center` by `angle` radians
///
/// Positive angles turn counter-clockwise in (lat, lng) space:
/// `lat' = lat·cos θ − lng·sin θ`, `lng' = lat·sin θ + lng·cos θ`.
pub fn rotate(ring: &Ring, angle: f64, center: GeoPoint) -> ShapeResult<Ring> {
    if !angle.is_finite() {
        return Err(ShapeError::non_finite("rotation angle"));
    }
    if !center.is_finite() {
        return Err(ShapeError::non_finite("rotation center"));
    }

    let rotation = DMat2::from_angle(angle);
    let origin = center.to_dvec2();
    ring.map_vertices(|p| GeoPoint::from_dvec2(rotation * (p.to_dvec2() - origin) + origin))
}

/// Arithmetic mean of a ring's vertices (not area-weighted)
pub fn centroid(ring: &Ring) -> ShapeResult<GeoPoint> {
    centroid_of(ring.vertices())
}

/// Arithmetic mean of a point list
pub fn centroid_of(points: &[GeoPoint]) -> ShapeResult<GeoPoint> {
    if points.is_empty() {
        return Err(ShapeError::InvalidInput("centroid of an empty ring".into()));
    }
    let n = points.len() as f64;
    let (lat, lng) = points
        .iter()
        .fold((0.0, 0.0), |(lat, lng), p| (lat + p.lat, lng + p.lng));
    Ok(GeoPoint::new(lat / n, lng / n))
}

/// Center of a ring's bounding box
pub fn bounds_center(ring: &Ring) -> GeoPoint {
    ring.bounds().center()
}

/// Translate every ring of a shape
pub fn translate_shape(shape: &Shape, d_lat: f64, d_lng: f64) -> ShapeResult<Shape> {
    let rings = shape
        .rings()
        .iter()
        .map(|r| translate(r, d_lat, d_lng))
        .collect::<ShapeResult<Vec<_>>>()?;
    shape.with_rings(rings)
}

/// Rotate every ring of a shape about a common center
pub fn rotate_shape(shape: &Shape, angle: f64, center: GeoPoint) -> ShapeResult<Shape> {
    let rings = shape
        .rings()
        .iter()
        .map(|r| rotate(r, angle, center))
        .collect::<ShapeResult<Vec<_>>>()?;
    shape.with_rings(rings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    const EPS: f64 = 1e-9;

    fn sample_ring() -> Ring {
        Ring::new(vec![
            GeoPoint::new(19.0, -99.0),
            GeoPoint::new(19.0, -98.999),
            GeoPoint::new(19.001, -98.999),
            GeoPoint::new(19.001, -99.0),
        ])
        .unwrap()
    }

    fn assert_rings_close(a: &Ring, b: &Ring) {
        assert_eq!(a.len(), b.len());
        for (p, q) in a.vertices().iter().zip(b.vertices()) {
            assert_abs_diff_eq!(p.lat, q.lat, epsilon = EPS);
            assert_abs_diff_eq!(p.lng, q.lng, epsilon = EPS);
        }
    }

    #[test]
    fn test_translate_is_invertible() {
        let ring = sample_ring();
        for (d_lat, d_lng) in [(0.5, -0.25), (-3.0, 7.125), (1e-6, 1e-6)] {
            let moved = translate(&ring, d_lat, d_lng).unwrap();
            let back = translate(&moved, -d_lat, -d_lng).unwrap();
            assert_rings_close(&back, &ring);
        }
    }

    #[test]
    fn test_translate_rejects_non_finite() {
        let ring = sample_ring();
        assert!(matches!(
            translate(&ring, f64::NAN, 0.0),
            Err(ShapeError::InvalidInput(_))
        ));
        assert!(translate(&ring, 0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_rotate_is_invertible() {
        let ring = sample_ring();
        let center = GeoPoint::new(19.0005, -98.9995);
        for angle in [0.1, -0.7, 2.5, FRAC_PI_2] {
            let turned = rotate(&ring, angle, center).unwrap();
            let back = rotate(&turned, -angle, center).unwrap();
            assert_rings_close(&back, &ring);
        }
    }

    #[test]
    fn test_rotate_quarter_turn_direction() {
        let ring = Ring::new(vec![
            GeoPoint::new(1.0, 0.0),
            GeoPoint::new(0.0, 1.0),
            GeoPoint::new(-1.0, 0.0),
        ])
        .unwrap();
        let turned = rotate(&ring, FRAC_PI_2, GeoPoint::new(0.0, 0.0)).unwrap();

        // (lat=1, lng=0) -> (lat=0, lng=1)
        assert_abs_diff_eq!(turned.vertices()[0].lat, 0.0, epsilon = EPS);
        assert_abs_diff_eq!(turned.vertices()[0].lng, 1.0, epsilon = EPS);
        // (lat=0, lng=1) -> (lat=-1, lng=0)
        assert_abs_diff_eq!(turned.vertices()[1].lat, -1.0, epsilon = EPS);
        assert_abs_diff_eq!(turned.vertices()[1].lng, 0.0, epsilon = EPS);
    }

    #[test]
    fn test_rotate_rejects_non_finite() {
        let ring = sample_ring();
        assert!(rotate(&ring, f64::NAN, GeoPoint::new(0.0, 0.0)).is_err());
        assert!(rotate(&ring, 0.1, GeoPoint::new(f64::NAN, 0.0)).is_err());
    }

    #[test]
    fn test_centroid() {
        let ring = Ring::new(vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 4.0),
            GeoPoint::new(4.0, 4.0),
            GeoPoint::new(4.0, 0.0),
            GeoPoint::new(2.0, -2.0),
        ])
        .unwrap();
        let c = centroid(&ring).unwrap();
        assert_abs_diff_eq!(c.lat, 2.0, epsilon = EPS);
        assert_abs_diff_eq!(c.lng, 1.2, epsilon = EPS);

        assert!(matches!(centroid_of(&[]), Err(ShapeError::InvalidInput(_))));
    }

    #[test]
    fn test_pivot_modes_differ() {
        let ring = Ring::new(vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 4.0),
            GeoPoint::new(4.0, 4.0),
            GeoPoint::new(4.0, 0.0),
            GeoPoint::new(2.0, -2.0),
        ])
        .unwrap();
        let bbox = PivotMode::BoundingBoxCenter.pivot(&ring).unwrap();
        let mean = PivotMode::Centroid.pivot(&ring).unwrap();
        assert_eq!(bbox, GeoPoint::new(2.0, 1.0));
        assert!(!bbox.approx_eq(&mean, 1e-6));
    }

    #[test]
    fn test_multipolygon_pivot_spans_members() {
        let a = Ring::new(vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 1.0),
            GeoPoint::new(1.0, 1.0),
            GeoPoint::new(1.0, 0.0),
        ])
        .unwrap();
        let b = translate(&a, 4.0, 0.0).unwrap();
        let multi = Shape::new(ShapeKind::MultiPolygon, vec![a.clone(), b]).unwrap();

        let pivot = PivotMode::BoundingBoxCenter.shape_pivot(&multi).unwrap();
        assert_eq!(pivot, GeoPoint::new(2.5, 0.5));
        let mean = PivotMode::Centroid.shape_pivot(&multi).unwrap();
        assert_abs_diff_eq!(mean.lat, 2.5, epsilon = EPS);

        let single = Shape::polygon(a);
        assert_eq!(
            PivotMode::BoundingBoxCenter.shape_pivot(&single).unwrap(),
            GeoPoint::new(0.5, 0.5)
        );
    }

    #[test]
    fn test_shape_transforms_keep_identity() {
        let shape = Shape::polygon(sample_ring());
        let moved = translate_shape(&shape, 0.01, 0.02).unwrap();
        assert_eq!(moved.id, shape.id);
        assert_abs_diff_eq!(
            moved.outer().vertices()[0].lat,
            19.01,
            epsilon = EPS
        );

        let turned = rotate_shape(&shape, 0.3, bounds_center(shape.outer())).unwrap();
        assert_eq!(turned.vertex_count(), shape.vertex_count());
    }
}
