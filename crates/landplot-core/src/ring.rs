//! Closed vertex loops

use serde::{Deserialize, Serialize};

use crate::error::{ShapeError, ShapeResult};
use crate::point::{BoundingBox, GeoPoint};

/// Minimum number of distinct vertices in a valid ring
pub const MIN_RING_VERTICES: usize = 3;

/// A closed polygon boundary
///
/// Vertices are stored open: the implicit closing edge runs from the last
/// vertex back to the first, and a trailing duplicate of the first vertex is
/// dropped on construction. Vertex order is the polygon's winding order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<GeoPoint>", into = "Vec<GeoPoint>")]
pub struct Ring {
    vertices: Vec<GeoPoint>,
}

impl Ring {
    /// Build a ring, validating finiteness and vertex count
    pub fn new(mut vertices: Vec<GeoPoint>) -> ShapeResult<Self> {
        if vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }

        if let Some(bad) = vertices.iter().position(|p| !p.is_finite()) {
            return Err(ShapeError::InvalidInput(format!(
                "vertex {} has a non-finite coordinate",
                bad
            )));
        }

        let distinct = count_distinct(&vertices, MIN_RING_VERTICES);
        if distinct < MIN_RING_VERTICES {
            return Err(ShapeError::InvalidInput(format!(
                "a ring needs at least {} distinct vertices, got {}",
                MIN_RING_VERTICES, distinct
            )));
        }

        Ok(Self { vertices })
    }

    /// Vertices in order, without the closing duplicate
    pub fn vertices(&self) -> &[GeoPoint] {
        &self.vertices
    }

    /// Vertices with the first one repeated at the end
    pub fn closed_vertices(&self) -> Vec<GeoPoint> {
        let mut closed = self.vertices.clone();
        closed.push(self.vertices[0]);
        closed
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn bounds(&self) -> BoundingBox {
        let first = self.vertices[0];
        BoundingBox::from_points(&self.vertices).unwrap_or(BoundingBox {
            min: first,
            max: first,
        })
    }

    /// Same boundary traversed in the opposite direction
    pub fn reversed(&self) -> Ring {
        let mut vertices = self.vertices.clone();
        vertices.reverse();
        Ring { vertices }
    }

    /// Same boundary starting from vertex `k`
    pub fn rotated_start(&self, k: usize) -> Ring {
        let mut vertices = self.vertices.clone();
        let k = k % vertices.len();
        vertices.rotate_left(k);
        Ring { vertices }
    }

    /// Even-odd point-in-polygon test in (lng, lat) space
    pub fn contains(&self, point: GeoPoint) -> bool {
        if !self.bounds().contains(point) {
            return false;
        }

        let mut inside = false;
        let n = self.vertices.len();
        let mut j = n - 1;
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[j];
            if (a.lat > point.lat) != (b.lat > point.lat) {
                let cross_lng = (b.lng - a.lng) * (point.lat - a.lat) / (b.lat - a.lat) + a.lng;
                if point.lng < cross_lng {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }

    /// Replace every vertex through `f`, revalidating the result
    pub(crate) fn map_vertices(&self, f: impl Fn(GeoPoint) -> GeoPoint) -> ShapeResult<Ring> {
        Ring::new(self.vertices.iter().map(|&p| f(p)).collect())
    }
}

impl TryFrom<Vec<GeoPoint>> for Ring {
    type Error = ShapeError;

    fn try_from(vertices: Vec<GeoPoint>) -> ShapeResult<Self> {
        Ring::new(vertices)
    }
}

impl From<Ring> for Vec<GeoPoint> {
    fn from(ring: Ring) -> Self {
        ring.vertices
    }
}

/// Count distinct points, stopping once `enough` have been found
fn count_distinct(points: &[GeoPoint], enough: usize) -> usize {
    let mut seen: Vec<GeoPoint> = Vec::with_capacity(enough);
    for p in points {
        if !seen.contains(p) {
            seen.push(*p);
            if seen.len() >= enough {
                break;
            }
        }
    }
    seen.len()
}
