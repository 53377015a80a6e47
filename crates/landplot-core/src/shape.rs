//! Shapes: the unit of persistence and comparison

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ShapeError, ShapeResult};
use crate::point::{BoundingBox, GeoPoint};
use crate::ring::Ring;

/// Geometry type of a shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShapeKind {
    /// First ring is the outer boundary, the rest are holes
    #[default]
    Polygon,
    /// One ring per member polygon
    MultiPolygon,
}

impl ShapeKind {
    /// Interchange type tag
    pub fn type_name(&self) -> &'static str {
        match self {
            ShapeKind::Polygon => "Polygon",
            ShapeKind::MultiPolygon => "MultiPolygon",
        }
    }
}

/// Optional display hint carried alongside the geometry
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShapeStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// A polygon or multipolygon on the map
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub id: Uuid,
    kind: ShapeKind,
    rings: Vec<Ring>,
    pub style: Option<ShapeStyle>,
}

impl Shape {
    /// Create a shape with a fresh ID
    pub fn new(kind: ShapeKind, rings: Vec<Ring>) -> ShapeResult<Self> {
        Self::with_id(Uuid::new_v4(), kind, rings)
    }

    /// Create a shape with a specific ID
    pub fn with_id(id: Uuid, kind: ShapeKind, rings: Vec<Ring>) -> ShapeResult<Self> {
        if rings.is_empty() {
            return Err(ShapeError::InvalidInput("a shape needs at least one ring".into()));
        }
        Ok(Self {
            id,
            kind,
            rings,
            style: None,
        })
    }

    /// Single-ring polygon
    pub fn polygon(outer: Ring) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: ShapeKind::Polygon,
            rings: vec![outer],
            style: None,
        }
    }

    /// Axis-aligned rectangle spanned by two opposite corners
    pub fn rectangle(corner1: GeoPoint, corner2: GeoPoint) -> ShapeResult<Self> {
        let corners = vec![
            corner1,
            GeoPoint::new(corner1.lat, corner2.lng),
            corner2,
            GeoPoint::new(corner2.lat, corner1.lng),
        ];
        Ok(Self::polygon(Ring::new(corners)?))
    }

    pub fn with_style(mut self, style: ShapeStyle) -> Self {
        self.style = Some(style);
        self
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    pub fn rings(&self) -> &[Ring] {
        &self.rings
    }

    /// Outer boundary (polygon) or first member (multipolygon)
    pub fn outer(&self) -> &Ring {
        &self.rings[0]
    }

    /// Holes of a polygon; empty for a multipolygon
    pub fn holes(&self) -> &[Ring] {
        match self.kind {
            ShapeKind::Polygon => &self.rings[1..],
            ShapeKind::MultiPolygon => &[],
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.rings.iter().map(Ring::len).sum()
    }

    pub fn bounds(&self) -> BoundingBox {
        self.rings
            .iter()
            .map(Ring::bounds)
            .reduce(|a, b| a.union(&b))
            .unwrap_or_else(|| self.outer().bounds())
    }

    /// Whether `point` falls inside the shape (holes excluded)
    pub fn contains(&self, point: GeoPoint) -> bool {
        match self.kind {
            ShapeKind::Polygon => {
                self.outer().contains(point) && !self.holes().iter().any(|h| h.contains(point))
            }
            ShapeKind::MultiPolygon => self.rings.iter().any(|r| r.contains(point)),
        }
    }

    /// Same shape identity with a whole new ring set
    ///
    /// The ring count must match; rings are swapped in as a unit.
    pub fn with_rings(&self, rings: Vec<Ring>) -> ShapeResult<Shape> {
        if rings.len() != self.rings.len() {
            return Err(ShapeError::InvalidInput(format!(
                "expected {} rings, got {}",
                self.rings.len(),
                rings.len()
            )));
        }
        Ok(Shape {
            id: self.id,
            kind: self.kind,
            rings,
            style: self.style.clone(),
        })
    }
}
