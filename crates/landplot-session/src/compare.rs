//! Area comparison of the two most recently saved shapes

use landplot_core::measure::{area, hectares};
use landplot_core::{BoundingBox, ShapeError, ShapeResult};

use crate::store::ShapeCollection;

/// Areas in hectares of the two latest saved shapes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaComparison {
    /// Older of the two shapes
    pub area_a: f64,
    /// Newer of the two shapes
    pub area_b: f64,
    /// `area_b - area_a`
    pub area_delta: f64,
    /// Bounds covering both shapes
    pub bounds: BoundingBox,
}

/// Compare the two most recently saved shapes
pub fn compare_latest(collection: &ShapeCollection) -> ShapeResult<AreaComparison> {
    let (a, b) = collection
        .latest_pair()
        .ok_or(ShapeError::InsufficientShapes {
            required: 2,
            actual: collection.len(),
        })?;

    let area_a = hectares(area(a));
    let area_b = hectares(area(b));
    Ok(AreaComparison {
        area_a,
        area_b,
        area_delta: area_b - area_a,
        bounds: a.bounds().union(&b.bounds()),
    })
}
