//! Map Surface collaborator
//!
//! The surface renders geometry and supplies already-georeferenced input
//! events. The session only calls back into it to redraw or clear shapes, to
//! show or clear the measuring path, and to fit the view to some bounds.

use landplot_core::{BoundingBox, GeoPoint, Ring};
use uuid::Uuid;

/// How a surface supports dragging shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragCapability {
    /// The surface has its own drag support and renders the drag itself
    Native,
    /// The surface only forwards pointer events; the core redraws each step
    #[default]
    Manual,
}

/// Rendering target and event source for the session
pub trait MapSurface: Send {
    /// Drag support offered for newly added shapes
    fn drag_capability(&self) -> DragCapability {
        DragCapability::Manual
    }

    /// Replace the drawn geometry of a shape
    fn redraw(&mut self, shape_id: Uuid, rings: &[Ring]);

    /// Show the distance-measuring path
    fn draw_measure_path(&mut self, points: &[GeoPoint]);

    /// Remove the distance-measuring path
    fn clear_measure_path(&mut self);

    /// Remove every drawn shape
    fn clear_shapes(&mut self);

    /// Move the view so `bounds` is visible
    fn fit_bounds(&mut self, bounds: BoundingBox);
}

/// Surface that renders nothing, for headless use
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSurface;

impl MapSurface for NullSurface {
    fn redraw(&mut self, _shape_id: Uuid, _rings: &[Ring]) {}

    fn draw_measure_path(&mut self, _points: &[GeoPoint]) {}

    fn clear_measure_path(&mut self) {}

    fn clear_shapes(&mut self) {}

    fn fit_bounds(&mut self, _bounds: BoundingBox) {}
}
