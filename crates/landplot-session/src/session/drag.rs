//! Drag behaviors, chosen once per shape

use std::fmt::Debug;

use landplot_core::transform::translate_shape;
use landplot_core::{GeoPoint, Shape, ShapeResult};

use crate::surface::DragCapability;

/// Moves a shape by one pointer step
pub trait Draggable: Send + Sync + Debug {
    fn capability(&self) -> DragCapability;

    /// Shape moved by the relative step from `previous` to `current`
    fn step(&self, shape: &Shape, previous: GeoPoint, current: GeoPoint) -> ShapeResult<Shape> {
        let delta = current - previous;
        translate_shape(shape, delta.d_lat, delta.d_lng)
    }

    /// Whether the surface must be asked to redraw after every step
    fn redraws_each_step(&self) -> bool;
}

/// Surface draws the drag itself; the core only tracks the vertices
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeDrag;

impl Draggable for NativeDrag {
    fn capability(&self) -> DragCapability {
        DragCapability::Native
    }

    fn redraws_each_step(&self) -> bool {
        false
    }
}

/// Core moves the vertices and redraws on every pointer move
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualDrag;

impl Draggable for ManualDrag {
    fn capability(&self) -> DragCapability {
        DragCapability::Manual
    }

    fn redraws_each_step(&self) -> bool {
        true
    }
}

/// Pick the drag behavior for a surface capability
pub fn resolve_draggable(capability: DragCapability) -> Box<dyn Draggable> {
    match capability {
        DragCapability::Native => Box::new(NativeDrag),
        DragCapability::Manual => Box::new(ManualDrag),
    }
}
