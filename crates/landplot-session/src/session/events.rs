//! Typed input events and their outcomes

use glam::DVec2;
use landplot_core::{GeoPoint, MeasurementSnapshot, Shape};

/// One finger on a touch screen, in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchContact {
    pub position: DVec2,
}

impl TouchContact {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            position: DVec2::new(x, y),
        }
    }
}

/// Angle of the line from the first to the second contact, in radians
pub fn contact_angle(first: &TouchContact, second: &TouchContact) -> f64 {
    let d = second.position - first.position;
    d.y.atan2(d.x)
}

/// Input delivered by the map surface
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// A shape finished drawing on the surface
    ShapeCreated(Shape),
    /// Mouse-down or touch-start at a map position
    PressStart(GeoPoint),
    /// Pointer moved to a map position
    PointerMove(GeoPoint),
    /// Mouse-up
    Release,
    /// Touch move with every active contact
    TouchMove(Vec<TouchContact>),
    /// A finger lifted; `remaining` contacts are still down
    TouchEnd { remaining: usize },
    /// Click on the map (measuring)
    MapClick(GeoPoint),
}

/// Active gesture, as visible from outside the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GestureKind {
    #[default]
    Idle,
    Dragging,
    Rotating,
}

/// What handling an event did
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    /// The event did not apply in the current state
    Ignored,
    /// A new shape became editable and current
    ShapeAdded(MeasurementSnapshot),
    /// A drag or rotation began
    GestureStarted(GestureKind),
    /// The target moved by one drag step
    Moved(MeasurementSnapshot),
    /// The target turned by `delta` radians
    Rotated {
        delta: f64,
        snapshot: MeasurementSnapshot,
    },
    /// The gesture finished; final measurement of the target
    GestureEnded(MeasurementSnapshot),
    /// A point joined the measuring path
    MeasurePoint {
        points: usize,
        distance_meters: Option<f64>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_contact_angle() {
        let a = TouchContact::new(10.0, 10.0);
        assert_abs_diff_eq!(contact_angle(&a, &TouchContact::new(20.0, 10.0)), 0.0);
        assert_abs_diff_eq!(
            contact_angle(&a, &TouchContact::new(10.0, 30.0)),
            FRAC_PI_2,
            epsilon = 1e-12
        );
    }
}
