//! Interaction Session
//!
//! A single owner for everything that changes while the user works with the
//! map: the editable shapes, which one is current, the active gesture, the
//! distance-measuring path and the saved collection. Input arrives as typed
//! [`MapEvent`]s and is handled by an explicit state machine:
//!
//! - `Idle -> Dragging` on a press over a shape
//! - `Dragging -> Dragging` on each pointer move (relative deltas)
//! - `Dragging -> Idle` on release
//! - `Idle | Dragging -> Rotating` once exactly two touch contacts move
//! - `Rotating -> Rotating` on each two-finger move (incremental angle)
//! - `Rotating -> Idle` when fewer than two contacts remain
//!
//! Measuring is toggled independently and never modifies a shape.
//!
//! Every operation computes its result before touching state, so a failure
//! leaves the session exactly as it was.

mod drag;
mod events;

pub use drag::{Draggable, ManualDrag, NativeDrag, resolve_draggable};
pub use events::{GestureKind, MapEvent, SessionOutcome, TouchContact, contact_angle};

use std::f64::consts::{PI, TAU};
use std::sync::Arc;

use landplot_core::measure::{MeasurePath, MeasurementSnapshot, format_kilometers};
use landplot_core::transform::rotate_shape;
use landplot_core::{GeoPoint, PivotMode, Shape, ShapeError};
use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::compare::{AreaComparison, compare_latest};
use crate::config::SessionConfig;
use crate::store::{ShapeCollection, ShapeStore, StoreError};
use crate::surface::MapSurface;

/// Session-level errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// Session shared between the UI thread and event sources
pub type SharedSession = Arc<Mutex<InteractionSession>>;

/// A shape on the map together with how it is dragged
#[derive(Debug)]
pub struct EditableShape {
    shape: Shape,
    drag: Box<dyn Draggable>,
    snapshot: MeasurementSnapshot,
}

impl EditableShape {
    fn new(shape: Shape, drag: Box<dyn Draggable>) -> Self {
        let snapshot = MeasurementSnapshot::of(&shape);
        Self {
            shape,
            drag,
            snapshot,
        }
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn draggable(&self) -> &dyn Draggable {
        self.drag.as_ref()
    }

    pub fn snapshot(&self) -> MeasurementSnapshot {
        self.snapshot
    }

    /// Swap in a moved shape and refresh its measurement
    fn replace(&mut self, shape: Shape) -> MeasurementSnapshot {
        self.snapshot = MeasurementSnapshot::of(&shape);
        self.shape = shape;
        self.snapshot
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Gesture {
    Idle,
    Dragging {
        anchor: GeoPoint,
        previous: GeoPoint,
        target: Uuid,
    },
    Rotating {
        center: GeoPoint,
        start_angle: f64,
        target: Uuid,
    },
}

impl Gesture {
    fn kind(&self) -> GestureKind {
        match self {
            Gesture::Idle => GestureKind::Idle,
            Gesture::Dragging { .. } => GestureKind::Dragging,
            Gesture::Rotating { .. } => GestureKind::Rotating,
        }
    }
}

/// The process-wide interaction controller
pub struct InteractionSession {
    surface: Box<dyn MapSurface>,
    store: ShapeStore,
    pivot: PivotMode,
    distance_decimals: usize,
    layers: Vec<EditableShape>,
    current: Option<Uuid>,
    gesture: Gesture,
    measure: Option<MeasurePath>,
    collection: ShapeCollection,
}

impl InteractionSession {
    /// Start a session, loading the saved collection once
    ///
    /// Stored content that cannot be decoded is treated as absent.
    pub fn new(surface: Box<dyn MapSurface>, store: ShapeStore, config: &SessionConfig) -> Self {
        let collection = match store.load_all() {
            Ok(collection) => collection,
            Err(e) => {
                warn!("Ignoring unreadable saved shapes: {}", e);
                ShapeCollection::new()
            }
        };
        info!("Session started with {} saved shapes", collection.len());

        Self {
            surface,
            store,
            pivot: config.rotation.pivot,
            distance_decimals: config.measure.distance_decimals,
            layers: Vec::new(),
            current: None,
            gesture: Gesture::Idle,
            measure: None,
            collection,
        }
    }

    /// Wrap the session for sharing
    pub fn into_shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }

    // ============== Queries ==============

    pub fn gesture(&self) -> GestureKind {
        self.gesture.kind()
    }

    pub fn is_measuring(&self) -> bool {
        self.measure.is_some()
    }

    pub fn measure_path(&self) -> Option<&MeasurePath> {
        self.measure.as_ref()
    }

    pub fn layers(&self) -> &[EditableShape] {
        &self.layers
    }

    pub fn collection(&self) -> &ShapeCollection {
        &self.collection
    }

    pub fn pivot_mode(&self) -> PivotMode {
        self.pivot
    }

    pub fn set_pivot_mode(&mut self, pivot: PivotMode) {
        self.pivot = pivot;
    }

    /// Most recently created or edited shape
    pub fn current_shape(&self) -> Option<&Shape> {
        self.current_layer().map(EditableShape::shape)
    }

    /// Measurement of the current shape
    pub fn snapshot(&self) -> Option<MeasurementSnapshot> {
        self.current_layer().map(EditableShape::snapshot)
    }

    fn current_layer(&self) -> Option<&EditableShape> {
        self.current.and_then(|id| self.layer(id))
    }

    fn layer(&self, id: Uuid) -> Option<&EditableShape> {
        self.layers.iter().find(|l| l.shape.id == id)
    }

    // ============== Shapes ==============

    /// Make a shape editable and current
    ///
    /// The drag behavior is resolved here, once, from the surface capability.
    /// A shape whose ID is already on the map is re-identified so layers stay
    /// addressable one by one.
    pub fn add_shape(&mut self, mut shape: Shape) -> MeasurementSnapshot {
        if self.layer(shape.id).is_some() {
            let fresh = Uuid::new_v4();
            debug!("Shape {} already on the map, re-identified as {}", shape.id, fresh);
            shape.id = fresh;
        }
        let drag = resolve_draggable(self.surface.drag_capability());
        debug!("Added shape {} ({:?} drag)", shape.id, drag.capability());
        let layer = EditableShape::new(shape, drag);
        let snapshot = layer.snapshot;
        self.surface.redraw(layer.shape.id, layer.shape.rings());
        self.current = Some(layer.shape.id);
        self.layers.push(layer);
        snapshot
    }

    // ============== Events ==============

    /// Route one input event through the state machine
    pub fn handle_event(&mut self, event: MapEvent) -> SessionResult<SessionOutcome> {
        match event {
            MapEvent::ShapeCreated(shape) => Ok(SessionOutcome::ShapeAdded(self.add_shape(shape))),
            MapEvent::PressStart(point) => Ok(self.press_start(point)),
            MapEvent::PointerMove(point) => self.pointer_move(point),
            MapEvent::Release => Ok(self.release()),
            MapEvent::TouchMove(contacts) => self.touch_move(&contacts),
            MapEvent::TouchEnd { remaining } => Ok(self.touch_end(remaining)),
            MapEvent::MapClick(point) => self.map_click(point),
        }
    }

    fn press_start(&mut self, point: GeoPoint) -> SessionOutcome {
        if self.gesture != Gesture::Idle || !point.is_finite() {
            return SessionOutcome::Ignored;
        }

        // Topmost layer wins
        let Some(target) = self
            .layers
            .iter()
            .rev()
            .find(|l| l.shape.contains(point))
            .map(|l| l.shape.id)
        else {
            return SessionOutcome::Ignored;
        };

        self.gesture = Gesture::Dragging {
            anchor: point,
            previous: point,
            target,
        };
        self.current = Some(target);
        debug!("Drag started on {}", target);
        SessionOutcome::GestureStarted(GestureKind::Dragging)
    }

    fn pointer_move(&mut self, point: GeoPoint) -> SessionResult<SessionOutcome> {
        let Gesture::Dragging {
            anchor,
            previous,
            target,
        } = self.gesture
        else {
            return Ok(SessionOutcome::Ignored);
        };
        let Some(layer) = find_layer(&mut self.layers, target) else {
            return Ok(SessionOutcome::Ignored);
        };

        let moved = layer.drag.step(&layer.shape, previous, point)?;
        let redraw = layer.drag.redraws_each_step();
        let snapshot = layer.replace(moved);
        if redraw {
            self.surface.redraw(layer.shape.id, layer.shape.rings());
        }

        self.gesture = Gesture::Dragging {
            anchor,
            previous: point,
            target,
        };
        Ok(SessionOutcome::Moved(snapshot))
    }

    fn release(&mut self) -> SessionOutcome {
        let Gesture::Dragging { target, anchor, .. } = self.gesture else {
            return SessionOutcome::Ignored;
        };
        self.gesture = Gesture::Idle;
        debug!("Drag ended on {} (anchored at {:?})", target, anchor);
        self.finish_gesture(target)
    }

    fn touch_move(&mut self, contacts: &[TouchContact]) -> SessionResult<SessionOutcome> {
        match (contacts, self.gesture) {
            ([first, second], Gesture::Rotating { .. }) => {
                self.rotate_step(contact_angle(first, second))
            }
            ([first, second], _) => self.begin_rotation(contact_angle(first, second)),
            (_, Gesture::Rotating { target, .. }) if contacts.len() < 2 => {
                self.gesture = Gesture::Idle;
                Ok(self.finish_gesture(target))
            }
            _ => Ok(SessionOutcome::Ignored),
        }
    }

    fn begin_rotation(&mut self, angle: f64) -> SessionResult<SessionOutcome> {
        let target = match self.gesture {
            Gesture::Dragging { target, .. } => Some(target),
            _ => self.current,
        };
        let Some(layer) = target.and_then(|id| self.layer(id)) else {
            return Ok(SessionOutcome::Ignored);
        };
        if !angle.is_finite() {
            return Err(ShapeError::InvalidInput("touch angle must be finite".into()).into());
        }

        let center = self.pivot.shape_pivot(&layer.shape)?;
        let target = layer.shape.id;

        // Rotation takes over from any drag on the same target
        self.gesture = Gesture::Rotating {
            center,
            start_angle: angle,
            target,
        };
        self.current = Some(target);
        debug!("Rotation started on {} about {:?}", target, center);
        Ok(SessionOutcome::GestureStarted(GestureKind::Rotating))
    }

    fn rotate_step(&mut self, angle: f64) -> SessionResult<SessionOutcome> {
        let Gesture::Rotating {
            center,
            start_angle,
            target,
        } = self.gesture
        else {
            return Ok(SessionOutcome::Ignored);
        };

        let delta = wrap_angle(angle - start_angle);
        let Some(layer) = find_layer(&mut self.layers, target) else {
            return Ok(SessionOutcome::Ignored);
        };
        let turned = rotate_shape(&layer.shape, delta, center)?;
        let snapshot = layer.replace(turned);
        self.surface.redraw(layer.shape.id, layer.shape.rings());

        self.gesture = Gesture::Rotating {
            center,
            start_angle: angle,
            target,
        };
        Ok(SessionOutcome::Rotated { delta, snapshot })
    }

    fn touch_end(&mut self, remaining: usize) -> SessionOutcome {
        match self.gesture {
            Gesture::Rotating { target, .. } if remaining < 2 => {
                self.gesture = Gesture::Idle;
                debug!("Rotation ended on {}", target);
                self.finish_gesture(target)
            }
            Gesture::Dragging { .. } if remaining == 0 => self.release(),
            _ => SessionOutcome::Ignored,
        }
    }

    /// Re-measure and redraw the target once a gesture completes
    fn finish_gesture(&mut self, target: Uuid) -> SessionOutcome {
        let Some(layer) = find_layer(&mut self.layers, target) else {
            return SessionOutcome::Ignored;
        };
        let snapshot = MeasurementSnapshot::of(&layer.shape);
        layer.snapshot = snapshot;
        self.surface.redraw(layer.shape.id, layer.shape.rings());
        SessionOutcome::GestureEnded(snapshot)
    }

    // ============== Measuring ==============

    /// Turn distance measuring on or off; returns the new state
    ///
    /// Turning it off discards the path and clears it from the surface.
    pub fn toggle_measure(&mut self) -> bool {
        if self.measure.take().is_some() {
            self.surface.clear_measure_path();
            info!("Measure mode: off");
            false
        } else {
            self.measure = Some(MeasurePath::new());
            info!("Measure mode: on");
            true
        }
    }

    fn map_click(&mut self, point: GeoPoint) -> SessionResult<SessionOutcome> {
        let Some(path) = self.measure.as_mut() else {
            return Ok(SessionOutcome::Ignored);
        };
        path.push(point)?;
        self.surface.draw_measure_path(path.points());

        let distance_meters = path.distance().ok();
        if let Some(meters) = distance_meters {
            debug!(
                "Measured distance: {}",
                format_kilometers(meters, self.distance_decimals)
            );
        }
        Ok(SessionOutcome::MeasurePoint {
            points: path.len(),
            distance_meters,
        })
    }

    /// Running distance of the measuring path in meters
    pub fn measured_distance(&self) -> SessionResult<f64> {
        let path = self.measure.as_ref().ok_or(ShapeError::InsufficientPoints {
            required: 2,
            actual: 0,
        })?;
        Ok(path.distance()?)
    }

    /// Running distance formatted as kilometers
    pub fn measured_distance_label(&self) -> SessionResult<String> {
        Ok(format_kilometers(
            self.measured_distance()?,
            self.distance_decimals,
        ))
    }

    // ============== Save / Load / Compare ==============

    /// Append a snapshot of the current shape to the saved collection
    ///
    /// Each saved snapshot gets its own ID, so saving the same shape again
    /// after editing it stores a distinct record. Returns the number of saved
    /// shapes.
    pub fn save(&mut self) -> SessionResult<usize> {
        let mut shape = self
            .current_shape()
            .cloned()
            .ok_or(ShapeError::InsufficientShapes {
                required: 1,
                actual: 0,
            })?;
        shape.id = Uuid::new_v4();
        let id = shape.id;
        self.collection = self.store.append_and_persist(&self.collection, shape)?;
        info!("Saved shape {} ({} total)", id, self.collection.len());
        Ok(self.collection.len())
    }

    /// Replace the editable shapes with the saved collection
    ///
    /// Any gesture in progress is dropped, since its target may no longer
    /// exist. Returns the number of loaded shapes.
    pub fn load(&mut self) -> SessionResult<usize> {
        let collection = self.store.load_all()?;

        self.gesture = Gesture::Idle;
        self.layers.clear();
        self.current = None;
        self.surface.clear_shapes();
        for shape in collection.shapes() {
            self.add_shape(shape.clone());
        }
        self.collection = collection;
        info!("Loaded {} shapes", self.collection.len());
        Ok(self.collection.len())
    }

    /// Compare the two most recently saved shapes and frame them
    pub fn compare(&mut self) -> SessionResult<AreaComparison> {
        let comparison = compare_latest(&self.collection)?;
        self.surface.fit_bounds(comparison.bounds);
        info!(
            "Compared areas: {:.4} ha -> {:.4} ha ({:+.4} ha)",
            comparison.area_a, comparison.area_b, comparison.area_delta
        );
        Ok(comparison)
    }
}

/// Build a session and wrap it for sharing
pub fn create_shared_session(
    surface: Box<dyn MapSurface>,
    store: ShapeStore,
    config: &SessionConfig,
) -> SharedSession {
    InteractionSession::new(surface, store, config).into_shared()
}

impl std::fmt::Debug for InteractionSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionSession")
            .field("gesture", &self.gesture)
            .field("current", &self.current)
            .field("layers", &self.layers.len())
            .field("measuring", &self.measure.is_some())
            .field("saved", &self.collection.len())
            .finish()
    }
}

fn find_layer(layers: &mut [EditableShape], id: Uuid) -> Option<&mut EditableShape> {
    layers.iter_mut().find(|l| l.shape.id == id)
}

/// Normalize an angle difference into (-π, π]
fn wrap_angle(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped == -PI { PI } else { wrapped }
}
