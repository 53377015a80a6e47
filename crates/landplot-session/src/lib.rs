//! Landplot interaction session
//!
//! Everything stateful around the geometry core:
//! - Session: the gesture state machine driven by map events
//! - Store: the saved shape collection behind a key-value store
//! - Compare: area difference of the two latest saved shapes
//! - Config: RON-backed session settings
//! - Surface: the rendering collaborator the session calls back into

pub mod compare;
pub mod config;
pub mod logging;
pub mod session;
pub mod store;
pub mod surface;

pub use compare::{AreaComparison, compare_latest};
pub use config::{ConfigManager, SessionConfig, SharedConfig, create_shared_config};
pub use session::{
    GestureKind, InteractionSession, MapEvent, SessionError, SessionOutcome, SessionResult,
    SharedSession, TouchContact, create_shared_session,
};
pub use store::{FileStore, MemoryStore, PersistentStore, ShapeCollection, ShapeStore, StoreError};
pub use surface::{DragCapability, MapSurface, NullSurface};
