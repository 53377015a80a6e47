//! Landplot geometry core
//!
//! This crate contains the pure geometry of the map-measuring tool:
//! - GeoPoint / Ring / Shape: coordinate and polygon value types
//! - Transform Engine: translate and rotate rings about a pivot
//! - Measurement Engine: geodesic area and great-circle path distance
//! - Interchange: lossless `[lng, lat]` geometry records and stored collections

pub mod error;
pub mod interchange;
pub mod measure;
pub mod point;
pub mod ring;
pub mod shape;
pub mod transform;

pub use error::*;
pub use interchange::{CanonicalRecord, Position};
pub use measure::{MeasurePath, MeasurementSnapshot};
pub use point::*;
pub use ring::*;
pub use shape::*;
pub use transform::PivotMode;
