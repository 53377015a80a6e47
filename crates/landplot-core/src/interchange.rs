//! Canonical interchange format
//!
//! Shapes travel as GeoJSON-style geometry records:
//! `{ "type": "Polygon" | "MultiPolygon", "coordinates": [...] }` with
//! `[longitude, latitude]` pairs and closed rings. Internally points are
//! (lat, lng); [`to_position`] and [`from_position`] are the only places the
//! axes are swapped.
//!
//! Collections are stored as a `FeatureCollection` so that shape IDs and style
//! hints survive a save/load cycle.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{ShapeError, ShapeResult};
use crate::point::GeoPoint;
use crate::ring::Ring;
use crate::shape::{Shape, ShapeKind, ShapeStyle};

/// `[longitude, latitude]`
pub type Position = [f64; 2];

/// Geometry record in the canonical interchange format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CanonicalRecord {
    Polygon {
        coordinates: Vec<Vec<Position>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Position>>>,
    },
}

impl CanonicalRecord {
    pub fn type_name(&self) -> &'static str {
        match self {
            CanonicalRecord::Polygon { .. } => ShapeKind::Polygon.type_name(),
            CanonicalRecord::MultiPolygon { .. } => ShapeKind::MultiPolygon.type_name(),
        }
    }

    /// Parse a record from JSON text
    pub fn from_json(text: &str) -> ShapeResult<Self> {
        serde_json::from_str(text).map_err(malformed)
    }

    /// Parse a record from an already-decoded JSON value
    pub fn from_value(value: Value) -> ShapeResult<Self> {
        serde_json::from_value(value).map_err(malformed)
    }

    pub fn to_json(&self) -> ShapeResult<String> {
        serde_json::to_string(self).map_err(malformed)
    }
}

/// Internal (lat, lng) to external `[lng, lat]`
pub fn to_position(point: GeoPoint) -> Position {
    [point.lng, point.lat]
}

/// External `[lng, lat]` to internal (lat, lng)
pub fn from_position(position: Position) -> GeoPoint {
    GeoPoint::new(position[1], position[0])
}

fn ring_to_positions(ring: &Ring) -> Vec<Position> {
    ring.closed_vertices().into_iter().map(to_position).collect()
}

fn ring_from_positions(positions: &[Position]) -> ShapeResult<Ring> {
    Ring::new(positions.iter().copied().map(from_position).collect())
        .map_err(|e| ShapeError::MalformedRecord(format!("invalid ring: {}", e)))
}

/// Encode a shape's geometry
pub fn serialize(shape: &Shape) -> CanonicalRecord {
    match shape.kind() {
        ShapeKind::Polygon => CanonicalRecord::Polygon {
            coordinates: shape.rings().iter().map(ring_to_positions).collect(),
        },
        ShapeKind::MultiPolygon => CanonicalRecord::MultiPolygon {
            coordinates: shape
                .rings()
                .iter()
                .map(|r| vec![ring_to_positions(r)])
                .collect(),
        },
    }
}

/// Decode a geometry record into a new shape
pub fn deserialize(record: &CanonicalRecord) -> ShapeResult<Shape> {
    deserialize_with_id(record, Uuid::new_v4())
}

/// Decode a geometry record, keeping a known shape ID
pub fn deserialize_with_id(record: &CanonicalRecord, id: Uuid) -> ShapeResult<Shape> {
    let (kind, rings) = match record {
        CanonicalRecord::Polygon { coordinates } => {
            let rings = coordinates
                .iter()
                .map(|r| ring_from_positions(r))
                .collect::<ShapeResult<Vec<_>>>()?;
            (ShapeKind::Polygon, rings)
        }
        CanonicalRecord::MultiPolygon { coordinates } => {
            let rings = coordinates
                .iter()
                .enumerate()
                .map(|(i, member)| match member.as_slice() {
                    [ring] => ring_from_positions(ring),
                    _ => Err(ShapeError::MalformedRecord(format!(
                        "multipolygon member {} has {} rings, expected 1",
                        i,
                        member.len()
                    ))),
                })
                .collect::<ShapeResult<Vec<_>>>()?;
            (ShapeKind::MultiPolygon, rings)
        }
    };

    if rings.is_empty() {
        return Err(ShapeError::MalformedRecord(format!(
            "{} without coordinates",
            record.type_name()
        )));
    }
    Shape::with_id(id, kind, rings)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum FeatureTag {
    Feature,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum FeatureCollectionTag {
    FeatureCollection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ShapeFeature {
    #[serde(rename = "type")]
    tag: FeatureTag,
    id: Uuid,
    #[serde(default)]
    properties: Option<ShapeStyle>,
    geometry: CanonicalRecord,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ShapeFeatureCollection {
    #[serde(rename = "type")]
    tag: FeatureCollectionTag,
    features: Vec<ShapeFeature>,
}

/// Encode an ordered shape list as a FeatureCollection document
pub fn encode_collection(shapes: &[Shape]) -> ShapeResult<String> {
    let document = ShapeFeatureCollection {
        tag: FeatureCollectionTag::FeatureCollection,
        features: shapes
            .iter()
            .map(|shape| ShapeFeature {
                tag: FeatureTag::Feature,
                id: shape.id,
                properties: shape.style.clone(),
                geometry: serialize(shape),
            })
            .collect(),
    };
    serde_json::to_string(&document).map_err(malformed)
}

/// Decode a stored collection document
///
/// Accepts the FeatureCollection layout written by [`encode_collection`] and
/// the older layout of bare `[[{lat, lng}, ...], ...]` ring arrays per shape,
/// which is imported as polygons.
pub fn decode_collection(text: &str) -> ShapeResult<Vec<Shape>> {
    let value: Value = serde_json::from_str(text).map_err(malformed)?;
    match value {
        Value::Array(_) => decode_legacy(value),
        Value::Object(_) => {
            let document: ShapeFeatureCollection =
                serde_json::from_value(value).map_err(malformed)?;
            document
                .features
                .into_iter()
                .map(|feature| {
                    let mut shape = deserialize_with_id(&feature.geometry, feature.id)?;
                    shape.style = feature.properties;
                    Ok(shape)
                })
                .collect()
        }
        other => Err(ShapeError::MalformedRecord(format!(
            "expected a shape collection, found {}",
            json_kind(&other)
        ))),
    }
}

fn decode_legacy(value: Value) -> ShapeResult<Vec<Shape>> {
    let shapes: Vec<Vec<Vec<GeoPoint>>> = serde_json::from_value(value).map_err(malformed)?;
    shapes
        .into_iter()
        .map(|rings| {
            let rings = rings
                .into_iter()
                .map(|r| {
                    Ring::new(r)
                        .map_err(|e| ShapeError::MalformedRecord(format!("invalid ring: {}", e)))
                })
                .collect::<ShapeResult<Vec<_>>>()?;
            Shape::new(ShapeKind::Polygon, rings)
                .map_err(|e| ShapeError::MalformedRecord(e.to_string()))
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn malformed(e: serde_json::Error) -> ShapeError {
    ShapeError::MalformedRecord(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(points: &[(f64, f64)]) -> Ring {
        Ring::new(points.iter().map(|&(lat, lng)| GeoPoint::new(lat, lng)).collect()).unwrap()
    }

    fn block() -> Ring {
        ring(&[
            (19.0, -99.0),
            (19.0, -98.999),
            (19.001, -98.999),
            (19.001, -99.0),
        ])
    }

    #[test]
    fn test_axis_swap() {
        let p = GeoPoint::new(19.4326, -99.1332);
        assert_eq!(to_position(p), [-99.1332, 19.4326]);
        assert_eq!(from_position([-99.1332, 19.4326]), p);
    }

    #[test]
    fn test_polygon_wire_format() {
        let shape = Shape::polygon(ring(&[(1.0, 10.0), (2.0, 20.0), (3.0, 10.0)]));
        let json = serialize(&shape).to_json().unwrap();
        assert_eq!(
            json,
            r#"{"type":"Polygon","coordinates":[[[10.0,1.0],[20.0,2.0],[10.0,3.0],[10.0,1.0]]]}"#
        );
    }

    #[test]
    fn test_polygon_round_trip() {
        let hole = ring(&[
            (19.0004, -98.9996),
            (19.0004, -98.9994),
            (19.0006, -98.9994),
        ]);
        let shape = Shape::new(ShapeKind::Polygon, vec![block(), hole]).unwrap();
        let decoded = deserialize(&serialize(&shape)).unwrap();

        assert_eq!(decoded.kind(), ShapeKind::Polygon);
        assert_eq!(decoded.rings(), shape.rings());
    }

    #[test]
    fn test_multipolygon_round_trip() {
        let other = ring(&[(20.0, -100.0), (20.0, -99.9), (20.1, -99.95)]);
        let shape = Shape::new(ShapeKind::MultiPolygon, vec![block(), other]).unwrap();
        let record = serialize(&shape);
        assert_eq!(record.type_name(), "MultiPolygon");

        let decoded = deserialize(&CanonicalRecord::from_json(&record.to_json().unwrap()).unwrap())
            .unwrap();
        assert_eq!(decoded.kind(), ShapeKind::MultiPolygon);
        assert_eq!(decoded.rings(), shape.rings());
    }

    #[test]
    fn test_open_rings_accepted() {
        let record = CanonicalRecord::from_json(
            r#"{"type":"Polygon","coordinates":[[[10.0,1.0],[20.0,2.0],[10.0,3.0]]]}"#,
        )
        .unwrap();
        let shape = deserialize(&record).unwrap();
        assert_eq!(shape.outer().len(), 3);
        assert_eq!(shape.outer().vertices()[1], GeoPoint::new(2.0, 20.0));
    }

    #[test]
    fn test_unknown_type_is_malformed() {
        let result = CanonicalRecord::from_json(r#"{"type":"LineString","coordinates":[]}"#);
        assert!(matches!(result, Err(ShapeError::MalformedRecord(_))));
    }

    #[test]
    fn test_bad_positions_are_malformed() {
        let three = r#"{"type":"Polygon","coordinates":[[[1.0,2.0,3.0],[2.0,3.0],[3.0,1.0]]]}"#;
        assert!(matches!(
            CanonicalRecord::from_json(three),
            Err(ShapeError::MalformedRecord(_))
        ));

        let text = r#"{"type":"Polygon","coordinates":[[["a",2.0],[2.0,3.0],[3.0,1.0]]]}"#;
        assert!(matches!(
            CanonicalRecord::from_json(text),
            Err(ShapeError::MalformedRecord(_))
        ));
    }

    #[test]
    fn test_degenerate_geometry_is_malformed() {
        let empty = CanonicalRecord::Polygon {
            coordinates: vec![],
        };
        assert!(matches!(
            deserialize(&empty),
            Err(ShapeError::MalformedRecord(_))
        ));

        let line = CanonicalRecord::Polygon {
            coordinates: vec![vec![[0.0, 0.0], [1.0, 1.0]]],
        };
        assert!(matches!(
            deserialize(&line),
            Err(ShapeError::MalformedRecord(_))
        ));

        let holed_member = CanonicalRecord::MultiPolygon {
            coordinates: vec![vec![ring_to_positions(&block()), ring_to_positions(&block())]],
        };
        assert!(matches!(
            deserialize(&holed_member),
            Err(ShapeError::MalformedRecord(_))
        ));
    }

    #[test]
    fn test_collection_keeps_ids_and_style() {
        let first = Shape::polygon(block()).with_style(ShapeStyle {
            color: Some("#ff0000".into()),
            label: Some("north field".into()),
        });
        let second = Shape::rectangle(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.01, 0.01)).unwrap();

        let text = encode_collection(&[first.clone(), second.clone()]).unwrap();
        let decoded = decode_collection(&text).unwrap();

        assert_eq!(decoded, vec![first, second]);
    }

    #[test]
    fn test_legacy_layout_is_imported() {
        let text = r#"[[[{"lat":19.0,"lng":-99.0},{"lat":19.0,"lng":-98.999},{"lat":19.001,"lng":-98.999}]]]"#;
        let shapes = decode_collection(text).unwrap();
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].kind(), ShapeKind::Polygon);
        assert_eq!(shapes[0].outer().vertices()[2], GeoPoint::new(19.001, -98.999));
    }

    #[test]
    fn test_undecodable_collection() {
        assert!(matches!(
            decode_collection("not json"),
            Err(ShapeError::MalformedRecord(_))
        ));
        assert!(matches!(
            decode_collection("42"),
            Err(ShapeError::MalformedRecord(_))
        ));
        assert!(matches!(
            decode_collection(r#"{"type":"FeatureCollection"}"#),
            Err(ShapeError::MalformedRecord(_))
        ));
    }
}
