//! GeoJSON <-> geometry conversion and WKT rendering.

use super::{Geometry, Position, Ring};
use crate::error::{CoreError, CoreResult};
use serde_json::{json, Value};

const MIN_OPEN_RING: usize = 3;
const MIN_CLOSED_RING: usize = 4;

/// Translate a GeoJSON geometry object into WKT.
///
/// Only `Polygon` and `MultiPolygon` are supported; anything else is an
/// [`CoreError::UnsupportedGeometry`] the caller is expected to skip.
///
/// # Examples
/// ```
/// let geom = serde_json::json!({
///     "type": "Polygon",
///     "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]
/// });
/// assert_eq!(
///     ch_core::geojson_to_wkt(&geom).unwrap(),
///     "POLYGON((0 0, 1 0, 1 1, 0 0))"
/// );
/// ```
pub fn geojson_to_wkt(geometry: &Value) -> CoreResult<String> {
    Geometry::from_geojson(geometry).map(|g| g.to_wkt())
}

impl Geometry {
    /// Build from a GeoJSON geometry object.
    pub fn from_geojson(geometry: &Value) -> CoreResult<Self> {
        let geometry_type = geometry
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let coordinates = geometry.get("coordinates").unwrap_or(&Value::Null);

        match geometry_type {
            "Polygon" => Ok(Geometry::Polygon(polygon_rings(coordinates)?)),
            "MultiPolygon" => {
                let polygons = non_empty(as_array(coordinates, "multipolygon")?, "multipolygon")?
                    .iter()
                    .map(polygon_rings)
                    .collect::<CoreResult<Vec<_>>>()?;
                Ok(Geometry::MultiPolygon(polygons))
            }
            other => Err(CoreError::UnsupportedGeometry {
                geometry_type: if other.is_empty() {
                    "<missing>".to_string()
                } else {
                    other.to_string()
                },
            }),
        }
    }

    /// Render as a GeoJSON geometry object.
    pub fn to_geojson(&self) -> Value {
        let coordinates = match self {
            Geometry::Polygon(rings) => rings_json(rings),
            Geometry::MultiPolygon(polys) => {
                Value::Array(polys.iter().map(|rings| rings_json(rings)).collect())
            }
        };
        json!({ "type": self.type_name(), "coordinates": coordinates })
    }

    /// Render as WKT, e.g. `POLYGON((x1 y1, x2 y2, ...), (...))`.
    pub fn to_wkt(&self) -> String {
        match self {
            Geometry::Polygon(rings) => format!("POLYGON{}", polygon_wkt(rings)),
            Geometry::MultiPolygon(polys) => {
                let parts: Vec<String> = polys.iter().map(|rings| polygon_wkt(rings)).collect();
                format!("MULTIPOLYGON({})", parts.join(", "))
            }
        }
    }
}

fn polygon_wkt(rings: &[Ring]) -> String {
    let parts: Vec<String> = rings.iter().map(|ring| ring_wkt(ring)).collect();
    format!("({})", parts.join(", "))
}

fn ring_wkt(ring: &[Position]) -> String {
    let coords: Vec<String> = ring.iter().map(|p| format!("{} {}", p[0], p[1])).collect();
    format!("({})", coords.join(", "))
}

fn rings_json(rings: &[Ring]) -> Value {
    Value::Array(
        rings
            .iter()
            .map(|ring| Value::Array(ring.iter().map(|p| json!([p[0], p[1]])).collect()))
            .collect(),
    )
}

fn as_array<'a>(value: &'a Value, what: &str) -> CoreResult<&'a Vec<Value>> {
    value.as_array().ok_or_else(|| CoreError::MalformedGeometry {
        message: format!("{what} coordinates must be an array"),
    })
}

fn non_empty<'a>(values: &'a [Value], what: &str) -> CoreResult<&'a [Value]> {
    if values.is_empty() {
        Err(CoreError::MalformedGeometry {
            message: format!("{what} has no coordinates"),
        })
    } else {
        Ok(values)
    }
}

fn polygon_rings(value: &Value) -> CoreResult<Vec<Ring>> {
    non_empty(as_array(value, "polygon")?, "polygon")?
        .iter()
        .map(ring)
        .collect()
}

/// A ring needs three distinct positions, four when it repeats the first.
fn ring(value: &Value) -> CoreResult<Ring> {
    let positions = as_array(value, "ring")?
        .iter()
        .map(position)
        .collect::<CoreResult<Ring>>()?;
    let closed = positions.len() > 1 && positions.first() == positions.last();
    let required = if closed { MIN_CLOSED_RING } else { MIN_OPEN_RING };
    if positions.len() < required {
        return Err(CoreError::MalformedGeometry {
            message: format!("ring has {} positions, need at least {required}", positions.len()),
        });
    }
    Ok(positions)
}

fn position(value: &Value) -> CoreResult<Position> {
    let pair = as_array(value, "position")?;
    match (
        pair.first().and_then(Value::as_f64),
        pair.get(1).and_then(Value::as_f64),
    ) {
        (Some(x), Some(y)) => Ok([x, y]),
        _ => Err(CoreError::MalformedGeometry {
            message: format!("position must hold two numbers, got {value}"),
        }),
    }
}
