//! County polygon geometry.
//!
//! Ingestion turns GeoJSON `Polygon`/`MultiPolygon` objects into WKT text
//! ([`geojson_to_wkt`]). Read paths go the other way: WKT from the store is
//! parsed back ([`parse_wkt`]) to emit GeoJSON, compute centroids for the
//! spatial weights, and test vertex adjacency.
//!
//! Coordinates are `[longitude, latitude]` in a single geographic frame.
//! Rings and vertices are kept exactly as supplied: no closing, dedup, or
//! winding correction.

mod translate;
mod wkt;

pub use translate::geojson_to_wkt;
pub use wkt::parse_wkt;

use std::collections::HashSet;

/// A `[x, y]` coordinate pair.
pub type Position = [f64; 2];

/// A linear ring as supplied (closed or not).
pub type Ring = Vec<Position>;

/// Polygon or multipolygon, exterior ring first, holes after.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Polygon(Vec<Ring>),
    MultiPolygon(Vec<Vec<Ring>>),
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Overlap test that counts shared edges as intersecting.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }
}

impl Geometry {
    /// Geometry type name as used by GeoJSON and WKT.
    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Polygon(_) => "Polygon",
            Geometry::MultiPolygon(_) => "MultiPolygon",
        }
    }

    /// The polygons of this geometry; a `Polygon` yields itself.
    pub fn polygons(&self) -> Vec<&[Ring]> {
        match self {
            Geometry::Polygon(rings) => vec![rings.as_slice()],
            Geometry::MultiPolygon(polys) => polys.iter().map(|p| p.as_slice()).collect(),
        }
    }

    fn vertices(&self) -> impl Iterator<Item = &Position> {
        self.polygons()
            .into_iter()
            .flat_map(|rings| rings.iter())
            .flat_map(|ring| ring.iter())
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let mut iter = self.vertices();
        let first = iter.next()?;
        let init = BoundingBox {
            min_x: first[0],
            min_y: first[1],
            max_x: first[0],
            max_y: first[1],
        };
        Some(iter.fold(init, |b, p| BoundingBox {
            min_x: b.min_x.min(p[0]),
            min_y: b.min_y.min(p[1]),
            max_x: b.max_x.max(p[0]),
            max_y: b.max_y.max(p[1]),
        }))
    }

    /// Area-weighted centroid `(x, y)`.
    ///
    /// Each polygon contributes its exterior area minus its holes. When the
    /// total area is zero (collapsed rings) the mean of all vertices is used.
    /// Returns `None` for a geometry without vertices.
    pub fn centroid(&self) -> Option<(f64, f64)> {
        let mut area = 0.0;
        let mut moment_x = 0.0;
        let mut moment_y = 0.0;

        for rings in self.polygons() {
            for (idx, ring) in rings.iter().enumerate() {
                let (ring_area, cx, cy) = ring_area_centroid(ring);
                let weight = if idx == 0 { ring_area } else { -ring_area };
                area += weight;
                moment_x += cx * weight;
                moment_y += cy * weight;
            }
        }

        if area.abs() > f64::EPSILON {
            return Some((moment_x / area, moment_y / area));
        }

        let (count, sum_x, sum_y) = self
            .vertices()
            .fold((0usize, 0.0, 0.0), |(n, sx, sy), p| (n + 1, sx + p[0], sy + p[1]));
        if count == 0 {
            None
        } else {
            Some((sum_x / count as f64, sum_y / count as f64))
        }
    }

    /// True when the two geometries have at least one identical vertex.
    ///
    /// Adjacent county boundaries are digitized from shared arcs, so a shared
    /// vertex is the adjacency test used when native `ST_Touches` is not
    /// available.
    pub fn shares_vertex_with(&self, other: &Geometry) -> bool {
        match (self.bounding_box(), other.bounding_box()) {
            (Some(a), Some(b)) if a.intersects(&b) => {}
            _ => return false,
        }
        let mine: HashSet<(u64, u64)> = self.vertices().map(vertex_key).collect();
        other.vertices().any(|p| mine.contains(&vertex_key(p)))
    }
}

fn vertex_key(p: &Position) -> (u64, u64) {
    // +0.0 folds -0.0 onto 0.0 so the bit patterns agree
    ((p[0] + 0.0).to_bits(), (p[1] + 0.0).to_bits())
}

/// Absolute area and centroid of one ring (shoelace). The ring is treated
/// as closed whether or not the last vertex repeats the first.
fn ring_area_centroid(ring: &[Position]) -> (f64, f64, f64) {
    let n = ring.len();
    if n < 3 {
        return (0.0, 0.0, 0.0);
    }
    let mut twice_area = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for i in 0..n {
        let [x0, y0] = ring[i];
        let [x1, y1] = ring[(i + 1) % n];
        let cross = x0 * y1 - x1 * y0;
        twice_area += cross;
        cx += (x0 + x1) * cross;
        cy += (y0 + y1) * cross;
    }
    if twice_area.abs() <= f64::EPSILON {
        return (0.0, 0.0, 0.0);
    }
    let area = twice_area / 2.0;
    // sign of the area cancels in the centroid; report the area unsigned
    (area.abs(), cx / (6.0 * area), cy / (6.0 * area))
}

#[cfg(test)]
#[path = "geometry_test.rs"]
mod tests;
