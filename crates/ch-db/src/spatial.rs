//! SQL fragments for the geometry column.

use std::fmt;

/// How county geometries are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryStorage {
    /// Native `GEOMETRY` values from the `spatial` extension.
    Native,
    /// WKT text in a `VARCHAR` column.
    Wkt,
}

impl GeometryStorage {
    pub fn is_native(self) -> bool {
        self == GeometryStorage::Native
    }

    /// Column type for the geometry column.
    pub fn column_type(self) -> &'static str {
        match self {
            GeometryStorage::Native => "GEOMETRY",
            GeometryStorage::Wkt => "VARCHAR",
        }
    }

    /// Expression turning WKT text (`expr`, usually a `?` placeholder) into
    /// a stored geometry value.
    pub fn from_wkt(self, expr: &str) -> String {
        match self {
            GeometryStorage::Native => format!("ST_GeomFromText({expr})"),
            GeometryStorage::Wkt => expr.to_string(),
        }
    }

    /// Expression reading a stored geometry back as WKT text.
    pub fn to_wkt(self, expr: &str) -> String {
        match self {
            GeometryStorage::Native => format!("ST_AsText({expr})"),
            GeometryStorage::Wkt => expr.to_string(),
        }
    }

    /// `CREATE INDEX` statement for a spatial R-tree, only available natively.
    pub fn rtree_index_sql(self, index: &str, table: &str, column: &str) -> Option<String> {
        match self {
            GeometryStorage::Native => Some(format!(
                "CREATE INDEX {index} ON {table} USING RTREE ({column})"
            )),
            GeometryStorage::Wkt => None,
        }
    }
}

impl fmt::Display for GeometryStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometryStorage::Native => write!(f, "native"),
            GeometryStorage::Wkt => write!(f, "wkt"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_fragments() {
        let storage = GeometryStorage::Native;
        assert_eq!(storage.column_type(), "GEOMETRY");
        assert_eq!(storage.from_wkt("?"), "ST_GeomFromText(?)");
        assert_eq!(storage.to_wkt("s.geometry"), "ST_AsText(s.geometry)");
        assert_eq!(
            storage.rtree_index_sql("idx_geom", "county_spatial", "geometry").unwrap(),
            "CREATE INDEX idx_geom ON county_spatial USING RTREE (geometry)"
        );
    }

    #[test]
    fn test_wkt_fragments_pass_through() {
        let storage = GeometryStorage::Wkt;
        assert_eq!(storage.column_type(), "VARCHAR");
        assert_eq!(storage.from_wkt("?"), "?");
        assert_eq!(storage.to_wkt("geometry"), "geometry");
        assert!(storage.rtree_index_sql("i", "t", "c").is_none());
    }
}
