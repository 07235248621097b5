//! Strongly-typed identifiers.

use crate::newtype_string::define_string_id;

define_string_id! {
    /// County identifier (5-digit FIPS code) used as the join key between
    /// health records and county geometries.
    pub struct FipsCode;
}

define_string_id! {
    /// API-facing variable name derived from a raw-value column header,
    /// e.g. `Adult obesity raw value` -> `adult_obesity`.
    pub struct VariableName;
}

/// Width of a county-level FIPS code.
pub const FIPS_WIDTH: usize = 5;

/// Marker that identifies an indicator column in the health table header.
pub const RAW_VALUE_MARKER: &str = "raw value";

impl FipsCode {
    /// True when the code is exactly five ASCII digits.
    pub fn is_well_formed(&self) -> bool {
        self.len() == FIPS_WIDTH && self.bytes().all(|b| b.is_ascii_digit())
    }
}

impl VariableName {
    /// Derive the variable name for a raw-value column header.
    ///
    /// The ` raw value` suffix is removed, the rest lower-cased and spaces
    /// replaced by underscores.
    pub fn from_column(column: &str) -> Self {
        let base = column.replace(&format!(" {RAW_VALUE_MARKER}"), "");
        Self::new(base.trim().to_lowercase().replace(' ', "_"))
    }
}

/// Health indicator table, one row per county.
pub const HEALTH_TABLE: &str = "county_health";

/// County geometry table (`fips_code`, `county_name`, `state_fp`, `geometry`).
pub const SPATIAL_TABLE: &str = "county_spatial";

/// Inner join of health records and geometries.
pub const JOINED_VIEW: &str = "counties_with_geometry";

/// Dictionary-derived display metadata.
pub const METADATA_TABLE: &str = "variable_metadata";

/// True when a health-table column holds an indicator raw value.
pub fn is_raw_value_column(column: &str) -> bool {
    column.contains(RAW_VALUE_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_name_from_column() {
        assert_eq!(
            VariableName::from_column("Adult obesity raw value"),
            "adult_obesity"
        );
        assert_eq!(
            VariableName::from_column("Premature Death raw value"),
            "premature_death"
        );
    }

    #[test]
    fn test_fips_well_formed() {
        assert!(FipsCode::new("01001").is_well_formed());
        assert!(FipsCode::new(" 01001 ").is_well_formed());
        assert!(!FipsCode::new("1001").is_well_formed());
        assert!(!FipsCode::new("0100a").is_well_formed());
        assert!(!FipsCode::new("010011").is_well_formed());
    }

    #[test]
    fn test_raw_value_column_detection() {
        assert!(is_raw_value_column("Adult smoking raw value"));
        assert!(!is_raw_value_column("Adult smoking numerator"));
        assert!(!is_raw_value_column("5-digit FIPS Code"));
    }
}
