//! Variable registry: raw-value columns of the health table joined with the
//! dictionary metadata.

use crate::error::{AnalysisError, AnalysisResult};
use ch_core::catalog::{
    fallback_descriptor, is_percentage_variable, title_case, HealthDomain, VariableCatalog,
    VariableInfo,
};
use ch_core::names::{is_raw_value_column, VariableName, HEALTH_TABLE, METADATA_TABLE};
use ch_db::Database;
use serde::Serialize;
use std::collections::BTreeMap;

/// Number of known names listed in an "Invalid variable name" error.
const MAX_LISTED_NAMES: usize = 10;

const DEFAULT_DATA_TYPE: &str = "numeric";

/// One queryable indicator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variable {
    /// API-facing name, e.g. `adult_obesity`.
    pub name: String,
    pub display_name: String,
    /// Health-table column holding the raw values.
    pub column: String,
    #[serde(rename = "type")]
    pub value_type: String,
    pub description: String,
    pub units: String,
    pub data_type: String,
}

impl Variable {
    /// Registry entry for `column`, using dictionary metadata when present.
    pub fn from_column(column: &str, info: Option<&VariableInfo>) -> Self {
        let name = VariableName::from_column(column).into_inner();
        let base = column
            .strip_suffix(" raw value")
            .unwrap_or(column)
            .trim()
            .to_string();
        match info {
            Some(info) => Self {
                name,
                display_name: non_empty(&info.display_name).unwrap_or(base),
                column: column.to_string(),
                value_type: "numeric".to_string(),
                description: info.description.clone(),
                units: info.units.clone(),
                data_type: non_empty(&info.data_type)
                    .unwrap_or_else(|| DEFAULT_DATA_TYPE.to_string()),
            },
            None => Self {
                name,
                display_name: base,
                column: column.to_string(),
                value_type: "numeric".to_string(),
                description: String::new(),
                units: String::new(),
                data_type: DEFAULT_DATA_TYPE.to_string(),
            },
        }
    }

    /// Descriptive fields for a statistics or choropleth response.
    ///
    /// Dictionary values win. Gaps are filled from the fallback descriptor,
    /// and transform mode reports percentage variables in `percentage`.
    pub fn descriptor(&self, transformed: bool) -> VariableDescriptor {
        let fallback = fallback_descriptor(&self.name, transformed);
        let percentage = transformed && is_percentage_variable(&self.name);

        let units = if percentage {
            "percentage".to_string()
        } else {
            non_empty(&self.units)
                .or_else(|| fallback.map(|f| f.units.to_string()))
                .unwrap_or_default()
        };
        let description = non_empty(&self.description)
            .or_else(|| fallback.map(|f| f.description.to_string()))
            .unwrap_or_default();
        let display_name = non_empty(&self.display_name).unwrap_or_else(|| title_case(&self.name));

        VariableDescriptor {
            variable: self.name.clone(),
            display_name,
            description,
            units,
            data_type: self.data_type.clone(),
        }
    }
}

/// Descriptive header shared by several responses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableDescriptor {
    pub variable: String,
    pub display_name: String,
    pub description: String,
    pub units: String,
    pub data_type: String,
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// All raw-value variables in health-table column order.
#[derive(Debug, Clone, Default)]
pub struct VariableRegistry {
    variables: Vec<Variable>,
}

impl VariableRegistry {
    /// Build from health-table columns and metadata entries.
    pub fn from_parts(columns: &[String], metadata: &VariableCatalog) -> Self {
        let variables = columns
            .iter()
            .filter(|c| is_raw_value_column(c))
            .map(|column| Variable::from_column(column, metadata.find_by_column(column)))
            .collect();
        Self { variables }
    }

    /// Read the registry from the database. A missing metadata table leaves
    /// every variable on defaults.
    pub fn load(db: &dyn Database) -> AnalysisResult<Self> {
        let columns: Vec<String> = db
            .describe(HEALTH_TABLE)?
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        let metadata = load_metadata(db)?;
        log::debug!(
            "Variable registry: {} columns, {} metadata entries",
            columns.len(),
            metadata.len()
        );
        Ok(Self::from_parts(&columns, &metadata))
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Look up `name` or fail with the list of known names.
    pub fn resolve(&self, name: &str) -> AnalysisResult<&Variable> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AnalysisError::validation(
                "Missing variable name",
                "A variable name is required",
            ));
        }
        self.get(name).ok_or_else(|| {
            let available: Vec<&str> = self
                .variables
                .iter()
                .take(MAX_LISTED_NAMES)
                .map(|v| v.name.as_str())
                .collect();
            AnalysisError::validation(
                "Invalid variable name",
                format!(
                    "Variable '{name}' not found in dataset. Available: {}...",
                    available.join(", ")
                ),
            )
        })
    }

    /// Variables grouped by health domain. Every domain is present, possibly
    /// empty.
    pub fn by_domain(&self) -> BTreeMap<HealthDomain, Vec<Variable>> {
        let mut groups: BTreeMap<HealthDomain, Vec<Variable>> =
            HealthDomain::ALL.iter().map(|d| (*d, Vec::new())).collect();
        for variable in &self.variables {
            groups
                .entry(HealthDomain::classify(&variable.display_name))
                .or_default()
                .push(variable.clone());
        }
        groups
    }
}

fn load_metadata(db: &dyn Database) -> AnalysisResult<VariableCatalog> {
    if !db.relation_exists(METADATA_TABLE)? {
        log::debug!("{METADATA_TABLE} not found, using default variable metadata");
        return Ok(VariableCatalog::default());
    }
    let rows = db.query_rows(
        &format!(
            "SELECT variable_code, display_name, description, measure, units, data_type, raw_column_name FROM {METADATA_TABLE}"
        ),
        &[],
    )?;
    Ok(VariableCatalog::from_entries(rows.rows.iter().map(|row| {
        let text = |idx: usize| row.get(idx).and_then(|v| v.to_text()).unwrap_or_default();
        VariableInfo {
            variable_code: text(0),
            display_name: text(1),
            description: text(2),
            measure: text(3),
            units: text(4),
            data_type: text(5),
            raw_column_name: text(6),
        }
    })))
}

#[cfg(test)]
#[path = "variables_test.rs"]
mod tests;
