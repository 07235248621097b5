//! Data-dictionary variable catalog.
//!
//! The dictionary lists every measure with a `Variable Name` such as
//! `v001_rawvalue`, a free-text `Description` and the `Measure` label that
//! names the matching health-table column (`"{Measure} raw value"`). Units and
//! category are inferred from the description with ordered keyword tables
//! where the first matching rule wins.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Token that marks the dictionary rows describing raw values.
pub const DICTIONARY_RAW_MARKER: &str = "rawvalue";

/// Descriptions with a first sentence at most this long fall back to truncation.
const MIN_SENTENCE_LEN: usize = 10;

/// Character budget for truncated display names.
const DISPLAY_NAME_BUDGET: usize = 60;

/// Variables stored as decimal fractions that are presented as percentages.
pub const PERCENTAGE_VARIABLES: &[&str] = &[
    "unemployment",
    "adult_obesity",
    "adult_smoking",
    "physical_inactivity",
    "mammography_screening",
    "flu_vaccinations",
    "children_in_poverty",
];

/// Ordered keyword table: the first entry with a keyword contained in the
/// input supplies the label.
type KeywordRules = &'static [(&'static [&'static str], &'static str)];

const UNIT_RULES: KeywordRules = &[
    (&["per 100,000"], "per 100,000 population"),
    (&["per 10,000"], "per 10,000 population"),
    (&["per 1,000"], "per 1,000 population"),
    (&["percentage", "percent", "%"], "percentage"),
    (&["years of potential life", "life expectancy", "years"], "years"),
    (&["days"], "days"),
    (&["ratio"], "ratio"),
    (&["index"], "index"),
    (&["number of"], "count"),
    (&["rate"], "rate"),
];

const DATA_TYPE_RULES: KeywordRules = &[
    (
        &["death", "mortality", "fatalit", "years of potential life"],
        "mortality",
    ),
    (&["percentage", "percent", "%"], "percentage"),
    (&["rate", "per 100,000", "per 1,000"], "rate"),
    (&["income", "dollar", "$"], "currency"),
    (&["index"], "index"),
    (&["ratio"], "ratio"),
];

const DEFAULT_LABEL: &str = "numeric";

fn first_match(rules: KeywordRules, text: &str) -> Option<&'static str> {
    rules
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| text.contains(k)))
        .map(|(_, label)| *label)
}

/// Units label for a description.
pub fn infer_units(description: &str) -> &'static str {
    first_match(UNIT_RULES, &description.to_lowercase()).unwrap_or(DEFAULT_LABEL)
}

/// Data-type category for a description.
pub fn infer_data_type(description: &str) -> &'static str {
    first_match(DATA_TYPE_RULES, &description.to_lowercase()).unwrap_or(DEFAULT_LABEL)
}

/// Short label derived from a description.
///
/// The first sentence (text before the first `". "`) is used when it is
/// longer than 10 characters. Otherwise the description is cut to 60
/// characters with a trailing `...`; shorter descriptions are kept whole.
pub fn display_name(description: &str) -> String {
    let sentence = description
        .split_once(". ")
        .map_or(description, |(first, _)| first)
        .trim();
    if sentence.chars().count() > MIN_SENTENCE_LEN {
        return sentence.to_string();
    }
    if description.chars().count() <= DISPLAY_NAME_BUDGET {
        return description.to_string();
    }
    let cut: String = description.chars().take(DISPLAY_NAME_BUDGET).collect();
    format!("{}...", cut.trim_end())
}

/// One row of the data dictionary as read from disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryRow {
    pub variable_name: String,
    pub description: String,
    pub measure: String,
}

/// Display metadata for one raw-value variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableInfo {
    pub variable_code: String,
    pub display_name: String,
    pub description: String,
    pub measure: String,
    pub units: String,
    pub data_type: String,
    pub raw_column_name: String,
}

impl VariableInfo {
    /// Build the entry for a dictionary row, or `None` when the row does not
    /// describe a raw value.
    pub fn from_row(row: &DictionaryRow) -> Option<Self> {
        let name = row.variable_name.trim();
        if !name.contains(DICTIONARY_RAW_MARKER) {
            return None;
        }
        let code = name.split('_').next().unwrap_or(name).to_string();
        let description = row.description.trim();
        let description = description
            .strip_suffix('.')
            .unwrap_or(description)
            .trim()
            .to_string();
        let measure = row.measure.trim().to_string();

        Some(Self {
            variable_code: code,
            display_name: display_name(&description),
            units: infer_units(&description).to_string(),
            data_type: infer_data_type(&description).to_string(),
            raw_column_name: format!("{measure} raw value"),
            description,
            measure,
        })
    }
}

/// Catalog of raw-value variables keyed by variable code.
#[derive(Debug, Clone, Default)]
pub struct VariableCatalog {
    entries: BTreeMap<String, VariableInfo>,
}

impl VariableCatalog {
    /// Build from dictionary rows. Later rows with a repeated code replace
    /// earlier ones.
    pub fn from_rows<'a>(rows: impl IntoIterator<Item = &'a DictionaryRow>) -> Self {
        let entries = rows
            .into_iter()
            .filter_map(VariableInfo::from_row)
            .map(|info| (info.variable_code.clone(), info))
            .collect();
        Self { entries }
    }

    /// Build from entries already resolved, e.g. read back from the
    /// metadata table.
    pub fn from_entries(entries: impl IntoIterator<Item = VariableInfo>) -> Self {
        let entries = entries
            .into_iter()
            .map(|info| (info.variable_code.clone(), info))
            .collect();
        Self { entries }
    }

    /// Case-insensitive lookup by health-table column name.
    pub fn find_by_column(&self, column: &str) -> Option<&VariableInfo> {
        self.entries
            .values()
            .find(|info| info.raw_column_name.eq_ignore_ascii_case(column))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in variable-code order.
    pub fn iter(&self) -> impl Iterator<Item = &VariableInfo> {
        self.entries.values()
    }
}

/// Health domain used to group variables for browsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthDomain {
    Mortality,
    Behavioral,
    Clinical,
    Social,
    PhysicalEnvironment,
    Demographics,
}

const DOMAIN_RULES: &[(&[&str], HealthDomain)] = &[
    (
        &["death", "mortality", "life expectancy", "fatalities", "suicide"],
        HealthDomain::Mortality,
    ),
    (
        &["smoking", "drinking", "obesity", "physical inactivity"],
        HealthDomain::Behavioral,
    ),
    (
        &["health days", "diabetes", "hiv", "mental", "distress"],
        HealthDomain::Clinical,
    ),
    (
        &["income", "poverty", "education", "unemployment", "housing", "associations"],
        HealthDomain::Social,
    ),
    (
        &["air pollution", "water", "housing", "climate", "environment"],
        HealthDomain::PhysicalEnvironment,
    ),
];

impl HealthDomain {
    /// All domains in presentation order.
    pub const ALL: [HealthDomain; 6] = [
        HealthDomain::Mortality,
        HealthDomain::Behavioral,
        HealthDomain::Clinical,
        HealthDomain::Social,
        HealthDomain::PhysicalEnvironment,
        HealthDomain::Demographics,
    ];

    /// Domain for a variable display name.
    pub fn classify(display_name: &str) -> Self {
        let name = display_name.to_lowercase();
        DOMAIN_RULES
            .iter()
            .find(|(keywords, _)| keywords.iter().any(|k| name.contains(k)))
            .map_or(HealthDomain::Demographics, |(_, domain)| *domain)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthDomain::Mortality => "mortality",
            HealthDomain::Behavioral => "behavioral",
            HealthDomain::Clinical => "clinical",
            HealthDomain::Social => "social",
            HealthDomain::PhysicalEnvironment => "physical_environment",
            HealthDomain::Demographics => "demographics",
        }
    }
}

impl std::fmt::Display for HealthDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Units and description used when a variable has no dictionary metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackDescriptor {
    pub units: &'static str,
    pub description: &'static str,
}

struct FallbackRule {
    matches: fn(&str, bool) -> bool,
    descriptor: FallbackDescriptor,
}

const fn rule(matches: fn(&str, bool) -> bool, units: &'static str, description: &'static str) -> FallbackRule {
    FallbackRule {
        matches,
        descriptor: FallbackDescriptor { units, description },
    }
}

const FALLBACK_RULES: &[FallbackRule] = &[
    rule(
        |v, _| v == "premature_death",
        "years lost per 100,000",
        "Years of potential life lost before age 75 per 100,000 population (age-adjusted)",
    ),
    rule(
        |v, _| v == "hiv_prevalence",
        "per 100,000 population",
        "Number of people aged 13 years and older living with a diagnosis of HIV per 100,000 population",
    ),
    rule(
        |v, transformed| transformed && v == "unemployment",
        "percentage",
        "Percentage of population ages 16 and older unemployed but seeking work",
    ),
    rule(
        |v, transformed| transformed && v == "mammography_screening",
        "percentage",
        "Percentage of female Medicare enrollees ages 65-74 who received an annual mammography screening",
    ),
    rule(
        |v, transformed| transformed && v == "adult_obesity",
        "percentage",
        "Percentage of adults aged 20 and older with obesity (BMI ≥ 30)",
    ),
    rule(
        |v, transformed| transformed && is_percentage_variable(v),
        "percentage",
        "Percentage value (transformed from decimal)",
    ),
    rule(
        |v, _| v.contains("health_days"),
        "days per month",
        "Average number of unhealthy days reported in past 30 days (age-adjusted)",
    ),
    rule(
        |v, _| v == "traffic_volume",
        "vehicles per meter per day",
        "Average daily traffic volume per meter of road length",
    ),
    rule(
        |v, _| {
            matches!(v, "firearm_fatalities" | "drug_overdose_deaths")
                || (v.contains("death") && !v.contains("premature"))
                || v.contains("mortality")
        },
        "per 100,000 population",
        "Population-standardized rate for fair comparison",
    ),
    rule(
        |v, _| v.contains("climate"),
        "0-3 categories",
        "Climate threshold categories met (heat, drought, disasters)",
    ),
    rule(
        |v, _| v.contains("obesity") || v.contains("smoking") || v.contains("physical_inactivity"),
        "percentage",
        "Percentage of adult population",
    ),
    rule(|v, _| v.contains("income"), "dollars", "Economic indicator"),
    rule(|v, _| v.contains("poverty"), "percentage", "Economic indicator"),
    rule(
        |v, _| v.contains("education"),
        "percentage",
        "Educational attainment indicator",
    ),
];

/// Fallback descriptor for a variable name. `transformed` selects the
/// percentage presentation of the fraction-valued variables.
pub fn fallback_descriptor(variable: &str, transformed: bool) -> Option<FallbackDescriptor> {
    FALLBACK_RULES
        .iter()
        .find(|r| (r.matches)(variable, transformed))
        .map(|r| r.descriptor)
}

/// True when the variable is stored as a fraction and shown as a percentage.
pub fn is_percentage_variable(variable: &str) -> bool {
    PERCENTAGE_VARIABLES.contains(&variable)
}

/// Title-cased label for a variable without metadata (`adult_obesity` ->
/// `Adult Obesity`).
pub fn title_case(variable: &str) -> String {
    variable
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
