//! Strict numeric coercion for raw-value columns.
//!
//! Indicator columns are stored as text (or auto-typed numbers) and may carry
//! placeholders such as blanks or `NA`. A value counts as numeric only when,
//! after trimming, it is one or more digits with at most one decimal point.
//! Signs and exponents are rejected. Values that fail the check are dropped
//! from the query entirely rather than treated as zero.
//!
//! The same rule is exposed twice: as a Rust predicate for in-process data,
//! and as SQL fragments for DuckDB queries. Both must agree.

use regex::Regex;
use std::sync::OnceLock;

/// Pattern shared by the Rust predicate and the SQL fragments.
pub const STRICT_NUMERIC_PATTERN: &str = r"^(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)$";

static STRICT_NUMERIC_RE: OnceLock<Regex> = OnceLock::new();

fn strict_numeric_re() -> &'static Regex {
    STRICT_NUMERIC_RE.get_or_init(|| Regex::new(STRICT_NUMERIC_PATTERN).expect("valid regex"))
}

/// True when the trimmed value qualifies as a strict numeric string.
pub fn is_strict_numeric(value: &str) -> bool {
    strict_numeric_re().is_match(value.trim())
}

/// Parse a qualifying value; `None` for anything the predicate rejects.
pub fn coerce(value: &str) -> Option<f64> {
    if !is_strict_numeric(value) {
        return None;
    }
    value.trim().parse::<f64>().ok()
}

/// Text form of a column expression, trimmed. Numeric columns produced by
/// the CSV sniffer are checked through their string rendering.
fn text_expr(column_expr: &str) -> String {
    format!("trim(CAST({column_expr} AS VARCHAR))")
}

/// SQL boolean expression: the column passes strict numeric coercion.
///
/// NULL input yields NULL, which filters the row out of a WHERE clause.
pub fn predicate_sql(column_expr: &str) -> String {
    format!(
        "regexp_full_match({}, '{}')",
        text_expr(column_expr),
        STRICT_NUMERIC_PATTERN
    )
}

/// SQL DOUBLE expression: the coerced value, or NULL when the column does not
/// qualify.
pub fn cast_sql(column_expr: &str) -> String {
    format!(
        "CASE WHEN {} THEN TRY_CAST({} AS DOUBLE) END",
        predicate_sql(column_expr),
        text_expr(column_expr)
    )
}
