//! SQL quoting helpers.
//!
//! Health-table column names carry spaces and punctuation
//! (`5-digit FIPS Code`, `Adult obesity raw value`), so every dynamic
//! identifier goes through [`quote_ident`] and every file path or text value
//! embedded in SQL goes through [`string_literal`].

/// Quote a SQL identifier, doubling embedded double quotes.
///
/// # Examples
/// ```
/// use ch_core::sql_utils::quote_ident;
/// assert_eq!(quote_ident("5-digit FIPS Code"), r#""5-digit FIPS Code""#);
/// assert_eq!(quote_ident(r#"a"b"#), r#""a""b""#);
/// ```
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Qualify a quoted column with a table alias: `h."Name"`.
pub fn qualified(alias: &str, column: &str) -> String {
    format!("{alias}.{}", quote_ident(column))
}

/// Render a single-quoted SQL string literal.
///
/// # Examples
/// ```
/// use ch_core::sql_utils::string_literal;
/// assert_eq!(string_literal("data/o'brien.csv"), "'data/o''brien.csv'");
/// ```
pub fn string_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident_plain() {
        assert_eq!(quote_ident("county_health"), r#""county_health""#);
    }

    #[test]
    fn test_qualified() {
        assert_eq!(qualified("h", "Name"), r#"h."Name""#);
    }

    #[test]
    fn test_string_literal_empty() {
        assert_eq!(string_literal(""), "''");
    }
}
