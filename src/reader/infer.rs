use super::missing::MissingTokens;
use crate::dataset::{Column, ColumnKind};
use crate::error::Result;
use crate::value::{MissingValue, Value};

/// Picks the narrowest kind that every observed field parses as:
/// integer, then float, then boolean, falling back to text. A column with no
/// observed fields is float.
pub(super) fn infer_kind(fields: &[String], tokens: &MissingTokens) -> ColumnKind {
    let mut observed = fields
        .iter()
        .map(|field| field.trim())
        .filter(|field| !tokens.is_missing(field))
        .peekable();
    if observed.peek().is_none() {
        return ColumnKind::Float;
    }
    let observed: Vec<&str> = observed.collect();
    if observed.iter().all(|field| field.parse::<i64>().is_ok()) {
        ColumnKind::Integer
    } else if observed.iter().all(|field| field.parse::<f64>().is_ok()) {
        ColumnKind::Float
    } else if observed.iter().all(|field| parse_bool(field).is_some()) {
        ColumnKind::Boolean
    } else {
        ColumnKind::Text
    }
}

/// Converts raw fields into a typed column.
pub(super) fn build_column(
    name: String,
    fields: Vec<String>,
    tokens: &MissingTokens,
) -> Result<Column> {
    let kind = infer_kind(&fields, tokens);
    let values = fields
        .into_iter()
        .map(|field| parse_field(field, kind, tokens))
        .collect();
    Column::new(name, kind, values)
}

fn parse_field(field: String, kind: ColumnKind, tokens: &MissingTokens) -> Value {
    const MISSING: Value = Value::Missing(MissingValue::System);
    if tokens.is_missing(&field) {
        return MISSING;
    }
    let trimmed = field.trim();
    match kind {
        ColumnKind::Integer => trimmed.parse().map_or(MISSING, Value::Integer),
        ColumnKind::Float => match trimmed.parse::<f64>() {
            Ok(v) if !v.is_nan() => Value::Float(v),
            _ => MISSING,
        },
        ColumnKind::Boolean => parse_bool(trimmed).map_or(MISSING, Value::Boolean),
        ColumnKind::Text => Value::Text(field),
    }
}

fn parse_bool(field: &str) -> Option<bool> {
    if field.eq_ignore_ascii_case("true") {
        Some(true)
    } else if field.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}
