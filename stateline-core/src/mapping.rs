//! Source-Row Mapping
//!
//! Bridges external feed rows onto the storage schema. Feeds key their rows
//! however they like (R-dataset CSV headers, JSON attribute names); this
//! module resolves each registry column against those keys and coerces the
//! values into the record's types. Any miss or bad value is an error, never
//! a default: a refresh writes fully populated rows or nothing.

use crate::columns::{ColumnDef, STATE_COLUMNS};
use crate::error::MappingError;
use crate::record::StateRecord;
use serde_json::{Map, Value};

/// Build a [`StateRecord`] from a field-keyed source row.
///
/// Keys are matched per [`ColumnDef::matches_source_key`]; keys matching no
/// column are ignored. Numeric coercion is strict: integer columns reject
/// fractional values rather than truncating them, and non-finite floats are
/// rejected everywhere.
pub fn record_from_row(row: &Map<String, Value>) -> Result<StateRecord, MappingError> {
    Ok(StateRecord {
        name: text_field(row, &STATE_COLUMNS[0])?,
        population: integer_field(row, &STATE_COLUMNS[1])?,
        income: integer_field(row, &STATE_COLUMNS[2])?,
        illiteracy: real_field(row, &STATE_COLUMNS[3])?,
        life_exp: real_field(row, &STATE_COLUMNS[4])?,
        murder: real_field(row, &STATE_COLUMNS[5])?,
        hs_grad: real_field(row, &STATE_COLUMNS[6])?,
        frost: integer_field(row, &STATE_COLUMNS[7])?,
        area: integer_field(row, &STATE_COLUMNS[8])?,
    })
}

fn field_value<'a>(row: &'a Map<String, Value>, def: &ColumnDef) -> Result<&'a Value, MappingError> {
    row.iter()
        .find(|(key, _)| def.matches_source_key(key))
        .map(|(_, value)| value)
        .ok_or(MappingError::MissingField {
            field: def.public_name,
        })
}

fn invalid(def: &ColumnDef, reason: impl Into<String>) -> MappingError {
    MappingError::InvalidValue {
        field: def.public_name,
        reason: reason.into(),
    }
}

fn text_field(row: &Map<String, Value>, def: &ColumnDef) -> Result<String, MappingError> {
    match field_value(row, def)? {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Err(invalid(def, "blank value"))
            } else {
                Ok(trimmed.to_string())
            }
        }
        other => Err(invalid(def, format!("expected text, got {other}"))),
    }
}

fn integer_field(row: &Map<String, Value>, def: &ColumnDef) -> Result<i32, MappingError> {
    match field_value(row, def)? {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                into_i32(def, i)
            } else if let Some(f) = n.as_f64() {
                integer_from_f64(def, f)
            } else {
                Err(invalid(def, format!("out of range: {n}")))
            }
        }
        Value::String(s) => {
            let trimmed = s.trim();
            if let Ok(i) = trimmed.parse::<i64>() {
                into_i32(def, i)
            } else if let Ok(f) = trimmed.parse::<f64>() {
                integer_from_f64(def, f)
            } else {
                Err(invalid(def, format!("not numeric: {trimmed:?}")))
            }
        }
        other => Err(invalid(def, format!("expected a number, got {other}"))),
    }
}

fn real_field(row: &Map<String, Value>, def: &ColumnDef) -> Result<f64, MappingError> {
    let parsed = match field_value(row, def)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(f) if f.is_finite() => Ok(f),
        Some(f) => Err(invalid(def, format!("not a finite number: {f}"))),
        None => Err(invalid(def, "not numeric".to_string())),
    }
}

fn integer_from_f64(def: &ColumnDef, f: f64) -> Result<i32, MappingError> {
    if !f.is_finite() {
        return Err(invalid(def, format!("not a finite number: {f}")));
    }
    if f.fract() != 0.0 {
        return Err(invalid(def, format!("fractional value {f}")));
    }
    into_i32(def, f as i64)
}

fn into_i32(def: &ColumnDef, i: i64) -> Result<i32, MappingError> {
    i32::try_from(i).map_err(|_| invalid(def, format!("out of range: {i}")))
}
