//! Property-Based Tests for Source-Row Mapping
//!
//! **Property: Feed-shape independence**
//!
//! For any record values, a CSV-shaped row (R headers, string values) and a
//! JSON-shaped row (public names, native numbers) SHALL map to the same
//! `StateRecord`.
//!
//! **Property: Self round-trip**
//!
//! A serialized `StateRecord` is itself a valid source row and SHALL map
//! back to an identical record.

use proptest::prelude::*;
use serde_json::{json, Map, Value};
use stateline_core::{record_from_row, MappingError, StateRecord, STATE_COLUMNS};

// ============================================================================
// PROPERTY TEST STRATEGIES
// ============================================================================

/// Strategy for plausible state records. Values stay inside the ranges the
/// dataset actually uses; the point here is shape, not boundary hunting.
fn state_record_strategy() -> impl Strategy<Value = StateRecord> {
    (
        "[A-Z][a-z]{2,12}( [A-Z][a-z]{2,12})?",
        0..25_000_000i32,
        0..100_000i32,
        0.0..100.0f64,
        30.0..100.0f64,
        0.0..50.0f64,
        0.0..100.0f64,
        0..366i32,
        0..600_000i32,
    )
        .prop_map(
            |(name, population, income, illiteracy, life_exp, murder, hs_grad, frost, area)| {
                StateRecord {
                    name,
                    population,
                    income,
                    illiteracy,
                    life_exp,
                    murder,
                    hs_grad,
                    frost,
                    area,
                }
            },
        )
}

/// CSV-shaped row: R-dataset headers, every value a string, the way the
/// upstream `state.x77` export arrives.
fn csv_row(record: &StateRecord) -> Map<String, Value> {
    let value = json!({
        "rownames": record.name,
        "Population": record.population.to_string(),
        "Income": record.income.to_string(),
        "Illiteracy": record.illiteracy.to_string(),
        "Life Exp": record.life_exp.to_string(),
        "Murder": record.murder.to_string(),
        "HS Grad": record.hs_grad.to_string(),
        "Frost": record.frost.to_string(),
        "Area": record.area.to_string(),
    });
    value.as_object().expect("object literal").clone()
}

// ============================================================================
// PROPERTIES
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// CSV strings and native JSON numbers map to the same record.
    #[test]
    fn prop_feed_shape_does_not_change_the_record(record in state_record_strategy()) {
        let from_csv = record_from_row(&csv_row(&record)).expect("csv row maps");

        let json_value = serde_json::to_value(&record).expect("record serializes");
        let json_row = json_value.as_object().expect("record is an object");
        let from_json = record_from_row(json_row).expect("json row maps");

        prop_assert_eq!(&from_csv, &record);
        prop_assert_eq!(&from_json, &record);
    }

    /// Dropping any single column fails the whole row with that column's
    /// public name, never a partial record.
    #[test]
    fn prop_any_missing_column_fails_the_row(
        record in state_record_strategy(),
        index in 0..STATE_COLUMNS.len()
    ) {
        let def = &STATE_COLUMNS[index];
        let mut row = csv_row(&record);
        let key = row
            .keys()
            .find(|k| def.matches_source_key(k))
            .expect("csv row covers every column")
            .clone();
        row.remove(&key);

        let err = record_from_row(&row).expect_err("incomplete row rejected");
        prop_assert_eq!(err, MappingError::MissingField { field: def.public_name });
    }

    /// Corrupting any numeric column fails the whole row.
    #[test]
    fn prop_any_bad_numeric_fails_the_row(
        record in state_record_strategy(),
        index in 1..STATE_COLUMNS.len()
    ) {
        let def = &STATE_COLUMNS[index];
        let mut row = csv_row(&record);
        let key = row
            .keys()
            .find(|k| def.matches_source_key(k))
            .expect("csv row covers every column")
            .clone();
        row.insert(key, Value::String("n/a".to_string()));

        let err = record_from_row(&row).expect_err("bad numeric rejected");
        let names_corrupted_field =
            matches!(err, MappingError::InvalidValue { field, .. } if field == def.public_name);
        prop_assert!(names_corrupted_field);
    }
}
