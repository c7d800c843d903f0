//! Fixture builders shared by the unit tests.

use super::model::{
    required_columns, Dataset, NumericColumn, RawRecord, RawTable, RawValue, GENDER_COLUMN,
    PARENTAL_CONTROL_COLUMN, PURPOSE_COLUMN,
};
use super::normalize::normalize;

/// A raw source row with every schema column present; numeric columns not
/// named here default to `2`.
pub fn respondent(
    age: i64,
    gender: &str,
    purpose: &str,
    parental_control: &str,
    addiction_level: f64,
) -> RawRecord {
    let mut rec: RawRecord = required_columns()
        .map(|c| (c.to_string(), RawValue::Integer(2)))
        .collect();
    rec.insert(GENDER_COLUMN.into(), RawValue::String(gender.into()));
    rec.insert(PURPOSE_COLUMN.into(), RawValue::String(purpose.into()));
    rec.insert(
        PARENTAL_CONTROL_COLUMN.into(),
        RawValue::String(parental_control.into()),
    );
    with(&mut rec, NumericColumn::Age, age as f64);
    with(&mut rec, NumericColumn::AddictionLevel, addiction_level);
    rec
}

pub fn with(rec: &mut RawRecord, column: NumericColumn, value: f64) {
    rec.insert(column.source_name().into(), RawValue::Float(value));
}

pub fn dataset(rows: Vec<RawRecord>) -> Dataset {
    let column_names = required_columns().map(String::from).collect();
    normalize(&RawTable { column_names, rows }).expect("fixture normalizes")
}
