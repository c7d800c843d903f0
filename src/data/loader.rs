use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{
    Array, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array, LargeStringArray,
    StringArray,
};
use arrow::datatypes::DataType;
use arrow::util::display::array_value_to_string;
use log::{debug, info};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::{DataError, Result};
use super::model::{RawRecord, RawTable, RawValue};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the raw survey table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row followed by one respondent per line
/// * `.json`    – `[{ "Age": 14, "Gender": "Male", ... }, ...]`
/// * `.parquet` – flat scalar columns
pub fn load_file(path: &Path) -> Result<RawTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => load_csv(std::fs::File::open(path)?),
        "json" => load_json(&std::fs::read_to_string(path)?),
        "parquet" | "pq" => load_parquet(path),
        other => Err(DataError::UnsupportedFormat(other.to_string())),
    }?;

    info!(
        "loaded {} rows x {} columns from {}",
        table.len(),
        table.column_names.len(),
        path.display()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one respondent per record.
/// Empty cells become nulls; everything else stays as the source text, so
/// label and flag columns see exactly what the file holds. Numeric columns
/// are parsed later by [`RawValue::as_f64`].
pub fn load_csv<R: Read>(source: R) -> Result<RawTable> {
    let mut reader = csv::Reader::from_reader(source);
    let column_names: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let row: RawRecord = column_names
            .iter()
            .zip(record.iter())
            .map(|(col, value)| (col.clone(), text_cell(value)))
            .collect();
        rows.push(row);
    }

    debug!("csv: {} records", rows.len());
    Ok(RawTable { column_names, rows })
}

fn text_cell(s: &str) -> RawValue {
    if s.is_empty() {
        RawValue::Null
    } else {
        RawValue::String(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Age": 14, "Gender": "Male", "Parental_Control": "Yes", ... },
///   ...
/// ]
/// ```
///
/// Column order is the order in which keys are first seen.
pub fn load_json(text: &str) -> Result<RawTable> {
    let root: JsonValue = serde_json::from_str(text)?;
    let records = root
        .as_array()
        .ok_or_else(|| DataError::Malformed("expected a top-level JSON array".into()))?;

    let mut column_names: Vec<String> = Vec::new();
    let mut rows = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| DataError::Malformed(format!("row {i} is not a JSON object")))?;

        let mut row = BTreeMap::new();
        for (key, val) in obj {
            if !column_names.contains(key) {
                column_names.push(key.clone());
            }
            row.insert(key.clone(), json_to_value(val));
        }
        rows.push(row);
    }

    Ok(RawTable { column_names, rows })
}

fn json_to_value(val: &JsonValue) -> RawValue {
    match val {
        JsonValue::String(s) => RawValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                RawValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                RawValue::Float(f)
            } else {
                RawValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => RawValue::Bool(*b),
        JsonValue::Null => RawValue::Null,
        other => RawValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one scalar column per survey field.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
pub fn load_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let column_names: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build()?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        for row in 0..batch.num_rows() {
            let record: RawRecord = column_names
                .iter()
                .zip(batch.columns())
                .map(|(name, col)| Ok((name.clone(), extract_value(col, row)?)))
                .collect::<Result<_>>()?;
            rows.push(record);
        }
    }

    Ok(RawTable { column_names, rows })
}

// -- Parquet / Arrow helpers --

/// Extract a single cell from an Arrow column at a given row.
fn extract_value(col: &Arc<dyn Array>, row: usize) -> Result<RawValue> {
    if col.is_null(row) {
        return Ok(RawValue::Null);
    }
    let any = col.as_any();
    let value = match col.data_type() {
        DataType::Utf8 => any
            .downcast_ref::<StringArray>()
            .map(|a| RawValue::String(a.value(row).to_string())),
        DataType::LargeUtf8 => any
            .downcast_ref::<LargeStringArray>()
            .map(|a| RawValue::String(a.value(row).to_string())),
        DataType::Int32 => any
            .downcast_ref::<Int32Array>()
            .map(|a| RawValue::Integer(i64::from(a.value(row)))),
        DataType::Int64 => any
            .downcast_ref::<Int64Array>()
            .map(|a| RawValue::Integer(a.value(row))),
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .map(|a| RawValue::Float(f64::from(a.value(row)))),
        DataType::Float64 => any
            .downcast_ref::<Float64Array>()
            .map(|a| RawValue::Float(a.value(row))),
        DataType::Boolean => any
            .downcast_ref::<BooleanArray>()
            .map(|a| RawValue::Bool(a.value(row))),
        _ => None,
    };

    match value {
        Some(v) => Ok(v),
        // Anything else (dictionaries, small ints, dates) goes through its
        // display form and is coerced later like any other text cell.
        None => Ok(RawValue::String(array_value_to_string(col.as_ref(), row)?)),
    }
}
