//! Raw table → canonical [`Dataset`].
//!
//! Individual bad cells never fail the run: unparsable numbers become nulls,
//! odd boolean encodings become `false`, blank labels become [`UNKNOWN_LABEL`].
//! Only a structurally unusable source (no rows, missing schema columns) is
//! an error.

use log::{debug, info, warn};

use super::error::{DataError, Result};
use super::model::{
    is_schema_column, required_columns, AddictionCategory, AgeGroup, Dataset, NumericColumn,
    RawRecord, RawTable, RawValue, Respondent, GENDER_COLUMN, PARENTAL_CONTROL_COLUMN,
    PURPOSE_COLUMN,
};

/// Label used when a gender or purpose cell is null or blank.
pub const UNKNOWN_LABEL: &str = "Unknown";

const TRUTHY: [&str; 3] = ["1", "yes", "true"];

/// Build the canonical table. Re-normalizing `Dataset::to_raw()` output is a no-op.
pub fn normalize(raw: &RawTable) -> Result<Dataset> {
    if raw.column_names.is_empty() && raw.rows.is_empty() {
        return Err(DataError::Empty);
    }
    if let Some(missing) = required_columns().find(|c| !raw.has_column(c)) {
        return Err(DataError::MissingColumn(missing.to_string()));
    }
    if raw.is_empty() {
        return Err(DataError::Empty);
    }

    let mut records: Vec<Respondent> = raw
        .rows
        .iter()
        .enumerate()
        .map(|(row, rec)| coerce_record(row, rec))
        .collect();

    for col in NumericColumn::ALL {
        let nulls = records.iter().filter(|r| r.value(col).is_none()).count();
        if nulls > 0 {
            debug!("{col}: {nulls} null value(s) after coercion");
        }
    }

    backfill_medians(&mut records);

    for r in &mut records {
        r.age_group = r.age().and_then(AgeGroup::from_age);
        r.addiction_category = r.addiction_level().and_then(AddictionCategory::from_level);
    }

    let dataset = Dataset::from_records(records, &raw.column_names);
    let options = dataset.options();
    info!(
        "normalized {} respondents ({} genders, {} purposes, {} age groups)",
        dataset.len(),
        options.genders.len(),
        options.purposes.len(),
        options.age_groups.len()
    );
    Ok(dataset)
}

fn coerce_record(row: usize, rec: &RawRecord) -> Respondent {
    let cell = |name: &str| rec.get(name).unwrap_or(&RawValue::Null);

    let extra = rec
        .iter()
        .filter(|(name, _)| !is_schema_column(name))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();

    let mut values = [None; NumericColumn::COUNT];
    for (slot, col) in values.iter_mut().zip(NumericColumn::ALL) {
        *slot = cell(col.source_name()).as_f64();
    }

    Respondent {
        row,
        gender: label_or_unknown(cell(GENDER_COLUMN), capitalize),
        phone_usage_purpose: label_or_unknown(cell(PURPOSE_COLUMN), title_case),
        parental_control: parse_parental_control(cell(PARENTAL_CONTROL_COLUMN)),
        age_group: None,
        addiction_category: None,
        values,
        extra,
    }
}

fn label_or_unknown(value: &RawValue, case: fn(&str) -> String) -> String {
    let text = value.as_text().unwrap_or_default();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        UNKNOWN_LABEL.to_string()
    } else {
        case(trimmed)
    }
}

/// `"1"`, `"yes"`, `"true"` in any case map to `true`; everything else,
/// nulls included, to `false`.
pub fn parse_parental_control(value: &RawValue) -> bool {
    value
        .as_text()
        .map(|t| TRUTHY.contains(&t.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// First character upper-case, the rest lower-case.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Every letter that follows a non-letter is upper-cased, all other letters
/// lower-cased: `"social media"` → `"Social Media"`, `"e-sports"` → `"E-Sports"`.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_is_letter = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }
    out
}

/// Median of the non-null values; mean of the two middle values for even counts.
pub fn median(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let mut sorted: Vec<f64> = values.into_iter().collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Fill nulls in the wellbeing columns with each column's own median. All
/// medians are taken before any column is filled.
fn backfill_medians(records: &mut [Respondent]) {
    let fills: Vec<(NumericColumn, Option<f64>)> = NumericColumn::MEDIAN_BACKFILLED
        .into_iter()
        .map(|col| (col, median(records.iter().filter_map(|r| r.value(col)))))
        .collect();

    for (col, fill) in fills {
        let Some(fill) = fill else {
            warn!("{col}: no numeric values, nulls left in place");
            continue;
        };
        let mut filled = 0usize;
        for r in records.iter_mut().filter(|r| r.value(col).is_none()) {
            r.set_value(col, Some(fill));
            filled += 1;
        }
        debug!("{col}: median {fill} filled {filled} cell(s)");
    }
}
