use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray, Float64Array, StringArray, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;

use super::error::Result;
use super::filter::Subset;
use super::model::{
    NumericColumn, Respondent, ADDICTION_CATEGORY_COLUMN, AGE_GROUP_COLUMN, GENDER_COLUMN,
    PARENTAL_CONTROL_COLUMN, PURPOSE_COLUMN,
};

/// Columnar copy of the first `limit` respondents of a subset, in canonical
/// column order, for tabular display.
pub fn to_record_batch(subset: &Subset<'_>, limit: usize) -> Result<RecordBatch> {
    let rows: Vec<&Respondent> = subset.iter().take(limit).collect();

    let mut fields = vec![
        Field::new("Row", DataType::UInt64, false),
        Field::new(GENDER_COLUMN, DataType::Utf8, false),
        Field::new(PURPOSE_COLUMN, DataType::Utf8, false),
        Field::new(PARENTAL_CONTROL_COLUMN, DataType::Boolean, false),
    ];
    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(UInt64Array::from_iter_values(rows.iter().map(|r| r.row as u64))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.gender.as_str()))),
        Arc::new(StringArray::from_iter_values(
            rows.iter().map(|r| r.phone_usage_purpose.as_str()),
        )),
        Arc::new(BooleanArray::from(
            rows.iter().map(|r| r.parental_control).collect::<Vec<_>>(),
        )),
    ];

    for col in NumericColumn::ALL {
        fields.push(Field::new(col.source_name(), DataType::Float64, true));
        columns.push(Arc::new(Float64Array::from(
            rows.iter().map(|r| r.value(col)).collect::<Vec<_>>(),
        )));
    }

    fields.push(Field::new(AGE_GROUP_COLUMN, DataType::Utf8, true));
    columns.push(Arc::new(StringArray::from(
        rows.iter()
            .map(|r| r.age_group.map(|g| g.label()))
            .collect::<Vec<_>>(),
    )));
    fields.push(Field::new(ADDICTION_CATEGORY_COLUMN, DataType::Utf8, true));
    columns.push(Arc::new(StringArray::from(
        rows.iter()
            .map(|r| r.addiction_category.map(|c| c.label()))
            .collect::<Vec<_>>(),
    )));

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::RawValue;
    use crate::data::test_support::{dataset, respondent};
    use arrow::util::pretty::pretty_format_batches;

    #[test]
    fn batch_mirrors_subset_rows() {
        let mut far = respondent(40, "Male", "Gaming", "no", 5.0);
        far.insert("Time_on_Gaming".into(), RawValue::Null);
        let ds = dataset(vec![
            respondent(14, "Female", "social media", "yes", 8.0),
            far,
            respondent(16, "Male", "Gaming", "no", 1.0),
        ]);
        let batch = to_record_batch(&Subset::whole(&ds), 2).unwrap();

        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.num_columns(), 4 + NumericColumn::COUNT + 2);

        let text = pretty_format_batches(&[batch]).unwrap().to_string();
        assert!(text.contains("Social Media"));
        assert!(text.contains("13-15"));
        assert!(text.contains("High"));
        assert!(!text.contains("16-18"));
    }
}
