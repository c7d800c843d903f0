/// Data layer: core types, loading, normalization, filtering and aggregates.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RawTable (untyped cells)
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ normalize  │  coerce, backfill medians, derive bins → Dataset
///   └───────────┘
///        │  Arc<Dataset>, never mutated
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterSpec → Subset (row indices)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  stats    │  counts, means, correlations over a Subset
///   └──────────┘
/// ```

pub mod batch;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod stats;

#[cfg(test)]
pub(crate) mod test_support;

use std::path::Path;
use std::sync::Arc;

pub use error::{DataError, Result};
pub use filter::{apply, ClosedRange, FilterSpec, ParentalControlFilter, Subset};
pub use model::{AddictionCategory, AgeGroup, Dataset, NumericColumn, Respondent};
pub use stats::Summary;

/// Load and normalize the survey once; hand the returned handle to every reader.
pub fn load_dataset(path: &Path) -> Result<Arc<Dataset>> {
    let raw = loader::load_file(path)?;
    let dataset = normalize::normalize(&raw)?;
    Ok(Arc::new(dataset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn dataset_can_be_shared_across_threads() {
        assert_send_sync::<Dataset>();
        assert_send_sync::<Arc<Dataset>>();
    }

    #[test]
    fn load_dataset_end_to_end() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        let header = model::required_columns().collect::<Vec<_>>().join(",");
        writeln!(file, "ID,{header}").unwrap();
        for (id, gender, pc) in [(1, " male ", "Yes"), (2, "FEMALE", "no")] {
            let cells: Vec<String> = model::required_columns()
                .map(|c| match c {
                    "Gender" => gender.to_string(),
                    "Phone_Usage_Purpose" => "social media".to_string(),
                    "Parental_Control" => pc.to_string(),
                    "Age" => "14".to_string(),
                    "Sleep_Hours" if id == 2 => String::new(),
                    _ => "6".to_string(),
                })
                .collect();
            writeln!(file, "{id},{}", cells.join(",")).unwrap();
        }

        let ds = load_dataset(file.path()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.extra_columns(), ["ID".to_string()]);
        assert_eq!(ds.options().genders, vec!["Female", "Male"]);
        assert_eq!(ds.records()[1].value(NumericColumn::SleepHours), Some(6.0));

        let spec = FilterSpec {
            parental_control: ParentalControlFilter::Enabled,
            ..Default::default()
        };
        let subset = apply(&ds, &spec);
        assert_eq!(subset.len(), 1);
        assert_eq!(subset.iter().next().unwrap().gender, "Male");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_dataset(&dir.path().join("absent.csv"));
        assert!(matches!(result, Err(DataError::Io(_))));
    }
}
