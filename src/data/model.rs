use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RawValue – a single cell of the source table, before normalization
// ---------------------------------------------------------------------------

/// A dynamically-typed cell as read from CSV / JSON / Parquet.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::String(s) => write!(f, "{s}"),
            RawValue::Integer(i) => write!(f, "{i}"),
            RawValue::Float(v) => write!(f, "{v}"),
            RawValue::Bool(b) => write!(f, "{b}"),
            RawValue::Null => write!(f, "<null>"),
        }
    }
}

impl RawValue {
    /// Interpret the cell as a number. Text is trimmed and parsed; anything
    /// unparsable (or NaN / infinite) yields `None`.
    pub fn as_f64(&self) -> Option<f64> {
        let v = match self {
            RawValue::Float(v) => *v,
            RawValue::Integer(i) => *i as f64,
            RawValue::Bool(b) => f64::from(u8::from(*b)),
            RawValue::String(s) => s.trim().parse::<f64>().ok()?,
            RawValue::Null => return None,
        };
        v.is_finite().then_some(v)
    }

    /// Textual form of the cell, `None` for nulls. Floats keep their
    /// fractional part (`1.0`, never `1`).
    pub fn as_text(&self) -> Option<String> {
        match self {
            RawValue::Null => None,
            RawValue::Float(v) => Some(format!("{v:?}")),
            other => Some(other.to_string()),
        }
    }
}

/// One source row: column name → cell.
pub type RawRecord = BTreeMap<String, RawValue>;

/// The table exactly as loaded from disk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    /// Column names in source order.
    pub column_names: Vec<String>,
    pub rows: Vec<RawRecord>,
}

impl RawTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_names.iter().any(|c| c == name)
    }
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

pub const GENDER_COLUMN: &str = "Gender";
pub const PURPOSE_COLUMN: &str = "Phone_Usage_Purpose";
pub const PARENTAL_CONTROL_COLUMN: &str = "Parental_Control";
pub const AGE_GROUP_COLUMN: &str = "Age_Group";
pub const ADDICTION_CATEGORY_COLUMN: &str = "Addiction_Category";

/// The eighteen numeric survey columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericColumn {
    Age,
    DailyUsageHours,
    SleepHours,
    AcademicPerformance,
    SocialInteractions,
    ExerciseHours,
    AnxietyLevel,
    DepressionLevel,
    SelfEsteem,
    ScreenTimeBeforeBed,
    PhoneChecksPerDay,
    AppsUsedDaily,
    TimeOnSocialMedia,
    TimeOnGaming,
    TimeOnEducation,
    WeekendUsageHours,
    AddictionLevel,
    FamilyCommunication,
}

impl NumericColumn {
    pub const COUNT: usize = 18;

    pub const ALL: [NumericColumn; Self::COUNT] = [
        NumericColumn::Age,
        NumericColumn::DailyUsageHours,
        NumericColumn::SleepHours,
        NumericColumn::AcademicPerformance,
        NumericColumn::SocialInteractions,
        NumericColumn::ExerciseHours,
        NumericColumn::AnxietyLevel,
        NumericColumn::DepressionLevel,
        NumericColumn::SelfEsteem,
        NumericColumn::ScreenTimeBeforeBed,
        NumericColumn::PhoneChecksPerDay,
        NumericColumn::AppsUsedDaily,
        NumericColumn::TimeOnSocialMedia,
        NumericColumn::TimeOnGaming,
        NumericColumn::TimeOnEducation,
        NumericColumn::WeekendUsageHours,
        NumericColumn::AddictionLevel,
        NumericColumn::FamilyCommunication,
    ];

    /// Columns whose missing values are replaced by the column median.
    pub const MEDIAN_BACKFILLED: [NumericColumn; 5] = [
        NumericColumn::AcademicPerformance,
        NumericColumn::SleepHours,
        NumericColumn::AnxietyLevel,
        NumericColumn::DepressionLevel,
        NumericColumn::SelfEsteem,
    ];

    /// Column header in the source file.
    pub fn source_name(self) -> &'static str {
        match self {
            NumericColumn::Age => "Age",
            NumericColumn::DailyUsageHours => "Daily_Usage_Hours",
            NumericColumn::SleepHours => "Sleep_Hours",
            NumericColumn::AcademicPerformance => "Academic_Performance",
            NumericColumn::SocialInteractions => "Social_Interactions",
            NumericColumn::ExerciseHours => "Exercise_Hours",
            NumericColumn::AnxietyLevel => "Anxiety_Level",
            NumericColumn::DepressionLevel => "Depression_Level",
            NumericColumn::SelfEsteem => "Self_Esteem",
            NumericColumn::ScreenTimeBeforeBed => "Screen_Time_Before_Bed",
            NumericColumn::PhoneChecksPerDay => "Phone_Checks_Per_Day",
            NumericColumn::AppsUsedDaily => "Apps_Used_Daily",
            NumericColumn::TimeOnSocialMedia => "Time_on_Social_Media",
            NumericColumn::TimeOnGaming => "Time_on_Gaming",
            NumericColumn::TimeOnEducation => "Time_on_Education",
            NumericColumn::WeekendUsageHours => "Weekend_Usage_Hours",
            NumericColumn::AddictionLevel => "Addiction_Level",
            NumericColumn::FamilyCommunication => "Family_Communication",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for NumericColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.source_name())
    }
}

impl FromStr for NumericColumn {
    type Err = String;

    /// Accepts the source header (`Sleep_Hours`) in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        NumericColumn::ALL
            .into_iter()
            .find(|c| c.source_name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown numeric column '{wanted}'"))
    }
}

/// Every column the source must provide.
pub fn required_columns() -> impl Iterator<Item = &'static str> {
    [GENDER_COLUMN, PURPOSE_COLUMN, PARENTAL_CONTROL_COLUMN]
        .into_iter()
        .chain(NumericColumn::ALL.into_iter().map(NumericColumn::source_name))
}

/// Survey columns plus the derived ones; everything else is passed through.
pub(crate) fn is_schema_column(name: &str) -> bool {
    name == AGE_GROUP_COLUMN
        || name == ADDICTION_CATEGORY_COLUMN
        || required_columns().any(|c| c == name)
}

// ---------------------------------------------------------------------------
// Derived categories
// ---------------------------------------------------------------------------

/// Age bucket; buckets are half-open: [0,13), [13,16), [16,19), [19,26).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgeGroup {
    #[serde(rename = "10-12")]
    UpTo12,
    #[serde(rename = "13-15")]
    From13To15,
    #[serde(rename = "16-18")]
    From16To18,
    #[serde(rename = "19+")]
    From19,
}

impl AgeGroup {
    pub const ALL: [AgeGroup; 4] = [
        AgeGroup::UpTo12,
        AgeGroup::From13To15,
        AgeGroup::From16To18,
        AgeGroup::From19,
    ];

    pub fn from_age(age: f64) -> Option<Self> {
        match age {
            a if (0.0..13.0).contains(&a) => Some(AgeGroup::UpTo12),
            a if (13.0..16.0).contains(&a) => Some(AgeGroup::From13To15),
            a if (16.0..19.0).contains(&a) => Some(AgeGroup::From16To18),
            a if (19.0..26.0).contains(&a) => Some(AgeGroup::From19),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AgeGroup::UpTo12 => "10-12",
            AgeGroup::From13To15 => "13-15",
            AgeGroup::From16To18 => "16-18",
            AgeGroup::From19 => "19+",
        }
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AgeGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AgeGroup::ALL
            .into_iter()
            .find(|g| g.label() == s.trim())
            .ok_or_else(|| format!("unknown age group '{s}'"))
    }
}

/// Addiction bucket; buckets are right-closed: (-1,3], (3,7], (7,11].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AddictionCategory {
    Low,
    Moderate,
    High,
}

impl AddictionCategory {
    pub const ALL: [AddictionCategory; 3] = [
        AddictionCategory::Low,
        AddictionCategory::Moderate,
        AddictionCategory::High,
    ];

    pub fn from_level(level: f64) -> Option<Self> {
        if level > -1.0 && level <= 3.0 {
            Some(AddictionCategory::Low)
        } else if level > 3.0 && level <= 7.0 {
            Some(AddictionCategory::Moderate)
        } else if level > 7.0 && level <= 11.0 {
            Some(AddictionCategory::High)
        } else {
            None
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AddictionCategory::Low => "Low",
            AddictionCategory::Moderate => "Moderate",
            AddictionCategory::High => "High",
        }
    }
}

impl fmt::Display for AddictionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Respondent – one row of the canonical table
// ---------------------------------------------------------------------------

/// A single normalized survey respondent.
#[derive(Debug, Clone, PartialEq)]
pub struct Respondent {
    /// Position in the source file; the record's identity.
    pub row: usize,
    /// Capitalized, trimmed; `"Unknown"` when the source cell is null or blank.
    pub gender: String,
    /// Title-cased, trimmed; `"Unknown"` when the source cell is null or blank.
    pub phone_usage_purpose: String,
    pub parental_control: bool,
    pub age_group: Option<AgeGroup>,
    pub addiction_category: Option<AddictionCategory>,
    pub(crate) values: [Option<f64>; NumericColumn::COUNT],
    /// Source columns outside the survey schema (ID, Name, ...), untouched.
    pub extra: BTreeMap<String, RawValue>,
}

impl Respondent {
    pub fn value(&self, column: NumericColumn) -> Option<f64> {
        self.values[column.index()]
    }

    pub(crate) fn set_value(&mut self, column: NumericColumn, value: Option<f64>) {
        self.values[column.index()] = value;
    }

    pub fn age(&self) -> Option<f64> {
        self.value(NumericColumn::Age)
    }

    pub fn addiction_level(&self) -> Option<f64> {
        self.value(NumericColumn::AddictionLevel)
    }

    /// Render back into a source row using the canonical values.
    fn to_raw(&self) -> RawRecord {
        let mut rec = self.extra.clone();
        rec.insert(GENDER_COLUMN.into(), RawValue::String(self.gender.clone()));
        rec.insert(
            PURPOSE_COLUMN.into(),
            RawValue::String(self.phone_usage_purpose.clone()),
        );
        rec.insert(
            PARENTAL_CONTROL_COLUMN.into(),
            RawValue::Bool(self.parental_control),
        );
        for col in NumericColumn::ALL {
            let cell = self.value(col).map_or(RawValue::Null, RawValue::Float);
            rec.insert(col.source_name().into(), cell);
        }
        rec.insert(
            AGE_GROUP_COLUMN.into(),
            self.age_group
                .map_or(RawValue::Null, |g| RawValue::String(g.label().into())),
        );
        rec.insert(
            ADDICTION_CATEGORY_COLUMN.into(),
            self.addiction_category
                .map_or(RawValue::Null, |c| RawValue::String(c.label().into())),
        );
        rec
    }
}

// ---------------------------------------------------------------------------
// Dataset – the canonical table
// ---------------------------------------------------------------------------

/// Distinct values a consumer can offer as filter choices.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterOptions {
    pub genders: Vec<String>,
    pub age_groups: Vec<AgeGroup>,
    pub purposes: Vec<String>,
}

/// The normalized dataset with pre-computed option indices. Never mutated
/// once built; share it behind an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    records: Vec<Respondent>,
    /// Non-schema source columns, in source order.
    extra_columns: Vec<String>,
    genders: BTreeSet<String>,
    age_groups: BTreeSet<AgeGroup>,
    purposes: BTreeSet<String>,
}

impl Dataset {
    /// Build option indices from normalized records.
    pub(crate) fn from_records(records: Vec<Respondent>, source_columns: &[String]) -> Self {
        let mut genders = BTreeSet::new();
        let mut age_groups = BTreeSet::new();
        let mut purposes = BTreeSet::new();

        for r in &records {
            genders.insert(r.gender.clone());
            purposes.insert(r.phone_usage_purpose.clone());
            if let Some(g) = r.age_group {
                age_groups.insert(g);
            }
        }

        let extra_columns = source_columns
            .iter()
            .filter(|c| !is_schema_column(c))
            .cloned()
            .collect();

        Dataset {
            records,
            extra_columns,
            genders,
            age_groups,
            purposes,
        }
    }

    pub fn records(&self) -> &[Respondent] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&Respondent> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn extra_columns(&self) -> &[String] {
        &self.extra_columns
    }

    /// Distinct normalized genders, age groups (ordinal) and purposes.
    pub fn options(&self) -> FilterOptions {
        FilterOptions {
            genders: self.genders.iter().cloned().collect(),
            age_groups: self.age_groups.iter().copied().collect(),
            purposes: self.purposes.iter().cloned().collect(),
        }
    }

    /// Smallest and largest non-null age, `None` if there is none.
    pub fn age_bounds(&self) -> Option<(f64, f64)> {
        self.records
            .iter()
            .filter_map(Respondent::age)
            .fold(None, |acc, a| match acc {
                None => Some((a, a)),
                Some((lo, hi)) => Some((lo.min(a), hi.max(a))),
            })
    }

    /// Export the canonical table as a raw table. Normalizing the result
    /// reproduces this dataset.
    pub fn to_raw(&self) -> RawTable {
        let mut column_names = self.extra_columns.clone();
        column_names.extend(required_columns().map(String::from));
        column_names.push(AGE_GROUP_COLUMN.into());
        column_names.push(ADDICTION_CATEGORY_COLUMN.into());

        RawTable {
            column_names,
            rows: self.records.iter().map(Respondent::to_raw).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_group_bins_are_half_open() {
        assert_eq!(AgeGroup::from_age(0.0), Some(AgeGroup::UpTo12));
        assert_eq!(AgeGroup::from_age(12.9), Some(AgeGroup::UpTo12));
        assert_eq!(AgeGroup::from_age(13.0), Some(AgeGroup::From13To15));
        assert_eq!(AgeGroup::from_age(16.0), Some(AgeGroup::From16To18));
        assert_eq!(AgeGroup::from_age(19.0), Some(AgeGroup::From19));
        assert_eq!(AgeGroup::from_age(25.99), Some(AgeGroup::From19));
        assert_eq!(AgeGroup::from_age(26.0), None);
        assert_eq!(AgeGroup::from_age(-0.5), None);
    }

    #[test]
    fn every_age_in_range_gets_exactly_one_group() {
        let mut age = 0.0;
        while age < 26.0 {
            let group = AgeGroup::from_age(age).expect("in range");
            let hits = AgeGroup::ALL
                .iter()
                .filter(|g| g.label() == group.label())
                .count();
            assert_eq!(hits, 1);
            age += 0.25;
        }
    }

    #[test]
    fn addiction_bins_are_right_closed() {
        assert_eq!(AddictionCategory::from_level(-1.0), None);
        assert_eq!(AddictionCategory::from_level(-0.5), Some(AddictionCategory::Low));
        assert_eq!(AddictionCategory::from_level(3.0), Some(AddictionCategory::Low));
        assert_eq!(AddictionCategory::from_level(3.1), Some(AddictionCategory::Moderate));
        assert_eq!(AddictionCategory::from_level(7.0), Some(AddictionCategory::Moderate));
        assert_eq!(AddictionCategory::from_level(8.0), Some(AddictionCategory::High));
        assert_eq!(AddictionCategory::from_level(11.0), Some(AddictionCategory::High));
        assert_eq!(AddictionCategory::from_level(11.5), None);
    }

    #[test]
    fn raw_value_numeric_coercion() {
        assert_eq!(RawValue::String(" 4.5 ".into()).as_f64(), Some(4.5));
        assert_eq!(RawValue::String("n/a".into()).as_f64(), None);
        assert_eq!(RawValue::String("NaN".into()).as_f64(), None);
        assert_eq!(RawValue::Integer(7).as_f64(), Some(7.0));
        assert_eq!(RawValue::Bool(true).as_f64(), Some(1.0));
        assert_eq!(RawValue::Null.as_f64(), None);
    }

    #[test]
    fn raw_value_text_form() {
        assert_eq!(RawValue::Float(1.0).as_text().as_deref(), Some("1.0"));
        assert_eq!(RawValue::Float(2.5).as_text().as_deref(), Some("2.5"));
        assert_eq!(RawValue::Integer(1).as_text().as_deref(), Some("1"));
        assert_eq!(RawValue::Bool(true).as_text().as_deref(), Some("true"));
        assert_eq!(RawValue::String("01".into()).as_text().as_deref(), Some("01"));
        assert_eq!(RawValue::Null.as_text(), None);
    }

    #[test]
    fn numeric_column_names_round_trip() {
        for col in NumericColumn::ALL {
            assert_eq!(col.source_name().parse::<NumericColumn>(), Ok(col));
        }
        assert_eq!(
            "time_on_gaming".parse::<NumericColumn>(),
            Ok(NumericColumn::TimeOnGaming)
        );
        assert!("Gender".parse::<NumericColumn>().is_err());
    }

    #[test]
    fn age_group_serializes_as_label() {
        let json = serde_json::to_string(&AgeGroup::From19).unwrap();
        assert_eq!(json, "\"19+\"");
        let back: AgeGroup = serde_json::from_str("\"13-15\"").unwrap();
        assert_eq!(back, AgeGroup::From13To15);
    }
}
