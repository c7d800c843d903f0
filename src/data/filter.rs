use std::collections::BTreeSet;

use log::debug;
use serde::{Deserialize, Serialize};

use super::model::{AgeGroup, Dataset, Respondent};

// ---------------------------------------------------------------------------
// Filter specification
// ---------------------------------------------------------------------------

/// Inclusive numeric interval `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClosedRange {
    pub min: f64,
    pub max: f64,
}

impl ClosedRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Tri-state parental-control constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParentalControlFilter {
    #[default]
    Any,
    Enabled,
    Disabled,
}

impl ParentalControlFilter {
    fn accepts(self, parental_control: bool) -> bool {
        match self {
            ParentalControlFilter::Any => true,
            ParentalControlFilter::Enabled => parental_control,
            ParentalControlFilter::Disabled => !parental_control,
        }
    }
}

/// Which respondents to keep. Every `None` option is unconstrained; a
/// `Some` set that is empty matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_range: Option<ClosedRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genders: Option<BTreeSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_groups: Option<BTreeSet<AgeGroup>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purposes: Option<BTreeSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addiction_range: Option<ClosedRange>,
    pub parental_control: ParentalControlFilter,
}

impl FilterSpec {
    /// The "show everything selectable" default: full age span of the data,
    /// every option selected, addiction 0–10, any parental control.
    ///
    /// Respondents with a null age or no age group are still excluded by this
    /// spec, the same way an unselected value would be.
    pub fn select_all(dataset: &Dataset) -> Self {
        let options = dataset.options();
        Self {
            age_range: dataset
                .age_bounds()
                .map(|(lo, hi)| ClosedRange::new(lo.floor(), hi.ceil())),
            genders: Some(options.genders.into_iter().collect()),
            age_groups: Some(options.age_groups.into_iter().collect()),
            purposes: Some(options.purposes.into_iter().collect()),
            addiction_range: Some(ClosedRange::new(0.0, 10.0)),
            parental_control: ParentalControlFilter::Any,
        }
    }

    /// Whether `r` satisfies every constrained option. Nulls never satisfy a
    /// range or set constraint.
    pub fn matches(&self, r: &Respondent) -> bool {
        in_range(self.age_range, r.age())
            && in_set(self.genders.as_ref(), Some(&r.gender))
            && in_set(self.age_groups.as_ref(), r.age_group.as_ref())
            && in_set(self.purposes.as_ref(), Some(&r.phone_usage_purpose))
            && in_range(self.addiction_range, r.addiction_level())
            && self.parental_control.accepts(r.parental_control)
    }
}

fn in_range(range: Option<ClosedRange>, value: Option<f64>) -> bool {
    match range {
        None => true,
        Some(range) => value.is_some_and(|v| range.contains(v)),
    }
}

fn in_set<T: Ord>(allowed: Option<&BTreeSet<T>>, value: Option<&T>) -> bool {
    match allowed {
        None => true,
        Some(allowed) => value.is_some_and(|v| allowed.contains(v)),
    }
}

// ---------------------------------------------------------------------------
// Applying a spec
// ---------------------------------------------------------------------------

/// Return indices of respondents that pass `spec`, in table order.
pub fn filtered_indices(dataset: &Dataset, spec: &FilterSpec) -> Vec<usize> {
    let indices: Vec<usize> = dataset
        .records()
        .iter()
        .enumerate()
        .filter(|(_, r)| spec.matches(r))
        .map(|(i, _)| i)
        .collect();
    debug!("filter kept {} of {} respondents", indices.len(), dataset.len());
    indices
}

/// Evaluate `spec` against the canonical table.
pub fn apply<'a>(dataset: &'a Dataset, spec: &FilterSpec) -> Subset<'a> {
    Subset::new(dataset, filtered_indices(dataset, spec))
}

/// Read-only view of selected respondents. May be empty.
#[derive(Debug, Clone)]
pub struct Subset<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl<'a> Subset<'a> {
    pub(crate) fn new(dataset: &'a Dataset, indices: Vec<usize>) -> Self {
        Self { dataset, indices }
    }

    /// Every respondent of the table.
    pub fn whole(dataset: &'a Dataset) -> Self {
        Self::new(dataset, (0..dataset.len()).collect())
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Respondent> + '_ {
        let records = self.dataset.records();
        self.indices.iter().map(move |&i| &records[i])
    }
}
