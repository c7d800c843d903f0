use std::collections::BTreeSet;
use std::sync::Arc;

use log::warn;

use crate::data::filter::{
    filtered_indices, ClosedRange, FilterSpec, ParentalControlFilter, Subset,
};
use crate::data::model::{AgeGroup, Dataset};
use crate::data::stats::Summary;

// ---------------------------------------------------------------------------
// Dashboard state
// ---------------------------------------------------------------------------

/// Which set-valued filter a toggle applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facet {
    Gender,
    AgeGroup,
    Purpose,
}

/// Filter selections for one consumer, independent of rendering. The dataset
/// is shared; only the selection and the visible rows belong to this state.
pub struct DashboardState {
    dataset: Arc<Dataset>,
    filter: FilterSpec,

    /// Indices of respondents passing the current filter (cached).
    visible_indices: Vec<usize>,
}

impl DashboardState {
    /// Start with everything selectable selected.
    pub fn new(dataset: Arc<Dataset>) -> Self {
        let filter = FilterSpec::select_all(&dataset);
        let visible_indices = filtered_indices(&dataset, &filter);
        Self {
            dataset,
            filter,
            visible_indices,
        }
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    /// Current filter selections.
    pub fn filter(&self) -> &FilterSpec {
        &self.filter
    }

    /// Respondents passing the current filter.
    pub fn visible(&self) -> Subset<'_> {
        Subset::new(&self.dataset, self.visible_indices.clone())
    }

    /// Overview indicators for the visible rows against the whole table.
    pub fn summary(&self) -> Summary {
        Summary::compute(&self.visible(), &Subset::whole(&self.dataset))
    }

    /// Recompute `visible_indices` after a filter change.
    fn refilter(&mut self) {
        self.visible_indices = filtered_indices(&self.dataset, &self.filter);
    }

    /// Replace the whole filter at once.
    pub fn set_filter(&mut self, filter: FilterSpec) {
        self.filter = filter;
        self.refilter();
    }

    pub fn set_age_range(&mut self, min: f64, max: f64) {
        self.filter.age_range = Some(ClosedRange::new(min, max));
        self.refilter();
    }

    pub fn set_addiction_range(&mut self, min: f64, max: f64) {
        self.filter.addiction_range = Some(ClosedRange::new(min, max));
        self.refilter();
    }

    pub fn set_parental_control(&mut self, mode: ParentalControlFilter) {
        self.filter.parental_control = mode;
        self.refilter();
    }

    /// Toggle a single value of a facet. Unknown age-group labels are ignored.
    pub fn toggle_filter_value(&mut self, facet: Facet, value: &str) {
        match facet {
            Facet::Gender => toggle(&mut self.filter.genders, value.to_string()),
            Facet::Purpose => toggle(&mut self.filter.purposes, value.to_string()),
            Facet::AgeGroup => {
                let Ok(group) = value.parse::<AgeGroup>() else {
                    warn!("ignoring unknown age group '{value}'");
                    return;
                };
                toggle(&mut self.filter.age_groups, group);
            }
        }
        self.refilter();
    }

    /// Select all values of a facet.
    pub fn select_all(&mut self, facet: Facet) {
        let options = self.dataset.options();
        match facet {
            Facet::Gender => self.filter.genders = Some(options.genders.into_iter().collect()),
            Facet::AgeGroup => {
                self.filter.age_groups = Some(options.age_groups.into_iter().collect())
            }
            Facet::Purpose => self.filter.purposes = Some(options.purposes.into_iter().collect()),
        }
        self.refilter();
    }

    /// Deselect all values of a facet; nothing will match until one is picked.
    pub fn select_none(&mut self, facet: Facet) {
        match facet {
            Facet::Gender => self.filter.genders = Some(Default::default()),
            Facet::AgeGroup => self.filter.age_groups = Some(Default::default()),
            Facet::Purpose => self.filter.purposes = Some(Default::default()),
        }
        self.refilter();
    }
}

fn toggle<T: Ord>(selected: &mut Option<BTreeSet<T>>, value: T) {
    let selected = selected.get_or_insert_with(Default::default);
    if !selected.remove(&value) {
        selected.insert(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::apply;
    use crate::data::test_support::{dataset, respondent};
    use pretty_assertions::assert_eq;

    fn state() -> DashboardState {
        DashboardState::new(Arc::new(dataset(vec![
            respondent(12, "Male", "Gaming", "yes", 2.0),
            respondent(14, "Female", "Social Media", "no", 8.0),
            respondent(17, "Female", "Education", "yes", 5.0),
        ])))
    }

    fn visible_rows(state: &DashboardState) -> Vec<usize> {
        state.visible().iter().map(|r| r.row).collect()
    }

    #[test]
    fn starts_with_everything_visible() {
        let s = state();
        assert_eq!(visible_rows(&s), vec![0, 1, 2]);
        assert_eq!(s.summary().respondents, 3);
    }

    #[test]
    fn toggling_values_refilters() {
        let mut s = state();
        s.toggle_filter_value(Facet::Gender, "Female");
        assert_eq!(visible_rows(&s), vec![0]);

        s.toggle_filter_value(Facet::Gender, "Female");
        assert_eq!(visible_rows(&s), vec![0, 1, 2]);

        s.toggle_filter_value(Facet::AgeGroup, "13-15");
        assert_eq!(visible_rows(&s), vec![0, 2]);

        s.toggle_filter_value(Facet::AgeGroup, "not a group");
        assert_eq!(visible_rows(&s), vec![0, 2]);
    }

    #[test]
    fn select_none_then_all() {
        let mut s = state();
        s.select_none(Facet::Purpose);
        assert!(s.visible().is_empty());
        assert_eq!(s.summary().daily_usage_hours.mean, None);

        s.select_all(Facet::Purpose);
        assert_eq!(visible_rows(&s), vec![0, 1, 2]);
    }

    #[test]
    fn ranges_and_parental_control() {
        let mut s = state();
        s.set_parental_control(ParentalControlFilter::Enabled);
        assert_eq!(visible_rows(&s), vec![0, 2]);
        s.set_addiction_range(3.0, 10.0);
        assert_eq!(visible_rows(&s), vec![2]);
        s.set_age_range(13.0, 15.0);
        assert!(s.visible().is_empty());
    }

    #[test]
    fn cache_agrees_with_pure_filter() {
        let mut s = state();
        s.toggle_filter_value(Facet::Purpose, "Gaming");
        s.set_age_range(12.0, 16.0);
        let fresh = apply(s.dataset(), s.filter());
        assert_eq!(s.visible().indices(), fresh.indices());
    }
}
