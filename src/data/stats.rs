//! Read-only aggregates over a [`Subset`].
//!
//! Every aggregate over an empty selection (or a column with no values in
//! it) comes back as `None` instead of NaN; callers decide how to show
//! "no data".

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use super::filter::Subset;
use super::model::{AddictionCategory, AgeGroup, NumericColumn, Respondent};

/// A label and how many respondents carry it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Count<K> {
    pub value: K,
    pub count: usize,
}

/// Mean of `column` over a 2-D grouping (ages down, genders across).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedMeans {
    pub ages: Vec<f64>,
    pub genders: Vec<String>,
    /// `cells[i][j]` is the mean for `ages[i]` × `genders[j]`.
    pub cells: Vec<Vec<Option<f64>>>,
}

/// Pairwise-complete Pearson correlations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<NumericColumn>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: NumericColumn, b: NumericColumn) -> Option<f64> {
        let i = self.columns.iter().position(|c| *c == a)?;
        let j = self.columns.iter().position(|c| *c == b)?;
        self.values[i][j]
    }
}

fn mean_of(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

impl<'a> Subset<'a> {
    pub fn count(&self) -> usize {
        self.len()
    }

    /// Mean of the non-null values of `column`.
    pub fn mean(&self, column: NumericColumn) -> Option<f64> {
        mean_of(self.iter().filter_map(|r| r.value(column)))
    }

    /// This subset's mean minus `baseline`'s mean.
    pub fn delta_vs(&self, baseline: &Subset<'_>, column: NumericColumn) -> Option<f64> {
        Some(self.mean(column)? - baseline.mean(column)?)
    }

    /// Respondents per gender, most frequent first.
    pub fn gender_counts(&self) -> Vec<Count<String>> {
        counts_by_frequency(self.iter().map(|r| r.gender.clone()))
    }

    /// Respondents per purpose, most frequent first.
    pub fn purpose_counts(&self) -> Vec<Count<String>> {
        counts_by_frequency(self.iter().map(|r| r.phone_usage_purpose.clone()))
    }

    /// Respondents per age group in ordinal order, empty groups included.
    pub fn age_group_counts(&self) -> Vec<Count<AgeGroup>> {
        AgeGroup::ALL
            .into_iter()
            .map(|g| Count {
                value: g,
                count: self.iter().filter(|r| r.age_group == Some(g)).count(),
            })
            .collect()
    }

    /// Respondents per addiction category in ordinal order, empty ones included.
    pub fn addiction_category_counts(&self) -> Vec<Count<AddictionCategory>> {
        AddictionCategory::ALL
            .into_iter()
            .map(|c| Count {
                value: c,
                count: self
                    .iter()
                    .filter(|r| r.addiction_category == Some(c))
                    .count(),
            })
            .collect()
    }

    /// Mean of `column` per key; keys with no values are omitted.
    pub fn mean_by<K, F>(&self, key: F, column: NumericColumn) -> BTreeMap<K, f64>
    where
        K: Ord,
        F: Fn(&Respondent) -> Option<K>,
    {
        let mut acc: BTreeMap<K, (f64, usize)> = BTreeMap::new();
        for r in self.iter() {
            if let (Some(k), Some(v)) = (key(r), r.value(column)) {
                let e = acc.entry(k).or_insert((0.0, 0));
                e.0 += v;
                e.1 += 1;
            }
        }
        acc.into_iter()
            .map(|(k, (sum, n))| (k, sum / n as f64))
            .collect()
    }

    pub fn mean_by_purpose(&self, column: NumericColumn) -> BTreeMap<String, f64> {
        self.mean_by(|r| Some(r.phone_usage_purpose.clone()), column)
    }

    /// Mean of `column` for every (age, gender) pair present in the subset.
    pub fn mean_by_age_and_gender(&self, column: NumericColumn) -> GroupedMeans {
        let mut ages: Vec<f64> = self.iter().filter_map(Respondent::age).collect();
        ages.sort_by(f64::total_cmp);
        ages.dedup();
        let genders: Vec<String> = self
            .iter()
            .map(|r| r.gender.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut acc: HashMap<(u64, &str), (f64, usize)> = HashMap::new();
        for r in self.iter() {
            if let (Some(age), Some(v)) = (r.age(), r.value(column)) {
                let e = acc.entry((age.to_bits(), r.gender.as_str())).or_default();
                e.0 += v;
                e.1 += 1;
            }
        }

        let cells = ages
            .iter()
            .map(|age| {
                genders
                    .iter()
                    .map(|g| {
                        acc.get(&(age.to_bits(), g.as_str()))
                            .map(|(sum, n)| sum / *n as f64)
                    })
                    .collect()
            })
            .collect();

        GroupedMeans {
            ages,
            genders,
            cells,
        }
    }

    /// Correlation matrix for the chosen columns; `None` when fewer than two
    /// columns are given.
    pub fn correlation_matrix(&self, columns: &[NumericColumn]) -> Option<CorrelationMatrix> {
        if columns.len() < 2 {
            return None;
        }
        let values = columns
            .iter()
            .map(|&a| columns.iter().map(|&b| self.pearson(a, b)).collect())
            .collect();
        Some(CorrelationMatrix {
            columns: columns.to_vec(),
            values,
        })
    }

    /// Pearson's r over rows where both columns are present. `None` with
    /// fewer than two such rows or when either side is constant.
    pub fn pearson(&self, a: NumericColumn, b: NumericColumn) -> Option<f64> {
        let pairs: Vec<(f64, f64)> = self
            .iter()
            .filter_map(|r| Some((r.value(a)?, r.value(b)?)))
            .collect();
        if pairs.len() < 2 {
            return None;
        }
        let n = pairs.len() as f64;
        let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
        let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;
        let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
        for (x, y) in &pairs {
            let dx = x - mean_x;
            let dy = y - mean_y;
            sxy += dx * dy;
            sxx += dx * dx;
            syy += dy * dy;
        }
        if sxx == 0.0 || syy == 0.0 {
            return None;
        }
        Some((sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0))
    }
}

fn counts_by_frequency(labels: impl Iterator<Item = String>) -> Vec<Count<String>> {
    let mut tally: BTreeMap<String, usize> = BTreeMap::new();
    for label in labels {
        *tally.entry(label).or_default() += 1;
    }
    let mut counts: Vec<Count<String>> = tally
        .into_iter()
        .map(|(value, count)| Count { value, count })
        .collect();
    // stable sort keeps ties alphabetical
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

// ---------------------------------------------------------------------------
// Summary – the overview indicators
// ---------------------------------------------------------------------------

/// A subset mean next to its difference from the whole-table mean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Indicator {
    pub mean: Option<f64>,
    pub delta_vs_overall: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub respondents: usize,
    pub daily_usage_hours: Indicator,
    pub academic_performance: Indicator,
    pub addiction_level: Indicator,
    pub anxiety_level: Option<f64>,
    pub depression_level: Option<f64>,
    pub self_esteem: Option<f64>,
    pub genders: Vec<Count<String>>,
    pub age_groups: Vec<Count<AgeGroup>>,
    pub purposes: Vec<Count<String>>,
    pub addiction_categories: Vec<Count<AddictionCategory>>,
}

impl Summary {
    /// Indicators for `subset`, deltas taken against `overall`.
    pub fn compute(subset: &Subset<'_>, overall: &Subset<'_>) -> Self {
        let indicator = |column| Indicator {
            mean: subset.mean(column),
            delta_vs_overall: subset.delta_vs(overall, column),
        };
        Summary {
            respondents: subset.count(),
            daily_usage_hours: indicator(NumericColumn::DailyUsageHours),
            academic_performance: indicator(NumericColumn::AcademicPerformance),
            addiction_level: indicator(NumericColumn::AddictionLevel),
            anxiety_level: subset.mean(NumericColumn::AnxietyLevel),
            depression_level: subset.mean(NumericColumn::DepressionLevel),
            self_esteem: subset.mean(NumericColumn::SelfEsteem),
            genders: subset.gender_counts(),
            age_groups: subset.age_group_counts(),
            purposes: subset.purpose_counts(),
            addiction_categories: subset.addiction_category_counts(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{apply, FilterSpec};
    use crate::data::model::{Dataset, RawValue};
    use crate::data::test_support::{dataset, respondent, with};
    use pretty_assertions::assert_eq;

    fn approx(a: Option<f64>, b: f64) -> bool {
        a.is_some_and(|a| (a - b).abs() < 1e-9)
    }

    fn sample() -> Dataset {
        let mut rows = vec![
            respondent(13, "Male", "Gaming", "yes", 8.0),
            respondent(13, "Female", "Social Media", "no", 6.0),
            respondent(15, "Female", "Social Media", "no", 4.0),
            respondent(17, "Male", "Education", "yes", 2.0),
        ];
        for (rec, (usage, sleep)) in rows
            .iter_mut()
            .zip([(6.0, 5.0), (5.0, 6.0), (3.0, 7.0), (2.0, 8.0)])
        {
            with(rec, NumericColumn::DailyUsageHours, usage);
            with(rec, NumericColumn::SleepHours, sleep);
        }
        dataset(rows)
    }

    #[test]
    fn mean_and_delta() {
        let ds = sample();
        let all = Subset::whole(&ds);
        let females = apply(
            &ds,
            &FilterSpec {
                genders: Some(["Female".to_string()].into()),
                ..Default::default()
            },
        );

        assert_eq!(all.count(), 4);
        assert!(approx(all.mean(NumericColumn::DailyUsageHours), 4.0));
        assert!(approx(females.mean(NumericColumn::DailyUsageHours), 4.0));
        assert!(approx(
            females.delta_vs(&all, NumericColumn::AddictionLevel),
            0.0
        ));
        assert!(approx(females.mean(NumericColumn::SleepHours), 6.5));
        assert!(approx(females.delta_vs(&all, NumericColumn::SleepHours), 0.0));
    }

    #[test]
    fn aggregates_over_empty_subset_are_none() {
        let ds = sample();
        let none = apply(
            &ds,
            &FilterSpec {
                genders: Some(BTreeSet::new()),
                ..Default::default()
            },
        );
        let all = Subset::whole(&ds);

        assert_eq!(none.count(), 0);
        assert_eq!(none.mean(NumericColumn::DailyUsageHours), None);
        assert_eq!(none.delta_vs(&all, NumericColumn::DailyUsageHours), None);
        assert_eq!(none.pearson(NumericColumn::DailyUsageHours, NumericColumn::SleepHours), None);
        assert!(none.gender_counts().is_empty());

        let summary = Summary::compute(&none, &all);
        assert_eq!(summary.respondents, 0);
        assert_eq!(summary.daily_usage_hours.mean, None);
        assert!(summary.age_groups.iter().all(|c| c.count == 0));
    }

    #[test]
    fn mean_skips_nulls_in_non_backfilled_columns() {
        let mut a = respondent(14, "Male", "Gaming", "no", 5.0);
        let mut b = respondent(14, "Male", "Gaming", "no", 5.0);
        with(&mut a, NumericColumn::ExerciseHours, 3.0);
        b.insert(
            NumericColumn::ExerciseHours.source_name().into(),
            RawValue::String("??".into()),
        );
        let ds = dataset(vec![a, b]);
        assert!(approx(
            Subset::whole(&ds).mean(NumericColumn::ExerciseHours),
            3.0
        ));
    }

    #[test]
    fn value_counts() {
        let ds = sample();
        let all = Subset::whole(&ds);

        assert_eq!(
            all.gender_counts(),
            vec![
                Count { value: "Female".to_string(), count: 2 },
                Count { value: "Male".to_string(), count: 2 },
            ]
        );
        assert_eq!(all.purpose_counts()[0], Count { value: "Social Media".to_string(), count: 2 });
        assert_eq!(
            all.age_group_counts()
                .iter()
                .map(|c| c.count)
                .collect::<Vec<_>>(),
            vec![0, 3, 1, 0]
        );
        assert_eq!(
            all.addiction_category_counts()
                .iter()
                .map(|c| c.count)
                .collect::<Vec<_>>(),
            vec![1, 2, 1]
        );
    }

    #[test]
    fn grouped_means() {
        let ds = sample();
        let all = Subset::whole(&ds);

        let by_purpose = all.mean_by_purpose(NumericColumn::DailyUsageHours);
        assert!(approx(by_purpose.get("Social Media").copied(), 4.0));
        assert!(approx(by_purpose.get("Gaming").copied(), 6.0));

        let grid = all.mean_by_age_and_gender(NumericColumn::DailyUsageHours);
        assert_eq!(grid.ages, vec![13.0, 15.0, 17.0]);
        assert_eq!(grid.genders, vec!["Female", "Male"]);
        assert_eq!(grid.cells[0], vec![Some(5.0), Some(6.0)]);
        assert_eq!(grid.cells[1], vec![Some(3.0), None]);
        assert_eq!(grid.cells[2], vec![None, Some(2.0)]);
    }

    #[test]
    fn correlation() {
        let ds = sample();
        let all = Subset::whole(&ds);

        assert!(all.correlation_matrix(&[NumericColumn::SleepHours]).is_none());

        let m = all
            .correlation_matrix(&[
                NumericColumn::DailyUsageHours,
                NumericColumn::SleepHours,
                NumericColumn::AddictionLevel,
                NumericColumn::TimeOnGaming,
            ])
            .unwrap();
        assert!(approx(m.get(NumericColumn::SleepHours, NumericColumn::SleepHours), 1.0));
        assert!(m.get(NumericColumn::DailyUsageHours, NumericColumn::SleepHours).unwrap() < -0.9);
        assert!(approx(
            m.get(NumericColumn::SleepHours, NumericColumn::AddictionLevel),
            -1.0
        ));
        // constant column
        assert_eq!(m.get(NumericColumn::TimeOnGaming, NumericColumn::SleepHours), None);
    }

    #[test]
    fn summary_serializes() {
        let ds = sample();
        let all = Subset::whole(&ds);
        let summary = Summary::compute(&all, &all);
        assert!(approx(summary.daily_usage_hours.delta_vs_overall, 0.0));

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["respondents"], 4);
        assert_eq!(json["age_groups"][1]["value"], "13-15");
        assert_eq!(json["addiction_categories"][2]["value"], "High");
    }
}
