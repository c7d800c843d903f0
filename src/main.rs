//! Command-line front end for the survey data layer.
//!
//! Commands:
//! - options: list the distinct filter choices in the dataset
//! - summary: overview indicators for the filtered respondents
//! - head: print the first filtered rows as a table
//! - correlate: correlation matrix between numeric columns
//! - breakdown: mean of a column by purpose and by age x gender

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use arrow::util::pretty::pretty_format_batches;
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;

use teen_phone_insights::data::batch::to_record_batch;
use teen_phone_insights::data::stats::{Count, Indicator, Summary};
use teen_phone_insights::data::{
    apply, load_dataset, AgeGroup, ClosedRange, Dataset, FilterSpec, NumericColumn,
    ParentalControlFilter, Subset,
};

/// Clean, filter and summarize the adolescent phone-usage survey
#[derive(Parser)]
#[command(name = "teen-phone-insights")]
#[command(version)]
#[command(about = "Clean, filter and summarize adolescent phone-usage survey data", long_about = None)]
struct Cli {
    /// Survey file (.csv, .json or .parquet)
    #[arg(short, long, global = true, default_value = "teen_phone_addiction_dataset.csv")]
    data: PathBuf,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the distinct genders, age groups and purposes
    Options,

    /// Overview indicators for the filtered respondents
    Summary {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Print the first filtered rows as a table
    Head {
        #[command(flatten)]
        filter: FilterArgs,

        /// Number of rows to print
        #[arg(short = 'n', long, default_value = "10")]
        rows: usize,
    },

    /// Correlation matrix between numeric columns (at least two)
    Correlate {
        #[command(flatten)]
        filter: FilterArgs,

        /// Column to include, e.g. Sleep_Hours (repeatable)
        #[arg(short, long = "column", required = true)]
        columns: Vec<NumericColumn>,
    },

    /// Mean of a column by purpose and by age x gender
    Breakdown {
        #[command(flatten)]
        filter: FilterArgs,

        /// Column to average
        #[arg(short, long, default_value = "Daily_Usage_Hours")]
        column: NumericColumn,
    },
}

#[derive(Args, Clone)]
struct FilterArgs {
    /// JSON filter spec; flags below override its fields
    #[arg(long)]
    filter: Option<PathBuf>,

    /// Start from every option selected instead of no constraint
    #[arg(long)]
    select_all: bool,

    #[arg(long)]
    age_min: Option<f64>,

    #[arg(long)]
    age_max: Option<f64>,

    /// Allowed gender (repeatable)
    #[arg(long = "gender")]
    genders: Vec<String>,

    /// Allowed age group: 10-12, 13-15, 16-18, 19+ (repeatable)
    #[arg(long = "age-group")]
    age_groups: Vec<AgeGroup>,

    /// Allowed phone usage purpose (repeatable)
    #[arg(long = "purpose")]
    purposes: Vec<String>,

    #[arg(long)]
    addiction_min: Option<f64>,

    #[arg(long)]
    addiction_max: Option<f64>,

    #[arg(long, value_enum)]
    parental_control: Option<ParentalArg>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ParentalArg {
    Any,
    Yes,
    No,
}

impl From<ParentalArg> for ParentalControlFilter {
    fn from(arg: ParentalArg) -> Self {
        match arg {
            ParentalArg::Any => ParentalControlFilter::Any,
            ParentalArg::Yes => ParentalControlFilter::Enabled,
            ParentalArg::No => ParentalControlFilter::Disabled,
        }
    }
}

impl FilterArgs {
    fn to_spec(&self, dataset: &Dataset) -> Result<FilterSpec> {
        let mut spec = match &self.filter {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading filter spec {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("parsing filter spec {}", path.display()))?
            }
            None if self.select_all => FilterSpec::select_all(dataset),
            None => FilterSpec::default(),
        };

        if let Some(range) = merge_range(spec.age_range, self.age_min, self.age_max) {
            spec.age_range = Some(range);
        }
        if let Some(range) =
            merge_range(spec.addiction_range, self.addiction_min, self.addiction_max)
        {
            spec.addiction_range = Some(range);
        }
        if !self.genders.is_empty() {
            spec.genders = Some(self.genders.iter().cloned().collect());
        }
        if !self.age_groups.is_empty() {
            spec.age_groups = Some(self.age_groups.iter().copied().collect());
        }
        if !self.purposes.is_empty() {
            spec.purposes = Some(self.purposes.iter().cloned().collect());
        }
        if let Some(pc) = self.parental_control {
            spec.parental_control = pc.into();
        }
        Ok(spec)
    }
}

/// Open-ended bounds fall back to the current range, then to infinity.
fn merge_range(
    current: Option<ClosedRange>,
    min: Option<f64>,
    max: Option<f64>,
) -> Option<ClosedRange> {
    if min.is_none() && max.is_none() {
        return None;
    }
    let min = min.or(current.map(|r| r.min)).unwrap_or(f64::NEG_INFINITY);
    let max = max.or(current.map(|r| r.max)).unwrap_or(f64::INFINITY);
    Some(ClosedRange::new(min, max))
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let dataset = load_dataset(&cli.data)
        .with_context(|| format!("loading survey data from {}", cli.data.display()))?;
    info!("dataset ready: {} respondents", dataset.len());

    match &cli.command {
        Commands::Options => {
            let options = dataset.options();
            if cli.json {
                let value = serde_json::json!({
                    "options": options,
                    "age_bounds": dataset.age_bounds(),
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("Genders:    {}", options.genders.join(", "));
                let groups: Vec<&str> = options.age_groups.iter().map(|g| g.label()).collect();
                println!("Age groups: {}", groups.join(", "));
                println!("Purposes:   {}", options.purposes.join(", "));
                if let Some((lo, hi)) = dataset.age_bounds() {
                    println!("Ages:       {lo} - {hi}");
                }
            }
        }

        Commands::Summary { filter } => {
            let spec = filter.to_spec(&dataset)?;
            let subset = apply(&dataset, &spec);
            let summary = Summary::compute(&subset, &Subset::whole(&dataset));
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_summary(&summary);
            }
        }

        Commands::Head { filter, rows } => {
            let spec = filter.to_spec(&dataset)?;
            let subset = apply(&dataset, &spec);
            if subset.is_empty() {
                println!("No respondents match the current filters.");
                return Ok(());
            }
            let batch = to_record_batch(&subset, *rows)?;
            println!("{}", pretty_format_batches(&[batch])?);
            println!("({} of {} matching rows shown)", (*rows).min(subset.len()), subset.len());
        }

        Commands::Correlate { filter, columns } => {
            let spec = filter.to_spec(&dataset)?;
            let subset = apply(&dataset, &spec);
            let Some(matrix) = subset.correlation_matrix(columns) else {
                bail!("select at least 2 columns to correlate");
            };
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&matrix)?);
            } else {
                let width = columns.iter().map(|c| c.source_name().len()).max().unwrap_or(0);
                print!("{:width$}", "");
                for c in columns {
                    print!("  {:>8.8}", c.source_name());
                }
                println!();
                for (c, row) in columns.iter().zip(&matrix.values) {
                    print!("{:width$}", c.source_name());
                    for v in row {
                        print!("  {:>8}", fmt_opt(*v, 2));
                    }
                    println!();
                }
            }
        }

        Commands::Breakdown { filter, column } => {
            let spec = filter.to_spec(&dataset)?;
            let subset = apply(&dataset, &spec);
            let by_purpose = subset.mean_by_purpose(*column);
            let grid = subset.mean_by_age_and_gender(*column);
            if cli.json {
                let value = serde_json::json!({
                    "column": column,
                    "by_purpose": by_purpose,
                    "by_age_and_gender": grid,
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else if subset.is_empty() {
                println!("No respondents match the current filters.");
            } else {
                println!("Mean {column} by purpose");
                for (purpose, mean) in &by_purpose {
                    println!("  {purpose:<20} {mean:.2}");
                }
                println!("\nMean {column} by age and gender");
                print!("  {:>5}", "Age");
                for g in &grid.genders {
                    print!("  {g:>8.8}");
                }
                println!();
                for (age, row) in grid.ages.iter().zip(&grid.cells) {
                    print!("  {age:>5}");
                    for v in row {
                        print!("  {:>8}", fmt_opt(*v, 2));
                    }
                    println!();
                }
            }
        }
    }

    Ok(())
}

fn fmt_opt(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{v:.decimals$}"),
        None => "-".to_string(),
    }
}

fn fmt_indicator(ind: &Indicator, decimals: usize, unit: &str) -> String {
    match (ind.mean, ind.delta_vs_overall) {
        (Some(m), Some(d)) => format!("{m:.decimals$}{unit} ({d:+.decimals$} vs overall)"),
        (Some(m), None) => format!("{m:.decimals$}{unit}"),
        _ => "no data".to_string(),
    }
}

fn fmt_counts<K: std::fmt::Display>(counts: &[Count<K>]) -> String {
    counts
        .iter()
        .map(|c| format!("{} {}", c.value, c.count))
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_summary(s: &Summary) {
    println!("Respondents:          {}", s.respondents);
    if s.respondents == 0 {
        println!("No respondents match the current filters.");
        return;
    }
    println!("Daily usage:          {}", fmt_indicator(&s.daily_usage_hours, 1, "h"));
    println!("Academic performance: {}", fmt_indicator(&s.academic_performance, 0, "/100"));
    println!("Addiction level:      {}", fmt_indicator(&s.addiction_level, 1, "/10"));
    println!("Anxiety:              {}", fmt_opt(s.anxiety_level, 1));
    println!("Depression:           {}", fmt_opt(s.depression_level, 1));
    println!("Self-esteem:          {}", fmt_opt(s.self_esteem, 1));
    println!();
    println!("Genders:              {}", fmt_counts(&s.genders));
    println!("Age groups:           {}", fmt_counts(&s.age_groups));
    println!("Purposes:             {}", fmt_counts(&s.purposes));
    println!("Addiction categories: {}", fmt_counts(&s.addiction_categories));
}
