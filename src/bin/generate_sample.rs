use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Write a synthetic survey file with deliberately dirty cells
#[derive(Parser)]
#[command(name = "generate_sample")]
#[command(about = "Write a synthetic adolescent phone-usage survey", long_about = None)]
struct Args {
    /// Output file (.csv or .parquet)
    #[arg(default_value = "teen_phone_addiction_dataset.csv")]
    output: PathBuf,

    /// Number of respondents
    #[arg(short, long, default_value = "1000")]
    rows: usize,

    /// Seed for reproducible output
    #[arg(long, default_value = "42")]
    seed: u64,
}

/// Box-Muller transform for normal distribution
fn gauss(rng: &mut StdRng, mean: f64, std_dev: f64) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(1e-15);
    let u2: f64 = rng.gen();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    mean + std_dev * z
}

fn pick<'a>(rng: &mut StdRng, items: &[&'a str]) -> &'a str {
    items.choose(rng).copied().unwrap_or_default()
}

const COLUMNS: [&str; 24] = [
    "ID",
    "Name",
    "Age",
    "Gender",
    "Location",
    "School_Grade",
    "Daily_Usage_Hours",
    "Sleep_Hours",
    "Academic_Performance",
    "Social_Interactions",
    "Exercise_Hours",
    "Anxiety_Level",
    "Depression_Level",
    "Self_Esteem",
    "Parental_Control",
    "Screen_Time_Before_Bed",
    "Phone_Checks_Per_Day",
    "Apps_Used_Daily",
    "Time_on_Social_Media",
    "Time_on_Gaming",
    "Time_on_Education",
    "Phone_Usage_Purpose",
    "Family_Communication",
    "Weekend_Usage_Hours",
];

const GENDERS: [&str; 7] = ["Male", "Female", "Other", " male", "FEMALE ", "female", "other"];
const PURPOSES: [&str; 7] = [
    "Social Media",
    "Gaming",
    "Education",
    "Browsing",
    "Other",
    " social media",
    "gaming ",
];
const PARENTAL: [&str; 8] = ["1", "0", "Yes", "No", "true", "FALSE", "yes", "n/a"];
const LOCATIONS: [&str; 4] = ["East Kayla", "Lake Tiffany", "Port Joseph", "New Sarah"];

fn fmt1(v: f64) -> String {
    format!("{v:.1}")
}

/// One respondent; roughly one in twenty numeric cells is blank or garbage.
fn generate_row(id: usize, rng: &mut StdRng) -> Vec<String> {
    let age: i64 = rng.gen_range(13..=19);
    let usage = gauss(rng, 5.0, 1.8).clamp(0.5, 12.0);
    let sleep = (8.5 - 0.3 * usage + gauss(rng, 0.0, 0.8)).clamp(3.0, 10.0);
    let addiction = (usage * 1.2 + gauss(rng, 0.0, 1.5)).clamp(0.0, 10.0);
    let academic = (90.0 - 3.0 * usage + gauss(rng, 0.0, 8.0)).clamp(40.0, 100.0);

    let mut row = vec![
        id.to_string(),
        format!("Student {id}"),
        age.to_string(),
        pick(rng, &GENDERS).to_string(),
        pick(rng, &LOCATIONS).to_string(),
        format!("{}th", (age - 6).clamp(7, 12)),
        fmt1(usage),
        fmt1(sleep),
        format!("{:.0}", academic),
        rng.gen_range(0..=10).to_string(),
        fmt1(gauss(rng, 1.5, 0.8).clamp(0.0, 4.0)),
        rng.gen_range(1..=10).to_string(),
        rng.gen_range(1..=10).to_string(),
        rng.gen_range(1..=10).to_string(),
        pick(rng, &PARENTAL).to_string(),
        fmt1(gauss(rng, 1.0, 0.5).clamp(0.0, 3.0)),
        rng.gen_range(20..=150).to_string(),
        rng.gen_range(5..=20).to_string(),
        fmt1(usage * 0.5),
        fmt1(usage * 0.3),
        fmt1(usage * 0.2),
        pick(rng, &PURPOSES).to_string(),
        rng.gen_range(0..=10).to_string(),
        fmt1((usage + gauss(rng, 1.0, 1.0)).clamp(0.0, 14.0)),
    ];

    // Age, Gender, Parental_Control and the purpose stay intact so every
    // respondent remains filterable.
    for (i, cell) in row.iter_mut().enumerate() {
        let numeric = !matches!(i, 0..=5 | 14 | 21);
        if numeric && rng.gen_bool(0.05) {
            *cell = if rng.gen_bool(0.5) {
                String::new()
            } else {
                "unknown".to_string()
            };
        }
    }
    row.push(fmt1(addiction));
    row
}

fn write_csv(path: &Path, header: &[&str], rows: &[Vec<String>]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Every column is written as nullable text so the dirty cells survive.
fn write_parquet(path: &Path, header: &[&str], rows: &[Vec<String>]) -> Result<()> {
    let schema = Arc::new(Schema::new(
        header
            .iter()
            .map(|name| Field::new(*name, DataType::Utf8, true))
            .collect::<Vec<_>>(),
    ));
    let columns: Vec<ArrayRef> = (0..header.len())
        .map(|i| {
            let cells: Vec<Option<&str>> = rows
                .iter()
                .map(|r| Some(r[i].as_str()).filter(|s| !s.is_empty()))
                .collect();
            Arc::new(StringArray::from(cells)) as ArrayRef
        })
        .collect();

    let batch = RecordBatch::try_new(schema.clone(), columns)?;
    let file = std::fs::File::create(path).context("creating output file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut rng = StdRng::seed_from_u64(args.seed);
    let rows: Vec<Vec<String>> = (1..=args.rows)
        .map(|id| generate_row(id, &mut rng))
        .collect();

    let mut header = COLUMNS.to_vec();
    header.push("Addiction_Level");

    let path = args.output.as_path();
    match path.extension().and_then(|e| e.to_str()) {
        Some("csv") => write_csv(path, &header, &rows)?,
        Some("parquet") => write_parquet(path, &header, &rows)?,
        _ => bail!("output must end in .csv or .parquet"),
    }

    log::info!("wrote {} respondents to {}", args.rows, path.display());
    println!("Wrote {} respondents to {}", args.rows, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_default_and_override() {
        let args = Args::try_parse_from(["generate_sample"]).unwrap();
        assert_eq!(args.output, PathBuf::from("teen_phone_addiction_dataset.csv"));
        assert_eq!(args.rows, 1000);

        let args =
            Args::try_parse_from(["generate_sample", "out.parquet", "--rows", "25"]).unwrap();
        assert_eq!(args.output, PathBuf::from("out.parquet"));
        assert_eq!(args.rows, 25);

        assert!(Args::try_parse_from(["generate_sample", "--rows", "many"]).is_err());
    }

    #[test]
    fn rows_match_header_and_are_reproducible() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        for id in 1..=50 {
            let row = generate_row(id, &mut a);
            assert_eq!(row.len(), COLUMNS.len() + 1);
            assert_eq!(row, generate_row(id, &mut b));
            let age: i64 = row[2].parse().unwrap();
            assert!((13..=19).contains(&age));
        }
    }
}
