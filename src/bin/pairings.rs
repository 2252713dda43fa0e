use std::env;
use std::error::Error;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::anyhow;
use chrono::NaiveDate;
use clap::Parser;
use stanza::renderer::console::Console;
use stanza::renderer::Renderer;
use strum::IntoEnumIterator;
use tracing::{debug, info, warn};

use fourball::config::Config;
use fourball::csv::{CsvWriter, Record};
use fourball::pairing;
use fourball::print::{self, PairingColumn};
use fourball::rating;
use fourball::rounds::RoundStore;

#[derive(Debug, clap::Parser, Clone)]
struct Args {
    /// CSV file of raw round rows
    file: Option<PathBuf>,

    /// JSON configuration carrying the constraint set and league defaults
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,

    /// analysis date, e.g. 2024-06-01; defaults to today
    #[clap(short = 'd', long, value_parser = parse_date)]
    date: Option<NaiveDate>,

    /// where to write the pairings CSV to
    #[clap(short = 'o', long)]
    out: Option<PathBuf>,
}
impl Args {
    fn validate(&self) -> anyhow::Result<()> {
        self.file
            .as_ref()
            .ok_or(anyhow!("rounds file must be specified"))?;
        Ok(())
    }
}
fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| anyhow!("unsupported date format {s}"))
}

fn main() -> Result<(), Box<dyn Error>> {
    if env::var("RUST_BACKTRACE").is_err() {
        env::set_var("RUST_BACKTRACE", "full")
    }
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info")
    }
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    args.validate()?;
    debug!("args: {args:?}");

    let config = match &args.config {
        Some(path) => Config::read_json_file(path)?,
        None => Config::default(),
    };
    let now = args.date.unwrap_or_else(|| chrono::Utc::now().date_naive());

    let start_time = Instant::now();
    let ingest = RoundStore::from_csv(args.file.unwrap(), &config.home_course)?;
    if ingest.dropped > 0 {
        warn!("dropped {} unparseable rows", ingest.dropped);
    }

    let ratings = rating::rate(&ingest.store, &config, now);
    let candidates = pairing::candidates(&ratings, &ingest.store.home_course_handicaps());
    info!(
        "{} of {} rated players eligible for pairing",
        candidates.len(),
        ratings.len()
    );

    let assignment = pairing::solve(&candidates, &config.constraints)?;
    info!("assignment strategy: {}", assignment.strategy);
    if !assignment.complete() {
        warn!(
            "only {} of {} pairs could be filled",
            assignment.pairings.len(),
            pairing::POOL_SIZE
        );
    }

    println!(
        "Recommended pairings:\n{}",
        Console::default().render(&print::tabulate_pairings(&assignment))
    );
    println!(
        "Pair balance:\n{}",
        Console::default().render(&print::tabulate_balance(&assignment.pairings))
    );
    println!(
        "Reserves:\n{}",
        Console::default().render(&print::tabulate_reserves(&assignment.reserves))
    );

    if let Some(out) = args.out {
        let mut csv = CsvWriter::create(out)?;
        csv.append(Record::with_values(PairingColumn::iter()))?;
        for (index, pairing) in assignment.pairings.iter().enumerate() {
            csv.append(print::pairing_record(index + 1, pairing))?;
        }
        csv.flush()?;
    }
    let elapsed_time = start_time.elapsed();
    info!(
        "assigned {} pairs in {}s",
        assignment.pairings.len(),
        elapsed_time.as_millis() as f64 / 1_000.
    );

    Ok(())
}
