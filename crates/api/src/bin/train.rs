//! Offline training entry point
//!
//! Reads historical departures, trains the delay model and writes the artifact.
//! Nothing is written when training fails.

use anyhow::Context;
use api::{init_logging, LogFormat};
use clap::Parser;
use delay_pipeline::{FlightDataset, Trainer, TrainingConfig};
use model_store::ModelStore;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "delay-train", version, about = "Train the flight delay model from historical departures")]
struct Args {
    /// Historical flights CSV (Fecha-I, Fecha-O, OPERA, TIPOVUELO, MES)
    #[arg(long)]
    data: PathBuf,

    /// Model artifact to write (.json, or .bin/.postcard for postcard)
    #[arg(long, default_value = "model/delay_model.json")]
    output: PathBuf,

    /// Minutes late at which a departure counts as delayed
    #[arg(long, default_value_t = 15.0)]
    delay_threshold: f64,

    /// Skip rows with unknown airlines, flight types or months
    #[arg(long)]
    skip_invalid_rows: bool,

    /// Write the training report as JSON
    #[arg(long)]
    report: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

impl Args {
    fn training_config(&self) -> TrainingConfig {
        let mut config = TrainingConfig {
            skip_invalid_rows: self.skip_invalid_rows,
            ..Default::default()
        };
        config.engineer.delay_threshold_minutes = self.delay_threshold;
        config
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_format)?;

    let dataset = FlightDataset::from_csv(&args.data)
        .with_context(|| format!("cannot read training data {}", args.data.display()))?;

    let store = ModelStore::new(&args.output);
    let outcome = Trainer::new(args.training_config())
        .train_and_save(&dataset, &store)
        .context("training failed")?;
    info!("Model written to {}", store.path().display());

    if let Some(path) = &args.report {
        let file = File::create(path).with_context(|| format!("cannot create report {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &outcome.report)
            .with_context(|| format!("cannot write report {}", path.display()))?;
        info!("Training report written to {}", path.display());
    }

    let report = &outcome.report;
    info!(
        "Trained on {} flights ({} skipped): accuracy={:.3}, delayed recall={:.3}",
        report.rows_used, report.rows_skipped, report.metrics.accuracy, report.metrics.delayed.recall
    );
    Ok(())
}
