// EcoWatch - GPL-3.0-or-later
// This file is part of EcoWatch.
//
// Copyright (C) 2026 EcoWatch contributors
//
// EcoWatch is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// EcoWatch is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with EcoWatch.  If not, see <https://www.gnu.org/licenses/>.

//! Export an outlier anomaly report as plain text.

use anyhow::{Context, Result};
use clap::Parser;
use ecowatch::narration::{HttpNarrator, Narrator};
use ecowatch::observation::read_observations;
use ecowatch::report::{default_file_name, render_report};
use ecowatch::{Analyzer, EngineConfig};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ecowatch-report")]
#[command(version)]
#[command(about = "Write an EcoWatch anomaly report for a set of observations", long_about = None)]
struct Args {
    /// JSON array of observations
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Output file (defaults to EcoWatch_Report_<date>.txt)
    #[arg(short, long, value_name = "OUT")]
    output: Option<PathBuf>,

    /// Config file (defaults to the user config directory)
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    ecowatch::init_logging();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => EngineConfig::load_from(path)?,
        None => EngineConfig::load(),
    };

    let file = std::fs::File::open(&args.input)
        .with_context(|| format!("Failed to open {}", args.input.display()))?;
    let observations = read_observations(std::io::BufReader::new(file))
        .with_context(|| format!("Failed to parse {}", args.input.display()))?;

    let narrator =
        HttpNarrator::from_config(&config.narrator).context("Failed to set up narrator")?;
    let report = Analyzer::new(&config)
        .review_outliers(&observations, narrator.as_ref().map(|n| n as &dyn Narrator));

    let now = chrono::Local::now();
    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(default_file_name(now.date_naive())));

    std::fs::write(&output, render_report(&report, now))
        .with_context(|| format!("Failed to write {}", output.display()))?;

    tracing::info!(
        "Wrote {} incidents ({} flagged) to {}",
        report.anomalies.len(),
        report.total_anomalies,
        output.display()
    );
    Ok(())
}
