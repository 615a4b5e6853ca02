/// `EcoWatch` - environmental observation analysis
///
/// Copyright (C) 2026 EcoWatch contributors
///
/// This program is free software: you can redistribute it and/or modify
/// it under the terms of the GNU General Public License as published by
/// the Free Software Foundation, either version 3 of the License, or
/// (at your option) any later version.
///
/// This program is distributed in the hope that it will be useful,
/// but WITHOUT ANY WARRANTY; without even the implied warranty of
/// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
/// GNU General Public License for more details.
///
/// You should have received a copy of the GNU General Public License
/// along with this program.  If not, see <https://www.gnu.org/licenses/>.
use anyhow::{Context, Result};
use clap::Parser;
use ecowatch::narration::{HttpNarrator, Narrator};
use ecowatch::observation::read_observations;
use ecowatch::{Analyzer, EngineConfig, Observation};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "ecowatch")]
#[command(author = "EcoWatch contributors")]
#[command(version)]
#[command(about = "Score environmental observations and flag anomalies", long_about = None)]
struct Args {
    /// JSON array of observations, or `-` for stdin
    #[arg(value_name = "FILE", required_unless_present = "write_config")]
    input: Option<PathBuf>,

    /// Print the outlier engine output instead of the summary
    #[arg(long)]
    outliers: bool,

    /// Config file (defaults to the user config directory)
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// LLM proxy endpoint used to narrate the findings
    #[arg(long, value_name = "URL")]
    narrator_url: Option<String>,

    /// Write the effective configuration to the config file and exit
    #[arg(long)]
    write_config: bool,
}

fn read_input(path: &Path) -> Result<Vec<Observation>> {
    if path == Path::new("-") {
        return read_observations(std::io::stdin().lock()).context("Failed to parse stdin");
    }
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    read_observations(std::io::BufReader::new(file))
        .with_context(|| format!("Failed to parse {}", path.display()))
}

fn main() -> Result<()> {
    ecowatch::init_logging();

    tracing::info!(
        "EcoWatch starting up (version {}, revision {})",
        env!("CARGO_PKG_VERSION"),
        env!("ECOWATCH_REVISION")
    );

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => EngineConfig::load_from(path)?,
        None => EngineConfig::load(),
    };
    if let Some(url) = args.narrator_url {
        config.narrator.endpoint = Some(url);
    }

    if args.write_config {
        let path = match &args.config {
            Some(path) => {
                config.save_to(path)?;
                path.clone()
            }
            None => config.save()?,
        };
        println!("{}", path.display());
        return Ok(());
    }

    let Some(input) = &args.input else {
        anyhow::bail!("No input file given");
    };
    let observations = read_input(input)?;
    tracing::info!("Analyzing {} observations", observations.len());

    let analyzer = Analyzer::new(&config);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if args.outliers {
        let analysis = analyzer.outliers(&observations);
        tracing::info!(
            "{} flagged {} of {} records",
            analysis.algorithm,
            analysis.flagged().count(),
            analysis.results.len()
        );
        serde_json::to_writer_pretty(&mut out, &analysis)?;
    } else {
        let narrator = HttpNarrator::from_config(&config.narrator)
            .context("Failed to set up narrator")?;
        let summary =
            analyzer.summarize(&observations, narrator.as_ref().map(|n| n as &dyn Narrator));
        tracing::info!(
            "Overall score {} with {} anomalies",
            summary.overall_score,
            summary.anomalies.len()
        );
        serde_json::to_writer_pretty(&mut out, &summary)?;
    }
    writeln!(out)?;

    Ok(())
}
