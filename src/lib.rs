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

//! `EcoWatch` analysis core.
//!
//! Turns citizen-science observations into category health scores, rule-based
//! anomalies, outlier classifications and prioritized recommendations. The
//! computations are pure and synchronous; only the optional [`narration`]
//! step talks to the outside world.

pub mod analyzer;
pub mod anomaly;
pub mod config;
pub mod insights;
pub mod narration;
pub mod observation;
pub mod outlier;
pub mod report;
pub mod scoring;

pub use analyzer::{Analyzer, EnvironmentalSummary, OutlierReport};
pub use anomaly::{detect_anomalies, Anomaly};
pub use config::EngineConfig;
pub use insights::{generate_insights, get_recommendations, Insights};
pub use observation::{Observation, ObservationType};
pub use outlier::{detect_outliers, Algorithm, OutlierAnalysis, OutlierResult, OutlierStatus};
pub use scoring::{calculate_scores, CategoryScores, ScoreReport};

/// Install the `tracing` subscriber used by the binaries.
///
/// Defaults to `info`; set `RUST_LOG` to override (e.g. `RUST_LOG=ecowatch=debug`).
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
