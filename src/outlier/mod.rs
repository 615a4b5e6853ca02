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

//! Adaptive outlier detection.
//!
//! The engine picks a strategy from the number of usable measurements:
//! small samples get a plain Z-score, medium ones Local Outlier Factor and
//! large ones an Isolation Forest. Every strategy classifies into the same
//! four statuses so callers never care which one ran.

pub mod isolation;
pub mod lof;
pub mod zscore;

use crate::observation::Observation;
use serde::{Deserialize, Serialize};
use std::fmt;

use isolation::IsolationForestDetector;
use lof::LofDetector;
use zscore::ZScoreDetector;

/// Below this many numeric values no analysis is attempted
pub const MIN_SAMPLES: usize = 5;
/// Above this, Local Outlier Factor replaces Z-score
pub const LOF_THRESHOLD: usize = 20;
/// Above this, Isolation Forest replaces Local Outlier Factor
pub const FOREST_THRESHOLD: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OutlierStatus {
    Normal,
    Suspicious,
    #[serde(rename = "High Risk")]
    HighRisk,
    Critical,
}

impl OutlierStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Suspicious => "Suspicious",
            Self::HighRisk => "High Risk",
            Self::Critical => "Critical",
        }
    }

    #[must_use]
    pub const fn is_flagged(&self) -> bool {
        !matches!(self, Self::Normal)
    }
}

impl fmt::Display for OutlierStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    #[serde(rename = "Z-Score")]
    ZScore,
    #[serde(rename = "Local Outlier Factor")]
    LocalOutlierFactor,
    #[serde(rename = "Isolation Forest")]
    IsolationForest,
}

impl Algorithm {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ZScore => "Z-Score",
            Self::LocalOutlierFactor => "Local Outlier Factor",
            Self::IsolationForest => "Isolation Forest",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of one observation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlierResult {
    pub id: Option<String>,
    pub status: OutlierStatus,
    /// 0-100
    pub confidence: u8,
    /// Strategy-specific score, formatted for display
    pub score: String,
    pub explanation: String,
}

impl OutlierResult {
    /// Result for a record that has no usable measurement
    #[must_use]
    pub fn passthrough(observation: &Observation) -> Self {
        Self {
            id: observation.id.clone(),
            status: OutlierStatus::Normal,
            confidence: 0,
            score: "0".to_string(),
            explanation: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlierAnalysis {
    pub algorithm: Algorithm,
    pub results: Vec<OutlierResult>,
}

impl OutlierAnalysis {
    /// Results that are not `Normal`
    pub fn flagged(&self) -> impl Iterator<Item = &OutlierResult> {
        self.results.iter().filter(|r| r.status.is_flagged())
    }
}

/// A record paired with its measurement
pub type Sample<'a> = (&'a Observation, f64);

/// Trait for outlier scoring strategies
pub trait OutlierDetector {
    fn algorithm(&self) -> Algorithm;

    /// Classify every sample. Returns one result per sample, in order.
    fn analyze(&self, samples: &[Sample<'_>]) -> Vec<OutlierResult>;
}

/// Tuning knobs for the density and isolation strategies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlierConfig {
    /// Neighbourhood size for Local Outlier Factor
    pub lof_k: usize,
    pub forest_trees: usize,
    /// Subsample size per isolation tree
    pub forest_subsample: usize,
    pub forest_seed: u64,
}

impl Default for OutlierConfig {
    fn default() -> Self {
        Self {
            lof_k: 10,
            forest_trees: 100,
            forest_subsample: 256,
            forest_seed: 42,
        }
    }
}

/// Dispatches to a strategy based on sample size
#[derive(Debug, Clone, Default)]
pub struct OutlierEngine {
    config: OutlierConfig,
}

impl OutlierEngine {
    #[must_use]
    pub const fn new(config: OutlierConfig) -> Self {
        Self { config }
    }

    /// Strategy for `numeric_count` values, `None` when the sample is too small
    #[must_use]
    pub const fn select_algorithm(numeric_count: usize) -> Option<Algorithm> {
        if numeric_count < MIN_SAMPLES {
            None
        } else if numeric_count > FOREST_THRESHOLD {
            Some(Algorithm::IsolationForest)
        } else if numeric_count > LOF_THRESHOLD {
            Some(Algorithm::LocalOutlierFactor)
        } else {
            Some(Algorithm::ZScore)
        }
    }

    fn detector(&self, algorithm: Algorithm) -> Box<dyn OutlierDetector> {
        match algorithm {
            Algorithm::ZScore => Box::new(ZScoreDetector),
            Algorithm::LocalOutlierFactor => Box::new(LofDetector::new(self.config.lof_k)),
            Algorithm::IsolationForest => Box::new(IsolationForestDetector::new(
                self.config.forest_trees,
                self.config.forest_subsample,
                self.config.forest_seed,
            )),
        }
    }

    /// Classify every observation. Records without a measurement come back
    /// as `Normal` passthroughs; samples that are too small yield no results.
    #[must_use]
    pub fn detect_outliers(&self, observations: &[Observation]) -> OutlierAnalysis {
        profiling::scope!("OutlierEngine::detect_outliers");

        let samples: Vec<Sample<'_>> = observations
            .iter()
            .filter_map(|o| o.value().map(|v| (o, v)))
            .collect();

        let Some(algorithm) = Self::select_algorithm(samples.len()) else {
            tracing::debug!(
                "Only {} numeric values, skipping outlier analysis",
                samples.len()
            );
            return OutlierAnalysis {
                algorithm: Algorithm::ZScore,
                results: Vec::new(),
            };
        };

        tracing::debug!("Running {algorithm} over {} values", samples.len());
        let mut scored = self.detector(algorithm).analyze(&samples).into_iter();

        let results = observations
            .iter()
            .map(|obs| {
                if obs.value().is_some() {
                    scored
                        .next()
                        .unwrap_or_else(|| OutlierResult::passthrough(obs))
                } else {
                    OutlierResult::passthrough(obs)
                }
            })
            .collect();

        OutlierAnalysis { algorithm, results }
    }
}

/// Run the engine with default settings
#[must_use]
pub fn detect_outliers(observations: &[Observation]) -> OutlierAnalysis {
    OutlierEngine::default().detect_outliers(observations)
}
