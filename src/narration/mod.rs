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

//! Optional natural-language refinement of the deterministic results.
//!
//! A [`Narrator`] wraps an external language-model service. It may be slow,
//! unavailable or return partial answers; the analyzer treats every error as
//! "use the rule-based output instead".

pub mod http;

pub use http::HttpNarrator;

use crate::anomaly::Anomaly;
use crate::outlier::{Algorithm, OutlierResult};
use crate::scoring::CategoryScores;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NarrationError {
    #[error("narrator request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("narrator returned HTTP {0}")]
    Status(u16),
    #[error("could not decode narrator response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("narrator unavailable: {0}")]
    Unavailable(String),
}

/// Deterministic findings handed to the narrator
#[derive(Debug, Clone, Serialize)]
pub struct NarrationRequest {
    pub overall_score: u8,
    pub scores: CategoryScores,
    pub anomalies: Vec<Anomaly>,
    pub recommendations: Vec<String>,
}

/// Narrator answer. Any field left out keeps the deterministic value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Narration {
    #[serde(default)]
    pub concerns: Option<Vec<String>>,
    #[serde(default)]
    pub positives: Option<Vec<String>>,
    #[serde(default)]
    pub recommendations: Option<Vec<String>>,
}

/// Flagged outlier results handed to the narrator for review
#[derive(Debug, Clone, Serialize)]
pub struct OutlierReviewRequest {
    pub algorithm: Algorithm,
    pub dataset_size: usize,
    pub detections: Vec<OutlierResult>,
}

/// One incident line in an outlier report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportedAnomaly {
    pub id: Option<String>,
    pub title: String,
    pub location: String,
    pub status: String,
    pub risk_level: String,
    pub confidence_score: Option<f64>,
    pub explanation: String,
}

/// Narrator verdict on the outlier engine's detections
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct OutlierReview {
    pub anomalies: Vec<ReportedAnomaly>,
    pub summary: String,
    pub highest_risk_category: String,
    pub recommendation: String,
}

/// External service that rewrites findings in natural language
pub trait Narrator: Send + Sync {
    fn narrate(&self, request: &NarrationRequest) -> Result<Narration, NarrationError>;

    fn review_outliers(
        &self,
        request: &OutlierReviewRequest,
    ) -> Result<OutlierReview, NarrationError>;
}
