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

//! End-to-end analysis: deterministic pipeline plus optional narration.

use crate::anomaly::rule::RuleSet;
use crate::anomaly::{create_default_rules, Anomaly};
use crate::config::EngineConfig;
use crate::insights::{generate_insights, get_recommendations};
use crate::narration::{NarrationRequest, Narrator, OutlierReviewRequest, ReportedAnomaly};
use crate::observation::Observation;
use crate::outlier::{Algorithm, OutlierAnalysis, OutlierEngine, OutlierResult};
use crate::scoring::{CategoryScores, ScoreReport, Scorer};
use serde::{Deserialize, Serialize};

const FALLBACK_TITLE: &str = "Measurement Point";
const FALLBACK_LOCATION: &str = "Unknown";
const FALLBACK_CATEGORY: &str = "Environmental";
const FALLBACK_RECOMMENDATION: &str =
    "Investigate flagged records where deviation scores exceed significance thresholds.";

/// Scores, anomalies and the narrative built on top of them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentalSummary {
    pub overall_score: u8,
    pub scores: CategoryScores,
    pub anomalies: Vec<Anomaly>,
    pub concerns: Vec<String>,
    pub positives: Vec<String>,
    pub recommendations: Vec<String>,
    /// Whether a narrator contributed to the text fields
    pub narrated: bool,
}

/// Outlier findings in report form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierReport {
    #[serde(rename = "algorithm_used")]
    pub algorithm: Algorithm,
    pub anomalies: Vec<ReportedAnomaly>,
    pub total_anomalies: usize,
    pub highest_risk_category: String,
    pub summary: String,
    pub recommendation: String,
    /// Whether the narrator reviewed the detections
    pub reviewed: bool,
}

impl OutlierReport {
    /// Report built from the engine output alone
    #[must_use]
    pub fn from_analysis(analysis: &OutlierAnalysis, observations: &[Observation]) -> Self {
        let anomalies: Vec<ReportedAnomaly> = analysis
            .results
            .iter()
            .map(|result| reported(result, observations))
            .collect();

        let flagged = analysis.flagged().count();
        let highest_risk_category = observations
            .first()
            .and_then(|o| o.kind)
            .map_or_else(|| FALLBACK_CATEGORY.to_string(), |k| k.as_str().to_string());

        Self {
            algorithm: analysis.algorithm,
            anomalies,
            total_anomalies: flagged,
            highest_risk_category,
            summary: format!(
                "Adaptive {} engine detected {flagged} significant outliers. Numerical analysis completed successfully but AI reasoning layer is currently unavailable.",
                analysis.algorithm
            ),
            recommendation: FALLBACK_RECOMMENDATION.to_string(),
            reviewed: false,
        }
    }
}

fn reported(result: &OutlierResult, observations: &[Observation]) -> ReportedAnomaly {
    let original = result
        .id
        .as_ref()
        .and_then(|id| observations.iter().find(|o| o.id.as_ref() == Some(id)));

    let title = original
        .and_then(|o| o.title.clone())
        .unwrap_or_else(|| FALLBACK_TITLE.to_string());
    let location = original
        .and_then(|o| o.location.clone().or_else(|| o.location_name.clone()))
        .unwrap_or_else(|| FALLBACK_LOCATION.to_string());

    ReportedAnomaly {
        id: result.id.clone(),
        title,
        location,
        status: result.status.to_string(),
        risk_level: result.status.to_string(),
        confidence_score: Some(f64::from(result.confidence)),
        explanation: result.explanation.clone(),
    }
}

/// Replace `fallback` with the narrator's list unless it is missing or empty
fn prefer(narrated: Option<Vec<String>>, fallback: Vec<String>) -> (Vec<String>, bool) {
    match narrated {
        Some(list) if !list.is_empty() => (list, true),
        _ => (fallback, false),
    }
}

/// The full analysis pipeline with its configuration baked in
pub struct Analyzer {
    scorer: Scorer,
    rules: RuleSet,
    engine: OutlierEngine,
}

impl Analyzer {
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            scorer: Scorer::new(config.weights.clone(), config.impact_floor),
            rules: create_default_rules(),
            engine: OutlierEngine::new(config.outlier.clone()),
        }
    }

    /// Swap the anomaly rules, e.g. to plug in a different region classifier
    #[must_use]
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    #[must_use]
    pub fn scores(&self, observations: &[Observation]) -> ScoreReport {
        self.scorer.calculate_scores(observations)
    }

    #[must_use]
    pub fn anomalies(&self, observations: &[Observation]) -> Vec<Anomaly> {
        self.rules.detect(observations)
    }

    #[must_use]
    pub fn outliers(&self, observations: &[Observation]) -> OutlierAnalysis {
        self.engine.detect_outliers(observations)
    }

    /// Score, detect and describe. The narrator, when given, only rewrites text;
    /// any failure falls back to the rule-based insights.
    #[must_use]
    pub fn summarize(
        &self,
        observations: &[Observation],
        narrator: Option<&dyn Narrator>,
    ) -> EnvironmentalSummary {
        profiling::scope!("Analyzer::summarize");

        let ScoreReport {
            scores,
            overall_score,
        } = self.scores(observations);
        let anomalies = self.anomalies(observations);
        let recommendations = get_recommendations(&scores);
        let insights = generate_insights(&scores, &anomalies);

        let narration = narrator.and_then(|narrator| {
            let request = NarrationRequest {
                overall_score,
                scores: scores.clone(),
                anomalies: anomalies.clone(),
                recommendations: recommendations.clone(),
            };
            match narrator.narrate(&request) {
                Ok(narration) => Some(narration),
                Err(e) => {
                    tracing::warn!("Narration failed, using deterministic results: {e}");
                    None
                }
            }
        });

        let narration = narration.unwrap_or_default();
        let (concerns, narrated_concerns) = prefer(narration.concerns, insights.concerns);
        let (positives, narrated_positives) = prefer(narration.positives, insights.positives);
        let (recommendations, narrated_recommendations) =
            prefer(narration.recommendations, recommendations);

        EnvironmentalSummary {
            overall_score,
            scores,
            anomalies,
            concerns,
            positives,
            recommendations,
            narrated: narrated_concerns || narrated_positives || narrated_recommendations,
        }
    }

    /// Run the outlier engine and have the narrator review flagged results.
    /// Without a narrator, or when it fails, the report comes from the engine alone.
    #[must_use]
    pub fn review_outliers(
        &self,
        observations: &[Observation],
        narrator: Option<&dyn Narrator>,
    ) -> OutlierReport {
        profiling::scope!("Analyzer::review_outliers");

        let analysis = self.outliers(observations);

        if let Some(narrator) = narrator {
            let request = OutlierReviewRequest {
                algorithm: analysis.algorithm,
                dataset_size: observations.len(),
                detections: analysis.flagged().cloned().collect(),
            };
            match narrator.review_outliers(&request) {
                Ok(review) => {
                    return OutlierReport {
                        algorithm: analysis.algorithm,
                        total_anomalies: review.anomalies.len(),
                        anomalies: review.anomalies,
                        highest_risk_category: review.highest_risk_category,
                        summary: review.summary,
                        recommendation: review.recommendation,
                        reviewed: true,
                    };
                }
                Err(e) => {
                    tracing::warn!("Outlier review failed, showing engine predictions: {e}");
                }
            }
        }

        OutlierReport::from_analysis(&analysis, observations)
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::narration::{Narration, NarrationError, OutlierReview};
    use crate::observation::ObservationType;
    use crate::outlier::OutlierStatus;

    struct DownNarrator;

    impl Narrator for DownNarrator {
        fn narrate(&self, _request: &NarrationRequest) -> Result<Narration, NarrationError> {
            Err(NarrationError::Unavailable("offline".to_string()))
        }

        fn review_outliers(
            &self,
            _request: &OutlierReviewRequest,
        ) -> Result<OutlierReview, NarrationError> {
            Err(NarrationError::Status(503))
        }
    }

    struct EchoNarrator;

    impl Narrator for EchoNarrator {
        fn narrate(&self, request: &NarrationRequest) -> Result<Narration, NarrationError> {
            Ok(Narration {
                concerns: Some(vec![format!("Overall score is {}.", request.overall_score)]),
                positives: Some(Vec::new()),
                recommendations: None,
            })
        }

        fn review_outliers(
            &self,
            request: &OutlierReviewRequest,
        ) -> Result<OutlierReview, NarrationError> {
            Ok(OutlierReview {
                anomalies: request
                    .detections
                    .iter()
                    .map(|d| ReportedAnomaly {
                        id: d.id.clone(),
                        status: d.status.to_string(),
                        ..ReportedAnomaly::default()
                    })
                    .collect(),
                summary: format!("Reviewed {} detections.", request.detections.len()),
                highest_risk_category: "air_quality".to_string(),
                recommendation: "Recalibrate the sensor.".to_string(),
            })
        }
    }

    fn spiky_air() -> Vec<Observation> {
        let mut observations: Vec<Observation> = (0..19)
            .map(|i| {
                Observation::new(format!("a{i}"), ObservationType::AirQuality, Some(10.0))
                    .with_location("Connaught Place, Delhi")
            })
            .collect();
        observations.push(
            Observation::new("spike", ObservationType::AirQuality, Some(100.0))
                .with_title("Smoke plume")
                .with_location("Okhla, Delhi"),
        );
        observations
    }

    #[test]
    fn test_summary_without_narrator() {
        let summary = Analyzer::default().summarize(&[], None);
        assert_eq!(summary.overall_score, 85);
        assert!(summary.anomalies.is_empty());
        assert_eq!(summary.concerns.len(), 1);
        assert_eq!(summary.positives.len(), 1);
        assert_eq!(summary.recommendations.len(), 3);
        assert!(!summary.narrated);
    }

    #[test]
    fn test_summary_falls_back_when_narrator_fails() {
        let analyzer = Analyzer::default();
        let observations = spiky_air();
        let plain = analyzer.summarize(&observations, None);
        let failed = analyzer.summarize(&observations, Some(&DownNarrator));
        assert_eq!(plain, failed);
    }

    #[test]
    fn test_summary_merges_partial_narration() {
        let analyzer = Analyzer::default();
        let observations = spiky_air();
        let plain = analyzer.summarize(&observations, None);
        let narrated = analyzer.summarize(&observations, Some(&EchoNarrator));

        assert!(narrated.narrated);
        assert_eq!(
            narrated.concerns,
            vec![format!("Overall score is {}.", plain.overall_score)]
        );
        // Empty and missing lists keep the deterministic text
        assert_eq!(narrated.positives, plain.positives);
        assert_eq!(narrated.recommendations, plain.recommendations);
    }

    #[test]
    fn test_outlier_fallback_report() {
        let observations = spiky_air();
        let report = Analyzer::default().review_outliers(&observations, Some(&DownNarrator));

        assert!(!report.reviewed);
        assert_eq!(report.algorithm, Algorithm::ZScore);
        assert_eq!(report.anomalies.len(), 20);
        assert_eq!(report.total_anomalies, 1);
        assert_eq!(report.highest_risk_category, "air_quality");
        assert_eq!(
            report.summary,
            "Adaptive Z-Score engine detected 1 significant outliers. Numerical analysis completed successfully but AI reasoning layer is currently unavailable."
        );

        let spike = &report.anomalies[19];
        assert_eq!(spike.title, "Smoke plume");
        assert_eq!(spike.location, "Okhla, Delhi");
        assert_eq!(spike.status, OutlierStatus::Critical.to_string());
        assert_eq!(spike.risk_level, "Critical");
        assert_eq!(spike.confidence_score, Some(87.0));

        assert_eq!(report.anomalies[0].title, FALLBACK_TITLE);
    }

    #[test]
    fn test_outlier_review_success() {
        let observations = spiky_air();
        let report = Analyzer::default().review_outliers(&observations, Some(&EchoNarrator));

        assert!(report.reviewed);
        assert_eq!(report.total_anomalies, 1);
        assert_eq!(report.anomalies[0].id.as_deref(), Some("spike"));
        assert_eq!(report.summary, "Reviewed 1 detections.");
    }

    #[test]
    fn test_small_sample_report() {
        let observations = vec![Observation::default()];
        let report = Analyzer::default().review_outliers(&observations, None);
        assert!(report.anomalies.is_empty());
        assert_eq!(report.total_anomalies, 0);
        assert_eq!(report.highest_risk_category, FALLBACK_CATEGORY);
    }
}
