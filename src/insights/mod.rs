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

//! Rule-based insights and prioritized recommendations.
//!
//! These are the deterministic fallbacks for the narration step: whatever the
//! external narrator returns, the summary can always be built from here.

use crate::anomaly::{count_of, Anomaly};
use crate::observation::ObservationType;
use crate::scoring::CategoryScores;
use serde::{Deserialize, Serialize};

/// Number of recommendations returned by [`get_recommendations`]
pub const MAX_RECOMMENDATIONS: usize = 3;

const GENERIC_RECOMMENDATION: &str = "Maintain current environmental protection standards.";

const CONCERN_AIR_DISTURBANCES: &str =
    "Significant air quality disturbances detected across multiple nodes.";
const CONCERN_AIR_TREND: &str = "Downward trend in regional air integrity index noted.";
const CONCERN_FILLER: &str = "General environmental monitoring indicates low-risk baseline conditions.";

const POSITIVE_WATER: &str =
    "Water quality remains exceptionally stable with high biosphere safety scores.";
const POSITIVE_BIODIVERSITY: &str =
    "Resilient biodiversity counts suggest effective local habitat preservation.";
const POSITIVE_FILLER: &str =
    "Consistent data reporting frequency enables high-precision trend analysis.";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insights {
    pub concerns: Vec<String>,
    pub positives: Vec<String>,
}

fn recommendation_for(category: ObservationType) -> &'static str {
    match category {
        ObservationType::AirQuality => {
            "Reduce industrial emissions and increase AQI monitoring density in localized hotspots."
        }
        ObservationType::WaterQuality => {
            "Initiate rigorous testing for contamination sources and inspect upstream filtration hubs."
        }
        ObservationType::NoiseLevel => {
            "Enforce strict sound limits and expand nocturnal noise-curb zones in residential areas."
        }
        ObservationType::Biodiversity => {
            "Enhance habitat protection protocols and initiate a comprehensive species census."
        }
        ObservationType::Waste
        | ObservationType::SoilQuality
        | ObservationType::Weather
        | ObservationType::Radiation
        | ObservationType::Custom => GENERIC_RECOMMENDATION,
    }
}

/// Up to three recommendations, worst-scoring category first.
///
/// Ties keep the order of `scores`.
#[must_use]
pub fn get_recommendations(scores: &CategoryScores) -> Vec<String> {
    let mut ranked: Vec<(ObservationType, u8)> = scores.iter().map(|(c, s)| (*c, *s)).collect();
    ranked.sort_by_key(|(_, score)| *score);

    ranked
        .into_iter()
        .take(MAX_RECOMMENDATIONS)
        .map(|(category, _)| recommendation_for(category).to_string())
        .collect()
}

/// Concerns and positives derived from fixed thresholds. Neither list is ever empty.
#[must_use]
pub fn generate_insights(scores: &CategoryScores, anomalies: &[Anomaly]) -> Insights {
    let mut insights = Insights::default();
    let score = |category: ObservationType| scores.get(&category).copied();

    if count_of(anomalies, ObservationType::AirQuality) >= 2 {
        insights.concerns.push(CONCERN_AIR_DISTURBANCES.to_string());
    } else if score(ObservationType::AirQuality).is_some_and(|s| s < 70) {
        insights.concerns.push(CONCERN_AIR_TREND.to_string());
    }

    if count_of(anomalies, ObservationType::WaterQuality) == 0
        && score(ObservationType::WaterQuality).is_some_and(|s| s > 80)
    {
        insights.positives.push(POSITIVE_WATER.to_string());
    }

    if score(ObservationType::Biodiversity).is_some_and(|s| s > 85) {
        insights.positives.push(POSITIVE_BIODIVERSITY.to_string());
    }

    if insights.concerns.is_empty() {
        insights.concerns.push(CONCERN_FILLER.to_string());
    }
    if insights.positives.is_empty() {
        insights.positives.push(POSITIVE_FILLER.to_string());
    }

    insights
}
