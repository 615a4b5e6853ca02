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

//! Category health scores and the weighted overall score.

pub mod normalize;
pub mod weights;

pub use normalize::{impact, js_number, round_half_up, to_fixed, ImpactFloor};
pub use weights::{Weights, WeightsError};

use crate::observation::{Observation, ObservationType};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Score assumed for a category with no measurements
pub const DEFAULT_SCORE: u8 = 85;

/// Category → health score (0-100, higher is healthier), in weight-table order
pub type CategoryScores = IndexMap<ObservationType, u8>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub scores: CategoryScores,
    pub overall_score: u8,
}

/// Scores observations per category and combines them with a weight table
#[derive(Debug, Clone, Default)]
pub struct Scorer {
    weights: Weights,
    floor: ImpactFloor,
}

impl Scorer {
    #[must_use]
    pub const fn new(weights: Weights, floor: ImpactFloor) -> Self {
        Self { weights, floor }
    }

    #[must_use]
    pub fn calculate_scores(&self, observations: &[Observation]) -> ScoreReport {
        profiling::scope!("Scorer::calculate_scores");

        let scores: CategoryScores = self
            .weights
            .categories()
            .map(|category| (category, self.category_score(category, observations)))
            .collect();

        let overall: f64 = self
            .weights
            .iter()
            .map(|(category, weight)| {
                f64::from(scores.get(&category).copied().unwrap_or(DEFAULT_SCORE)) * weight
            })
            .sum();

        ScoreReport {
            scores,
            overall_score: to_score(overall),
        }
    }

    fn category_score(&self, category: ObservationType, observations: &[Observation]) -> u8 {
        let impacts: Vec<f64> = observations
            .iter()
            .filter_map(|o| o.value_of(category))
            .map(|v| self.floor.apply(impact(category, v)))
            .collect();

        if impacts.is_empty() {
            return DEFAULT_SCORE;
        }

        let average = impacts.iter().sum::<f64>() / impacts.len() as f64;
        to_score(100.0 - average)
    }
}

/// Score with the default weights and impact policy
#[must_use]
pub fn calculate_scores(observations: &[Observation]) -> ScoreReport {
    Scorer::default().calculate_scores(observations)
}

fn to_score(value: f64) -> u8 {
    round_half_up(value).clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(kind: ObservationType, value: f64) -> Observation {
        Observation::new("t", kind, Some(value))
    }

    #[test]
    fn test_empty_input_defaults() {
        let report = calculate_scores(&[]);
        assert_eq!(report.overall_score, 85);
        assert_eq!(report.scores.len(), 4);
        for (_, score) in &report.scores {
            assert_eq!(*score, 85);
        }

        let order: Vec<_> = report.scores.keys().copied().collect();
        assert_eq!(
            order,
            vec![
                ObservationType::AirQuality,
                ObservationType::WaterQuality,
                ObservationType::Biodiversity,
                ObservationType::NoiseLevel,
            ]
        );
    }

    #[test]
    fn test_neutral_ph_scores_full_marks() {
        let report = calculate_scores(&[obs(ObservationType::WaterQuality, 7.0)]);
        assert_eq!(report.scores[&ObservationType::WaterQuality], 100);
    }

    #[test]
    fn test_missing_values_fall_back_to_default() {
        let observations = vec![
            Observation::new("a", ObservationType::AirQuality, None),
            Observation {
                measurement_value: Some(300.0),
                ..Observation::default()
            },
        ];
        let report = calculate_scores(&observations);
        assert_eq!(report.scores[&ObservationType::AirQuality], 85);
    }

    #[test]
    fn test_weighted_overall() {
        let observations = vec![
            obs(ObservationType::AirQuality, 250.0),
            obs(ObservationType::WaterQuality, 7.0),
        ];
        let report = calculate_scores(&observations);
        assert_eq!(report.scores[&ObservationType::AirQuality], 50);
        assert_eq!(report.scores[&ObservationType::WaterQuality], 100);
        // 50*0.3 + 100*0.3 + 85*0.2 + 85*0.2
        assert_eq!(report.overall_score, 79);
    }

    #[test]
    fn test_unweighted_categories_do_not_contribute() {
        let observations = vec![
            obs(ObservationType::Radiation, 100.0),
            obs(ObservationType::Custom, 5.0),
        ];
        let report = calculate_scores(&observations);
        assert_eq!(report.overall_score, 85);
        assert!(!report.scores.contains_key(&ObservationType::Radiation));
    }

    #[test]
    fn test_biodiversity_counts() {
        let report = calculate_scores(&[
            obs(ObservationType::Biodiversity, 10.0),
            obs(ObservationType::Biodiversity, 60.0),
        ]);
        // impacts 80 and 0
        assert_eq!(report.scores[&ObservationType::Biodiversity], 60);
    }

    #[test]
    fn test_quiet_noise_offsets_average() {
        let readings = [
            obs(ObservationType::NoiseLevel, 20.0),
            obs(ObservationType::NoiseLevel, 80.0),
        ];

        let offset = calculate_scores(&readings);
        assert_eq!(offset.scores[&ObservationType::NoiseLevel], 82);

        let clamped = Scorer::new(Weights::default(), ImpactFloor::Clamp).calculate_scores(&readings);
        assert_eq!(clamped.scores[&ObservationType::NoiseLevel], 77);
    }

    #[test]
    fn test_scores_stay_in_range() {
        let extremes = [
            obs(ObservationType::NoiseLevel, 0.0),
            obs(ObservationType::AirQuality, -400.0),
            obs(ObservationType::Biodiversity, -100.0),
            obs(ObservationType::WaterQuality, 1e9),
        ];
        let report = calculate_scores(&extremes);
        assert_eq!(report.scores[&ObservationType::NoiseLevel], 100);
        assert_eq!(report.scores[&ObservationType::AirQuality], 100);
        assert_eq!(report.scores[&ObservationType::Biodiversity], 0);
        assert_eq!(report.scores[&ObservationType::WaterQuality], 0);
        assert!(report.overall_score <= 100);
    }

    #[test]
    fn test_custom_weights() {
        let weights = Weights::new([(ObservationType::AirQuality, 1.0)]).unwrap();
        let scorer = Scorer::new(weights, ImpactFloor::Offset);
        let report = scorer.calculate_scores(&[obs(ObservationType::AirQuality, 100.0)]);
        assert_eq!(report.scores.len(), 1);
        assert_eq!(report.overall_score, 80);
    }
}
