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

use crate::outlier::{Algorithm, OutlierDetector, OutlierResult, OutlierStatus, Sample};
use crate::scoring::{js_number, round_half_up, to_fixed};

/// Distance from the mean in population standard deviations
pub struct ZScoreDetector;

impl ZScoreDetector {
    /// Population mean and standard deviation (divides by N)
    #[must_use]
    pub fn mean_std(values: &[f64]) -> (f64, f64) {
        if values.is_empty() {
            return (0.0, 0.0);
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        (mean, variance.sqrt())
    }

    #[must_use]
    pub fn classify(z: f64) -> OutlierStatus {
        if z > 3.0 {
            OutlierStatus::Critical
        } else if z > 2.5 {
            OutlierStatus::HighRisk
        } else if z > 1.5 {
            OutlierStatus::Suspicious
        } else {
            OutlierStatus::Normal
        }
    }
}

impl OutlierDetector for ZScoreDetector {
    fn algorithm(&self) -> Algorithm {
        Algorithm::ZScore
    }

    fn analyze(&self, samples: &[Sample<'_>]) -> Vec<OutlierResult> {
        let values: Vec<f64> = samples.iter().map(|(_, v)| *v).collect();
        let (mean, std_dev) = Self::mean_std(&values);
        // Zero spread: fall back to raw distance from the mean
        let divisor = if std_dev > 0.0 { std_dev } else { 1.0 };

        samples
            .iter()
            .map(|(obs, value)| {
                let z = ((value - mean) / divisor).abs();
                let confidence = round_half_up((z * 20.0).max(10.0).min(99.0)) as u8;
                let label = obs.kind.map_or_else(|| "unknown".to_string(), |k| k.label());
                let unit = obs.measurement_unit.as_deref().unwrap_or("");

                OutlierResult {
                    id: obs.id.clone(),
                    status: Self::classify(z),
                    confidence,
                    score: to_fixed(z, 2),
                    explanation: format!(
                        "{label} value is {} {unit}, which deviates {}x standard deviations from the local average of {}.",
                        js_number(*value),
                        to_fixed(z, 2),
                        to_fixed(mean, 1)
                    ),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observation::{Observation, ObservationType};

    fn analyze(observations: &[Observation]) -> Vec<OutlierResult> {
        let samples: Vec<Sample<'_>> = observations
            .iter()
            .filter_map(|o| o.value().map(|v| (o, v)))
            .collect();
        ZScoreDetector.analyze(&samples)
    }

    fn air(values: &[f64]) -> Vec<Observation> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| Observation::new(format!("a{i}"), ObservationType::AirQuality, Some(*v)))
            .collect()
    }

    #[test]
    fn test_population_std() {
        let (mean, std) = ZScoreDetector::mean_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((mean - 5.0).abs() < 1e-12);
        assert!((std - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_spike_among_six() {
        // With six samples one value can sit at most sqrt(5) deviations out
        let results = analyze(&air(&[10.0, 10.0, 10.0, 10.0, 10.0, 100.0]));
        assert_eq!(results[5].score, "2.24");
        assert_eq!(results[5].status, OutlierStatus::Suspicious);
        assert_eq!(results[5].confidence, 45);
        for result in &results[..5] {
            assert_eq!(result.status, OutlierStatus::Normal);
            assert_eq!(result.confidence, 10);
        }
    }

    #[test]
    fn test_critical_spike() {
        let mut values = vec![10.0; 19];
        values.push(100.0);
        let results = analyze(&air(&values));

        // z = sqrt(19)
        assert_eq!(results[19].status, OutlierStatus::Critical);
        assert_eq!(results[19].score, "4.36");
        assert_eq!(results[19].confidence, 87);
        assert!(results[..19].iter().all(|r| r.status == OutlierStatus::Normal));
    }

    #[test]
    fn test_classification_bands() {
        assert_eq!(ZScoreDetector::classify(1.5), OutlierStatus::Normal);
        assert_eq!(ZScoreDetector::classify(1.51), OutlierStatus::Suspicious);
        assert_eq!(ZScoreDetector::classify(2.6), OutlierStatus::HighRisk);
        assert_eq!(ZScoreDetector::classify(3.01), OutlierStatus::Critical);
    }

    #[test]
    fn test_zero_variance() {
        let results = analyze(&air(&[42.0; 6]));
        assert!(results.iter().all(|r| r.status == OutlierStatus::Normal && r.score == "0.00"));
    }

    #[test]
    fn test_explanation_text() {
        let mut observations = air(&[10.0, 10.0, 10.0, 10.0, 10.0]);
        observations.push(
            Observation::new("u", ObservationType::WaterQuality, Some(100.0)).with_unit("NTU"),
        );
        let results = analyze(&observations);

        assert_eq!(
            results[0].explanation,
            "air quality value is 10 , which deviates 0.45x standard deviations from the local average of 25.0."
        );
        assert_eq!(
            results[5].explanation,
            "water quality value is 100 NTU, which deviates 2.24x standard deviations from the local average of 25.0."
        );
    }

    #[test]
    fn test_exact_tie_mean_rounds_up() {
        // Mean is exactly 2.25
        let results = analyze(&air(&[1.0, 2.0, 2.0, 2.0, 4.25, 2.25]));

        assert_eq!(
            results[4].explanation,
            "air quality value is 4.25 , which deviates 2.04x standard deviations from the local average of 2.3."
        );
        assert_eq!(results[5].score, "0.00");
        assert!(results.iter().all(|r| r.explanation.ends_with("local average of 2.3.")));
    }

    #[test]
    fn test_idempotent() {
        let observations = air(&[3.0, 9.0, 27.0, 81.0, 243.0, 1.0]);
        assert_eq!(analyze(&observations), analyze(&observations));
    }
}
