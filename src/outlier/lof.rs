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

//! Local Outlier Factor over one-dimensional measurements.
//!
//! Brute-force neighbour search: the engine only routes samples of 21-50
//! values here, so a spatial index would not pay off.

use crate::outlier::{Algorithm, OutlierDetector, OutlierResult, OutlierStatus, Sample};
use crate::scoring::{round_half_up, to_fixed};
use rayon::prelude::*;

/// Lower bound for mean reachability distance, avoids infinite density on duplicates
const MIN_REACH: f64 = 1e-10;

struct Neighborhood {
    /// Distance to the k-th nearest neighbour
    k_distance: f64,
    /// Every point within `k_distance` (ties included)
    neighbors: Vec<usize>,
}

fn neighborhoods(values: &[f64], k: usize) -> Vec<Neighborhood> {
    values
        .par_iter()
        .enumerate()
        .map(|(i, &x)| {
            let mut distances: Vec<(usize, f64)> = values
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(j, &y)| (j, (x - y).abs()))
                .collect();
            distances.sort_by(|a, b| a.1.total_cmp(&b.1));

            let k_distance = distances[k - 1].1;
            let neighbors = distances
                .iter()
                .take_while(|(_, d)| *d <= k_distance)
                .map(|(j, _)| *j)
                .collect();

            Neighborhood {
                k_distance,
                neighbors,
            }
        })
        .collect()
}

/// LOF score per value. About 1 inside a cluster, well above 1 for points in
/// sparser regions than their neighbours.
///
/// `k` is capped at `values.len() - 1`. Fewer than two values score 1.
#[must_use]
pub fn lof_scores(values: &[f64], k: usize) -> Vec<f64> {
    profiling::scope!("lof_scores");

    if values.len() < 2 {
        return vec![1.0; values.len()];
    }
    let k = k.clamp(1, values.len() - 1);
    let hoods = neighborhoods(values, k);

    let density: Vec<f64> = hoods
        .par_iter()
        .enumerate()
        .map(|(i, hood)| {
            let total: f64 = hood
                .neighbors
                .iter()
                .map(|&j| hoods[j].k_distance.max((values[i] - values[j]).abs()))
                .sum();
            let mean_reach = total / hood.neighbors.len() as f64;
            1.0 / mean_reach.max(MIN_REACH)
        })
        .collect();

    hoods
        .par_iter()
        .enumerate()
        .map(|(i, hood)| {
            let ratio_sum: f64 = hood.neighbors.iter().map(|&j| density[j] / density[i]).sum();
            ratio_sum / hood.neighbors.len() as f64
        })
        .collect()
}

/// Density-based detector built on [`lof_scores`]
pub struct LofDetector {
    k: usize,
}

impl LofDetector {
    #[must_use]
    pub const fn new(k: usize) -> Self {
        Self { k }
    }

    #[must_use]
    pub fn classify(lof: f64) -> OutlierStatus {
        if lof > 1.8 {
            OutlierStatus::HighRisk
        } else if lof > 1.4 {
            OutlierStatus::Suspicious
        } else {
            OutlierStatus::Normal
        }
    }
}

impl OutlierDetector for LofDetector {
    fn algorithm(&self) -> Algorithm {
        Algorithm::LocalOutlierFactor
    }

    fn analyze(&self, samples: &[Sample<'_>]) -> Vec<OutlierResult> {
        let values: Vec<f64> = samples.iter().map(|(_, v)| *v).collect();
        let scores = lof_scores(&values, self.k);

        samples
            .iter()
            .zip(scores)
            .map(|((obs, _), lof)| {
                let status = Self::classify(lof);
                let kind = obs.kind.map_or("unknown", |k| k.as_str());
                let factor = to_fixed(lof, 2);
                let explanation = if status.is_flagged() {
                    format!(
                        "LOF Density Analysis: Local density of this {kind} record is {factor}x lower than its K-nearest neighbors, indicating a localized structural anomaly."
                    )
                } else {
                    format!(
                        "LOF Density Analysis: Local density of this {kind} record is consistent with its K-nearest neighbors (factor {factor})."
                    )
                };

                OutlierResult {
                    id: obs.id.clone(),
                    status,
                    confidence: round_half_up((lof * 40.0).min(100.0)) as u8,
                    score: factor,
                    explanation,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observation::{Observation, ObservationType};

    #[test]
    fn test_uniform_grid_is_inlier() {
        let values: Vec<f64> = (0..24).map(f64::from).collect();
        let scores = lof_scores(&values, 10);
        assert!(scores.iter().all(|s| *s < 1.4), "scores: {scores:?}");
        // End points are the least dense part of the grid
        assert!(scores[0] > scores[12]);
        assert!((scores[0] - scores[23]).abs() < 1e-9);
    }

    #[test]
    fn test_isolated_point_scores_high() {
        let mut values: Vec<f64> = (0..24).map(|i| 10.0 + f64::from(i)).collect();
        values.push(500.0);
        let scores = lof_scores(&values, 10);

        let outlier = scores[24];
        assert!(outlier > 1.8, "outlier lof {outlier}");
        assert!(scores[..24].iter().all(|s| *s < outlier));
    }

    #[test]
    fn test_duplicates_do_not_blow_up() {
        let values = vec![5.0; 25];
        let scores = lof_scores(&values, 10);
        assert!(scores.iter().all(|s| s.is_finite() && (s - 1.0).abs() < 1e-9));
    }

    #[test]
    fn test_tiny_samples() {
        assert!(lof_scores(&[], 10).is_empty());
        assert_eq!(lof_scores(&[3.0], 10), vec![1.0]);
        assert_eq!(lof_scores(&[3.0, 4.0], 10).len(), 2);
    }

    #[test]
    fn test_detector_output() {
        let mut observations: Vec<Observation> = (0..24)
            .map(|i| {
                Observation::new(
                    format!("b{i}"),
                    ObservationType::Biodiversity,
                    Some(10.0 + f64::from(i)),
                )
            })
            .collect();
        observations.push(Observation::new("far", ObservationType::Biodiversity, Some(500.0)));

        let samples: Vec<Sample<'_>> = observations
            .iter()
            .filter_map(|o| o.value().map(|v| (o, v)))
            .collect();
        let results = LofDetector::new(10).analyze(&samples);

        let far = &results[24];
        assert_eq!(far.id.as_deref(), Some("far"));
        assert_eq!(far.status, OutlierStatus::HighRisk);
        assert_eq!(far.confidence, 100);
        assert!(far
            .explanation
            .starts_with("LOF Density Analysis: Local density of this biodiversity record is"));
        assert!(results[..24].iter().all(|r| r.status == OutlierStatus::Normal));
    }
}
