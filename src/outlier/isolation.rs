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

//! Isolation Forest over one-dimensional measurements.
//!
//! Each tree partitions a random subsample at uniformly drawn split points
//! until every value stands alone or the height limit is reached. Outliers
//! get isolated after few splits, so a short average path means a high score.
//! Trees are seeded from the forest seed plus their index, which keeps the
//! output identical across runs and thread schedules.

use crate::outlier::{Algorithm, OutlierDetector, OutlierResult, OutlierStatus, Sample};
use crate::scoring::{js_number, round_half_up, to_fixed};
use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rayon::prelude::*;

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

enum Node {
    Leaf {
        size: usize,
    },
    Split {
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// Average path length of an unsuccessful BST search among `n` points
fn average_path(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

/// Point `u` of the way from `min` to `max`, for `u` in [0, 1).
///
/// The span of two large readings of opposite sign overflows to infinity, so
/// it is interpolated from the endpoints instead.
fn split_point(min: f64, max: f64, u: f64) -> f64 {
    let span = max - min;
    if span.is_finite() {
        min + u * span
    } else {
        min.mul_add(1.0 - u, max * u)
    }
}

fn grow(sample: Vec<f64>, depth: usize, height_limit: usize, rng: &mut ChaCha20Rng) -> Node {
    if depth >= height_limit || sample.len() <= 1 {
        return Node::Leaf { size: sample.len() };
    }

    let min = sample.iter().copied().fold(f64::INFINITY, f64::min);
    let max = sample.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max <= min {
        return Node::Leaf { size: sample.len() };
    }

    let threshold = split_point(min, max, rng.gen::<f64>());
    let (left, right): (Vec<f64>, Vec<f64>) = sample.into_iter().partition(|v| *v < threshold);

    Node::Split {
        threshold,
        left: Box::new(grow(left, depth + 1, height_limit, rng)),
        right: Box::new(grow(right, depth + 1, height_limit, rng)),
    }
}

fn path_length(node: &Node, value: f64, depth: usize) -> f64 {
    match node {
        Node::Leaf { size } => depth as f64 + average_path(*size),
        Node::Split {
            threshold,
            left,
            right,
        } => {
            let next = if value < *threshold { left } else { right };
            path_length(next, value, depth + 1)
        }
    }
}

/// Anomaly score and mean path length for one value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsolationScore {
    /// `2^(-E[h] / c(psi))`, in (0, 1]; 0.5 and below is unremarkable
    pub score: f64,
    pub mean_path: f64,
}

pub struct IsolationForest {
    trees: Vec<Node>,
    subsample: usize,
}

impl IsolationForest {
    /// Grow `trees` isolation trees over subsamples of `values`
    #[must_use]
    pub fn fit(values: &[f64], trees: usize, subsample: usize, seed: u64) -> Self {
        profiling::scope!("IsolationForest::fit");

        let psi = subsample.min(values.len()).max(1);
        let height_limit = (psi as f64).log2().ceil().max(1.0) as usize;

        let trees = (0..trees)
            .into_par_iter()
            .map(|t| {
                let mut rng = ChaCha20Rng::seed_from_u64(seed.wrapping_add(t as u64));
                let sample: Vec<f64> = if values.is_empty() {
                    Vec::new()
                } else {
                    index::sample(&mut rng, values.len(), psi)
                        .iter()
                        .map(|i| values[i])
                        .collect()
                };
                grow(sample, 0, height_limit, &mut rng)
            })
            .collect();

        Self {
            trees,
            subsample: psi,
        }
    }

    #[must_use]
    pub fn score(&self, value: f64) -> IsolationScore {
        if self.trees.is_empty() {
            return IsolationScore {
                score: 0.5,
                mean_path: 0.0,
            };
        }

        let mean_path = self
            .trees
            .iter()
            .map(|tree| path_length(tree, value, 0))
            .sum::<f64>()
            / self.trees.len() as f64;

        let normalizer = average_path(self.subsample);
        let score = if normalizer > 0.0 {
            2f64.powf(-mean_path / normalizer)
        } else {
            0.5
        };

        IsolationScore { score, mean_path }
    }
}

/// Isolation-based detector for large samples
pub struct IsolationForestDetector {
    trees: usize,
    subsample: usize,
    seed: u64,
}

impl IsolationForestDetector {
    #[must_use]
    pub const fn new(trees: usize, subsample: usize, seed: u64) -> Self {
        Self {
            trees,
            subsample,
            seed,
        }
    }

    #[must_use]
    pub fn classify(score: f64) -> OutlierStatus {
        if score > 0.75 {
            OutlierStatus::Critical
        } else if score > 0.65 {
            OutlierStatus::HighRisk
        } else if score > 0.55 {
            OutlierStatus::Suspicious
        } else {
            OutlierStatus::Normal
        }
    }
}

impl OutlierDetector for IsolationForestDetector {
    fn algorithm(&self) -> Algorithm {
        Algorithm::IsolationForest
    }

    fn analyze(&self, samples: &[Sample<'_>]) -> Vec<OutlierResult> {
        let values: Vec<f64> = samples.iter().map(|(_, v)| *v).collect();
        let forest = IsolationForest::fit(&values, self.trees, self.subsample, self.seed);

        samples
            .par_iter()
            .map(|(obs, value)| {
                let IsolationScore { score, mean_path } = forest.score(*value);
                let status = Self::classify(score);
                let partitions = js_number(round_half_up(mean_path));
                let explanation = if status.is_flagged() {
                    format!(
                        "Isolation Forest: Anomaly was isolated in only {partitions} partitions. Short path length suggests a high-probability unique outlier cluster."
                    )
                } else {
                    format!(
                        "Isolation Forest: Record required {partitions} partitions to isolate, in line with the bulk of the sample."
                    )
                };

                OutlierResult {
                    id: obs.id.clone(),
                    status,
                    confidence: round_half_up(score * 100.0).clamp(0.0, 100.0) as u8,
                    score: to_fixed(score, 2),
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

    fn cluster_with_outlier() -> Vec<f64> {
        let mut values: Vec<f64> = (0..59).map(|i| 10.0 + f64::from(i % 20) * 0.1).collect();
        values.push(1000.0);
        values
    }

    #[test]
    fn test_average_path() {
        assert!(average_path(1).abs() < f64::EPSILON);
        assert!((average_path(2) - 1.0).abs() < f64::EPSILON);
        // c(256) is about 10.24
        assert!((average_path(256) - 10.24).abs() < 0.01);
    }

    #[test]
    fn test_split_point_stays_inside_range() {
        assert!((split_point(0.0, 10.0, 0.25) - 2.5).abs() < f64::EPSILON);

        let point = split_point(-1.7e308, 1.7e308, 0.75);
        assert!(point.is_finite());
        assert!(point > 0.0 && point < 1.7e308);
        assert!((split_point(-1.7e308, 1.7e308, 0.0) + 1.7e308).abs() < f64::EPSILON);
    }

    #[test]
    fn test_outlier_isolated_quickly() {
        let values = cluster_with_outlier();
        let forest = IsolationForest::fit(&values, 100, 256, 42);

        let outlier = forest.score(1000.0);
        assert!(outlier.score > 0.75, "outlier score {}", outlier.score);
        assert!(outlier.mean_path < 3.0);

        for value in &values[..59] {
            assert!(forest.score(*value).score < outlier.score);
        }
    }

    #[test]
    fn test_same_seed_same_forest() {
        let values = cluster_with_outlier();
        let a = IsolationForest::fit(&values, 50, 256, 9);
        let b = IsolationForest::fit(&values, 50, 256, 9);
        for value in &values {
            assert_eq!(a.score(*value), b.score(*value));
        }
    }

    #[test]
    fn test_constant_sample() {
        let forest = IsolationForest::fit(&[3.0; 60], 10, 256, 1);
        let result = forest.score(3.0);
        assert!(result.score.is_finite());
        assert!(result.score <= 0.5 + 1e-9);
    }

    #[test]
    fn test_empty_forest() {
        let forest = IsolationForest::fit(&[], 10, 256, 1);
        assert!((forest.score(1.0).score - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_detector_flags_outlier() {
        let observations: Vec<Observation> = cluster_with_outlier()
            .into_iter()
            .enumerate()
            .map(|(i, v)| Observation::new(format!("r{i}"), ObservationType::Radiation, Some(v)))
            .collect();
        let samples: Vec<Sample<'_>> = observations
            .iter()
            .filter_map(|o| o.value().map(|v| (o, v)))
            .collect();

        let results = IsolationForestDetector::new(100, 256, 42).analyze(&samples);
        assert_eq!(results.len(), 60);

        let far = &results[59];
        assert_eq!(far.id.as_deref(), Some("r59"));
        assert_eq!(far.status, OutlierStatus::Critical);
        assert!(far.explanation.starts_with("Isolation Forest: Anomaly was isolated in only"));

        let normal = results[..59]
            .iter()
            .filter(|r| r.status == OutlierStatus::Normal)
            .count();
        assert!(normal >= 45, "only {normal} of 59 cluster values normal");
    }
}
