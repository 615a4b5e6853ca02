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

//! Category weight table used for the overall health score.

use crate::observation::ObservationType;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const SUM_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WeightsError {
    #[error("weight table is empty")]
    Empty,
    #[error("weight for {category} is negative ({weight})")]
    Negative {
        category: ObservationType,
        weight: f64,
    },
    #[error("weights must sum to 1.0, got {0}")]
    BadSum(f64),
}

/// Immutable per-category weights. Always sums to 1.0.
///
/// The table also decides which categories get a score at all: the scorer
/// walks it in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "IndexMap<ObservationType, f64>",
    into = "IndexMap<ObservationType, f64>"
)]
pub struct Weights {
    table: IndexMap<ObservationType, f64>,
}

impl Weights {
    pub fn new<I>(entries: I) -> Result<Self, WeightsError>
    where
        I: IntoIterator<Item = (ObservationType, f64)>,
    {
        let table: IndexMap<ObservationType, f64> = entries.into_iter().collect();

        if table.is_empty() {
            return Err(WeightsError::Empty);
        }

        if let Some((&category, &weight)) = table.iter().find(|(_, w)| **w < 0.0) {
            return Err(WeightsError::Negative { category, weight });
        }

        let sum: f64 = table.values().sum();
        if (sum - 1.0).abs() > SUM_TOLERANCE {
            return Err(WeightsError::BadSum(sum));
        }

        Ok(Self { table })
    }

    pub fn categories(&self) -> impl Iterator<Item = ObservationType> + '_ {
        self.table.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObservationType, f64)> + '_ {
        self.table.iter().map(|(c, w)| (*c, *w))
    }
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            table: IndexMap::from([
                (ObservationType::AirQuality, 0.3),
                (ObservationType::WaterQuality, 0.3),
                (ObservationType::Biodiversity, 0.2),
                (ObservationType::NoiseLevel, 0.2),
            ]),
        }
    }
}

impl TryFrom<IndexMap<ObservationType, f64>> for Weights {
    type Error = WeightsError;

    fn try_from(table: IndexMap<ObservationType, f64>) -> Result<Self, Self::Error> {
        Self::new(table)
    }
}

impl From<Weights> for IndexMap<ObservationType, f64> {
    fn from(weights: Weights) -> Self {
        weights.table
    }
}
