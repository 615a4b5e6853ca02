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

//! Region consistency check across a batch of observations.

use crate::anomaly::rule::AnomalyRule;
use crate::anomaly::Anomaly;
use crate::observation::{Observation, ObservationType};
use indexmap::IndexSet;

/// Maps a free-text location to a coarse region tag
pub trait RegionClassifier: Send + Sync {
    fn classify(&self, location: &str) -> String;
}

const ASIA: &[&str] = &["India", "Delhi", "Mumbai", "Maharashtra"];
const AMERICA: &[&str] = &["USA", "NY"];

/// Substring heuristic: a handful of place-name fragments per region.
///
/// Crude on purpose. It only needs to notice that a batch mixes readings from
/// far-apart places.
pub struct SubstringRegionClassifier {
    regions: Vec<(&'static str, &'static [&'static str])>,
    fallback: &'static str,
}

impl SubstringRegionClassifier {
    #[must_use]
    pub fn new() -> Self {
        Self {
            regions: vec![("Asia", ASIA), ("America", AMERICA)],
            fallback: "Other",
        }
    }
}

impl Default for SubstringRegionClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl RegionClassifier for SubstringRegionClassifier {
    fn classify(&self, location: &str) -> String {
        self.regions
            .iter()
            .find(|(_, needles)| needles.iter().any(|n| location.contains(n)))
            .map_or(self.fallback, |(region, _)| *region)
            .to_string()
    }
}

/// Emits one anomaly when the batch spans more than one region
pub struct GeographicRule {
    classifier: Box<dyn RegionClassifier>,
}

impl GeographicRule {
    #[must_use]
    pub fn new(classifier: Box<dyn RegionClassifier>) -> Self {
        Self { classifier }
    }

    /// Distinct regions in first-seen order
    #[must_use]
    pub fn regions(&self, observations: &[Observation]) -> IndexSet<String> {
        observations
            .iter()
            .filter_map(|o| o.location_name.as_deref())
            .filter(|name| !name.is_empty())
            .map(|name| self.classifier.classify(name))
            .collect()
    }
}

impl Default for GeographicRule {
    fn default() -> Self {
        Self::new(Box::new(SubstringRegionClassifier::new()))
    }
}

impl AnomalyRule for GeographicRule {
    fn name(&self) -> &'static str {
        "geographic-consistency"
    }

    fn detect(&self, observations: &[Observation], out: &mut Vec<Anomaly>) {
        let regions = self.regions(observations);
        if regions.len() <= 1 {
            return;
        }

        let joined = regions.iter().map(String::as_str).collect::<Vec<_>>().join(", ");
        out.push(Anomaly {
            id: None,
            title: "Geographical Data Inconsistency".to_string(),
            kind: ObservationType::Custom,
            reason: format!(
                "Analysis detected sensor data spanning multiple regions ({joined}). Accuracy may be compromised."
            ),
        });
    }
}
