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

use crate::anomaly::Anomaly;
use crate::observation::Observation;

/// Trait for anomaly detection rules
pub trait AnomalyRule: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Append any anomalies found in `observations` to `out`, in input order
    fn detect(&self, observations: &[Observation], out: &mut Vec<Anomaly>);
}

/// Ordered set of rules. Rules run in the order they were added.
pub struct RuleSet {
    rules: Vec<Box<dyn AnomalyRule>>,
}

impl RuleSet {
    #[must_use]
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    #[must_use]
    pub fn add_rule(mut self, rule: Box<dyn AnomalyRule>) -> Self {
        self.rules.push(rule);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    #[must_use]
    pub fn detect(&self, observations: &[Observation]) -> Vec<Anomaly> {
        profiling::scope!("RuleSet::detect");

        let mut anomalies = Vec::new();
        for rule in &self.rules {
            let before = anomalies.len();
            rule.detect(observations, &mut anomalies);
            let found = anomalies.len() - before;
            if found > 0 {
                tracing::debug!("Rule '{}' flagged {found} anomalies", rule.name());
            }
        }
        anomalies
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::new()
    }
}
