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

use crate::anomaly::rule::AnomalyRule;
use crate::anomaly::Anomaly;
use crate::observation::{Observation, ObservationType};
use crate::scoring::js_number;

/// Flags water readings whose pH falls outside the safe range (bounds excluded)
pub struct WaterPhRule {
    min_ph: f64,
    max_ph: f64,
}

impl WaterPhRule {
    #[must_use]
    pub const fn new(min_ph: f64, max_ph: f64) -> Self {
        Self { min_ph, max_ph }
    }
}

impl Default for WaterPhRule {
    fn default() -> Self {
        Self::new(5.0, 9.0)
    }
}

impl AnomalyRule for WaterPhRule {
    fn name(&self) -> &'static str {
        "water-ph"
    }

    fn detect(&self, observations: &[Observation], out: &mut Vec<Anomaly>) {
        for obs in observations {
            let Some(value) = obs.value_of(ObservationType::WaterQuality) else {
                continue;
            };

            if value < self.min_ph || value > self.max_ph {
                out.push(Anomaly {
                    id: obs.id.clone(),
                    title: "Abnormal Water pH".to_string(),
                    kind: ObservationType::WaterQuality,
                    reason: format!(
                        "Critical pH deviation ({}) detected outside biosphere safety range ({}-{}).",
                        js_number(value),
                        js_number(self.min_ph),
                        js_number(self.max_ph)
                    ),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn water(id: &str, value: f64) -> Observation {
        Observation::new(id, ObservationType::WaterQuality, Some(value))
    }

    fn flagged(values: &[f64]) -> Vec<Anomaly> {
        let observations: Vec<Observation> = values
            .iter()
            .enumerate()
            .map(|(i, v)| water(&format!("w{i}"), *v))
            .collect();
        let mut out = Vec::new();
        WaterPhRule::default().detect(&observations, &mut out);
        out
    }

    #[test]
    fn test_bounds_are_exclusive() {
        assert!(flagged(&[5.0, 9.0, 7.0]).is_empty());
    }

    #[test]
    fn test_just_outside_bounds() {
        let out = flagged(&[4.9, 7.0, 9.1]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].id.as_deref(), Some("w0"));
        assert_eq!(out[1].id.as_deref(), Some("w2"));
        assert_eq!(
            out[0].reason,
            "Critical pH deviation (4.9) detected outside biosphere safety range (5-9)."
        );
    }

    #[test]
    fn test_reason_prints_numbers_like_js() {
        let out = flagged(&[-0.0, 1e-7, 1e21]);
        let reasons: Vec<&str> = out.iter().map(|a| a.reason.as_str()).collect();
        assert_eq!(
            reasons,
            [
                "Critical pH deviation (0) detected outside biosphere safety range (5-9).",
                "Critical pH deviation (1e-7) detected outside biosphere safety range (5-9).",
                "Critical pH deviation (1e+21) detected outside biosphere safety range (5-9).",
            ]
        );
    }

    #[test]
    fn test_ignores_other_categories() {
        let observations = vec![Observation::new("a", ObservationType::AirQuality, Some(2.0))];
        let mut out = Vec::new();
        WaterPhRule::default().detect(&observations, &mut out);
        assert!(out.is_empty());
    }
}
