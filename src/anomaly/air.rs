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
use crate::scoring::{js_number, round_half_up};

/// Flags single AQI readings that spike while the overall air average is low.
///
/// A high reading only counts when the mean of all air readings stays under
/// `baseline_ceiling`, i.e. the spike is unusual in context rather than part
/// of generally bad air.
pub struct AirSpikeRule {
    spike_threshold: f64,
    baseline_ceiling: f64,
}

impl AirSpikeRule {
    #[must_use]
    pub const fn new(spike_threshold: f64, baseline_ceiling: f64) -> Self {
        Self {
            spike_threshold,
            baseline_ceiling,
        }
    }
}

impl Default for AirSpikeRule {
    fn default() -> Self {
        Self::new(150.0, 80.0)
    }
}

impl AnomalyRule for AirSpikeRule {
    fn name(&self) -> &'static str {
        "air-spike"
    }

    fn detect(&self, observations: &[Observation], out: &mut Vec<Anomaly>) {
        let readings: Vec<(&Observation, f64)> = observations
            .iter()
            .filter_map(|o| o.value_of(ObservationType::AirQuality).map(|v| (o, v)))
            .collect();

        // Divisor of at least 1 keeps the average at 0 for no readings
        let average =
            readings.iter().map(|(_, v)| v).sum::<f64>() / readings.len().max(1) as f64;

        if average >= self.baseline_ceiling {
            return;
        }

        for (obs, value) in readings {
            if value > self.spike_threshold {
                out.push(Anomaly {
                    id: obs.id.clone(),
                    title: "Sudden Air Quality Spike".to_string(),
                    kind: ObservationType::AirQuality,
                    reason: format!(
                        "Value {} AQI exceeds localized average ({}) significantly.",
                        js_number(value),
                        js_number(round_half_up(average))
                    ),
                });
            }
        }
    }
}
