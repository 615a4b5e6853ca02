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

pub mod air;
pub mod region;
pub mod rule;
pub mod water;

use crate::observation::{Observation, ObservationType};
use serde::{Deserialize, Serialize};

use air::AirSpikeRule;
use region::GeographicRule;
use rule::RuleSet;
use water::WaterPhRule;

/// A flagged record or cross-record condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anomaly {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ObservationType,
    pub reason: String,
}

/// Create the default rule pipeline
#[must_use]
pub fn create_default_rules() -> RuleSet {
    RuleSet::new()
        .add_rule(Box::new(AirSpikeRule::default())) // AQI spike over a low baseline
        .add_rule(Box::new(WaterPhRule::default())) // pH outside 5-9
        .add_rule(Box::new(GeographicRule::default())) // batch spans several regions
}

/// Run the default rules over `observations`
#[must_use]
pub fn detect_anomalies(observations: &[Observation]) -> Vec<Anomaly> {
    create_default_rules().detect(observations)
}

/// Number of anomalies of the given category
#[must_use]
pub fn count_of(anomalies: &[Anomaly], kind: ObservationType) -> usize {
    anomalies.iter().filter(|a| a.kind == kind).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert!(detect_anomalies(&[]).is_empty());
    }

    #[test]
    fn test_rule_order_is_fixed() {
        let mut observations = vec![
            Observation::new("w1", ObservationType::WaterQuality, Some(3.0))
                .with_location("New Delhi, Delhi"),
        ];
        observations.extend(
            (0..9).map(|i| Observation::new(format!("a{i}"), ObservationType::AirQuality, Some(30.0))),
        );
        observations.push(
            Observation::new("spike", ObservationType::AirQuality, Some(200.0))
                .with_location("New York, USA"),
        );

        let anomalies = detect_anomalies(&observations);
        let titles: Vec<&str> = anomalies.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Sudden Air Quality Spike",
                "Abnormal Water pH",
                "Geographical Data Inconsistency",
            ]
        );
        assert_eq!(count_of(&anomalies, ObservationType::AirQuality), 1);
    }

    #[test]
    fn test_records_without_fields_are_skipped() {
        let observations = vec![Observation::default(), Observation::default()];
        assert!(detect_anomalies(&observations).is_empty());
    }

    #[test]
    fn test_serialized_shape() {
        let anomaly = Anomaly {
            id: None,
            title: "Geographical Data Inconsistency".to_string(),
            kind: ObservationType::Custom,
            reason: "r".to_string(),
        };
        let json = serde_json::to_value(&anomaly).unwrap();
        assert_eq!(json["type"], "custom");
        assert!(json.get("id").is_none());
    }
}
