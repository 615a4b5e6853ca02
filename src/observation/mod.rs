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

//! Observation records submitted by the monitoring front end.
//!
//! Records arrive as JSON produced by the hosted entity store. Parsing is
//! lenient on purpose: a record with an unknown `type`, a non-numeric
//! `measurement_value` or a numeric `id` still loads, and the analysis
//! filters simply skip whatever is missing.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::io::Read;

/// Category of an environmental observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationType {
    AirQuality,
    WaterQuality,
    Biodiversity,
    NoiseLevel,
    Waste,
    SoilQuality,
    Weather,
    Radiation,
    Custom,
}

impl ObservationType {
    pub const ALL: [Self; 9] = [
        Self::AirQuality,
        Self::WaterQuality,
        Self::Biodiversity,
        Self::NoiseLevel,
        Self::Waste,
        Self::SoilQuality,
        Self::Weather,
        Self::Radiation,
        Self::Custom,
    ];

    /// Parse the wire name of a category. Unknown names yield `None`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "air_quality" => Some(Self::AirQuality),
            "water_quality" => Some(Self::WaterQuality),
            "biodiversity" => Some(Self::Biodiversity),
            "noise_level" => Some(Self::NoiseLevel),
            "waste" => Some(Self::Waste),
            "soil_quality" => Some(Self::SoilQuality),
            "weather" => Some(Self::Weather),
            "radiation" => Some(Self::Radiation),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }

    /// Wire name, e.g. `air_quality`
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AirQuality => "air_quality",
            Self::WaterQuality => "water_quality",
            Self::Biodiversity => "biodiversity",
            Self::NoiseLevel => "noise_level",
            Self::Waste => "waste",
            Self::SoilQuality => "soil_quality",
            Self::Weather => "weather",
            Self::Radiation => "radiation",
            Self::Custom => "custom",
        }
    }

    /// Human-readable name with the first underscore replaced by a space
    #[must_use]
    pub fn label(&self) -> String {
        self.as_str().replacen('_', " ", 1)
    }
}

impl fmt::Display for ObservationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single citizen-science observation.
///
/// Only `type`, `measurement_value`, `measurement_unit` and `location_name`
/// feed the analysis. The remaining fields are carried through for reports.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<String>,

    #[serde(rename = "type", default, deserialize_with = "lenient_type")]
    pub kind: Option<ObservationType>,

    #[serde(default, deserialize_with = "lenient_number")]
    pub measurement_value: Option<f64>,

    #[serde(default)]
    pub measurement_unit: Option<String>,

    #[serde(default)]
    pub location_name: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub location: Option<String>,

    #[serde(default)]
    pub severity: Option<String>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub created_date: Option<String>,
}

impl Observation {
    pub fn new(id: impl Into<String>, kind: ObservationType, value: Option<f64>) -> Self {
        Self {
            id: Some(id.into()),
            kind: Some(kind),
            measurement_value: value,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.measurement_unit = Some(unit.into());
        self
    }

    #[must_use]
    pub fn with_location(mut self, location_name: impl Into<String>) -> Self {
        self.location_name = Some(location_name.into());
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// The measurement if it is a usable number (NaN and infinities are ignored)
    #[must_use]
    pub fn value(&self) -> Option<f64> {
        self.measurement_value.filter(|v| v.is_finite())
    }

    #[must_use]
    pub fn is(&self, kind: ObservationType) -> bool {
        self.kind == Some(kind)
    }

    /// Measurement of this record if it belongs to `kind`
    #[must_use]
    pub fn value_of(&self, kind: ObservationType) -> Option<f64> {
        if self.is(kind) {
            self.value()
        } else {
            None
        }
    }
}

/// All usable measurement values, in input order
#[must_use]
pub fn numeric_values(observations: &[Observation]) -> Vec<f64> {
    observations.iter().filter_map(Observation::value).collect()
}

/// Read a JSON array of observations
pub fn read_observations<R: Read>(reader: R) -> Result<Vec<Observation>, serde_json::Error> {
    let observations: Vec<Observation> = serde_json::from_reader(reader)?;
    tracing::debug!("Read {} observations", observations.len());
    Ok(observations)
}

// ============================================================================
// Lenient field decoding
// ============================================================================

fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_type<'de, D>(deserializer: D) -> Result<Option<ObservationType>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(ObservationType::parse))
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(serde_json::Value::as_f64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_record() {
        let json = r#"[{
            "id": "obs-1",
            "type": "water_quality",
            "measurement_value": 6.5,
            "measurement_unit": "pH",
            "location_name": "Yamuna, Delhi",
            "severity": "low",
            "created_date": "2026-02-26T08:00:00Z"
        }]"#;

        let observations = read_observations(json.as_bytes()).unwrap();
        assert_eq!(observations.len(), 1);

        let obs = &observations[0];
        assert_eq!(obs.id.as_deref(), Some("obs-1"));
        assert_eq!(obs.kind, Some(ObservationType::WaterQuality));
        assert_eq!(obs.value(), Some(6.5));
        assert_eq!(obs.measurement_unit.as_deref(), Some("pH"));
        assert_eq!(obs.location_name.as_deref(), Some("Yamuna, Delhi"));
    }

    #[test]
    fn test_lenient_fields() {
        let json = r#"[
            {"id": 17, "type": "air_quality", "measurement_value": "n/a"},
            {"type": "lava_flow", "measurement_value": 3},
            {"measurement_value": null}
        ]"#;

        let observations = read_observations(json.as_bytes()).unwrap();
        assert_eq!(observations.len(), 3);
        assert_eq!(observations[0].id.as_deref(), Some("17"));
        assert_eq!(observations[0].value(), None);
        assert_eq!(observations[1].kind, None);
        assert_eq!(observations[1].value(), Some(3.0));
        assert_eq!(observations[2].id, None);
        assert_eq!(observations[2].kind, None);
    }

    #[test]
    fn test_label_replaces_first_underscore() {
        assert_eq!(ObservationType::AirQuality.label(), "air quality");
        assert_eq!(ObservationType::Weather.label(), "weather");
    }

    #[test]
    fn test_non_finite_values_are_ignored() {
        let obs = Observation::new("x", ObservationType::NoiseLevel, Some(f64::NAN));
        assert_eq!(obs.value(), None);
        assert!(numeric_values(&[obs]).is_empty());
    }

    #[test]
    fn test_parse_round_trips_wire_names() {
        for kind in ObservationType::ALL {
            assert_eq!(ObservationType::parse(kind.as_str()), Some(kind));
        }
    }
}
