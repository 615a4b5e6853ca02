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

//! JSON-over-HTTP narrator.
//!
//! Posts `{ "prompt": ..., "response_json_schema": ... }` to an LLM proxy and
//! expects a JSON object matching the schema back.

use crate::config::NarratorConfig;
use crate::narration::{
    Narration, NarrationError, NarrationRequest, Narrator, OutlierReview, OutlierReviewRequest,
};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;

#[derive(Serialize)]
struct InvokeBody<'a> {
    prompt: &'a str,
    response_json_schema: &'a Value,
}

pub struct HttpNarrator {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpNarrator {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, NarrationError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: None,
        })
    }

    /// Build from config, `Ok(None)` when no endpoint is configured
    pub fn from_config(config: &NarratorConfig) -> Result<Option<Self>, NarrationError> {
        let Some(endpoint) = config.endpoint.as_deref() else {
            return Ok(None);
        };
        let mut narrator = Self::new(endpoint, Duration::from_secs(config.timeout_secs))?;
        narrator.api_key.clone_from(&config.api_key);
        Ok(Some(narrator))
    }

    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    fn invoke<T: DeserializeOwned>(&self, prompt: &str, schema: &Value) -> Result<T, NarrationError> {
        let mut request = self.client.post(&self.endpoint).json(&InvokeBody {
            prompt,
            response_json_schema: schema,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        tracing::debug!("Invoking narrator at {}", self.endpoint);
        let response = request.send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(NarrationError::Status(status.as_u16()));
        }

        let body = response.text()?;
        Ok(serde_json::from_str(&body)?)
    }
}

fn today() -> String {
    chrono::Local::now().format("%B %-d, %Y").to_string()
}

fn string_array() -> Value {
    json!({ "type": "array", "items": { "type": "string" } })
}

impl Narrator for HttpNarrator {
    fn narrate(&self, request: &NarrationRequest) -> Result<Narration, NarrationError> {
        let prompt = format!(
            "You are an environmental scientist writing for EcoWatch. Narrate these deterministic findings.\n\
             Overall health score: {}/100\n\
             Category scores: {}\n\
             Anomalies found: {}\n\
             Anomaly details: {}\n\
             Tasks:\n\
             1. Rewrite the concerns and positive findings as concise professional bullet points.\n\
             2. Turn these prioritized recommendations into a short environmental policy list: {}",
            request.overall_score,
            serde_json::to_string(&request.scores)?,
            request.anomalies.len(),
            serde_json::to_string(&request.anomalies)?,
            request.recommendations.join("; "),
        );
        let schema = json!({
            "type": "object",
            "properties": {
                "concerns": string_array(),
                "positives": string_array(),
                "recommendations": string_array(),
            }
        });
        self.invoke(&prompt, &schema)
    }

    fn review_outliers(
        &self,
        request: &OutlierReviewRequest,
    ) -> Result<OutlierReview, NarrationError> {
        let prompt = format!(
            "You are an environmental data scientist validating machine-learning outlier detections for EcoWatch.\n\
             Algorithm: {}\n\
             Dataset size: {}\n\
             Date: {}\n\
             Detections: {}\n\
             Tasks:\n\
             1. Refine the explanation of each outlier.\n\
             2. Classify each as Normal, Suspicious, High Risk or Critical.\n\
             3. Assign a confidence between 0 and 100.",
            request.algorithm,
            request.dataset_size,
            today(),
            serde_json::to_string(&request.detections)?,
        );
        let schema = json!({
            "type": "object",
            "properties": {
                "anomalies": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string" },
                            "title": { "type": "string" },
                            "location": { "type": "string" },
                            "status": { "type": "string" },
                            "risk_level": { "type": "string" },
                            "confidence_score": { "type": "number" },
                            "explanation": { "type": "string" }
                        }
                    }
                },
                "summary": { "type": "string" },
                "highest_risk_category": { "type": "string" },
                "recommendation": { "type": "string" }
            }
        });
        self.invoke(&prompt, &schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::CategoryScores;

    #[test]
    fn test_no_endpoint_means_no_narrator() {
        let config = NarratorConfig::default();
        assert!(HttpNarrator::from_config(&config).unwrap().is_none());
    }

    #[test]
    fn test_unreachable_endpoint_is_an_error() {
        let narrator = HttpNarrator::new("http://127.0.0.1:1/invoke", Duration::from_secs(2))
            .unwrap()
            .with_api_key("secret");
        let request = NarrationRequest {
            overall_score: 85,
            scores: CategoryScores::new(),
            anomalies: Vec::new(),
            recommendations: Vec::new(),
        };
        assert!(matches!(
            narrator.narrate(&request),
            Err(NarrationError::Transport(_))
        ));
    }

    #[test]
    fn test_partial_narration_decodes() {
        let narration: Narration =
            serde_json::from_str(r#"{"concerns": ["Smog over the river basin."]}"#).unwrap();
        assert_eq!(
            narration.concerns,
            Some(vec!["Smog over the river basin.".to_string()])
        );
        assert_eq!(narration.positives, None);
    }
}
