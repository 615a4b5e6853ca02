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

//! Plain-text export of an outlier report.

use crate::analyzer::OutlierReport;
use crate::narration::ReportedAnomaly;
use crate::scoring::js_number;
use chrono::{DateTime, Datelike, Local, NaiveDate};
use std::fmt::Write;

/// Default export file name for a report generated on `date`
#[must_use]
pub fn default_file_name(date: NaiveDate) -> String {
    format!("EcoWatch_Report_{}.txt", date.format("%Y-%m-%d"))
}

fn confidence(anomaly: &ReportedAnomaly) -> String {
    match anomaly.confidence_score {
        Some(score) if score != 0.0 => format!("{}%", js_number(score)),
        _ => "N/A%".to_string(),
    }
}

fn risk_level(anomaly: &ReportedAnomaly) -> &str {
    if anomaly.risk_level.is_empty() {
        &anomaly.status
    } else {
        &anomaly.risk_level
    }
}

fn explanation(anomaly: &ReportedAnomaly) -> &str {
    if anomaly.explanation.is_empty() {
        "No detailed explanation provided."
    } else {
        &anomaly.explanation
    }
}

/// Render the report as text
#[must_use]
pub fn render_report(report: &OutlierReport, generated_at: DateTime<Local>) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail
    let _ = writeln!(out, "ECOWATCH ENVIRONMENTAL ANOMALY REPORT");
    let _ = writeln!(out, "=====================================");
    let _ = writeln!(out, "Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "Algorithm: {}", report.algorithm);
    let _ = writeln!(out, "Total Incidents: {}", report.total_anomalies);
    let _ = writeln!(out, "Primary Risk Vector: {}", report.highest_risk_category);
    let _ = writeln!(out);
    let _ = writeln!(out, "EXECUTIVE SUMMARY");
    let _ = writeln!(out, "-----------------");
    let _ = writeln!(out, "{}", report.summary);
    let _ = writeln!(out);
    let _ = writeln!(out, "DETAILED INCIDENT LOGS");
    let _ = writeln!(out, "----------------------");

    for (i, anomaly) in report.anomalies.iter().enumerate() {
        let _ = writeln!(out);
        let _ = writeln!(out, "[INCIDENT #{}]", i + 1);
        let _ = writeln!(out, "Title: {}", anomaly.title);
        let _ = writeln!(out, "Risk Level: {}", risk_level(anomaly));
        let _ = writeln!(out, "Confidence: {}", confidence(anomaly));
        let _ = writeln!(out, "Location: {}", anomaly.location);
        let _ = writeln!(out, "Technical Insight: {}", explanation(anomaly));
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "SYSTEM RECOMMENDATION");
    let _ = writeln!(out, "---------------------");
    let _ = writeln!(out, "{}", report.recommendation);
    let _ = writeln!(out);
    let _ = writeln!(out, "-------------------------------------");
    let _ = write!(out, "© {} EcoWatch Intelligence Systems", generated_at.year());

    out
}
