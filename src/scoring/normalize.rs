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

//! Conversion of raw readings to a 0-100 impact scale.

use crate::observation::ObservationType;
use serde::{Deserialize, Serialize};

/// How negative impacts are treated before averaging.
///
/// Readings below the bottom of a category's scale (noise under 30 dB, a
/// negative AQI) produce a negative impact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactFloor {
    /// Negative impacts stay in the average and offset other readings
    #[default]
    Offset,
    /// Each impact is floored at 0 before averaging
    Clamp,
}

impl ImpactFloor {
    #[must_use]
    pub fn apply(self, impact: f64) -> f64 {
        match self {
            Self::Offset => impact,
            Self::Clamp => impact.max(0.0),
        }
    }
}

/// Impact of a single reading: 0 means no impact, 100 maximum impact.
///
/// Only the upper bound is enforced here. Biodiversity is the exception and
/// is floored at 0, since species counts above 50 mean a healthy ecosystem.
#[must_use]
pub fn impact(kind: ObservationType, value: f64) -> f64 {
    match kind {
        // AQI on a 0-500 scale
        ObservationType::AirQuality => (value / 500.0 * 100.0).min(100.0),
        // pH, deviation from neutral
        ObservationType::WaterQuality => ((7.0 - value).abs() / 7.0 * 100.0).min(100.0),
        // dB on a 30-140 scale
        ObservationType::NoiseLevel => ((value - 30.0) / 110.0 * 100.0).min(100.0),
        // species count, more is better
        ObservationType::Biodiversity => (100.0 - value * 2.0).max(0.0),
        ObservationType::Waste
        | ObservationType::SoilQuality
        | ObservationType::Weather
        | ObservationType::Radiation
        | ObservationType::Custom => value.min(100.0),
    }
}

/// Round half up, so 2.5 becomes 3 and -2.5 becomes -2
#[must_use]
pub fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

/// Extra decimals rendered to tell an exact tie from a value that only looks
/// like one at the requested precision
const TIE_GUARD_DIGITS: usize = 40;

/// Fixed-point text with `digits` decimals.
///
/// Exact decimal ties round away from zero (2.25 -> "2.3", 0.125 -> "0.13"),
/// where `format!` would pick the even neighbour. Values that are not exactly
/// representable round to nearest, so 1.005 stays "1.00". Magnitudes from
/// 1e21 up fall back to [`js_number`].
#[must_use]
pub fn to_fixed(x: f64, digits: usize) -> String {
    if !x.is_finite() || x.abs() >= 1e21 {
        return js_number(x);
    }

    let sign = if x < 0.0 { "-" } else { "" };
    let magnitude = x.abs();
    let wide_digits = digits + TIE_GUARD_DIGITS;
    let wide = format!("{magnitude:.wide_digits$}");
    let (head, tail) = wide.split_at(wide.len() - TIE_GUARD_DIGITS);

    let is_tie = tail.starts_with('5') && tail.bytes().skip(1).all(|b| b == b'0');
    let fixed = if is_tie {
        increment_last_digit(head.trim_end_matches('.'))
    } else {
        format!("{magnitude:.digits$}")
    };
    format!("{sign}{fixed}")
}

fn increment_last_digit(decimal: &str) -> String {
    let mut bytes = decimal.as_bytes().to_vec();
    for b in bytes.iter_mut().rev() {
        match *b {
            b'9' => *b = b'0',
            b'0'..=b'8' => {
                *b += 1;
                return String::from_utf8_lossy(&bytes).into_owned();
            }
            _ => {}
        }
    }
    format!("1{}", String::from_utf8_lossy(&bytes))
}

/// Shortest text for a number as a JavaScript template literal prints it.
///
/// Differs from `f64`'s `Display` for negative zero ("0"), and for
/// magnitudes of 1e21 and above or below 1e-6, which use exponent notation
/// ("1.7e+308", "1e-7").
#[must_use]
pub fn js_number(x: f64) -> String {
    if x.is_nan() {
        return "NaN".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if x == 0.0 {
        return "0".to_string();
    }

    let sign = if x < 0.0 { "-" } else { "" };
    // Shortest round-trip digits, e.g. "2.25e0" or "1.7e308"
    let scientific = format!("{:e}", x.abs());
    let (mantissa, exponent) = scientific
        .split_once('e')
        .unwrap_or((scientific.as_str(), "0"));
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let count = digits.len() as i32;
    // Position of the decimal point relative to the first digit
    let point = exponent.parse::<i32>().unwrap_or(0) + 1;

    let body = if count <= point && point <= 21 {
        format!("{digits}{}", "0".repeat((point - count) as usize))
    } else if 0 < point && point <= 21 {
        let (int, frac) = digits.split_at(point as usize);
        format!("{int}.{frac}")
    } else if -6 < point && point <= 0 {
        format!("0.{}{digits}", "0".repeat(point.unsigned_abs() as usize))
    } else {
        let power = point - 1;
        let power_sign = if power < 0 { '-' } else { '+' };
        let (first, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{first}e{power_sign}{}", power.unsigned_abs())
        } else {
            format!("{first}.{rest}e{power_sign}{}", power.unsigned_abs())
        }
    };
    format!("{sign}{body}")
}
