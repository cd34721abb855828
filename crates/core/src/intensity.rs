//! Intensity estimation for authoritative feed records.
//!
//! User reports carry a self-assessed 1–9 MMI level; feed records carry
//! magnitude and depth instead, so alerting needs a rough conversion.

use serde::{Deserialize, Serialize};

/// Estimate a 1–9 MMI intensity from magnitude and hypocenter depth.
///
/// Base intensity is `ceil(magnitude - 1)`. Shallow quakes (< 30 km) are
/// bumped up one level, deep quakes (> 100 km) down one. Clamped to 1..=9.
pub fn estimate_intensity(magnitude: f64, depth_km: f64) -> i32 {
    let mut intensity = (magnitude - 1.0).ceil() as i32;

    if depth_km < 30.0 {
        intensity += 1;
    } else if depth_km > 100.0 {
        intensity -= 1;
    }

    intensity.clamp(1, 9)
}

/// Human-readable label for an MMI level (Indonesian, matching BMKG usage).
pub fn intensity_description(intensity: i32) -> &'static str {
    match intensity {
        1 => "Tidak terasa",
        2 => "Terasa sangat ringan",
        3 => "Terasa ringan",
        4 => "Terasa sedang",
        5 => "Terasa kuat",
        6 => "Terasa sangat kuat",
        7 => "Kerusakan ringan",
        8 => "Kerusakan sedang",
        9 => "Kerusakan parah",
        _ => "Tidak diketahui",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
            RiskLevel::Critical => write!(f, "critical"),
        }
    }
}

/// Risk bucket for a single intensity level.
pub fn risk_level(intensity: i32) -> RiskLevel {
    if intensity <= 3 {
        RiskLevel::Low
    } else if intensity <= 5 {
        RiskLevel::Medium
    } else if intensity <= 7 {
        RiskLevel::High
    } else {
        RiskLevel::Critical
    }
}
