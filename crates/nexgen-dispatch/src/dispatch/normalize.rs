//! Rescale raw trip metrics into comparable `[0, 1]` scores.
//!
//! Cost, time and emissions are all "lower is better", so the normalizer
//! inverts them: the cheapest, fastest or cleanest candidate scores `1.0`
//! and the worst scores `0.0`. The inversion happens in [`normalize`] and
//! nowhere else; callers always pass raw values.

use super::estimate::TripEstimate;
use serde::{Deserialize, Serialize};

/// Score every candidate receives when the whole set ties on a metric.
pub const TIE_MIDPOINT: f64 = 0.5;

/// `1 - (raw - min) / (max - min)`, clamped to `[0, 1]`; [`TIE_MIDPOINT`]
/// when `min == max`.
pub fn normalize(raw: f64, min: f64, max: f64) -> f64 {
    let span = max - min;
    if span.abs() < f64::EPSILON {
        return TIE_MIDPOINT;
    }
    (1.0 - (raw - min) / span).clamp(0.0, 1.0)
}

/// Observed bounds of one metric across a candidate set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricRange {
    pub min: f64,
    pub max: f64,
}

impl MetricRange {
    pub fn from_values<I: IntoIterator<Item = f64>>(values: I) -> Option<Self> {
        let mut range: Option<Self> = None;
        for value in values {
            range = Some(match range {
                None => Self {
                    min: value,
                    max: value,
                },
                Some(current) => Self {
                    min: current.min.min(value),
                    max: current.max.max(value),
                },
            });
        }
        range
    }

    pub fn score(&self, raw: f64) -> f64 {
        normalize(raw, self.min, self.max)
    }
}

/// Normalized sub-scores for one candidate, higher is better.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedScores {
    pub cost: f64,
    pub speed: f64,
    pub sustainability: f64,
}

/// Normalize each metric against the bounds of this candidate set only.
pub fn normalize_trips(trips: &[TripEstimate]) -> Vec<NormalizedScores> {
    let cost = MetricRange::from_values(trips.iter().map(|trip| trip.cost));
    let time = MetricRange::from_values(trips.iter().map(|trip| trip.time_hours));
    let co2 = MetricRange::from_values(trips.iter().map(|trip| trip.co2_kg));

    let (Some(cost), Some(time), Some(co2)) = (cost, time, co2) else {
        return Vec::new();
    };

    trips
        .iter()
        .map(|trip| NormalizedScores {
            cost: cost.score(trip.cost),
            speed: time.score(trip.time_hours),
            sustainability: co2.score(trip.co2_kg),
        })
        .collect()
}
