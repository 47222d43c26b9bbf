use super::domain::Order;
use super::estimate::Candidate;
use super::normalize::{normalize_trips, NormalizedScores};
use super::recommendation::{RankedCandidate, RankedRecommendation};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Caller-supplied weights before validation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightInput {
    pub cost: f64,
    pub speed: f64,
    pub sustainability: f64,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{component} weight must be a number in [0, 1], got {value}")]
pub struct InvalidWeights {
    pub component: &'static str,
    pub value: f64,
}

/// Validated weights, each in `[0, 1]`.
///
/// Weights are applied exactly as given and never rescaled to sum to one.
/// Composite scores are therefore only comparable between candidates of the
/// same request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreWeights {
    cost: f64,
    speed: f64,
    sustainability: f64,
}

impl ScoreWeights {
    pub fn new(cost: f64, speed: f64, sustainability: f64) -> Result<Self, InvalidWeights> {
        Ok(Self {
            cost: check_weight("cost", cost)?,
            speed: check_weight("speed", speed)?,
            sustainability: check_weight("sustainability", sustainability)?,
        })
    }

    pub fn cost(&self) -> f64 {
        self.cost
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn sustainability(&self) -> f64 {
        self.sustainability
    }

    pub fn total(&self) -> f64 {
        self.cost + self.speed + self.sustainability
    }

    pub fn composite(&self, scores: &NormalizedScores) -> f64 {
        self.cost * scores.cost
            + self.speed * scores.speed
            + self.sustainability * scores.sustainability
    }
}

impl TryFrom<WeightInput> for ScoreWeights {
    type Error = InvalidWeights;

    fn try_from(input: WeightInput) -> Result<Self, Self::Error> {
        Self::new(input.cost, input.speed, input.sustainability)
    }
}

fn check_weight(component: &'static str, value: f64) -> Result<f64, InvalidWeights> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(InvalidWeights { component, value })
    }
}

/// Score and order eligible candidates: descending composite score, ties by
/// ascending vehicle id.
pub fn rank(
    order: &Order,
    candidates: &[Candidate<'_>],
    weights: &ScoreWeights,
) -> RankedRecommendation {
    let trips: Vec<_> = candidates.iter().map(|candidate| candidate.trip).collect();
    let sub_scores = normalize_trips(&trips);

    let mut entries: Vec<RankedCandidate> = candidates
        .iter()
        .zip(sub_scores)
        .map(|(candidate, scores)| RankedCandidate {
            rank: 0,
            vehicle_id: candidate.vehicle.vehicle_id.clone(),
            vehicle_type: candidate.vehicle.vehicle_type.clone(),
            score: weights.composite(&scores),
            sub_scores: scores,
            predicted_cost: candidate.trip.cost,
            predicted_time_hours: candidate.trip.time_hours,
            predicted_co2_kg: candidate.trip.co2_kg,
            distance_km: candidate.trip.distance_km,
            capacity_kg: candidate.vehicle.capacity_kg,
        })
        .collect();

    entries.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.vehicle_id.cmp(&b.vehicle_id))
    });
    for (index, entry) in entries.iter_mut().enumerate() {
        entry.rank = index + 1;
    }

    RankedRecommendation {
        order_id: order.order_id.clone(),
        category: order.category.clone(),
        weights: *weights,
        entries,
        excluded: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_outside_unit_interval_are_rejected() {
        let error = ScoreWeights::new(1.2, 0.0, 0.0).expect_err("cost above one");
        assert_eq!(error.component, "cost");

        let error = ScoreWeights::new(0.5, -0.1, 0.0).expect_err("negative speed");
        assert_eq!(error.component, "speed");

        let error = ScoreWeights::new(0.5, 0.1, f64::NAN).expect_err("nan sustainability");
        assert_eq!(error.component, "sustainability");
    }

    #[test]
    fn weights_are_not_renormalized() {
        let weights = ScoreWeights::new(1.0, 1.0, 0.5).expect("valid weights");
        assert_eq!(weights.total(), 2.5);

        let scores = NormalizedScores {
            cost: 1.0,
            speed: 0.5,
            sustainability: 0.0,
        };
        assert_eq!(weights.composite(&scores), 1.5);
    }

    #[test]
    fn weight_input_converts_through_validation() {
        let input = WeightInput {
            cost: 0.5,
            speed: 0.3,
            sustainability: 0.2,
        };
        let weights = ScoreWeights::try_from(input).expect("valid weights");
        assert_eq!(weights.cost(), 0.5);
        assert_eq!(weights.speed(), 0.3);
        assert_eq!(weights.sustainability(), 0.2);
    }
}
