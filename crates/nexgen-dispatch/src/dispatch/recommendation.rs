use super::domain::{OrderId, VehicleId};
use super::eligibility::ExcludedVehicle;
use super::normalize::NormalizedScores;
use super::scoring::ScoreWeights;
use serde::Serialize;

/// One scored vehicle with the inputs that produced its score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCandidate {
    pub rank: usize,
    pub vehicle_id: VehicleId,
    pub vehicle_type: String,
    pub score: f64,
    pub sub_scores: NormalizedScores,
    pub predicted_cost: f64,
    pub predicted_time_hours: f64,
    pub predicted_co2_kg: f64,
    pub distance_km: f64,
    pub capacity_kg: f64,
}

/// Eligible vehicles for an order, best first. Empty when nothing in the
/// fleet can serve the order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRecommendation {
    pub order_id: OrderId,
    pub category: String,
    pub weights: ScoreWeights,
    pub entries: Vec<RankedCandidate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded: Vec<ExcludedVehicle>,
}

impl RankedRecommendation {
    pub fn best(&self) -> Option<&RankedCandidate> {
        self.entries.first()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn vehicle_ids(&self) -> Vec<&VehicleId> {
        self.entries.iter().map(|entry| &entry.vehicle_id).collect()
    }

    pub fn with_exclusions(mut self, excluded: Vec<ExcludedVehicle>) -> Self {
        self.excluded = excluded;
        self
    }

    pub fn summary(&self) -> String {
        match self.best() {
            Some(best) => format!(
                "{} ({}) recommended for {} with score {:.2}",
                best.vehicle_id, best.vehicle_type, self.order_id, best.score
            ),
            None => format!(
                "no suitable vehicle for {} (requires {})",
                self.order_id, self.category
            ),
        }
    }
}
