//! Vehicle recommendation for a single order.
//!
//! The pipeline runs eligibility, trip estimation, normalization and
//! weighted ranking over one immutable reference snapshot and has no side
//! effects.

mod config;
pub mod domain;
pub mod eligibility;
pub mod estimate;
pub mod normalize;
pub mod recommendation;
pub mod router;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use config::{
    DispatchConfig, DEFAULT_FUEL_PRICE_PER_LITER, DEFAULT_LABOR_COST_PER_HOUR,
    DEFAULT_PERISHABLE_CATEGORIES,
};
pub use domain::{
    CategorySupport, CostRecord, Order, OrderId, PerformanceRecord, Priority, RouteRecord,
    Vehicle, VehicleId,
};
pub use eligibility::{eligible_vehicles, ExcludedVehicle, Ineligibility};
pub use estimate::{Candidate, TripEstimate};
pub use normalize::{normalize, NormalizedScores, TIE_MIDPOINT};
pub use recommendation::{RankedCandidate, RankedRecommendation};
pub use router::dispatch_router;
pub use scoring::{rank, InvalidWeights, ScoreWeights, WeightInput};
pub use service::DispatchService;

use crate::reference::ReferenceData;
use tracing::debug;

/// Per-request failures. None of these touch the reference snapshot.
#[derive(Debug, thiserror::Error)]
pub enum RecommendationError {
    #[error("unknown order '{0}'")]
    UnknownOrder(OrderId),
    #[error("no route data recorded for order '{0}' or its lane")]
    RouteUnavailable(OrderId),
    #[error(transparent)]
    InvalidWeights(#[from] InvalidWeights),
}

/// Rank the fleet for `order_id` under `weights`.
///
/// An order no vehicle can serve yields an empty recommendation, with the
/// reason each vehicle was excluded.
pub fn get_recommendation(
    order_id: &OrderId,
    weights: &ScoreWeights,
    data: &ReferenceData,
    config: &DispatchConfig,
) -> Result<RankedRecommendation, RecommendationError> {
    let order = data
        .order(order_id)
        .ok_or_else(|| RecommendationError::UnknownOrder(order_id.clone()))?;

    let (eligible, excluded) = eligibility::partition(order, data.vehicles());
    debug!(
        order_id = %order.order_id,
        eligible = eligible.len(),
        excluded = excluded.len(),
        "eligibility applied"
    );

    if eligible.is_empty() {
        return Ok(rank(order, &[], weights).with_exclusions(excluded));
    }

    let route = data
        .route_for(order)
        .ok_or_else(|| RecommendationError::RouteUnavailable(order.order_id.clone()))?;
    let overhead = data
        .cost_for(&order.order_id)
        .map(CostRecord::fixed_overhead)
        .unwrap_or(0.0);

    let candidates: Vec<Candidate<'_>> = eligible
        .into_iter()
        .map(|vehicle| Candidate {
            order,
            vehicle,
            trip: estimate::estimate_trip(route, vehicle, overhead, config),
        })
        .collect();

    Ok(rank(order, &candidates, weights).with_exclusions(excluded))
}
