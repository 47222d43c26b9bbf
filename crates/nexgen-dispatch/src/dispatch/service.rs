use std::sync::Arc;

use tracing::{info, info_span};

use super::config::DispatchConfig;
use super::domain::{OrderId, Priority};
use super::recommendation::RankedRecommendation;
use super::scoring::{ScoreWeights, WeightInput};
use super::{get_recommendation, RecommendationError};
use crate::dashboard::{filter_candidates, DashboardSummary, FilteredTable};
use crate::reference::{DataLoadError, ReferenceStore, ReferenceSummary};

/// Request boundary over the shared reference store. Each call works on the
/// snapshot current when it started.
pub struct DispatchService {
    store: Arc<ReferenceStore>,
    config: DispatchConfig,
}

impl DispatchService {
    pub fn new(store: Arc<ReferenceStore>, config: DispatchConfig) -> Self {
        Self { store, config }
    }

    /// Validate the weights, then rank the fleet for the order.
    pub fn recommend(
        &self,
        order_id: &str,
        weights: WeightInput,
    ) -> Result<RankedRecommendation, RecommendationError> {
        let span = info_span!("recommend", order_id = %order_id);
        let _entered = span.enter();

        let weights = ScoreWeights::try_from(weights)?;
        let snapshot = self.store.snapshot();
        let recommendation = get_recommendation(
            &OrderId::from(order_id),
            &weights,
            &snapshot,
            &self.config,
        )?;

        match recommendation.best() {
            Some(best) => info!(
                vehicle_id = %best.vehicle_id,
                score = best.score,
                candidates = recommendation.entries.len(),
                "recommendation ready"
            ),
            None => info!(
                excluded = recommendation.excluded.len(),
                "no eligible vehicle"
            ),
        }

        Ok(recommendation)
    }

    pub fn orders(&self, category: Option<&str>, priority: Option<Priority>) -> FilteredTable {
        filter_candidates(category, priority, &self.store.snapshot())
    }

    pub fn dashboard(
        &self,
        category: Option<&str>,
        priority: Option<Priority>,
    ) -> DashboardSummary {
        let snapshot = self.store.snapshot();
        let table = filter_candidates(category, priority, &snapshot);
        DashboardSummary::from_table(&table, snapshot.vehicles())
    }

    pub fn reference_summary(&self) -> ReferenceSummary {
        self.store.snapshot().summary().clone()
    }

    pub fn reload(&self) -> Result<ReferenceSummary, DataLoadError> {
        let snapshot = self.store.reload()?;
        Ok(snapshot.summary().clone())
    }
}
