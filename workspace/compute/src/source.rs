//! Access to the warehouse table holding the actual consumption values.

use async_trait::async_trait;
use model::entities::consumption;
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};
use tracing::{debug, error, instrument};

use crate::error::{ComputeError, Result};
use crate::series::{ActualSeries, ConsumptionRecord};

/// A queryable table of (period, value) rows.
#[async_trait]
pub trait ConsumptionSource: Send + Sync {
    /// Returns every row, ordered by period descending, values unrounded.
    async fn fetch_rows(&self) -> Result<Vec<ConsumptionRecord>>;
}

#[async_trait]
impl ConsumptionSource for DatabaseConnection {
    async fn fetch_rows(&self) -> Result<Vec<ConsumptionRecord>> {
        let rows = consumption::Entity::find()
            .order_by_desc(consumption::Column::Year)
            .all(self)
            .await
            .map_err(|e| {
                error!("Consumption query failed: {}", e);
                ComputeError::DataAccess(e.to_string())
            })?;

        Ok(rows
            .into_iter()
            .map(|row| ConsumptionRecord::new(row.year, row.consumption_kt))
            .collect())
    }
}

/// Runs the consumption query once and returns the rounded actual series.
///
/// An empty result is an error: every consumer of the series indexes into it.
#[instrument(skip(source))]
pub async fn fetch_actuals(source: &dyn ConsumptionSource) -> Result<ActualSeries> {
    let rows = source.fetch_rows().await?;
    debug!("Fetched {} consumption rows", rows.len());

    if rows.is_empty() {
        error!("Consumption query returned no rows");
        return Err(ComputeError::DataAccess(
            "Consumption query returned no rows".to_string(),
        ));
    }

    ActualSeries::new(rows)
}
