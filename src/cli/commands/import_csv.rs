use anyhow::{Context, Result, bail};
use compute::ConsumptionRecord;
use model::entities::consumption;
use sea_orm::{Database, DatabaseConnection, EntityTrait, Set, sea_query::OnConflict};
use std::collections::HashSet;
use std::fs::File;
use tracing::{debug, info, trace};

/// Loads a CSV of (year, consumption) rows into the warehouse table.
pub async fn import_csv(csv_path: &str, database_url: &str) -> Result<()> {
    trace!("Entering import_csv function");
    info!("Starting consumption import");
    debug!("CSV path: {}", csv_path);
    debug!("Database URL: {}", database_url);

    let file = File::open(csv_path).with_context(|| format!("Failed to open file: {}", csv_path))?;
    let records = compute::upload::parse_records(file)
        .with_context(|| format!("Failed to read {}", csv_path))?;
    info!("Read {} rows from {}", records.len(), csv_path);

    let db = Database::connect(database_url)
        .await
        .context("Failed to connect to database")?;
    info!("Connected to database");

    let imported = upsert_consumption(&db, &records).await?;
    info!("Import completed: {} years written", imported);
    Ok(())
}

/// Inserts the rows, overwriting the value of years already present.
pub async fn upsert_consumption(db: &DatabaseConnection, records: &[ConsumptionRecord]) -> Result<usize> {
    if records.is_empty() {
        info!("Nothing to import");
        return Ok(0);
    }

    let mut seen = HashSet::with_capacity(records.len());
    if let Some(duplicate) = records.iter().find(|r| !seen.insert(r.period)) {
        bail!("Year {} is listed more than once", duplicate.period);
    }

    let models = records.iter().map(|record| consumption::ActiveModel {
        year: Set(record.period),
        consumption_kt: Set(record.value),
    });

    consumption::Entity::insert_many(models)
        .on_conflict(
            OnConflict::column(consumption::Column::Year)
                .update_column(consumption::Column::ConsumptionKt)
                .to_owned(),
        )
        .exec(db)
        .await
        .context("Failed to write consumption rows")?;

    Ok(records.len())
}
