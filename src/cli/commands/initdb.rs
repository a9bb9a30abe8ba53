use anyhow::{Context, Result};
use migration::{Migrator, MigratorTrait};
use model::entities::consumption;
use sea_orm::{Database, DatabaseConnection, EntityTrait, PaginatorTrait, QueryOrder};
use tracing::{debug, info, trace, warn};

/// Rows held by the consumption table after initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarehouseSummary {
    pub rows: u64,
    /// First and last year on record
    pub span: Option<(i32, i32)>,
}

/// Creates the consumption table if needed and reports what it already holds.
pub async fn init_database(database_url: &str) -> Result<()> {
    trace!("Entering init_database function");
    info!("Preparing consumption warehouse");
    debug!("Database URL: {}", database_url);

    let db = Database::connect(database_url)
        .await
        .with_context(|| format!("Failed to connect to database '{}'", database_url))?;
    info!("Connected to database");

    let summary = prepare_warehouse(&db).await?;
    match summary.span {
        Some((first, last)) => info!(
            "Warehouse holds {} years of consumption ({}..={})",
            summary.rows, first, last
        ),
        None => warn!("Warehouse is empty; load history with `import-csv` before serving reports"),
    }

    Ok(())
}

/// Applies pending migrations, then summarizes the consumption rows.
pub async fn prepare_warehouse(db: &DatabaseConnection) -> Result<WarehouseSummary> {
    let pending = Migrator::get_pending_migrations(db)
        .await
        .context("Failed to read migration status")?;
    debug!("{} pending migrations", pending.len());

    Migrator::up(db, None)
        .await
        .context("Failed to run database migrations")?;

    let rows = consumption::Entity::find()
        .count(db)
        .await
        .context("Failed to count consumption rows")?;

    let first = consumption::Entity::find()
        .order_by_asc(consumption::Column::Year)
        .one(db)
        .await
        .context("Failed to read the first year")?;
    let last = consumption::Entity::find()
        .order_by_desc(consumption::Column::Year)
        .one(db)
        .await
        .context("Failed to read the last year")?;
    let span = first.zip(last).map(|(first, last)| (first.year, last.year));

    Ok(WarehouseSummary { rows, span })
}
