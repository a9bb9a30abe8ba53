//! Shared fixtures for the compute tests.

use std::str::FromStr;

use async_trait::async_trait;
use migration::{Migrator, MigratorTrait};
use model::entities::consumption;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};

use crate::error::Result;
use crate::series::ConsumptionRecord;
use crate::source::ConsumptionSource;

pub fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).expect("invalid decimal literal in test")
}

/// In-memory SQLite database with migrations applied.
pub async fn setup_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");
    Migrator::up(&db, None).await.expect("Migrations failed.");
    db
}

pub async fn seed_consumption(db: &DatabaseConnection, rows: &[(i32, &str)]) {
    for (year, value) in rows {
        consumption::ActiveModel {
            year: Set(*year),
            consumption_kt: Set(dec(value)),
        }
        .insert(db)
        .await
        .expect("Failed to insert consumption row");
    }
}

/// A source that returns fixed rows, in descending period order like the
/// database query does.
pub struct StaticSource {
    rows: Vec<ConsumptionRecord>,
}

impl StaticSource {
    pub fn new(rows: &[(i32, &str)]) -> Self {
        let mut rows: Vec<_> = rows
            .iter()
            .map(|(period, value)| ConsumptionRecord::new(*period, dec(value)))
            .collect();
        rows.sort_by(|a, b| b.period.cmp(&a.period));
        Self { rows }
    }
}

#[async_trait]
impl ConsumptionSource for StaticSource {
    async fn fetch_rows(&self) -> Result<Vec<ConsumptionRecord>> {
        Ok(self.rows.clone())
    }
}
