use sea_orm::entity::prelude::*;

/// Yearly "LPG, Propane and Butane" consumption as published by the Thai EPPO.
///
/// One row per calendar year; the year is the natural key, so it doubles as
/// the primary key and rules out duplicate periods at the storage level.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "thai_eppo_consumption")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub year: i32,
    /// Consumption in kilotonnes.
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub consumption_kt: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
