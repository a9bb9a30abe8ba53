//! SeaORM entity modules for the warehouse tables read by the dashboard.

pub mod consumption;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::consumption::Entity as Consumption;
}
