pub mod hash_password;
pub mod import_csv;
pub mod initdb;
pub mod report;
pub mod serve;

pub use hash_password::hash_password;
pub use import_csv::import_csv;
pub use initdb::init_database;
pub use report::report;
pub use serve::serve;
