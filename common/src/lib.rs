pub mod database;
pub mod secrets;
pub mod tracing;

pub use database::DatabaseCredentials;
pub use secrets::Secret;
