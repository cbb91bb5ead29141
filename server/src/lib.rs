pub mod config;
pub mod error;
pub mod routes;
pub mod store;

pub use config::Config;
pub use error::ApiError;
pub use store::{SqliteStore, StoreError, StoreResult, TodoStore};
