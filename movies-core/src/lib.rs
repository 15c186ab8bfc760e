pub mod common;
pub mod domain;
pub mod service;
pub mod storage;

#[cfg(feature = "db")]
pub mod database;

pub use common::error::{MovieError, Result};
pub use domain::*;
pub use service::MovieService;

// Re-export database manager when db feature is enabled
#[cfg(feature = "db")]
pub use database::DatabaseManager;
