pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{build_router, MemoryStore, SqliteStore};
pub use config::{StorageKind, TomlConfig};
pub use crate::core::expiration::{Clock, ExpirationPoller, SystemClock};
pub use crate::core::record_service::RecordService;
pub use domain::ports::InsuranceStore;
pub use utils::error::{InsuranceError, Result};
