// Adapters layer: concrete implementations for external systems (storage backends, http).

pub mod http;
pub mod memory;
pub mod sqlite;

pub use http::build_router;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
