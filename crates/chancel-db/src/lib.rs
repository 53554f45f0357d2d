//! Chancel DB Library
//!
//! Persistence for `MediaAsset` records. The `MediaAssetStore` trait is the
//! only mutation surface; the ingestion orchestrator exclusively owns these
//! records. Two implementations: Postgres (sqlx, dynamic queries) and an
//! in-memory store for tests and database-free deployments.
//!
//! Status writes are forward-only. Concurrent refreshes are last-write-wins,
//! but a write that would regress the lifecycle (e.g. `processing` over an
//! already-`ready` record) is rejected and the stored record returned
//! instead. The one deliberate exception is `reset_for_retry`, the explicit
//! operator action that replaces a dead attempt wholesale.

pub mod memory;
pub mod postgres;
pub mod store;

// Re-export commonly used types
pub use memory::MemoryAssetStore;
pub use postgres::{PgMediaAssetStore, MIGRATOR};
pub use store::{AssetProgress, MediaAssetStore};
