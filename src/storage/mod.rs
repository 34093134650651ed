//! Storage backends for the scoreboard tables
//!
//! This module provides a trait-based abstraction over the persistent store
//! shared between the poller and the (external) configuration/scoreboard
//! layer.
//!
//! ## Design
//!
//! - **Trait-based**: `StorageBackend` allows swapping implementations
//! - **Async**: All operations are async for compatibility with Tokio tasks
//! - **Typed rows**: Services, poll results and errors cross the boundary as
//!   structs with named fields; the service kind is validated here
//!
//! ## Backends
//!
//! - **SQLite** (default): Embedded database, shared with the dashboard
//! - **In-Memory**: No persistence, for testing or throwaway runs

pub mod backend;
pub mod error;
pub mod memory;
pub mod schema;
#[cfg(feature = "storage-sqlite")]
pub mod sqlite;

pub use backend::{HealthStatus, StorageBackend};
pub use error::{StorageError, StorageResult};
pub use memory::MemoryBackend;
pub use schema::{ErrorRow, NewService, PollRow, Service, ServiceKind, Team};
