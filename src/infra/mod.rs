//! Infrastructure adapters and runtime bootstrap.

pub mod directory;
pub mod error;
pub mod http;
pub mod spa_entry;
pub mod telemetry;
