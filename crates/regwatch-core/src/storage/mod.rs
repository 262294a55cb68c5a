//! Storage module: SQLite persistence for snapshots and the change log

pub mod changes;
pub mod database;
pub mod migrations;
pub mod snapshots;

pub use changes::{ChangeLog, SqliteChangeLog};
pub use database::{Database, DatabaseConfig};
pub use snapshots::{SnapshotStore, SqliteSnapshotStore};
