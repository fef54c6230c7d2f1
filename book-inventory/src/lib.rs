//! Persistence layer for the book inventory: schema, models, the connection
//! pool and session-scoped repository operations.

pub mod db;
pub mod error;
pub mod models;
pub mod repository;
pub mod schema;

pub use db::{run_migrations_blocking, Database, DbPool, Session, MIGRATIONS};
pub use error::{Result, StoreError};
pub use models::{Book, Inventory, InventoryMovement, NewBook, NewInventory, NewInventoryMovement};
pub use shared::{table_name, Entity, MovementType, Settings};
