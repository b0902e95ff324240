//! Database module: backend selection, the named-connection registry and
//! row access for the tracker tables.
//!
//! Layout:
//! - `backend.rs`: backend enum and the connection parameters written to the artifact
//! - `registry.rs`: name → handle registry (`open` / `lookup` / `is_open`)
//! - `schema.rs`: bundled install script
//! - `models.rs`: Rust structs mirroring DB rows
//! - `storage.rs`: queries used by the app once installed

pub mod backend;
pub mod models;
pub mod registry;
pub mod schema;
pub mod storage;

pub use backend::{Backend, BackendConfig, ConnectionConfig, Driver, OpenMode, ServerConfig};
pub use registry::{AnyPool, ConnectionRegistry, NamedConnection};
pub use schema::INSTALL_SQL;
pub use storage::Storage;
