//! Bundled install script.
//!
//! Written against MySQL with the generic `tracklet_` table prefix; see
//! `Backend::script_replacements` for the per-backend rewrites.

pub const INSTALL_SQL: &str = include_str!("install.sql");
