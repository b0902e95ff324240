pub mod auth;
pub mod install_guard;
