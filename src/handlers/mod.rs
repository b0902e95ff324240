pub mod install;
pub mod repositories;
pub mod session;
