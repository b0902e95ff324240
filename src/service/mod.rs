pub mod helpers;
pub mod locale;
pub mod password;
pub mod permissions;
pub mod repositories;
pub mod scm;
pub mod settings;
