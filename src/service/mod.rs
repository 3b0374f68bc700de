pub mod bootstrap;
pub mod config;
pub mod permissions;
pub mod users;
