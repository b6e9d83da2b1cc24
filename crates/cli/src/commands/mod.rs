//! CLI command implementations, one module per subcommand group.

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod orders;
