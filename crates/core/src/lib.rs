//! Clementine Core - Shared types library.
//!
//! This crate provides the wire and domain types used across all
//! Clementine components:
//! - `client` - Storefront client library (state stores, API access)
//! - `cli` - Command-line front end driving the client
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no
//! persistence. Everything here mirrors the remote storefront API's
//! JSON shapes exactly (camelCase field names, `_id` primary keys),
//! so a value deserialized from the server round-trips untouched.
//!
//! # Modules
//!
//! - [`types`] - IDs, emails, statuses, catalog/cart/order records,
//!   and the `{success, message, data, error}` response envelope

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
