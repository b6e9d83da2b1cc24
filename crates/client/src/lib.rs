//! Clementine storefront client library.
//!
//! Everything a storefront front end needs to talk to the remote
//! commerce API while keeping local state consistent with server
//! truth:
//!
//! - [`storage`] - durable local mirror of {token, user, session id}
//! - [`session`] - anonymous session identity, generated once per device
//! - [`stores`] - the auth and cart state stores (the synchronization core)
//! - [`catalog`] / [`orders`] - read-mostly query layers plus admin
//!   pass-through mutations
//! - [`notify`] - transient user-visible outcome messages
//! - [`app`] - constructor-injected assembly of the above
//!
//! # Design
//!
//! The server is the source of truth for every cart and order figure;
//! the stores here replace their whole state with each server response
//! rather than patching it optimistically. Local persistence exists
//! only so a restart resumes with the same identity and session.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod app;
pub mod catalog;
pub mod config;
pub mod error;
pub mod notify;
pub mod orders;
pub mod session;
pub mod storage;
pub mod stores;

pub use app::App;
pub use config::ClientConfig;
pub use error::ApiError;
