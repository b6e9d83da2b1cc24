//! Client-side state stores.
//!
//! The auth store owns the user/token pair; the cart store owns the
//! current cart. Each reconciles with the server on every mutation
//! and mirrors what must survive a restart into the local store.

pub mod auth;
pub mod cart;

pub use auth::{AuthState, AuthStore};
pub use cart::CartStore;
