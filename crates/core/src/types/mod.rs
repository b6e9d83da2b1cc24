//! Core types for Clementine.
//!
//! This module provides type-safe wrappers for common domain concepts
//! plus the wire records exchanged with the storefront API.

pub mod cart;
pub mod email;
pub mod envelope;
pub mod id;
pub mod order;
pub mod product;
pub mod status;
pub mod user;

pub use cart::{Cart, CartItem};
pub use email::{Email, EmailError};
pub use envelope::ApiResponse;
pub use id::*;
pub use order::{Address, NewOrder, Order, OrderPage};
pub use product::{NewProduct, Product, ProductPage, ProductUpdate};
pub use status::*;
pub use user::{AuthPayload, LoginRequest, ProfileUpdate, RegisterRequest, User};
