//! Core types for ClothStore.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod identity;
pub mod price;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use identity::{GuestToken, GuestTokenError, Identity, OwnerKind};
pub use price::Price;
pub use status::{Category, CategoryError, OrderStatus, OrderStatusError};
