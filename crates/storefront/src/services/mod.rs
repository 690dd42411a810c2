//! Business services for the storefront.
//!
//! Services wrap the repositories with validation, event publication, and the
//! outbound notification boundary. Route handlers talk to services, not to
//! repositories directly.

pub mod cart;
pub mod checkout;
pub mod events;
pub mod notify;

pub use cart::{CartError, CartService};
pub use checkout::{CheckoutError, CheckoutService};
pub use events::{CartEvent, CartEvents};
pub use notify::{Notifier, OrderConfirmation};
