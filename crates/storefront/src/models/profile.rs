//! Customer profile domain type.

use chrono::{DateTime, Utc};
use clothstore_core::{Email, UserId};

/// A customer profile row, keyed by the auth provider's user id.
///
/// The storefront reads profiles only to address order confirmations and
/// greet the signed-in customer; account management itself lives with the
/// auth provider.
#[derive(Debug, Clone)]
pub struct Profile {
    /// Auth provider user id.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Notification recipient address.
    pub email: Email,
    /// When the profile was created.
    pub created_at: DateTime<Utc>,
}
