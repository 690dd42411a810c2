//! Session-related types.
//!
//! Types stored in the session for identity state. The auth provider writes
//! [`CurrentUser`] on sign-in; the storefront only reads it.

use serde::{Deserialize, Serialize};

use clothstore_core::{Email, UserId};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's account ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
}

/// Session keys for identity data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the anonymous cart token, minted once per browser session.
    pub const GUEST_TOKEN: &str = "guest_token";
}
