//! Cart ownership identity.
//!
//! Every cart line belongs to exactly one [`Identity`]: an anonymous browser
//! session identified by a [`GuestToken`], or an authenticated account
//! identified by a [`UserId`]. The identity is stored as a (kind, key) pair
//! rather than two nullable columns, so storage-level uniqueness constraints
//! can be scoped to whichever variant is active.

use core::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::id::UserId;

/// Errors that can occur when parsing a [`GuestToken`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum GuestTokenError {
    /// The input string is empty.
    #[error("guest token cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("guest token must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains whitespace or control characters.
    #[error("guest token must not contain whitespace")]
    Whitespace,
}

/// An opaque anonymous-session token.
///
/// Allocated once per browser session and persisted in the session store; it
/// never rotates while valid and is never shared across browsers. Freshly
/// generated tokens are UUIDs, but any previously issued opaque string is
/// accepted on parse so long-lived sessions keep their carts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct GuestToken(String);

impl GuestToken {
    /// Maximum length of a guest token.
    pub const MAX_LENGTH: usize = 64;

    /// Allocate a fresh random token.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Parse a `GuestToken` from a stored string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, longer than
    /// [`Self::MAX_LENGTH`], or contains whitespace.
    pub fn parse(s: &str) -> Result<Self, GuestTokenError> {
        if s.is_empty() {
            return Err(GuestTokenError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(GuestTokenError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if s.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(GuestTokenError::Whitespace);
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GuestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which variant of [`Identity`] owns a row.
///
/// Stored in the `owner_kind` column; the matching key goes in `owner_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerKind {
    /// Anonymous browser session, keyed by guest token.
    Guest,
    /// Authenticated account, keyed by user id.
    User,
}

impl OwnerKind {
    /// Returns the storage representation of this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Guest => "guest",
            Self::User => "user",
        }
    }
}

impl fmt::Display for OwnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for OwnerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "guest" => Ok(Self::Guest),
            "user" => Ok(Self::User),
            other => Err(format!("unknown owner kind: {other}")),
        }
    }
}

/// The actor a cart belongs to.
///
/// Exactly one variant is active per request. Once a guest signs in, the
/// active identity becomes [`Identity::Authenticated`]; lines added under the
/// guest token stay keyed to that token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "key", rename_all = "snake_case")]
pub enum Identity {
    /// Anonymous browser session.
    Anonymous(GuestToken),
    /// Signed-in account.
    Authenticated(UserId),
}

impl Identity {
    /// The storage kind discriminant for this identity.
    #[must_use]
    pub const fn owner_kind(&self) -> OwnerKind {
        match self {
            Self::Anonymous(_) => OwnerKind::Guest,
            Self::Authenticated(_) => OwnerKind::User,
        }
    }

    /// The storage key for this identity (token or user uuid).
    #[must_use]
    pub fn owner_key(&self) -> String {
        match self {
            Self::Anonymous(token) => token.as_str().to_owned(),
            Self::Authenticated(user_id) => user_id.to_string(),
        }
    }

    /// Returns the user id if this identity is authenticated.
    #[must_use]
    pub const fn as_user(&self) -> Option<UserId> {
        match self {
            Self::Anonymous(_) => None,
            Self::Authenticated(user_id) => Some(*user_id),
        }
    }

    /// Whether this identity belongs to a signed-in account.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.owner_kind(), self.owner_key())
    }
}
