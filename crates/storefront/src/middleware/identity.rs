//! Identity resolution extractors.
//!
//! [`CurrentIdentity`] resolves the actor for every request: the signed-in
//! user if the auth provider put one in the session, otherwise an anonymous
//! guest token minted once per browser session and persisted there. The
//! extractor itself never fails on identity grounds — only on session-store
//! I/O.
//!
//! [`RequireUser`] gates pages that need a signed-in account (checkout,
//! order history) and redirects guests to the login page.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use clothstore_core::{GuestToken, Identity};

use crate::models::{CurrentUser, session_keys};

/// Extractor that resolves the request's cart identity.
///
/// Always succeeds for well-configured apps; allocating and persisting a
/// fresh guest token happens at most once per browser session.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(CurrentIdentity(identity): CurrentIdentity) -> impl IntoResponse {
///     format!("cart owner: {identity}")
/// }
/// ```
pub struct CurrentIdentity(pub Identity);

/// Error resolving the identity: the session layer is missing or its store
/// failed.
pub enum IdentityRejection {
    /// No `SessionManagerLayer` ran for this request.
    MissingSessionLayer,
    /// The session store failed to read or write.
    Session(tower_sessions::session::Error),
}

impl IntoResponse for IdentityRejection {
    fn into_response(self) -> Response {
        match self {
            Self::MissingSessionLayer => {
                tracing::error!("session layer missing; cannot resolve identity");
            }
            Self::Session(e) => {
                tracing::error!(error = %e, "session store failure while resolving identity");
            }
        }
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
    }
}

impl<S> FromRequestParts<S> for CurrentIdentity
where
    S: Send + Sync,
{
    type Rejection = IdentityRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(IdentityRejection::MissingSessionLayer)?
            .clone();

        // A signed-in account takes precedence over any guest token.
        let user: Option<CurrentUser> = session
            .get(session_keys::CURRENT_USER)
            .await
            .map_err(IdentityRejection::Session)?;
        if let Some(user) = user {
            return Ok(Self(Identity::Authenticated(user.id)));
        }

        let token: Option<GuestToken> = session
            .get(session_keys::GUEST_TOKEN)
            .await
            .map_err(IdentityRejection::Session)?;

        let token = match token {
            Some(token) => token,
            None => {
                let token = GuestToken::generate();
                session
                    .insert(session_keys::GUEST_TOKEN, &token)
                    .await
                    .map_err(IdentityRejection::Session)?;
                tracing::debug!(token = %token, "minted guest token");
                token
            }
        };

        Ok(Self(Identity::Anonymous(token)))
    }
}

/// Extractor that requires a signed-in account.
///
/// Guests are redirected to the login page, matching the checkout and order
/// history preconditions.
pub struct RequireUser(pub CurrentUser);

/// Error returned when a signed-in account is required but absent.
pub enum UserRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Session infrastructure failure.
    Identity(IdentityRejection),
}

impl IntoResponse for UserRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::Identity(rejection) => rejection.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = UserRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(UserRejection::Identity(
                IdentityRejection::MissingSessionLayer,
            ))?
            .clone();

        let user: Option<CurrentUser> = session
            .get(session_keys::CURRENT_USER)
            .await
            .map_err(|e| UserRejection::Identity(IdentityRejection::Session(e)))?;

        user.map(Self).ok_or(UserRejection::RedirectToLogin)
    }
}
