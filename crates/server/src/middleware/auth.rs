//! Authentication extractors.
//!
//! The signed-in principal is opaque to this service: it is read from the
//! session as a [`CurrentUser`]. Extractors run before the handler body, so an
//! unauthenticated request is rejected before any profile is looked up.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::error::{AppError, set_sentry_user};
use crate::models::{CurrentUser, session_keys};

/// Extractor that requires a signed-in user.
///
/// Rejects with `401 Unauthorized` if the session carries no current user, and
/// with `500` if the session store cannot be read.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(user): RequireAuth) -> String {
///     format!("Hello, user {}!", user.id)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(session) = parts.extensions.get::<Session>() else {
            return Err(AppError::Unauthorized("Sign in required".to_string()));
        };

        let user = require_user(current_user(session).await)?;
        set_sentry_user(&user.id);
        Ok(Self(user))
    }
}

fn require_user(
    read: Result<Option<CurrentUser>, tower_sessions::session::Error>,
) -> Result<CurrentUser, AppError> {
    read?.ok_or_else(|| AppError::Unauthorized("Sign in required".to_string()))
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this does not reject the request if nobody is signed in.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => current_user(session).await.unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to read current user from session");
                None
            }),
            None => None,
        };

        if let Some(user) = &user {
            set_sentry_user(&user.id);
        }

        Ok(Self(user))
    }
}

/// Read the current user from the session.
///
/// # Errors
///
/// Returns an error if the session cannot be read.
pub async fn current_user(
    session: &Session,
) -> Result<Option<CurrentUser>, tower_sessions::session::Error> {
    session.get(session_keys::CURRENT_USER).await
}

/// Helper to set the current user in the session (sign-in).
///
/// The wishlist merge runs on the next request that passes through the
/// merge middleware.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Helper to clear the current user from the session (sign-out).
///
/// Also drops the merge marker, returning the session to the anonymous state.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    session
        .remove::<harvest_market_core::UserId>(session_keys::WISHLIST_MERGED_FOR)
        .await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;
    use harvest_market_core::UserId;
    use tower_sessions::session::Error as SessionError;
    use tower_sessions::session_store::Error as StoreError;

    use super::*;

    #[test]
    fn test_session_backend_failure_is_server_error() {
        let read = Err(SessionError::Store(StoreError::Backend(
            "connection refused".to_owned(),
        )));
        let err = require_user(read).unwrap_err();
        assert!(matches!(err, AppError::Session(_)));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_missing_user_is_unauthorized() {
        let err = require_user(Ok(None)).unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_signed_in_user_passes() {
        let user = CurrentUser { id: UserId::new(7) };
        assert_eq!(require_user(Ok(Some(user))).unwrap().id, UserId::new(7));
    }
}
