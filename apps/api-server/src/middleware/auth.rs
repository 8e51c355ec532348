//! Access gate - bearer token extraction and verification.

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use std::future::{Ready, ready};

use sigil_core::DomainError;
use sigil_core::ports::AuthError;

use crate::middleware::error::AppError;
use crate::state::AppState;

/// Verified caller identity.
///
/// Taking `Identity` as a handler parameter is what makes a route protected:
/// the handler body only runs once the bearer token has been verified.
/// ```ignore
/// async fn protected_route(identity: Identity) -> impl Responder {
///     format!("Hello, {}!", identity.subject)
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Account identifier asserted by the token.
    pub subject: String,
}

impl FromRequest for Identity {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<Identity, AppError> {
    let state = req.app_data::<web::Data<AppState>>().ok_or_else(|| {
        tracing::error!("AppState not found in app data");
        AppError::Internal("server configuration error".to_string())
    })?;

    let token = bearer_token(req).map_err(reject)?;
    let claims = state.tokens.validate_token(token).map_err(reject)?;

    Ok(Identity {
        subject: claims.subject,
    })
}

/// Pull `<token>` out of `Authorization: Bearer <token>`.
fn bearer_token(req: &HttpRequest) -> Result<&str, AuthError> {
    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuth)?
        .to_str()
        .map_err(|_| AuthError::InvalidToken("non-ASCII authorization header".to_string()))?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AuthError::InvalidToken("expected Bearer token".to_string()))
}

/// Missing, invalid and expired tokens all look the same to the caller.
fn reject(reason: AuthError) -> AppError {
    tracing::debug!(reason = %reason, "Access gate rejected request");
    DomainError::Unauthenticated.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_bearer_token_extraction() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer abc.def.ghi"))
            .to_http_request();
        assert_eq!(bearer_token(&req).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_missing_header() {
        let req = TestRequest::default().to_http_request();
        assert!(matches!(bearer_token(&req), Err(AuthError::MissingAuth)));
    }

    #[test]
    fn test_wrong_scheme_or_empty_token() {
        for value in ["Basic dXNlcjpwYXNz", "Bearer ", "Bearer    ", "abc.def.ghi"] {
            let req = TestRequest::default()
                .insert_header((header::AUTHORIZATION, value))
                .to_http_request();
            assert!(
                matches!(bearer_token(&req), Err(AuthError::InvalidToken(_))),
                "{value:?} was accepted"
            );
        }
    }
}
