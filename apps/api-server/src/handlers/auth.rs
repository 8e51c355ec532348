//! Authentication handlers.

use actix_web::{HttpResponse, web};

use sigil_shared::dto::{CredentialsRequest, MeResponse, SigninResponse};

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/auth/signup
pub async fn signup(
    state: web::Data<AppState>,
    body: web::Json<CredentialsRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    state.auth.signup(&req.email, &req.password).await?;

    Ok(HttpResponse::Created().finish())
}

/// POST /api/auth/signin
pub async fn signin(
    state: web::Data<AppState>,
    body: web::Json<CredentialsRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let signed_in = state.auth.signin(&req.email, &req.password).await?;

    Ok(HttpResponse::Ok().json(SigninResponse {
        token: signed_in.token,
        email: signed_in.identifier,
    }))
}

/// POST /api/auth/signout
pub async fn signout(state: web::Data<AppState>) -> HttpResponse {
    state.auth.signout();
    HttpResponse::Ok().finish()
}

/// GET /api/me - Protected route
pub async fn me(state: web::Data<AppState>, identity: Identity) -> HttpResponse {
    let me = state.auth.introspect(&identity.subject);

    HttpResponse::Ok().json(MeResponse {
        email: me.identifier,
    })
}
