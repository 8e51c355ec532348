//! HTTP handlers and route configuration.

mod auth;
mod health;

use actix_web::{error::JsonPayloadError, web};

use crate::middleware::error::AppError;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/auth")
                    .route("/signup", web::post().to(auth::signup))
                    .route("/signin", web::post().to(auth::signin))
                    .route("/signout", web::post().to(auth::signout)),
            )
            // Protected routes
            .route("/me", web::get().to(auth::me)),
    );
}

/// JSON extractor config: malformed bodies become RFC 7807 400s.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(16 * 1024)
        .error_handler(|err: JsonPayloadError, _req| {
            tracing::debug!(error = %err, "Rejected request body");
            AppError::BadRequest("Invalid request body".to_string()).into()
        })
}
