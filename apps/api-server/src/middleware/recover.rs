//! Panic recovery middleware.
//!
//! A panic while handling one request becomes a 500 for that request. The
//! worker, and every other request it is serving, keeps running.

use actix_web::{
    Error, HttpResponse,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    error::InternalError,
};
use futures::FutureExt;
use sigil_shared::ErrorResponse;
use std::any::Any;
use std::future::{Future, Ready, ready};
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;

/// Panic recovery middleware factory.
pub struct CatchPanic;

impl<S, B> Transform<S, ServiceRequest> for CatchPanic
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = CatchPanicService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(CatchPanicService { service }))
    }
}

pub struct CatchPanicService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for CatchPanicService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // Owned copies only: holding an `HttpRequest` clone here would block
        // the router from mutating the request's match info.
        let method = req.method().to_string();
        let path = req.path().to_string();

        let fut = match panic::catch_unwind(AssertUnwindSafe(|| self.service.call(req))) {
            Ok(fut) => fut,
            Err(payload) => {
                let error = panic_error(&method, &path, payload.as_ref());
                return Box::pin(async move { Err(error) });
            }
        };

        Box::pin(async move {
            match AssertUnwindSafe(fut).catch_unwind().await {
                Ok(result) => result,
                Err(payload) => Err(panic_error(&method, &path, payload.as_ref())),
            }
        })
    }
}

fn panic_error(method: &str, path: &str, payload: &(dyn Any + Send)) -> Error {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string());

    tracing::error!(
        panic = %message,
        method = %method,
        path = %path,
        "Request handler panicked"
    );

    let response = HttpResponse::InternalServerError().json(ErrorResponse::internal_error());
    InternalError::from_response("request handler panicked", response).into()
}
