use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    web, Error, FromRequest, HttpMessage, HttpRequest,
};
use futures::future::LocalBoxFuture;

use crate::{app_state::AppState, auth::Claims, errors::AppError};

pub const TOKEN_COOKIE: &str = "token";

/// Bearer header first, then the session cookie.
pub fn extract_token(req: &HttpRequest) -> Option<String> {
    let from_header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    from_header.or_else(|| {
        req.cookie(TOKEN_COOKIE)
            .map(|c| c.value().to_string())
            .filter(|t| !t.is_empty())
    })
}

/// Why a presented token was not accepted. Read by [`AuthenticatedUser`].
#[derive(Debug, Clone)]
struct TokenRejection(String);

/// Resolves the caller's token into [`Claims`] stored in request extensions.
///
/// The middleware never rejects a request. A token that is invalid, expired
/// or revoked leaves the request anonymous, so public routes and the auth
/// routes keep working with a stale cookie; routes that need an
/// [`AuthenticatedUser`] answer 401 with the rejection reason.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            if let Some(token) = extract_token(req.request()) {
                match req.app_data::<web::Data<AppState>>().cloned() {
                    Some(state) => match state.auth_service.authenticate(&token).await {
                        Ok(claims) => {
                            req.extensions_mut().insert(claims);
                        }
                        Err(AppError::Unauthorized(reason)) => {
                            log::debug!("Ignoring rejected token: {}", reason);
                            req.extensions_mut().insert(TokenRejection(reason));
                        }
                        Err(e) => log::error!("Token check failed: {}", e),
                    },
                    None => log::error!("App state not configured for auth middleware"),
                }
            }

            service.call(req).await
        })
    }
}

// Extractor for authenticated user in handlers
pub struct AuthenticatedUser(pub Claims);

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let extensions = req.extensions();
        let claims = match extensions.get::<Claims>() {
            Some(claims) => Ok(AuthenticatedUser(claims.clone())),
            None => Err(AppError::Unauthorized(
                extensions
                    .get::<TokenRejection>()
                    .map(|r| r.0.clone())
                    .unwrap_or_else(|| "Not authorized".to_string()),
            )),
        };

        ready(claims)
    }
}
