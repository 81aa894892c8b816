//! Bearer token authentication middleware.
//!
//! Wraps a scope so that every request inside it carries validated [`JwtClaims`] in its request
//! extensions. Requests without a token, with an invalid or expired token, or from a suspended
//! account are rejected with 401 before any handler runs.

use std::{pin::Pin, rc::Rc};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error,
    HttpMessage,
};
use futures::{
    future::{ok, Ready},
    Future,
};
use log::trace;

use crate::{
    auth::validate_token,
    errors::{AuthError, ServerError},
};

pub struct JwtAuthMiddlewareFactory {
    jwt_secret: String,
}

impl JwtAuthMiddlewareFactory {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self { jwt_secret: jwt_secret.into() }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuthMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = JwtAuthMiddleware<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(JwtAuthMiddleware { jwt_secret: Rc::new(self.jwt_secret.clone()), service: Rc::new(service) })
    }
}

pub struct JwtAuthMiddleware<S> {
    jwt_secret: Rc<String>,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let secret = Rc::clone(&self.jwt_secret);
        Box::pin(async move {
            let token = bearer_token(&req).ok_or(ServerError::AuthenticationError(AuthError::MissingToken))?;
            let claims = validate_token(&token, &secret).map_err(ServerError::AuthenticationError)?;
            trace!("🔑️ Authenticated {} ({})", claims.sub, claims.role);
            req.extensions_mut().insert(claims);
            service.call(req).await
        })
    }
}

fn bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
}
