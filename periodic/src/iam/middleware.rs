// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::basic::{authorize, challenge_response};
use crate::config::AuthConfig;
use actix_web::{
    Error,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::Method,
};
use futures_util::future::LocalBoxFuture;
use log::warn;
use std::future::{Ready, ready};
use std::sync::Arc;

/// Challenges every non-GET request that does not carry the configured Basic credentials.
pub struct BasicAuthMiddleware {
    auth: Arc<AuthConfig>,
}

impl BasicAuthMiddleware {
    pub fn new(auth: Arc<AuthConfig>) -> Self {
        Self { auth }
    }
}

impl<S, B> Transform<S, ServiceRequest> for BasicAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = BasicAuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(BasicAuthMiddlewareService {
            service,
            auth: self.auth.clone(),
        }))
    }
}

pub struct BasicAuthMiddlewareService<S> {
    service: S,
    auth: Arc<AuthConfig>,
}

impl<S, B> Service<ServiceRequest> for BasicAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if req.method() != Method::GET
            && let Err(error) = authorize(req.headers(), &self.auth)
        {
            warn!(
                "Rejected {} {}: {:?} credentials",
                req.method(),
                req.path(),
                error
            );
            let (req, _) = req.into_parts();
            let response = challenge_response(error, &self.auth.realm).map_into_right_body();
            return Box::pin(async move { Ok(ServiceResponse::new(req, response)) });
        }

        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
    }
}
