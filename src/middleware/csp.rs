use crate::core::config::CspConfig;
use crate::core::policy::CspPolicy;
use crate::middleware::scope::RequestScope;
use actix_service::{Service, Transform};
use actix_web::{
    body::EitherBody,
    dev::{forward_ready, ServiceRequest, ServiceResponse},
    web::Data,
    Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use log::{debug, error, trace};
use std::{rc::Rc, sync::Arc};

/// Sets the `Content-Security-Policy` (or `-Report-Only`) header on every
/// response.
///
/// Each request gets a scope holding an optional fork of the default policy.
/// After the handler ran, the fork is rendered if the request made one, and
/// the untouched default otherwise. Errors from inner services are turned
/// into their error responses so those carry the header too.
#[derive(Clone)]
pub struct CspMiddleware {
    config: Arc<CspConfig>,
}

impl CspMiddleware {
    #[inline]
    pub fn new(config: CspConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    #[inline]
    pub fn config(&self) -> Arc<CspConfig> {
        self.config.clone()
    }
}

impl<S, B> Transform<S, ServiceRequest> for CspMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = CspMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(CspMiddlewareService {
            service: Rc::new(service),
            config: self.config.clone(),
        }))
    }
}

pub struct CspMiddlewareService<S> {
    service: Rc<S>,
    config: Arc<CspConfig>,
}

impl<S, B> Service<ServiceRequest> for CspMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let config = self.config.clone();

        let scope = Rc::new(RequestScope::new(config.clone()));
        req.extensions_mut().insert(scope.clone());
        let http_req = req.request().clone();

        Box::pin(async move {
            let mut res = match service.call(req).await {
                Ok(res) => res.map_into_left_body(),
                Err(err) => {
                    debug!("inner service failed, rendering its error response: {err}");
                    ServiceResponse::from_err(err, http_req).map_into_right_body()
                }
            };

            res.request().extensions_mut().remove::<Rc<RequestScope>>();
            let forked = scope.take_policy();
            let policy = forked.as_ref().unwrap_or(config.default_policy());

            match policy.apply(res.headers_mut()) {
                Ok(true) => trace!("applied CSP header {}", policy.header_name()),
                Ok(false) => trace!("CSP policy is empty, no header set"),
                Err(err) => error!("failed to set CSP header: {err}"),
            }

            Ok(res)
        })
    }
}

#[inline]
pub fn csp_middleware(policy: CspPolicy) -> CspMiddleware {
    CspMiddleware::new(CspConfig::new(policy))
}

/// Registers the config as app data so handlers can read the default policy.
pub fn configure_csp(policy: CspPolicy) -> impl FnOnce(&mut actix_web::web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(Data::new(CspConfig::new(policy)));
    }
}
