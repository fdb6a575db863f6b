//! Rate limiting middleware.

use std::future::{Ready, ready};
use std::rc::Rc;
use std::sync::Arc;

use actix_web::{
    Error,
    body::{EitherBody, MessageBody},
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures::future::LocalBoxFuture;

use folio_core::ports::RateLimiter;

use crate::middleware::error::AppError;

/// Rate limiting middleware factory.
///
/// Only paths under `scope` are counted; with no limiter every request passes.
pub struct RateLimitMiddleware {
    limiter: Option<Arc<dyn RateLimiter>>,
    scope: &'static str,
}

impl RateLimitMiddleware {
    pub fn new(limiter: Option<Arc<dyn RateLimiter>>, scope: &'static str) -> Self {
        Self { limiter, scope }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimitMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RateLimitMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddlewareService {
            service: Rc::new(service),
            limiter: self.limiter.clone(),
            scope: self.scope,
        }))
    }
}

pub struct RateLimitMiddlewareService<S> {
    service: Rc<S>,
    limiter: Option<Arc<dyn RateLimiter>>,
    scope: &'static str,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let limiter = self
            .limiter
            .clone()
            .filter(|_| req.path().starts_with(self.scope));

        Box::pin(async move {
            if let Some(limiter) = limiter {
                let key = req
                    .connection_info()
                    .realip_remote_addr()
                    .unwrap_or("unknown")
                    .to_string();

                match limiter.check(&key).await {
                    Ok(result) if !result.allowed => {
                        let retry_after = result.reset_after.as_secs().max(1);
                        tracing::warn!(client = %key, retry_after, "Rate limit exceeded");

                        let (http_req, _payload) = req.into_parts();
                        let error = AppError::TooManyRequests(retry_after);
                        let response = ServiceResponse::from_err(error, http_req);
                        return Ok(response.map_into_right_body());
                    }
                    Ok(_) => {}
                    // Fail open: a broken limiter must not take the API down.
                    Err(e) => tracing::error!(error = %e, "Rate limiter error, failing open"),
                }
            }

            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use actix_web::{App, HttpResponse, http::StatusCode, test, web};
    use async_trait::async_trait;
    use folio_core::ports::{RateLimitError, RateLimitResult};

    use super::*;

    /// Admits the first `budget` requests and refuses the rest.
    struct CountingLimiter {
        budget: std::sync::atomic::AtomicU32,
    }

    #[async_trait]
    impl RateLimiter for CountingLimiter {
        async fn check(&self, _key: &str) -> Result<RateLimitResult, RateLimitError> {
            use std::sync::atomic::Ordering;
            let left = self.budget.load(Ordering::SeqCst);
            if left == 0 {
                return Ok(RateLimitResult {
                    allowed: false,
                    reset_after: Duration::from_secs(30),
                });
            }
            self.budget.store(left - 1, Ordering::SeqCst);
            Ok(RateLimitResult {
                allowed: true,
                reset_after: Duration::ZERO,
            })
        }
    }

    async fn ok() -> HttpResponse {
        HttpResponse::Ok().finish()
    }

    #[actix_web::test]
    async fn test_rejects_once_budget_is_spent() {
        let limiter: Arc<dyn RateLimiter> = Arc::new(CountingLimiter {
            budget: 1.into(),
        });
        let app = test::init_service(
            App::new()
                .wrap(RateLimitMiddleware::new(Some(limiter), "/api"))
                .route("/api/ping", web::get().to(ok))
                .route("/", web::get().to(ok)),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/ping").to_request();
        let first = test::call_service(&app, req).await;
        assert_eq!(first.status(), StatusCode::OK);

        let req = test::TestRequest::get().uri("/api/ping").to_request();
        let second = test::call_service(&app, req).await;
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(second.headers().get("retry-after").unwrap(), "30");

        let req = test::TestRequest::get().uri("/").to_request();
        let outside = test::call_service(&app, req).await;
        assert_eq!(outside.status(), StatusCode::OK);
    }
}
