//! Fixed-window rate limiting, keyed on the caller's IP address.
//!
//! The [`RateLimiter`] holds the counters and is shared between workers, so it must be created once, outside the
//! `HttpServer::new` closure, and cloned into each app. Requests over the limit get a 429 and never reach the handler.
use std::{
    collections::HashMap,
    future::Future,
    net::IpAddr,
    pin::Pin,
    rc::Rc,
    sync::{Arc, Mutex},
    time::Instant,
};

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};
use futures::future::{ok, Ready};
use log::*;

use crate::{
    config::{RateLimitConfig, ServerOptions},
    errors::ServerError,
    helpers::get_remote_ip,
};

/// Windows are pruned once the table grows past this many callers.
const PRUNE_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    windows: Arc<Mutex<HashMap<Option<IpAddr>, Window>>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self { config, windows: Arc::new(Mutex::new(HashMap::new())) }
    }

    /// Records a request from `ip` and returns whether it is within the limit.
    pub fn check(&self, ip: Option<IpAddr>) -> bool {
        self.check_at(ip, Instant::now())
    }

    fn check_at(&self, ip: Option<IpAddr>, now: Instant) -> bool {
        let mut windows = match self.windows.lock() {
            Ok(w) => w,
            Err(poisoned) => poisoned.into_inner(),
        };
        if windows.len() > PRUNE_THRESHOLD {
            let period = self.config.window;
            windows.retain(|_, w| now.duration_since(w.started) < period);
        }
        let window = windows.entry(ip).or_insert(Window { started: now, count: 0 });
        if now.duration_since(window.started) >= self.config.window {
            *window = Window { started: now, count: 0 };
        }
        if window.count >= self.config.max_requests {
            return false;
        }
        window.count += 1;
        true
    }
}

pub struct RateLimitMiddlewareFactory {
    limiter: RateLimiter,
    options: ServerOptions,
}

impl RateLimitMiddlewareFactory {
    pub fn new(limiter: RateLimiter, options: ServerOptions) -> Self {
        Self { limiter, options }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimitMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RateLimitMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(RateLimitMiddlewareService {
            limiter: self.limiter.clone(),
            options: self.options,
            service: Rc::new(service),
        })
    }
}

pub struct RateLimitMiddlewareService<S> {
    limiter: RateLimiter,
    options: ServerOptions,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let ip = get_remote_ip(req.request(), self.options.use_x_forwarded_for, self.options.use_forwarded);
        let allowed = self.limiter.check(ip);
        Box::pin(async move {
            if !allowed {
                info!("💻️ Rate limit exceeded on {} for {ip:?}", req.path());
                return Ok(req.error_response(ServerError::RateLimited).map_into_right_body());
            }
            service.call(req).await.map(ServiceResponse::map_into_left_body)
        })
    }
}
