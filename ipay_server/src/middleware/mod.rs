mod acl;
mod jwt;
mod rate_limit;

pub use acl::{AclMiddlewareFactory, AclMiddlewareService};
pub use jwt::{JwtMiddlewareFactory, JwtMiddlewareService};
pub use rate_limit::{RateLimiter, RateLimitMiddlewareFactory, RateLimitMiddlewareService};
