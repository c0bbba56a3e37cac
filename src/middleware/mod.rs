pub mod rate_limit;

pub use rate_limit::{client_ip, enforce_rate_limit, RateLimitPolicy, RateLimiter, RouteLimit};
