//! HTTP middleware: bearer-token authentication and rate limiting.

pub mod auth;
pub mod rate_limit;

pub use auth::RequireAuth;
pub use rate_limit::auth_rate_limiter;
