pub mod auth;
pub mod rate_limit;
pub mod security_headers;
pub mod session_gate;

pub use auth::{admin_auth_middleware, AdminUser, Claims};
pub use rate_limit::{rate_limit_middleware, RateLimiter};
pub use security_headers::security_headers_middleware;
pub use session_gate::{evaluate, session_gate_middleware, GateDecision};
