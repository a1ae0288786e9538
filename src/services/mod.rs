pub mod rate_limiter;
pub mod usage_store;
