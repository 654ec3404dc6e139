//! Account tools: information about the caller's upstream subscription.

pub mod usage_limits;

pub use usage_limits::{GetUsageLimitsParams, GetUsageLimitsTool};
