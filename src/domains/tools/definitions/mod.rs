//! Tool definitions module.
//!
//! This module exports all available tool definitions.
//! Each tool is defined in its own file for better maintainability.

pub mod account;
pub mod companies;

pub use account::{GetUsageLimitsParams, GetUsageLimitsTool};
pub use companies::{
    BulkEnrichParams, BulkEnrichTool, GetCompanyByIdParams, GetCompanyByIdTool,
    GetDeltaUpdatesParams, GetDeltaUpdatesTool, SearchCompaniesParams, SearchCompaniesTool,
};
