//! Company data tools.
//!
//! - `search`: Search companies with filters, paging and projection
//! - `get_by_id`: Fetch one company by id
//! - `bulk_enrich`: Enrich up to 1000 domains in one call
//! - `delta`: Changes to one company since a timestamp or cursor

pub mod bulk_enrich;
pub mod delta;
pub mod get_by_id;
pub mod search;

pub use bulk_enrich::{BulkEnrichParams, BulkEnrichTool};
pub use delta::{GetDeltaUpdatesParams, GetDeltaUpdatesTool};
pub use get_by_id::{GetCompanyByIdParams, GetCompanyByIdTool};
pub use search::{SearchCompaniesParams, SearchCompaniesTool};
