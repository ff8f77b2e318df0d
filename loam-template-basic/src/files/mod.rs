//! File generators, one per output artifact.

mod api_ts;
mod client_ts;
mod hook_ts;
mod index_ts;
mod schema_sql;
mod validation_json;

pub use api_ts::ApiTs;
pub use client_ts::ClientTs;
pub use hook_ts::{HOOK_HEADER, HookTs};
pub use index_ts::IndexTs;
pub use schema_sql::SchemaSql;
pub use validation_json::ValidationJson;

/// First line of every regenerated file.
pub const GENERATED_HEADER: &str = "Generated by loam. Do not edit.";
