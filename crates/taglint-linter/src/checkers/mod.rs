//! Built-in checkers.

mod empty_nodes;
mod page_grouping;
mod role_map;
mod schema_validation;

pub use empty_nodes::EmptyNodeChecker;
pub use page_grouping::PageGroupingChecker;
pub use role_map::RoleMapChecker;
pub use schema_validation::SchemaValidationChecker;

use crate::traits::CheckerId;

pub const SCHEMA_VALIDATION: CheckerId = "schema_validation";
pub const EMPTY_NODES: CheckerId = "empty_nodes";
pub const PAGE_GROUPING: CheckerId = "page_grouping";
pub const ROLE_MAP: CheckerId = "role_map";
