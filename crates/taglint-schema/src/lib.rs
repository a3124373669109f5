//! Declarative role schema and the child-sequence pattern matcher.

mod pattern;
mod schema;

pub use pattern::{Pattern, PatternError};
pub use schema::{RuleSpec, Schema, SchemaBuilder, SchemaError, SchemaRule};
