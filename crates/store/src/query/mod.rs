//! Client-driven query construction.
//!
//! Untrusted query-string input flows through three stages:
//!
//! 1. [`params::ParsedQuery::from_raw`] decodes and validates the raw
//!    string map into typed primitives.
//! 2. [`filter::FilterExpr`] is the tagged filter-expression tree.
//! 3. [`plan::QueryPlan::build`] composes a deferred, bounded plan for a
//!    collection; backends execute it.

pub mod filter;
pub mod params;
pub mod plan;

pub use filter::{CompareOp, FilterExpr};
pub use params::{parse_select, ParsedQuery};
pub use plan::{Projection, QueryPlan, SortOrder, SortSpec, DEFAULT_TASK_LIMIT};
