//! The four representative tools that exercise [`crate::facade`] end to
//! end. Every other tool the upstream exposes is a mechanical repetition
//! of one of these four shapes and is out of scope here.

pub mod add_tests_to_execution;
pub mod execute_jql_query;
pub mod get_test;

use std::sync::Arc;

use crate::graphql::GraphQLClient;
use crate::resolve::IdResolver;

/// The shared dependencies every tool handler is built from. Cheap to
/// clone: `GraphQLClient` wraps an `Arc`-backed `reqwest::Client` (and
/// its own `Arc<AuthManager>`), and `IdResolver` is held behind `Arc`
/// since its cache must be shared, not duplicated, across calls.
#[derive(Clone)]
pub struct ToolContext {
    pub graphql: GraphQLClient,
    pub resolver: Arc<IdResolver>,
}
