//! `execute_jql_query` — run an arbitrary JQL search against Tests.
//!
//! `jql` passes through [`crate::jql::validate`] before it ever reaches
//! the upstream (Scenario C covers rejection); `limit` is clamped to
//! `[1, 100]` per §6's concurrency-limit note.

use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;
use crate::facade::clamp_limit;
use crate::jql;

use super::ToolContext;

const QUERY: &str = "query($jql: String!, $limit: Int!) { getTests(jql: $jql, limit: $limit) { total results { issueId jira } } }";

#[derive(Deserialize)]
pub struct ExecuteJqlQueryArgs {
    pub jql: String,
    pub limit: Option<u32>,
}

/// Validates `args.jql`, clamps `args.limit`, and dispatches the search.
pub async fn execute_jql_query(ctx: &ToolContext, args: ExecuteJqlQueryArgs) -> Result<Value> {
    let normalized = jql::validate(&args.jql)?;
    let limit = clamp_limit(args.limit);

    let data = ctx
        .graphql
        .execute(
            QUERY,
            serde_json::json!({ "jql": normalized, "limit": limit }),
        )
        .await?;

    Ok(data.get("getTests").cloned().unwrap_or(Value::Null))
}
