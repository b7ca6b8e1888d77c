//! Resolves a user-supplied key (numeric ID or human key like `PROJ-123`)
//! to the concrete Xray internal ID a GraphQL query expects.
//!
//! # Overview
//!
//! Numeric keys are returned unchanged — Xray internal IDs are already
//! numeric, so there is nothing to resolve and no upstream call is made.
//! Non-numeric keys are looked up via a JQL-filtered query against each
//! candidate [`ResourceKind`] in turn: the caller's hint first (if any),
//! then the fixed order `Test → TestSet → TestExecution → TestPlan →
//! CoverableIssue`. The first kind that resolves wins and the mapping is
//! cached for the remaining process lifetime — entries are never evicted,
//! since a human key's target resource does not change identity.

use std::collections::HashMap;
use std::sync::RwLock;

use tracing::debug;

use crate::error::{AppError, Result};
use crate::graphql::GraphQLClient;

/// The kinds of Xray resource a key may refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Test,
    TestSet,
    TestExecution,
    TestPlan,
    CoverableIssue,
}

impl ResourceKind {
    /// Fixed probing order used when the caller gives no hint.
    const ALL: [ResourceKind; 5] = [
        ResourceKind::Test,
        ResourceKind::TestSet,
        ResourceKind::TestExecution,
        ResourceKind::TestPlan,
        ResourceKind::CoverableIssue,
    ];

    /// The GraphQL query field used to probe for a resource of this kind.
    fn query_field(self) -> &'static str {
        match self {
            ResourceKind::Test => "getTests",
            ResourceKind::TestSet => "getTestSets",
            ResourceKind::TestExecution => "getTestExecutions",
            ResourceKind::TestPlan => "getTestPlans",
            ResourceKind::CoverableIssue => "getCoverableIssues",
        }
    }
}

/// The resolved Xray internal ID for a resource.
pub type ResolvedId = String;

type CacheKey = (String, Option<ResourceKind>);

/// Resolves human-readable keys to Xray internal IDs, caching every
/// resolution for the life of the process.
pub struct IdResolver {
    graphql: GraphQLClient,
    cache: RwLock<HashMap<CacheKey, ResolvedId>>,
}

impl IdResolver {
    pub fn new(graphql: GraphQLClient) -> Self {
        Self {
            graphql,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Resolves `key` to an Xray internal ID.
    ///
    /// Numeric keys pass through untouched with zero upstream calls.
    /// Otherwise `key` must match the project-scoped resource-key format
    /// (`^[A-Z][A-Z0-9_]*-\d+$`) — this is the only validation standing
    /// between `key` and interpolation into the upstream lookup JQL, so it
    /// is enforced before any cache lookup or upstream call. Valid keys
    /// consult the cache under `(key, hint)` and `(key, *)` before probing
    /// `hint` first, then each [`ResourceKind`] in a fixed order, returning
    /// the first hit and caching it under both keys.
    pub async fn resolve(&self, key: &str, hint: Option<ResourceKind>) -> Result<ResolvedId> {
        if is_numeric(key) {
            return Ok(key.to_string());
        }

        if !is_project_scoped_key(key) {
            return Err(AppError::Validation(format!(
                "key `{key}` is neither numeric nor a valid PROJECT-123 style resource key"
            )));
        }

        if let Some(cached) = self.cache_lookup(key, hint) {
            return Ok(cached);
        }

        let candidates: Vec<ResourceKind> = match hint {
            Some(kind) => {
                std::iter::once(kind)
                    .chain(ResourceKind::ALL.into_iter().filter(|k| *k != kind))
                    .collect()
            }
            None => ResourceKind::ALL.to_vec(),
        };

        for kind in candidates {
            if let Some(resolved) = self.probe(key, kind).await? {
                let mut cache = self.cache.write().unwrap();
                cache.insert((key.to_string(), hint), resolved.clone());
                cache.insert((key.to_string(), Some(kind)), resolved.clone());
                drop(cache);
                return Ok(resolved);
            }
        }

        Err(AppError::Resolution {
            key: key.to_string(),
        })
    }

    fn cache_lookup(&self, key: &str, hint: Option<ResourceKind>) -> Option<ResolvedId> {
        let cache = self.cache.read().unwrap();
        cache
            .get(&(key.to_string(), hint))
            .or_else(|| cache.get(&(key.to_string(), None)))
            .cloned()
    }

    async fn probe(&self, key: &str, kind: ResourceKind) -> Result<Option<ResolvedId>> {
        debug!(key, ?kind, "probing resource kind for key");

        // `resolve` already rejected anything but a numeric id or a
        // project-scoped key before this point; `key` is safe to
        // interpolate into the lookup JQL verbatim.
        let variables = serde_json::json!({ "jql": format!("key = \"{key}\""), "limit": 1 });
        let query = format!(
            "query($jql: String!, $limit: Int!) {{ {field}(jql: $jql, limit: $limit) {{ results {{ issueId }} }} }}",
            field = kind.query_field()
        );

        let data = self.graphql.execute(&query, variables).await?;

        let id = data
            .get(kind.query_field())
            .and_then(|v| v.get("results"))
            .and_then(|v| v.as_array())
            .and_then(|results| results.first())
            .and_then(|first| first.get("issueId"))
            .and_then(|id| id.as_str())
            .map(|s| s.to_string());

        Ok(id)
    }
}

fn is_numeric(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit())
}

/// Matches `^[A-Z][A-Z0-9_]*-\d+$` (spec.md §3's `ResourceKey` project-scoped
/// form), byte by byte — the gate `resolve` enforces before `key` is ever
/// interpolated into a lookup JQL string.
fn is_project_scoped_key(key: &str) -> bool {
    let Some(dash) = key.find('-') else {
        return false;
    };
    let (prefix, rest) = key.split_at(dash);
    let suffix = &rest[1..];

    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }

    let mut prefix_bytes = prefix.bytes();
    match prefix_bytes.next() {
        Some(b) if b.is_ascii_uppercase() => {}
        _ => return false,
    }
    prefix_bytes.all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_')
}
