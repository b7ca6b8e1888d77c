//! `get_test` — fetch a single Test by resource key.
//!
//! Exercises [`crate::resolve::IdResolver`] with a [`ResourceKind::Test`]
//! hint, then dispatches the `getTest` query (Scenario A).

use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;
use crate::resolve::ResourceKind;

use super::ToolContext;

const QUERY: &str = "query($issueId: String!) { getTest(issueId: $issueId) { issueId testType { name } jira } }";

#[derive(Deserialize)]
pub struct GetTestArgs {
    pub issue_id: String,
}

/// Resolves `args.issue_id` to a numeric id and returns the `getTest`
/// subtree of the upstream response.
pub async fn get_test(ctx: &ToolContext, args: GetTestArgs) -> Result<Value> {
    let id = ctx
        .resolver
        .resolve(&args.issue_id, Some(ResourceKind::Test))
        .await?;

    let data = ctx
        .graphql
        .execute(QUERY, serde_json::json!({ "issueId": id }))
        .await?;

    Ok(data.get("getTest").cloned().unwrap_or(Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthManager;
    use crate::config::Config;
    use crate::graphql::GraphQLClient;
    use crate::resolve::IdResolver;
    use std::collections::HashMap;
    use std::sync::Arc;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn context_for(server: &MockServer) -> ToolContext {
        let source: HashMap<&str, &str> = HashMap::from([
            ("XRAY_CLIENT_ID", "id"),
            ("XRAY_CLIENT_SECRET", "secret"),
            ("XRAY_BASE_URL", &server.uri()),
        ]);
        let config = Config::from_env(&source).unwrap();
        Mock::given(method("POST"))
            .and(path("/api/v2/authenticate"))
            .respond_with(ResponseTemplate::new(200).set_body_json("header.payload.sig"))
            .mount(server)
            .await;
        let http = reqwest::Client::new();
        let auth = Arc::new(AuthManager::new(config.clone(), http.clone()));
        let graphql = GraphQLClient::new(http, &config.base_url, auth);
        ToolContext {
            resolver: Arc::new(IdResolver::new(graphql.clone())),
            graphql,
        }
    }

    #[tokio::test]
    async fn resolves_key_then_fetches_test() {
        let server = MockServer::start().await;
        let ctx = context_for(&server).await;

        Mock::given(method("POST"))
            .and(path("/api/v2/graphql"))
            .respond_with(move |req: &wiremock::Request| {
                let body: Value = req.body_json().unwrap();
                let query = body["query"].as_str().unwrap();
                if query.contains("getTests") {
                    ResponseTemplate::new(200).set_body_json(serde_json::json!({
                        "data": { "getTests": { "results": [{ "issueId": "1162822" }] } }
                    }))
                } else {
                    assert_eq!(body["variables"]["issueId"], "1162822");
                    ResponseTemplate::new(200).set_body_json(serde_json::json!({
                        "data": { "getTest": { "issueId": "1162822", "jira": { "key": "PROJ-123" } } }
                    }))
                }
            })
            .mount(&server)
            .await;

        let result = get_test(
            &ctx,
            GetTestArgs {
                issue_id: "PROJ-123".into(),
            },
        )
        .await
        .unwrap();

        assert_eq!(result["issueId"], "1162822");
    }

    #[tokio::test]
    async fn numeric_key_skips_resolution_entirely() {
        let server = MockServer::start().await;
        let ctx = context_for(&server).await;

        Mock::given(method("POST"))
            .and(path("/api/v2/graphql"))
            .respond_with(move |req: &wiremock::Request| {
                let body: Value = req.body_json().unwrap();
                assert_eq!(body["variables"]["issueId"], "1162822");
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "data": { "getTest": { "issueId": "1162822" } } }))
            })
            .mount(&server)
            .await;

        let result = get_test(
            &ctx,
            GetTestArgs {
                issue_id: "1162822".into(),
            },
        )
        .await
        .unwrap();

        assert_eq!(result["issueId"], "1162822");
    }
}
