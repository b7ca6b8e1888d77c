//! The MCP `ServerHandler` — a thin adapter from `rmcp`'s stdio
//! transport onto [`crate::facade`] and [`crate::tools`]. Carries no
//! business logic of its own: `call_tool` dispatches by name to the
//! matching tool function and embeds a failed [`crate::error::AppError`]
//! as non-fatal tool content rather than a protocol-level RPC error, so
//! a calling agent always gets back a well-formed, inspectable result.

use rmcp::model::{
    CallToolRequestParam, CallToolResult, Implementation, InitializeRequestParam,
    InitializeResult, ListToolsResult, PaginatedRequestParam, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, RoleServer, ServerHandler};
use serde_json::Value;
use tracing::{error, instrument};

use crate::error::ErrorEnvelope;
use crate::facade::call_tool;
use crate::tools::{
    add_tests_to_execution::{self, AddTestsToExecutionArgs},
    execute_jql_query::{self, ExecuteJqlQueryArgs},
    get_test::{self, GetTestArgs},
    update_test::{self, UpdateTestArgs},
    ToolContext,
};

const GET_TEST: &str = "get_test";
const ADD_TESTS_TO_EXECUTION: &str = "add_tests_to_execution";
const EXECUTE_JQL_QUERY: &str = "execute_jql_query";
const UPDATE_TEST: &str = "update_test";

/// The MCP-facing server. Holds one [`ToolContext`], shared (cheaply
/// cloned) across every call.
#[derive(Clone)]
pub struct XrayMcpServer {
    ctx: ToolContext,
}

impl XrayMcpServer {
    pub fn new(ctx: ToolContext) -> Self {
        Self { ctx }
    }
}

impl ServerHandler for XrayMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "xray-mcp".to_string(),
                icons: None,
                title: Some("Xray MCP Server".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                website_url: None,
            },
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    #[instrument(skip_all)]
    async fn initialize(
        &self,
        _request: InitializeRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<InitializeResult, McpError> {
        Ok(self.get_info())
    }

    #[instrument(skip_all)]
    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            next_cursor: None,
            tools: vec![
                tool(
                    GET_TEST,
                    "Fetch a single Test by its key or numeric id.",
                    serde_json::json!({
                        "type": "object",
                        "properties": { "issue_id": { "type": "string" } },
                        "required": ["issue_id"],
                    }),
                ),
                tool(
                    ADD_TESTS_TO_EXECUTION,
                    "Add Tests to an existing Test Execution.",
                    serde_json::json!({
                        "type": "object",
                        "properties": {
                            "execution_issue_id": { "type": "string" },
                            "test_issue_ids": { "type": "array", "items": { "type": "string" } },
                        },
                        "required": ["execution_issue_id", "test_issue_ids"],
                    }),
                ),
                tool(
                    EXECUTE_JQL_QUERY,
                    "Search Tests with a JQL query restricted to a whitelisted grammar.",
                    serde_json::json!({
                        "type": "object",
                        "properties": {
                            "jql": { "type": "string" },
                            "limit": { "type": "integer" },
                        },
                        "required": ["jql"],
                    }),
                ),
                tool(
                    UPDATE_TEST,
                    "Update a Test's Jira fields.",
                    serde_json::json!({
                        "type": "object",
                        "properties": {
                            "issue_id": { "type": "string" },
                            "jira_fields": {
                                "oneOf": [{ "type": "object" }, { "type": "string" }],
                            },
                        },
                        "required": ["issue_id", "jira_fields"],
                    }),
                ),
            ],
        })
    }

    #[instrument(skip_all, fields(tool = request.name.as_ref()))]
    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let name = request.name.clone();
        let arguments = Value::from(request.arguments.unwrap_or_default());
        let ctx = self.ctx.clone();

        let outcome = match name.as_ref() {
            GET_TEST => {
                dispatch(arguments, move |args: GetTestArgs| {
                    let ctx = ctx.clone();
                    async move { get_test::get_test(&ctx, args).await }
                })
                .await
            }
            ADD_TESTS_TO_EXECUTION => {
                dispatch(arguments, move |args: AddTestsToExecutionArgs| {
                    let ctx = ctx.clone();
                    async move { add_tests_to_execution::add_tests_to_execution(&ctx, args).await }
                })
                .await
            }
            EXECUTE_JQL_QUERY => {
                dispatch(arguments, move |args: ExecuteJqlQueryArgs| {
                    let ctx = ctx.clone();
                    async move { execute_jql_query::execute_jql_query(&ctx, args).await }
                })
                .await
            }
            UPDATE_TEST => {
                dispatch(arguments, move |args: UpdateTestArgs| {
                    let ctx = ctx.clone();
                    async move { update_test::update_test(&ctx, args).await }
                })
                .await
            }
            other => Err(ErrorEnvelope {
                error: format!("unknown tool: {other}"),
                kind: "ValidationError".to_string(),
            }),
        };

        Ok(envelope_to_result(outcome))
    }
}

/// Parses `arguments` into `Args` and runs `body`, surfacing a parse
/// failure as the same [`ErrorEnvelope`] shape any other `ValidationError`
/// would produce — never a protocol-level error.
async fn dispatch<Args, F, Fut>(
    arguments: Value,
    body: F,
) -> Result<Value, ErrorEnvelope>
where
    Args: serde::de::DeserializeOwned,
    F: FnOnce(Args) -> Fut,
    Fut: std::future::Future<Output = crate::error::Result<Value>>,
{
    let args: Args = serde_json::from_value(arguments).map_err(|e| ErrorEnvelope {
        error: format!("malformed arguments: {e}"),
        kind: "ValidationError".to_string(),
    })?;
    call_tool(|| body(args)).await
}

fn envelope_to_result(outcome: Result<Value, ErrorEnvelope>) -> CallToolResult {
    match outcome {
        Ok(data) => CallToolResult::success(vec![rmcp::model::Content::json(data)
            .unwrap_or_else(|_| rmcp::model::Content::text(String::new()))]),
        Err(envelope) => {
            error!(kind = %envelope.kind, "tool call failed");
            let body = serde_json::to_value(&envelope).unwrap_or(Value::Null);
            CallToolResult::error(vec![rmcp::model::Content::json(body)
                .unwrap_or_else(|_| rmcp::model::Content::text(envelope.error.clone()))])
        }
    }
}

fn tool(name: &'static str, description: &'static str, schema: Value) -> Tool {
    let schema_object = schema.as_object().cloned().unwrap_or_default();
    Tool::new(name, description, std::sync::Arc::new(schema_object))
}
