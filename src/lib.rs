//! Mediating core between MCP tool calls and a Jira Xray GraphQL backend.
//!
//! Cross-cutting concerns shared by every tool live here: authentication
//! lifecycle ([`auth`]), request dispatch ([`graphql`]), identifier
//! resolution ([`resolve`]), JQL whitelisting ([`jql`]), and the uniform
//! error envelope ([`error`]). [`server`] wires these into an MCP
//! `ServerHandler`; [`tools`] holds the representative tool handlers
//! built on top of [`facade`].

pub mod auth;
pub mod config;
pub mod error;
pub mod facade;
pub mod graphql;
pub mod jql;
pub mod resolve;
pub mod server;
pub mod time;
pub mod tools;
