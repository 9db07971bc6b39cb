// Copyright (C) 2025 Nuwaira
// All Rights Reserved.
//
// NOTICE: All information contained herein is, and remains
// the property of Nuwaira.
// The intellectual and technical concepts contained
// herein are proprietary to Nuwaira
// and are protected by trade secret or copyright law.
// Dissemination of this information or reproduction of this material
// is strictly forbidden unless prior written permission is obtained
// from Nuwaira.
use std::sync::Arc;

use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::mssql::MssqlConnector;
use crate::registry::ToolRegistry;
use rmcp::{
    model::*, service::RequestContext, transport::stdio, ErrorData as McpError, RoleServer,
    ServerHandler, ServiceExt,
};
use tracing_subscriber::EnvFilter;

// -----------------------------
// Server impl
// -----------------------------

#[derive(Clone)]
pub struct SqlExplorer {
    dispatcher: Arc<Dispatcher>,
}

impl SqlExplorer {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Tool descriptors as advertised to MCP clients.
    pub fn advertised_tools(&self) -> Vec<Tool> {
        self.dispatcher
            .list_tools()
            .into_iter()
            .map(|c| Tool::new(c.name, c.description, Arc::new(c.input_schema())))
            .collect()
    }

    /// Run one tool and wrap its pretty-printed JSON output.
    pub async fn call(&self, name: &str, args: JsonObject) -> Result<CallToolResult, McpError> {
        let value = self.dispatcher.dispatch(name, &args).await?;
        let text = serde_json::to_string_pretty(&value).map_err(|e| {
            McpError::internal_error(format!("Failed to serialize result: {}", e), None)
        })?;
        mcp_return!(text)
    }
}

// -----------------------------
// ServerHandler impl
// -----------------------------

impl ServerHandler for SqlExplorer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Read-only SQL Server metadata explorer. Tools: list_schemas, list_tables, list_procedures, list_functions, list_indexes, get_table_details. Schema defaults to dbo."
                    .to_string(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: self.advertised_tools(),
            next_cursor: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.call(&request.name, request.arguments.unwrap_or_default())
            .await
    }
}

// -----------------------------
// Helper functions
// -----------------------------

/// Log to stderr; stdout carries the protocol.
pub fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}

pub fn new_dispatcher(config: Config) -> Arc<Dispatcher> {
    Arc::new(Dispatcher::new(
        ToolRegistry::with_catalog_tools(),
        Arc::new(MssqlConnector::new(config)),
    ))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

// -----------------------------
// Main: run over stdio
// -----------------------------

pub async fn run(config: Config) -> anyhow::Result<()> {
    let dispatcher = new_dispatcher(config);
    tracing::info!("Starting SQL MCP server on stdio");

    let service = SqlExplorer::new(dispatcher.clone())
        .serve(stdio())
        .await
        .inspect_err(|e| {
            tracing::error!("serving error: {:?}", e);
        })?;
    let cancel = service.cancellation_token();

    tokio::select! {
        res = service.waiting() => {
            let reason = res?;
            tracing::info!("client disconnected: {:?}", reason);
        }
        _ = shutdown_signal() => {
            tracing::info!("shutdown signal received");
            dispatcher.shutdown().await;
            cancel.cancel();
            return Ok(());
        }
    }

    dispatcher.shutdown().await;
    Ok(())
}

/// Open a connection, list schemas, and release it again.
pub async fn check(config: Config) -> anyhow::Result<usize> {
    let dispatcher = new_dispatcher(config);
    let result = dispatcher
        .dispatch("list_schemas", &JsonObject::new())
        .await;
    dispatcher.shutdown().await;

    let schemas = result.map_err(|e| anyhow::anyhow!(e))?;
    Ok(schemas.as_array().map(|a| a.len()).unwrap_or(0))
}
