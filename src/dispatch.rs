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
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::Value;

use crate::catalog::Connector;
use crate::connection::ConnectionManager;
use crate::error::ToolError;
use crate::registry::ToolRegistry;
use crate::tools::{Args, ToolContract};

/// Routes `(tool name, arguments)` to the matching catalog query set.
pub struct Dispatcher {
    registry: ToolRegistry,
    connections: ConnectionManager,
    closed: AtomicBool,
}

impl Dispatcher {
    pub fn new(registry: ToolRegistry, connector: Arc<dyn Connector>) -> Self {
        Self {
            registry,
            connections: ConnectionManager::new(connector),
            closed: AtomicBool::new(false),
        }
    }

    pub fn list_tools(&self) -> Vec<ToolContract> {
        self.registry.list_all()
    }

    pub fn connections(&self) -> &ConnectionManager {
        &self.connections
    }

    pub async fn dispatch(&self, name: &str, args: &Args) -> Result<Value, ToolError> {
        let (_, tool) = self
            .registry
            .get(name)
            .ok_or_else(|| ToolError::MethodNotFound(name.to_string()))?;

        let request = tool.prepare(args)?;

        if self.closed.load(Ordering::SeqCst) {
            return Err(ToolError::internal("Server is shutting down"));
        }

        tracing::debug!(tool = name, schema = %request.schema, table = ?request.table_name, "dispatch");

        let conn = self.connections.acquire().await?;
        if self.closed.load(Ordering::SeqCst) {
            // shutdown ran while we were connecting; the connection may be one
            // it never saw
            self.connections.release().await;
            return Err(ToolError::internal("Server is shutting down"));
        }
        tool.run(conn.as_ref(), &request).await.map_err(|e| {
            if let ToolError::InternalError(msg) = &e {
                tracing::error!(tool = name, "{}", msg);
            }
            e
        })
    }

    /// Refuse further calls and close the shared connection.
    pub async fn shutdown(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.connections.release().await;
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
