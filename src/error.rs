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
use rmcp::{model::ErrorCode, ErrorData as McpError};
use thiserror::Error;

/// Failure raised while talking to the catalog store.
#[derive(Debug, Error)]
pub enum DbError {
    /// Connection settings are incomplete, raised before any network attempt.
    #[error("{0}")]
    Configuration(String),

    #[error("Failed to connect to database: {0}")]
    Connect(String),

    #[error("{0}")]
    Query(String),

    #[error("{operation} timed out after {seconds}s")]
    Timeout { operation: &'static str, seconds: u64 },

    #[error("Connection is closed")]
    Closed,
}

/// Error returned to the caller of a tool.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    #[error("{0}")]
    InvalidParams(String),

    #[error("Unknown tool: {0}")]
    MethodNotFound(String),

    #[error("{0}")]
    InternalError(String),
}

impl ToolError {
    pub fn invalid_params(msg: impl Into<String>) -> Self {
        ToolError::InvalidParams(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ToolError::InternalError(msg.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ToolError::InvalidParams(_) => ErrorCode::INVALID_PARAMS,
            ToolError::MethodNotFound(_) => ErrorCode::METHOD_NOT_FOUND,
            ToolError::InternalError(_) => ErrorCode::INTERNAL_ERROR,
        }
    }
}

impl From<DbError> for ToolError {
    fn from(err: DbError) -> Self {
        ToolError::InternalError(format!("Database operation failed: {}", err))
    }
}

impl From<ToolError> for McpError {
    fn from(err: ToolError) -> Self {
        McpError::new(err.code(), err.to_string(), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_error_keeps_cause() {
        let err: ToolError = DbError::Connect("login failed for user 'sa'".to_string()).into();
        assert_eq!(
            err,
            ToolError::InternalError(
                "Database operation failed: Failed to connect to database: login failed for user 'sa'"
                    .to_string()
            )
        );
    }

    #[test]
    fn test_mcp_error_codes() {
        let e: McpError = ToolError::invalid_params("Invalid schema name").into();
        assert_eq!(e.code, ErrorCode::INVALID_PARAMS);
        assert_eq!(e.message, "Invalid schema name");

        let e: McpError = ToolError::MethodNotFound("drop_everything".to_string()).into();
        assert_eq!(e.code, ErrorCode::METHOD_NOT_FOUND);
        assert_eq!(e.message, "Unknown tool: drop_everything");

        let e: McpError = ToolError::from(DbError::Closed).into();
        assert_eq!(e.code, ErrorCode::INTERNAL_ERROR);
    }
}
