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
//! Abstract catalog query executor.
//!
//! Tools only ever see a [`CatalogConnection`]; the concrete driver lives
//! behind a [`Connector`] so the connection manager can open, replace and
//! close connections without knowing which database it is talking to.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::DbError;

/// One result row, keyed by column name in catalog column order.
pub type Row = Map<String, Value>;

/// Rows in the order the query returned them.
pub type ResultSet = Vec<Row>;

/// A live connection able to run parameterized catalog queries.
///
/// Parameters are bound positionally as `@P1`, `@P2`, ...
#[async_trait]
pub trait CatalogConnection: Send + Sync {
    async fn query(&self, sql: &str, params: &[&str]) -> Result<ResultSet, DbError>;

    /// Whether the connection can still serve queries.
    fn is_healthy(&self) -> bool;

    /// Close the connection. Calling it twice is a no-op.
    async fn close(&self);
}

/// Opens new catalog connections.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn CatalogConnection>, DbError>;
}
