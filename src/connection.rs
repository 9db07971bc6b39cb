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
//! Owner of the single shared catalog connection.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::catalog::{CatalogConnection, Connector};
use crate::error::DbError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Nothing opened yet, or the last connection went unhealthy.
    Absent,
    Connected,
    /// Released on shutdown. The next acquire opens a fresh connection.
    Closed,
}

enum Slot {
    Absent,
    Connected(Arc<dyn CatalogConnection>),
    Closed,
}

/// Lazily opens one connection and hands the same handle to every caller
/// while it stays healthy.
///
/// The slot lock is held across the connect, so callers racing on an
/// absent connection wait for the first attempt instead of opening their own.
pub struct ConnectionManager {
    connector: Arc<dyn Connector>,
    slot: Mutex<Slot>,
}

impl ConnectionManager {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self {
            connector,
            slot: Mutex::new(Slot::Absent),
        }
    }

    pub async fn acquire(&self) -> Result<Arc<dyn CatalogConnection>, DbError> {
        let mut slot = self.slot.lock().await;

        if let Slot::Connected(conn) = &*slot {
            if conn.is_healthy() {
                return Ok(conn.clone());
            }
            tracing::warn!("catalog connection is unhealthy, reconnecting");
            conn.close().await;
            *slot = Slot::Absent;
        }

        let conn = self.connector.connect().await.map_err(|e| {
            tracing::error!("{}", e);
            e
        })?;
        tracing::info!("catalog connection established");
        *slot = Slot::Connected(conn.clone());
        Ok(conn)
    }

    /// Close the active connection, if any.
    pub async fn release(&self) {
        let mut slot = self.slot.lock().await;
        if let Slot::Connected(conn) = std::mem::replace(&mut *slot, Slot::Closed) {
            conn.close().await;
            tracing::info!("catalog connection closed");
        }
    }

    pub async fn state(&self) -> ConnectionState {
        match &*self.slot.lock().await {
            Slot::Absent => ConnectionState::Absent,
            Slot::Connected(conn) if conn.is_healthy() => ConnectionState::Connected,
            Slot::Connected(_) => ConnectionState::Absent,
            Slot::Closed => ConnectionState::Closed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixture::{CountingConnector, FixtureConnection};
    use std::time::Duration;
    use tokio_test::assert_ok;

    #[tokio::test]
    async fn test_acquire_reuses_healthy_connection() {
        let connector = Arc::new(CountingConnector::new());
        let manager = ConnectionManager::new(connector.clone());

        let a = assert_ok!(manager.acquire().await);
        let b = assert_ok!(manager.acquire().await);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(connector.opened(), 1);
        assert_eq!(manager.state().await, ConnectionState::Connected);
    }

    #[tokio::test]
    async fn test_concurrent_acquire_opens_once() {
        let connector = Arc::new(CountingConnector::new().with_delay(Duration::from_millis(50)));
        let manager = Arc::new(ConnectionManager::new(connector.clone()));

        let (a, b) = futures::future::join(manager.acquire(), manager.acquire()).await;
        assert!(Arc::ptr_eq(&assert_ok!(a), &assert_ok!(b)));
        assert_eq!(connector.opened(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_acquire_across_tasks_opens_once() {
        let connector = Arc::new(CountingConnector::new().with_delay(Duration::from_millis(50)));
        let manager = Arc::new(ConnectionManager::new(connector.clone()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let m = manager.clone();
                tokio::spawn(async move { m.acquire().await.map(|_| ()) })
            })
            .collect();
        for h in handles {
            assert_ok!(h.await.unwrap());
        }
        assert_eq!(connector.opened(), 1);
    }

    #[tokio::test]
    async fn test_release_then_acquire_opens_new_connection() {
        let connector = Arc::new(CountingConnector::new());
        let manager = ConnectionManager::new(connector.clone());

        let first = assert_ok!(manager.acquire().await);
        manager.release().await;
        assert!(!first.is_healthy());
        assert_eq!(manager.state().await, ConnectionState::Closed);

        let second = assert_ok!(manager.acquire().await);
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(connector.opened(), 2);
    }

    #[tokio::test]
    async fn test_release_is_idempotent() {
        let manager = ConnectionManager::new(Arc::new(CountingConnector::new()));
        manager.release().await;
        manager.release().await;
        assert_eq!(manager.state().await, ConnectionState::Closed);
    }

    #[tokio::test]
    async fn test_unhealthy_connection_is_replaced() {
        let shared = Arc::new(FixtureConnection::new());
        let connector = Arc::new(CountingConnector::new().serving(shared.clone()));
        let manager = ConnectionManager::new(connector.clone());

        assert_ok!(manager.acquire().await);
        shared.close().await;
        assert_eq!(manager.state().await, ConnectionState::Absent);

        assert_ok!(manager.acquire().await);
        assert_eq!(connector.opened(), 2);
    }

    #[tokio::test]
    async fn test_connect_failure_propagates() {
        let connector = Arc::new(CountingConnector::new().failing("network unreachable"));
        let manager = ConnectionManager::new(connector.clone());

        let err = manager.acquire().await.err().expect("connect should fail");
        assert_eq!(
            err.to_string(),
            "Failed to connect to database: network unreachable"
        );
        assert_eq!(manager.state().await, ConnectionState::Absent);
    }
}
