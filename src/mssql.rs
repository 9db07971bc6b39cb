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
//! SQL Server connector built on `tiberius`.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tiberius::{
    AuthMethod, Client, ColumnData, EncryptionLevel, FromSql, Query, Row as SqlRow, SqlBrowser,
};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

use crate::catalog::{CatalogConnection, Connector, ResultSet, Row};
use crate::config::{Config, ConnectionSettings, Credentials};
use crate::error::DbError;

type SqlClient = Client<Compat<TcpStream>>;

/// Opens SQL Server connections, resolving settings on every attempt.
pub struct MssqlConnector {
    config: Config,
}

impl MssqlConnector {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Connector for MssqlConnector {
    async fn connect(&self) -> Result<Arc<dyn CatalogConnection>, DbError> {
        let settings = ConnectionSettings::resolve(&self.config)?;
        let conn = MssqlConnection::open(&settings).await?;
        Ok(Arc::new(conn))
    }
}

/// One live TDS session. Queries on it run one at a time.
pub struct MssqlConnection {
    client: Mutex<Option<SqlClient>>,
    healthy: AtomicBool,
    request_timeout: Duration,
}

impl MssqlConnection {
    pub async fn open(settings: &ConnectionSettings) -> Result<Self, DbError> {
        let config = build_config(settings)?;
        tracing::info!(
            host = %settings.host,
            instance = ?settings.instance,
            database = %settings.database,
            "connecting to SQL Server"
        );

        let client = with_timeout("connect", settings.connect_timeout, async {
            let tcp = match settings.instance {
                Some(_) => TcpStream::connect_named(&config).await,
                None => TcpStream::connect(config.get_addr())
                    .await
                    .map_err(tiberius::error::Error::from),
            }
            .map_err(|e| DbError::Connect(e.to_string()))?;
            tcp.set_nodelay(true)
                .map_err(|e| DbError::Connect(e.to_string()))?;

            Client::connect(config, tcp.compat_write())
                .await
                .map_err(|e| DbError::Connect(e.to_string()))
        })
        .await
        .map_err(|e| match e {
            timeout @ DbError::Timeout { .. } => DbError::Connect(timeout.to_string()),
            other => other,
        })?;

        Ok(MssqlConnection {
            client: Mutex::new(Some(client)),
            healthy: AtomicBool::new(true),
            request_timeout: settings.request_timeout,
        })
    }

    fn query_error(&self, e: tiberius::error::Error) -> DbError {
        // Server-side errors (bad object name, permission denied) leave the
        // session usable; anything else means the stream is gone.
        if !matches!(e, tiberius::error::Error::Server(_)) {
            self.healthy.store(false, Ordering::SeqCst);
        }
        DbError::Query(e.to_string())
    }
}

#[async_trait]
impl CatalogConnection for MssqlConnection {
    async fn query(&self, sql: &str, params: &[&str]) -> Result<ResultSet, DbError> {
        let mut guard = self.client.lock().await;
        let client = guard.as_mut().ok_or(DbError::Closed)?;

        let mut query = Query::new(sql);
        for param in params {
            query.bind(param.to_string());
        }

        let result = with_timeout("query", self.request_timeout, async {
            let stream = query.query(client).await.map_err(|e| self.query_error(e))?;
            stream
                .into_first_result()
                .await
                .map_err(|e| self.query_error(e))
        })
        .await;

        match result {
            Ok(rows) => Ok(rows.iter().map(row_to_json).collect()),
            Err(e) => {
                if let DbError::Timeout { .. } = e {
                    self.healthy.store(false, Ordering::SeqCst);
                }
                Err(e)
            }
        }
    }

    fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::SeqCst)
    }

    async fn close(&self) {
        self.healthy.store(false, Ordering::SeqCst);
        if let Some(client) = self.client.lock().await.take() {
            if let Err(e) = client.close().await {
                tracing::warn!("error while closing SQL Server connection: {}", e);
            }
        }
    }
}

fn build_config(settings: &ConnectionSettings) -> Result<tiberius::Config, DbError> {
    let mut config = tiberius::Config::new();
    config.host(&settings.host);
    config.port(settings.port);
    config.database(&settings.database);
    if let Some(instance) = &settings.instance {
        config.instance_name(instance);
    }
    config.application_name("sql-mcp");

    match &settings.credentials {
        Credentials::SqlLogin { user, password } => {
            config.authentication(AuthMethod::sql_server(user, password));
        }
        #[cfg(windows)]
        Credentials::Trusted => {
            config.authentication(AuthMethod::Integrated);
        }
        #[cfg(not(windows))]
        Credentials::Trusted => {
            return Err(DbError::Configuration(
                "Trusted connections are only supported on Windows".to_string(),
            ));
        }
    }

    if settings.encrypt {
        config.encryption(EncryptionLevel::Required);
    } else {
        config.encryption(EncryptionLevel::Off);
    }
    if settings.trust_server_certificate {
        config.trust_cert();
    }
    Ok(config)
}

async fn with_timeout<T, F>(operation: &'static str, limit: Duration, fut: F) -> Result<T, DbError>
where
    F: Future<Output = Result<T, DbError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(res) => res,
        Err(_) => Err(DbError::Timeout {
            operation,
            seconds: limit.as_secs(),
        }),
    }
}

fn row_to_json(row: &SqlRow) -> Row {
    row.cells()
        .map(|(column, data)| (column.name().to_string(), cell_to_json(data)))
        .collect()
}

fn cell_to_json(data: &ColumnData<'static>) -> Value {
    match data {
        ColumnData::U8(v) => json!(v),
        ColumnData::I16(v) => json!(v),
        ColumnData::I32(v) => json!(v),
        ColumnData::I64(v) => json!(v),
        ColumnData::F32(v) => json!(v),
        ColumnData::F64(v) => json!(v),
        ColumnData::Bit(v) => json!(v),
        ColumnData::String(v) => json!(v.as_deref()),
        ColumnData::Guid(v) => json!(v.map(|g| g.to_string())),
        ColumnData::Numeric(v) => match v {
            Some(n) => {
                let scale = 10f64.powi(n.scale() as i32);
                json!(n.value() as f64 / scale)
            }
            None => Value::Null,
        },
        ColumnData::Xml(v) => json!(v.as_ref().map(|x| x.clone().into_owned().into_string())),
        ColumnData::Binary(v) => json!(v.as_ref().map(|b| to_hex(b))),
        ColumnData::DateTime(_) | ColumnData::SmallDateTime(_) | ColumnData::DateTime2(_) => {
            json!(chrono::NaiveDateTime::from_sql(data)
                .ok()
                .flatten()
                .map(|d| d.format("%Y-%m-%dT%H:%M:%S%.3f").to_string()))
        }
        ColumnData::Date(_) => json!(chrono::NaiveDate::from_sql(data)
            .ok()
            .flatten()
            .map(|d| d.to_string())),
        ColumnData::Time(_) => json!(chrono::NaiveTime::from_sql(data)
            .ok()
            .flatten()
            .map(|t| t.to_string())),
        ColumnData::DateTimeOffset(_) => {
            json!(chrono::DateTime::<chrono::Utc>::from_sql(data)
                .ok()
                .flatten()
                .map(|d| d.to_rfc3339()))
        }
    }
}

fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(2 + bytes.len() * 2);
    out.push_str("0x");
    for b in bytes {
        out.push_str(&format!("{:02X}", b));
    }
    out
}
