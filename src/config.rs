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
use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use crate::error::DbError;

pub const DEFAULT_SERVER: &str = "localhost";
pub const DEFAULT_DATABASE: &str = "master";
pub const DEFAULT_PORT: u16 = 1433;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Optional TOML config file, eg:
///
/// ```toml
/// [database]
/// server = "db01\\SQLEXPRESS"
/// database = "Northwind"
/// trusted_connection = true
/// ```
#[derive(Deserialize, Debug, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseSection,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct DatabaseSection {
    pub server: Option<String>,
    pub instance: Option<String>,
    pub port: Option<u16>,
    pub database: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub trusted_connection: Option<bool>,
    pub encrypt: Option<bool>,
    pub trust_server_certificate: Option<bool>,
    pub connect_timeout_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    pub fn from_toml_str(toml_str: &str) -> Result<Config, toml::de::Error> {
        toml::from_str(toml_str)
    }
    pub fn from_file(file_path: &str) -> Result<Config, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(file_path)?;
        Ok(Self::from_toml_str(&content)?)
    }
}

#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Integrated (Windows) authentication.
    Trusted,
    SqlLogin { user: String, password: String },
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Trusted => f.write_str("Trusted"),
            Credentials::SqlLogin { user, .. } => f
                .debug_struct("SqlLogin")
                .field("user", user)
                .field("password", &"***")
                .finish(),
        }
    }
}

/// Fully resolved settings for opening one catalog connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub host: String,
    pub instance: Option<String>,
    pub port: u16,
    pub database: String,
    pub credentials: Credentials,
    pub encrypt: bool,
    pub trust_server_certificate: bool,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl ConnectionSettings {
    /// Resolve settings from the process environment, falling back to the
    /// config file and then to built-in defaults.
    pub fn resolve(config: &Config) -> Result<Self, DbError> {
        Self::resolve_with(config, |key| std::env::var(key).ok())
    }

    pub fn resolve_with<F>(config: &Config, env: F) -> Result<Self, DbError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db = &config.database;
        let var = |key: &str| env(key).filter(|v| !v.trim().is_empty());
        let flag = |key: &str, fallback: Option<bool>| match var(key) {
            Some(v) => v.trim() == "true",
            None => fallback.unwrap_or(false),
        };

        let server = var("MSSQL_SERVER")
            .or_else(|| db.server.clone())
            .unwrap_or_else(|| DEFAULT_SERVER.to_string());
        let (host, server_instance, server_port) = split_server(&server);

        let port = match var("MSSQL_PORT") {
            Some(p) => p
                .trim()
                .parse::<u16>()
                .map_err(|_| DbError::Configuration(format!("Invalid MSSQL_PORT value '{}'", p)))?,
            None => server_port.or(db.port).unwrap_or(DEFAULT_PORT),
        };

        let instance = var("MSSQL_INSTANCE")
            .or_else(|| db.instance.clone())
            .or(server_instance);

        let database = var("MSSQL_DATABASE")
            .or_else(|| db.database.clone())
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string());

        let credentials = if flag("MSSQL_TRUSTED_CONNECTION", db.trusted_connection) {
            Credentials::Trusted
        } else {
            match (
                var("MSSQL_USER").or_else(|| db.user.clone()),
                var("MSSQL_PASSWORD").or_else(|| db.password.clone()),
            ) {
                (Some(user), Some(password)) => Credentials::SqlLogin { user, password },
                _ => {
                    return Err(DbError::Configuration(
                        "Database credentials not provided. Set MSSQL_USER and MSSQL_PASSWORD \
                         environment variables, or set MSSQL_TRUSTED_CONNECTION=true for Windows \
                         Authentication."
                            .to_string(),
                    ))
                }
            }
        };

        Ok(ConnectionSettings {
            host,
            instance,
            port,
            database,
            credentials,
            encrypt: flag("MSSQL_ENCRYPT", db.encrypt),
            trust_server_certificate: flag("MSSQL_TRUST_CERT", db.trust_server_certificate),
            connect_timeout: Duration::from_secs(
                db.connect_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            request_timeout: Duration::from_secs(
                db.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
        })
    }
}

/// Split `host\instance` or `host,port` into its parts.
fn split_server(server: &str) -> (String, Option<String>, Option<u16>) {
    let server = server.trim();
    if let Some((host, instance)) = server.split_once('\\') {
        let instance = Some(instance.to_string()).filter(|i| !i.is_empty());
        return (host.to_string(), instance, None);
    }
    if let Some((host, port)) = server.split_once(',') {
        if let Ok(port) = port.trim().parse::<u16>() {
            return (host.to_string(), None, Some(port));
        }
    }
    (server.to_string(), None, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_with_credentials() {
        let env = env_of(&[("MSSQL_USER", "sa"), ("MSSQL_PASSWORD", "secret")]);
        let s = ConnectionSettings::resolve_with(&Config::default(), env).unwrap();
        assert_eq!(s.host, "localhost");
        assert_eq!(s.database, "master");
        assert_eq!(s.port, 1433);
        assert_eq!(s.instance, None);
        assert!(!s.encrypt);
        assert!(!s.trust_server_certificate);
        assert_eq!(s.connect_timeout, Duration::from_secs(30));
        assert_eq!(s.request_timeout, Duration::from_secs(30));
        assert_eq!(
            s.credentials,
            Credentials::SqlLogin {
                user: "sa".to_string(),
                password: "secret".to_string()
            }
        );
    }

    #[test]
    fn test_missing_credentials_is_configuration_error() {
        let env = env_of(&[("MSSQL_USER", "sa")]);
        let err = ConnectionSettings::resolve_with(&Config::default(), env).unwrap_err();
        assert!(matches!(err, DbError::Configuration(_)));
        assert!(err.to_string().contains("MSSQL_PASSWORD"));
    }

    #[test]
    fn test_trusted_connection_needs_no_credentials() {
        let env = env_of(&[("MSSQL_TRUSTED_CONNECTION", "true")]);
        let s = ConnectionSettings::resolve_with(&Config::default(), env).unwrap();
        assert_eq!(s.credentials, Credentials::Trusted);
    }

    #[test]
    fn test_flags_only_accept_literal_true() {
        let env = env_of(&[
            ("MSSQL_TRUSTED_CONNECTION", "yes"),
            ("MSSQL_ENCRYPT", "1"),
            ("MSSQL_TRUST_CERT", "true"),
            ("MSSQL_USER", "sa"),
            ("MSSQL_PASSWORD", "pw"),
        ]);
        let s = ConnectionSettings::resolve_with(&Config::default(), env).unwrap();
        assert!(matches!(s.credentials, Credentials::SqlLogin { .. }));
        assert!(!s.encrypt);
        assert!(s.trust_server_certificate);
    }

    #[test]
    fn test_named_instance_and_port_forms() {
        let env = env_of(&[
            ("MSSQL_SERVER", "db01\\SQLEXPRESS"),
            ("MSSQL_TRUSTED_CONNECTION", "true"),
        ]);
        let s = ConnectionSettings::resolve_with(&Config::default(), env).unwrap();
        assert_eq!(s.host, "db01");
        assert_eq!(s.instance.as_deref(), Some("SQLEXPRESS"));

        let env = env_of(&[
            ("MSSQL_SERVER", "db02,14330"),
            ("MSSQL_TRUSTED_CONNECTION", "true"),
        ]);
        let s = ConnectionSettings::resolve_with(&Config::default(), env).unwrap();
        assert_eq!(s.host, "db02");
        assert_eq!(s.port, 14330);
    }

    #[test]
    fn test_env_overrides_file() {
        let config = Config::from_toml_str(
            r#"
            [database]
            server = "filehost"
            database = "Northwind"
            user = "reader"
            password = "from-file"
            encrypt = true
            request_timeout_secs = 5
            "#,
        )
        .unwrap();
        let env = env_of(&[("MSSQL_DATABASE", "AdventureWorks"), ("MSSQL_ENCRYPT", "false")]);
        let s = ConnectionSettings::resolve_with(&config, env).unwrap();
        assert_eq!(s.host, "filehost");
        assert_eq!(s.database, "AdventureWorks");
        assert!(!s.encrypt);
        assert_eq!(s.request_timeout, Duration::from_secs(5));
        assert!(matches!(s.credentials, Credentials::SqlLogin { ref user, .. } if user == "reader"));
    }

    #[test]
    fn test_debug_hides_password() {
        let creds = Credentials::SqlLogin {
            user: "sa".to_string(),
            password: "hunter2".to_string(),
        };
        assert!(!format!("{:?}", creds).contains("hunter2"));
    }
}
