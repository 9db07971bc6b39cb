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

#[macro_use]
pub mod macros;
pub mod catalog;
pub mod config;
pub mod connection;
pub mod dispatch;
pub mod error;
pub mod identifier;
pub mod mssql;
pub mod registry;
pub mod server;
pub mod tools;
