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
use clap::{Parser, Subcommand};
use std::process::exit;

use sql_mcp::config::Config;
use sql_mcp::server;

#[derive(Parser, Debug)]
#[command(name = "sql-mcp")]
#[command(about = "MCP server exposing SQL Server catalog metadata to Agentic AI")]
#[command(author, version, long_about=None)]
struct Args {
    /// Optional TOML config file; MSSQL_* environment variables take precedence
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<CommandEnum>,
}

/// Enum of subcommands
#[derive(Subcommand, Debug)]
enum CommandEnum {
    /// Run the MCP server over stdio (default)
    Run,
    /// Print the advertised tool contracts as JSON
    Tools,
    /// Connect to the database and list schemas
    Check,
    /// Print version info
    Version,
}

fn parse_args() -> (Args, Config) {
    dotenv::dotenv().ok();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::from_file(path).unwrap_or_else(|err| {
            eprintln!("Error reading config file {}: {}", path, err);
            exit(1);
        }),
        None => Config::default(),
    };

    (args, config)
}

#[tokio::main]
async fn main() {
    let (args, config) = parse_args();
    server::init_logging();

    match args.command.unwrap_or(CommandEnum::Run) {
        CommandEnum::Run => {
            if let Err(e) = server::run(config).await {
                tracing::error!("server error: {:?}", e);
                exit(1);
            }
        }
        CommandEnum::Tools => {
            let explorer = server::SqlExplorer::new(server::new_dispatcher(config));
            match serde_json::to_string_pretty(&explorer.advertised_tools()) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    eprintln!("Failed to serialize tools: {}", e);
                    exit(1);
                }
            }
        }
        CommandEnum::Check => match server::check(config).await {
            Ok(count) => println!("Connection OK, {} schema(s) visible", count),
            Err(e) => {
                eprintln!("Connection check failed: {}", e);
                exit(1);
            }
        },
        CommandEnum::Version => {
            println!("Version {}", env!("CARGO_PKG_VERSION"));
        }
    }
}
