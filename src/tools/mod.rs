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
//! Catalog tools: one static contract plus one metadata query set per tool.

mod get_table_details;
mod list_functions;
mod list_indexes;
mod list_procedures;
mod list_schemas;
mod list_tables;

pub use get_table_details::GetTableDetails;
pub use list_functions::ListFunctions;
pub use list_indexes::ListIndexes;
pub use list_procedures::ListProcedures;
pub use list_schemas::ListSchemas;
pub use list_tables::ListTables;

use std::sync::Arc;

use async_trait::async_trait;
use rmcp::schemars::{self, JsonSchema};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::catalog::{CatalogConnection, ResultSet};
use crate::error::ToolError;
use crate::identifier::is_valid_identifier;

/// Raw tool arguments as sent by the caller.
pub type Args = Map<String, Value>;

pub const DEFAULT_SCHEMA: &str = "dbo";
pub const SCHEMA_PARAM: &str = "schema";
pub const TABLE_NAME_PARAM: &str = "table_name";

// -----------------------------
// Args / DTOs
// -----------------------------

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct NoArgs {}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SchemaArgs {
    /// Schema name (optional, defaults to dbo)
    pub schema: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct IndexArgs {
    /// Table name to filter indexes (optional)
    pub table_name: Option<String>,

    /// Schema name (optional, defaults to dbo)
    pub schema: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct TableArgs {
    /// Name of the table
    pub table_name: String,

    /// Schema name (optional, defaults to dbo)
    pub schema: Option<String>,
}

/// One declared tool parameter, read off the input schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: String,
    pub required: bool,
}

/// Static, advertised description of a tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolContract {
    pub name: &'static str,
    pub description: &'static str,
    pub params: Vec<ParamSpec>,
    input_schema: Map<String, Value>,
}

impl ToolContract {
    /// Contract whose parameters are the fields of `A`.
    pub fn new<A: JsonSchema>(name: &'static str, description: &'static str) -> Self {
        let input_schema = schema_of::<A>();
        let required: Vec<&str> = input_schema
            .get("required")
            .and_then(Value::as_array)
            .map(|r| r.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        let params = input_schema
            .get("properties")
            .and_then(Value::as_object)
            .map(|props| {
                props
                    .keys()
                    .map(|k| ParamSpec {
                        name: k.clone(),
                        required: required.contains(&k.as_str()),
                    })
                    .collect()
            })
            .unwrap_or_default();
        ToolContract {
            name,
            description,
            params,
            input_schema,
        }
    }

    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    /// JSON-Schema object describing the tool input.
    pub fn input_schema(&self) -> Map<String, Value> {
        self.input_schema.clone()
    }
}

fn schema_of<A: JsonSchema>() -> Map<String, Value> {
    let mut schema = match serde_json::to_value(schemars::schema_for!(A)) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };
    schema.remove("$schema");
    schema.remove("title");
    schema.insert("type".to_string(), json!("object"));
    schema
        .entry("properties")
        .or_insert_with(|| Value::Object(Map::new()));
    let no_required = schema
        .get("required")
        .and_then(Value::as_array)
        .map_or(false, |r| r.is_empty());
    if no_required {
        schema.remove("required");
    }
    schema
}

/// Validated input for a query set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub schema: String,
    pub table_name: Option<String>,
}

impl QueryRequest {
    /// Extract the parameters `contract` declares from `args`.
    ///
    /// Missing required parameters are reported before any identifier is
    /// checked. Undeclared arguments are ignored.
    pub fn from_args(contract: &ToolContract, args: &Args) -> Result<Self, ToolError> {
        let schema = match contract.param(SCHEMA_PARAM) {
            Some(_) => string_arg(args, SCHEMA_PARAM)?,
            None => None,
        };
        let table_name = match contract.param(TABLE_NAME_PARAM) {
            Some(_) => string_arg(args, TABLE_NAME_PARAM)?,
            None => None,
        };

        if let Some(p) = contract.param(TABLE_NAME_PARAM) {
            if p.required && table_name.is_none() {
                return Err(ToolError::invalid_params("Table name is required"));
            }
        }

        let schema = schema.unwrap_or_else(|| DEFAULT_SCHEMA.to_string());
        if !is_valid_identifier(&schema) {
            return Err(ToolError::invalid_params("Invalid schema name"));
        }
        if let Some(table) = &table_name {
            if !is_valid_identifier(table) {
                return Err(ToolError::invalid_params("Invalid table name"));
            }
        }

        Ok(QueryRequest { schema, table_name })
    }
}

/// Read an optional string argument. Null and empty strings count as absent.
fn string_arg(args: &Args, name: &str) -> Result<Option<String>, ToolError> {
    match args.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ToolError::invalid_params(format!(
            "Parameter '{}' must be a string",
            name
        ))),
    }
}

/// One registered tool: its contract and the query set behind it.
#[async_trait]
pub trait CatalogTool: Send + Sync {
    fn contract(&self) -> ToolContract;

    /// Turn raw arguments into a validated request. Runs before any
    /// connection is acquired.
    fn prepare(&self, args: &Args) -> Result<QueryRequest, ToolError> {
        QueryRequest::from_args(&self.contract(), args)
    }

    async fn run(
        &self,
        conn: &dyn CatalogConnection,
        request: &QueryRequest,
    ) -> Result<Value, ToolError>;
}

/// The fixed tool set, in advertisement order.
pub fn all_tools() -> Vec<Arc<dyn CatalogTool>> {
    let tools: [Arc<dyn CatalogTool>; 6] = [
        Arc::new(ListSchemas),
        Arc::new(ListTables),
        Arc::new(ListProcedures),
        Arc::new(ListFunctions),
        Arc::new(ListIndexes),
        Arc::new(GetTableDetails),
    ];
    Vec::from(tools)
}

pub(crate) fn rows_value(rows: ResultSet) -> Value {
    Value::Array(rows.into_iter().map(Value::Object).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: Value) -> Args {
        v.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_schema_defaults_to_dbo() {
        let req = QueryRequest::from_args(&ListTables.contract(), &Args::new()).unwrap();
        assert_eq!(req.schema, "dbo");
        assert_eq!(req.table_name, None);

        let req =
            QueryRequest::from_args(&ListTables.contract(), &args(json!({"schema": ""}))).unwrap();
        assert_eq!(req.schema, "dbo");
    }

    #[test]
    fn test_rejects_unsafe_schema() {
        let err = QueryRequest::from_args(
            &ListTables.contract(),
            &args(json!({"schema": "dbo; DROP TABLE x"})),
        )
        .unwrap_err();
        assert_eq!(err, ToolError::invalid_params("Invalid schema name"));
    }

    #[test]
    fn test_rejects_non_string_argument() {
        let err = QueryRequest::from_args(&ListTables.contract(), &args(json!({"schema": 42})))
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidParams(_)));
    }

    #[test]
    fn test_required_table_name_checked_first() {
        let err = QueryRequest::from_args(
            &GetTableDetails.contract(),
            &args(json!({"schema": "bad schema"})),
        )
        .unwrap_err();
        assert_eq!(err, ToolError::invalid_params("Table name is required"));
    }

    #[test]
    fn test_optional_table_name_is_validated() {
        let err = QueryRequest::from_args(
            &ListIndexes.contract(),
            &args(json!({"table_name": "Orders;--"})),
        )
        .unwrap_err();
        assert_eq!(err, ToolError::invalid_params("Invalid table name"));

        let req = QueryRequest::from_args(
            &ListIndexes.contract(),
            &args(json!({"table_name": "Orders", "schema": "sales"})),
        )
        .unwrap();
        assert_eq!(req.schema, "sales");
        assert_eq!(req.table_name.as_deref(), Some("Orders"));
    }

    #[test]
    fn test_undeclared_arguments_are_ignored() {
        let req = QueryRequest::from_args(
            &ListSchemas.contract(),
            &args(json!({"schema": "not valid!", "table_name": "x y"})),
        )
        .unwrap();
        assert_eq!(req.schema, "dbo");
        assert_eq!(req.table_name, None);
    }

    #[test]
    fn test_input_schema_shape() {
        let schema = GetTableDetails.contract().input_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["table_name"]["type"], "string");
        assert_eq!(schema["required"], json!(["table_name"]));
        assert_eq!(
            schema["properties"]["schema"]["description"],
            "Schema name (optional, defaults to dbo)"
        );

        let schema = ListSchemas.contract().input_schema();
        assert_eq!(schema["properties"], json!({}));
        assert!(schema.get("required").is_none());
    }

    #[test]
    fn test_params_follow_args_struct() {
        let contract = ListIndexes.contract();
        assert_eq!(
            contract.params,
            vec![
                ParamSpec {
                    name: "table_name".to_string(),
                    required: false
                },
                ParamSpec {
                    name: "schema".to_string(),
                    required: false
                },
            ]
        );
        assert!(GetTableDetails.contract().param(TABLE_NAME_PARAM).unwrap().required);
        assert!(ListSchemas.contract().params.is_empty());
    }

    #[test]
    fn test_tool_names_are_unique() {
        let mut names: Vec<&str> = all_tools().iter().map(|t| t.contract().name).collect();
        assert_eq!(names.len(), 6);
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 6);
    }
}
