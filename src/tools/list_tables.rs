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
use async_trait::async_trait;
use serde_json::Value;

use super::{rows_value, CatalogTool, QueryRequest, SchemaArgs, ToolContract};
use crate::catalog::CatalogConnection;
use crate::error::ToolError;

const LIST_TABLES_SQL: &str = "
SELECT
  t.TABLE_SCHEMA,
  t.TABLE_NAME,
  t.TABLE_TYPE
FROM INFORMATION_SCHEMA.TABLES t
WHERE t.TABLE_SCHEMA = @P1
ORDER BY t.TABLE_NAME";

pub struct ListTables;

#[async_trait]
impl CatalogTool for ListTables {
    fn contract(&self) -> ToolContract {
        ToolContract::new::<SchemaArgs>(
            "list_tables",
            "List all tables in the database",
        )
    }

    async fn run(
        &self,
        conn: &dyn CatalogConnection,
        request: &QueryRequest,
    ) -> Result<Value, ToolError> {
        let rows = conn
            .query(LIST_TABLES_SQL, &[request.schema.as_str()])
            .await?;
        Ok(rows_value(rows))
    }
}
