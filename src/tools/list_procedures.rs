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

const LIST_PROCEDURES_SQL: &str = "
SELECT
  r.ROUTINE_SCHEMA,
  r.ROUTINE_NAME,
  r.ROUTINE_TYPE,
  r.CREATED,
  r.LAST_ALTERED
FROM INFORMATION_SCHEMA.ROUTINES r
WHERE r.ROUTINE_TYPE = 'PROCEDURE'
  AND r.ROUTINE_SCHEMA = @P1
ORDER BY r.ROUTINE_NAME";

pub struct ListProcedures;

#[async_trait]
impl CatalogTool for ListProcedures {
    fn contract(&self) -> ToolContract {
        ToolContract::new::<SchemaArgs>(
            "list_procedures",
            "List all stored procedures in the database",
        )
    }

    async fn run(
        &self,
        conn: &dyn CatalogConnection,
        request: &QueryRequest,
    ) -> Result<Value, ToolError> {
        let rows = conn
            .query(LIST_PROCEDURES_SQL, &[request.schema.as_str()])
            .await?;
        Ok(rows_value(rows))
    }
}
