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
use serde_json::{json, Value};

use super::{rows_value, CatalogTool, QueryRequest, TableArgs, ToolContract};
use crate::catalog::CatalogConnection;
use crate::error::ToolError;

const COLUMNS_SQL: &str = "
SELECT
  c.COLUMN_NAME,
  c.DATA_TYPE,
  c.IS_NULLABLE,
  c.COLUMN_DEFAULT,
  c.CHARACTER_MAXIMUM_LENGTH,
  c.NUMERIC_PRECISION,
  c.NUMERIC_SCALE,
  c.ORDINAL_POSITION
FROM INFORMATION_SCHEMA.COLUMNS c
WHERE c.TABLE_SCHEMA = @P1 AND c.TABLE_NAME = @P2
ORDER BY c.ORDINAL_POSITION";

const FOREIGN_KEYS_SQL: &str = "
SELECT
  fk.name AS FK_NAME,
  tp.name AS PARENT_TABLE,
  cp.name AS PARENT_COLUMN,
  tr.name AS REFERENCED_TABLE,
  cr.name AS REFERENCED_COLUMN
FROM sys.foreign_keys fk
INNER JOIN sys.foreign_key_columns fkc ON fk.object_id = fkc.constraint_object_id
INNER JOIN sys.tables tp ON fk.parent_object_id = tp.object_id
INNER JOIN sys.tables tr ON fk.referenced_object_id = tr.object_id
INNER JOIN sys.columns cp ON fkc.parent_object_id = cp.object_id AND fkc.parent_column_id = cp.column_id
INNER JOIN sys.columns cr ON fkc.referenced_object_id = cr.object_id AND fkc.referenced_column_id = cr.column_id
INNER JOIN sys.schemas s ON tp.schema_id = s.schema_id
WHERE s.name = @P1 AND tp.name = @P2";

const TABLE_INDEXES_SQL: &str = "
SELECT
  i.name AS INDEX_NAME,
  i.type_desc AS INDEX_TYPE,
  i.is_unique,
  i.is_primary_key,
  c.name AS COLUMN_NAME,
  ic.key_ordinal,
  ic.is_descending_key
FROM sys.indexes i
INNER JOIN sys.tables t ON i.object_id = t.object_id
INNER JOIN sys.schemas s ON t.schema_id = s.schema_id
LEFT JOIN sys.index_columns ic ON i.object_id = ic.object_id AND i.index_id = ic.index_id
LEFT JOIN sys.columns c ON ic.object_id = c.object_id AND ic.column_id = c.column_id
WHERE s.name = @P1 AND t.name = @P2
ORDER BY i.name, ic.key_ordinal";

pub struct GetTableDetails;

#[async_trait]
impl CatalogTool for GetTableDetails {
    fn contract(&self) -> ToolContract {
        ToolContract::new::<TableArgs>(
            "get_table_details",
            "Get detailed information about a table including columns, indexes, and relationships",
        )
    }

    async fn run(
        &self,
        conn: &dyn CatalogConnection,
        request: &QueryRequest,
    ) -> Result<Value, ToolError> {
        let table = request
            .table_name
            .as_deref()
            .ok_or_else(|| ToolError::invalid_params("Table name is required"))?;
        let params = [request.schema.as_str(), table];

        let columns = conn.query(COLUMNS_SQL, &params).await?;
        let foreign_keys = conn.query(FOREIGN_KEYS_SQL, &params).await?;
        let indexes = conn.query(TABLE_INDEXES_SQL, &params).await?;

        Ok(json!({
            "table": {
                "schema": request.schema,
                "name": table,
            },
            "columns": rows_value(columns),
            "indexes": rows_value(indexes),
            "foreign_keys": rows_value(foreign_keys),
        }))
    }
}
