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

use super::{rows_value, CatalogTool, IndexArgs, QueryRequest, ToolContract};
use crate::catalog::CatalogConnection;
use crate::error::ToolError;

const LIST_INDEXES_SQL: &str = "
SELECT
  i.name AS INDEX_NAME,
  t.name AS TABLE_NAME,
  s.name AS SCHEMA_NAME,
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
WHERE s.name = @P1";

const TABLE_FILTER: &str = "
  AND t.name = @P2";

const ORDERING: &str = "
ORDER BY t.name, i.name, ic.key_ordinal";

pub struct ListIndexes;

impl ListIndexes {
    fn build_query(filter_table: bool) -> String {
        let mut sql = String::from(LIST_INDEXES_SQL);
        if filter_table {
            sql.push_str(TABLE_FILTER);
        }
        sql.push_str(ORDERING);
        sql
    }
}

#[async_trait]
impl CatalogTool for ListIndexes {
    fn contract(&self) -> ToolContract {
        ToolContract::new::<IndexArgs>(
            "list_indexes",
            "List all indexes in the database",
        )
    }

    async fn run(
        &self,
        conn: &dyn CatalogConnection,
        request: &QueryRequest,
    ) -> Result<Value, ToolError> {
        let rows = match &request.table_name {
            Some(table) => {
                conn.query(
                    &Self::build_query(true),
                    &[request.schema.as_str(), table.as_str()],
                )
                .await?
            }
            None => {
                conn.query(&Self::build_query(false), &[request.schema.as_str()])
                    .await?
            }
        };
        Ok(rows_value(rows))
    }
}
