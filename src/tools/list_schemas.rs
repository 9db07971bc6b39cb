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

use super::{rows_value, CatalogTool, NoArgs, QueryRequest, ToolContract};
use crate::catalog::CatalogConnection;
use crate::error::ToolError;

const LIST_SCHEMAS_SQL: &str = "
SELECT
  SCHEMA_NAME
FROM INFORMATION_SCHEMA.SCHEMATA
ORDER BY SCHEMA_NAME";

pub struct ListSchemas;

#[async_trait]
impl CatalogTool for ListSchemas {
    fn contract(&self) -> ToolContract {
        ToolContract::new::<NoArgs>(
            "list_schemas",
            "List all schemas in the database",
        )
    }

    async fn run(
        &self,
        conn: &dyn CatalogConnection,
        _request: &QueryRequest,
    ) -> Result<Value, ToolError> {
        let rows = conn.query(LIST_SCHEMAS_SQL, &[]).await?;
        Ok(rows_value(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixture::{row, FixtureConnection};
    use serde_json::json;

    #[tokio::test]
    async fn test_list_schemas_keeps_catalog_order() {
        let conn = FixtureConnection::new().respond(
            "INFORMATION_SCHEMA.SCHEMATA",
            vec![
                row(&[("SCHEMA_NAME", json!("dbo"))]),
                row(&[("SCHEMA_NAME", json!("sales"))]),
            ],
        );
        let req = ListSchemas.prepare(&Default::default()).unwrap();
        let out = ListSchemas.run(&conn, &req).await.unwrap();
        assert_eq!(
            out,
            json!([{"SCHEMA_NAME": "dbo"}, {"SCHEMA_NAME": "sales"}])
        );
        let calls = conn.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].1.is_empty());
        assert!(calls[0].0.contains("ORDER BY SCHEMA_NAME"));
    }
}
