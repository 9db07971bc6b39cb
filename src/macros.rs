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
/// Return early with a successful text tool result.
macro_rules! mcp_return {
    ($text:expr) => {
        return Ok(rmcp::model::CallToolResult::success(vec![
            rmcp::model::Content::text($text),
        ]))
    };
}
