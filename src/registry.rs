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
use std::collections::HashMap;
use std::sync::Arc;

use crate::tools::{all_tools, CatalogTool, ToolContract};

struct Entry {
    contract: ToolContract,
    tool: Arc<dyn CatalogTool>,
}

/// Tool name -> (contract, query set). Built once at startup.
pub struct ToolRegistry {
    entries: HashMap<&'static str, Entry>,
    order: Vec<&'static str>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Registry holding the six catalog tools.
    pub fn with_catalog_tools() -> Self {
        let mut registry = Self::new();
        for tool in all_tools() {
            registry.register(tool);
        }
        registry
    }

    /// Register a tool. A later registration under the same name wins.
    pub fn register(&mut self, tool: Arc<dyn CatalogTool>) {
        let contract = tool.contract();
        let name = contract.name;
        if self.entries.insert(name, Entry { contract, tool }).is_none() {
            self.order.push(name);
        }
    }

    pub fn get(&self, name: &str) -> Option<(&ToolContract, Arc<dyn CatalogTool>)> {
        self.entries
            .get(name)
            .map(|e| (&e.contract, e.tool.clone()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Every contract, in registration order.
    pub fn list_all(&self) -> Vec<ToolContract> {
        self.order
            .iter()
            .filter_map(|name| self.entries.get(name))
            .map(|e| e.contract.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::with_catalog_tools()
    }
}
