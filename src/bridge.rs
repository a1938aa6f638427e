//! Seam for MCP-style tool servers.
//!
//! A [`ToolBridge`] hides the transport to a tool server behind an async
//! trait: callers discover tools, hand them to the model layer, and the
//! model executes them through the same bridge. Tool input schemas are
//! tightened with [`enforce_strict_schema`] before they reach a model,
//! since strict structured-output modes reject object schemas that leave
//! `additionalProperties` open.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

use crate::error::Result;
use crate::types::ToolCompletion;

/// Which tool server a connection reaches.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum McpServerKind {
    /// Catalog and storefront operations, no auth required.
    Storefront,
    /// Customer-account operations, may demand authorization.
    Customer,
}

/// A tool advertised by a bridge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub input_schema: Value,
}

impl ToolDescriptor {
    pub fn new(name: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: None,
            input_schema,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Tighten the input schema for strict structured-output modes.
    pub fn with_strict_schema(mut self) -> Self {
        self.input_schema = enforce_strict_schema(&self.input_schema);
        self
    }
}

/// Connection to a tool server.
#[async_trait]
pub trait ToolBridge: Send + Sync {
    /// Discover the tools this bridge exposes.
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>>;

    /// Execute a tool and report how the call ended.
    async fn call_tool(&self, name: &str, arguments: Value) -> Result<ToolCompletion>;
}

/// Recursively pin down object schemas for strict validation.
///
/// Every object schema gets `additionalProperties: false` unless it
/// already declares a value, and a `properties` map if it has none.
/// Nested schemas under `properties`, `items`, combinators, and
/// object-valued `additionalProperties` are tightened the same way.
pub fn enforce_strict_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(obj) => {
            let mut strict = serde_json::Map::new();
            for (key, value) in obj {
                let next = match key.as_str() {
                    "properties" => enforce_property_schemas(value),
                    _ => enforce_strict_schema(value),
                };
                strict.insert(key.clone(), next);
            }
            if is_object_schema(schema) {
                strict
                    .entry("additionalProperties")
                    .or_insert(Value::Bool(false));
                strict
                    .entry("properties")
                    .or_insert_with(|| Value::Object(serde_json::Map::new()));
            }
            Value::Object(strict)
        }
        Value::Array(items) => Value::Array(items.iter().map(enforce_strict_schema).collect()),
        _ => schema.clone(),
    }
}

// The value under "properties" is a name-to-schema map, not a schema
// itself, so only its entries are tightened.
fn enforce_property_schemas(properties: &Value) -> Value {
    if let Value::Object(map) = properties {
        let mut strict = serde_json::Map::new();
        for (key, value) in map {
            strict.insert(key.clone(), enforce_strict_schema(value));
        }
        Value::Object(strict)
    } else {
        enforce_strict_schema(properties)
    }
}

fn is_object_schema(value: &Value) -> bool {
    if let Value::Object(obj) = value {
        matches!(obj.get("type"), Some(Value::String(t)) if t == "object")
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::types::CompletionStatus;

    use super::*;

    #[test]
    fn strict_schema_closes_object_schemas_recursively() {
        let schema = json!({
            "type": "object",
            "properties": {
                "query": {"type": "string"},
                "filters": {
                    "type": "object",
                    "properties": {
                        "color": {"type": "string"}
                    }
                }
            },
            "required": ["query"]
        });
        let strict = enforce_strict_schema(&schema);
        assert_eq!(strict["additionalProperties"], false);
        assert_eq!(strict["properties"]["filters"]["additionalProperties"], false);
        assert_eq!(strict["required"], json!(["query"]));
    }

    #[test]
    fn strict_schema_keeps_explicit_additional_properties() {
        let schema = json!({
            "type": "object",
            "properties": {},
            "additionalProperties": true
        });
        let strict = enforce_strict_schema(&schema);
        assert_eq!(strict["additionalProperties"], true);
    }

    #[test]
    fn strict_schema_inserts_missing_properties_map() {
        let strict = enforce_strict_schema(&json!({"type": "object"}));
        assert_eq!(
            strict,
            json!({"type": "object", "additionalProperties": false, "properties": {}})
        );
    }

    #[test]
    fn strict_schema_descends_into_items_and_combinators() {
        let schema = json!({
            "type": "object",
            "properties": {
                "variants": {
                    "type": "array",
                    "items": {"type": "object", "properties": {"sku": {"type": "string"}}}
                },
                "sort": {
                    "anyOf": [
                        {"type": "string"},
                        {"type": "object", "properties": {"field": {"type": "string"}}}
                    ]
                }
            }
        });
        let strict = enforce_strict_schema(&schema);
        assert_eq!(
            strict["properties"]["variants"]["items"]["additionalProperties"],
            false
        );
        assert_eq!(
            strict["properties"]["sort"]["anyOf"][1]["additionalProperties"],
            false
        );
        assert!(strict["properties"]["sort"]["anyOf"][0]
            .get("additionalProperties")
            .is_none());
    }

    #[test]
    fn strict_schema_leaves_non_object_schemas_alone() {
        assert_eq!(
            enforce_strict_schema(&json!({"type": "string"})),
            json!({"type": "string"})
        );
        assert_eq!(enforce_strict_schema(&json!(true)), json!(true));
    }

    #[test]
    fn property_named_type_does_not_fool_the_walker() {
        let schema = json!({
            "type": "object",
            "properties": {
                "type": {"type": "string"}
            }
        });
        let strict = enforce_strict_schema(&schema);
        assert!(strict["properties"].get("additionalProperties").is_none());
        assert_eq!(strict["properties"]["type"], json!({"type": "string"}));
    }

    struct StaticBridge;

    #[async_trait]
    impl ToolBridge for StaticBridge {
        async fn list_tools(&self) -> Result<Vec<ToolDescriptor>> {
            Ok(vec![ToolDescriptor::new(
                "search_shop_catalog",
                json!({"type": "object", "properties": {"query": {"type": "string"}}}),
            )
            .with_description("Search products")
            .with_strict_schema()])
        }

        async fn call_tool(&self, name: &str, arguments: Value) -> Result<ToolCompletion> {
            Ok(ToolCompletion {
                call_id: "call_1".into(),
                tool_name: name.into(),
                arguments,
                status: CompletionStatus::Completed,
                output: Some(json!({"products": []})),
                error: None,
                latency_ms: Some(12),
            })
        }
    }

    #[tokio::test]
    async fn bridge_round_trip_produces_strict_tools_and_completions() {
        let bridge = StaticBridge;
        let tools = bridge.list_tools().await.unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].input_schema["additionalProperties"], false);

        let completion = bridge
            .call_tool("search_shop_catalog", json!({"query": "boots"}))
            .await
            .unwrap();
        assert_eq!(completion.status, CompletionStatus::Completed);
        assert_eq!(completion.tool_name, "search_shop_catalog");
    }

    #[test]
    fn server_kind_round_trips_through_strings() {
        assert_eq!(McpServerKind::Storefront.to_string(), "storefront");
        assert_eq!(
            "customer".parse::<McpServerKind>().unwrap(),
            McpServerKind::Customer
        );
    }
}
