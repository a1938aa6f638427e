//! Agent configuration: prompt tables and tool names.

use std::collections::HashMap;

use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Prompt type used when none is requested or the requested one is missing.
pub const DEFAULT_PROMPT_TYPE: &str = "standardAssistant";

/// Catalog search tool whose results feed the product rail.
pub const PRODUCT_SEARCH_TOOL: &str = "search_shop_catalog";

/// Instruction used when the prompt table has no usable entry.
pub const DEFAULT_INSTRUCTIONS: &str =
    "You are a helpful shopping assistant for this store. Answer questions about \
     products and orders, and use the available tools to look up live data.";

/// Static configuration for an agent deployment.
#[derive(Debug, Clone, Builder, Serialize, Deserialize, Default)]
pub struct ShopchatConfig {
    /// Prompt-type to system-instruction table.
    pub prompts: Option<HashMap<String, String>>,
    /// Overrides [`DEFAULT_PROMPT_TYPE`].
    pub default_prompt_type: Option<String>,
    /// Overrides [`PRODUCT_SEARCH_TOOL`].
    pub product_search_tool: Option<String>,
}

impl ShopchatConfig {
    /// Parse a configuration document.
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// The fallback prompt type.
    pub fn default_prompt_type(&self) -> &str {
        self.default_prompt_type
            .as_deref()
            .unwrap_or(DEFAULT_PROMPT_TYPE)
    }

    /// Name of the catalog search tool.
    pub fn product_search_tool(&self) -> &str {
        self.product_search_tool
            .as_deref()
            .unwrap_or(PRODUCT_SEARCH_TOOL)
    }

    /// Resolve the system instruction for `prompt_type`.
    ///
    /// Falls back to the default prompt type, then to
    /// [`DEFAULT_INSTRUCTIONS`], so a missing table entry never breaks a
    /// turn.
    pub fn system_instruction(&self, prompt_type: &str) -> &str {
        let prompts = self.prompts.as_ref();
        prompts
            .and_then(|table| table.get(prompt_type))
            .or_else(|| prompts.and_then(|table| table.get(self.default_prompt_type())))
            .map(String::as_str)
            .unwrap_or(DEFAULT_INSTRUCTIONS)
    }
}
