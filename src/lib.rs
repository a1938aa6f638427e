//! Streaming chat-agent core for storefront assistants.
//!
//! Provides the conversation plumbing a storefront chat app needs: history
//! normalization into a canonical wire shape, a streaming turn runner with
//! pluggable handlers, tool-outcome translation, and an in-memory debug
//! telemetry store with bounded retention.
//!
//! # Quick Start
//!
//! ```
//! use shopchat::prelude::*;
//!
//! let store = DebugStore::new();
//! store.record_conversation_start("c1", "demo.myshopify.com");
//! store.record_message("c1", Role::User, "Hi");
//!
//! let data = store.debug_data();
//! assert_eq!(data.conversations.len(), 1);
//! assert_eq!(data.stats.active_conversations, 1);
//! ```

pub mod bridge;
pub mod config;
pub mod error;
pub mod model;
pub mod normalize;
pub mod outcome;
pub mod prelude;
pub mod runner;
pub mod telemetry;
pub mod types;
