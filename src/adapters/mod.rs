//! Adapters - Implementations of port interfaces.
//!
//! - `ai` - AI providers and the LLM-backed summary generator
//! - `connectivity` - watch-channel connectivity monitor
//! - `document_store` - in-memory document store
//! - `questions` - store-backed and cached question sources

pub mod ai;
pub mod connectivity;
pub mod document_store;
pub mod questions;

pub use ai::{LlmSummaryGenerator, MockAIProvider, OpenAIConfig, OpenAIProvider};
pub use connectivity::WatchConnectivityMonitor;
pub use document_store::InMemoryDocumentStore;
pub use questions::{CachedQuestionSource, StoreQuestionSource};
