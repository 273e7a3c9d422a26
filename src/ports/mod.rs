//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `QuestionSource` - ordered questions of a sub-domain
//! - `DocumentStore` - remote document database
//! - `ConnectivityObserver` - online/offline transitions
//! - `SummaryGenerator` - AI summary of a completed report
//! - `AIProvider` - chat-completion provider used by the default summarizer

mod ai_provider;
mod connectivity;
mod document_store;
mod question_source;
mod summary_generator;

pub use ai_provider::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, Message,
    MessageRole, ProviderInfo, RequestMetadata, TokenUsage,
};
pub use connectivity::{Connectivity, ConnectivityObserver};
pub use document_store::{Collection, Document, DocumentStore, Filter, ID_FIELD};
pub use question_source::{LoadError, QuestionSource};
pub use summary_generator::{SummaryError, SummaryGenerator, SummaryItem, SummaryRequest};
