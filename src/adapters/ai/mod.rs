//! AI adapters - provider implementations and the LLM-backed summarizer.

mod llm_summary_generator;
mod mock_provider;
mod openai_provider;

pub use llm_summary_generator::{LlmSummaryGenerator, SummarySettings};
pub use mock_provider::{MockAIProvider, MockError, MockResponse, DEFAULT_MOCK_SUMMARY};
pub use openai_provider::{OpenAIConfig, OpenAIProvider};
