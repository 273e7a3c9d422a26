//! Question source adapters.

mod cached;
mod store_question_source;

pub use cached::CachedQuestionSource;
pub use store_question_source::StoreQuestionSource;
