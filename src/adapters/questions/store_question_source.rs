//! Question source reading the `questions` collection.
//!
//! Each question is its own document:
//! `{ "id", "subDomainId", "text", "order" }`.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::domain::foundation::QuestionId;
use crate::domain::questionnaire::{Question, QuestionSet};
use crate::ports::{Collection, DocumentStore, Filter, LoadError, QuestionSource};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionDocument {
    id: QuestionId,
    text: String,
    #[serde(default)]
    order: i64,
}

/// [`QuestionSource`] backed by a [`DocumentStore`].
pub struct StoreQuestionSource {
    store: Arc<dyn DocumentStore>,
}

impl StoreQuestionSource {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl QuestionSource for StoreQuestionSource {
    async fn fetch_questions(&self, sub_domain_id: &str) -> Result<QuestionSet, LoadError> {
        let docs = self
            .store
            .list(
                Collection::Questions,
                &Filter::new().eq("subDomainId", sub_domain_id),
            )
            .await
            .map_err(|e| LoadError::Unavailable(e.to_string()))?;

        if docs.is_empty() {
            return Err(LoadError::Empty(sub_domain_id.to_string()));
        }

        let questions = docs
            .into_iter()
            .map(|doc| {
                serde_json::from_value::<QuestionDocument>(serde_json::Value::Object(doc))
                    .map(|q| Question::new(q.id, q.text, q.order))
                    .map_err(|e| LoadError::Malformed(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        QuestionSet::new(questions).map_err(|e| LoadError::Malformed(e.to_string()))
    }
}
