//! Caching decorator for question sources.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::questionnaire::QuestionSet;
use crate::ports::{LoadError, QuestionSource};

/// Keeps successfully loaded question sets per sub-domain. Failures are not
/// cached, so a retry goes back to the inner source.
pub struct CachedQuestionSource {
    inner: Arc<dyn QuestionSource>,
    cache: RwLock<HashMap<String, QuestionSet>>,
}

impl CachedQuestionSource {
    pub fn new(inner: Arc<dyn QuestionSource>) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Drops the cached set for `sub_domain_id`.
    pub async fn invalidate(&self, sub_domain_id: &str) {
        self.cache.write().await.remove(sub_domain_id);
    }
}

#[async_trait]
impl QuestionSource for CachedQuestionSource {
    async fn fetch_questions(&self, sub_domain_id: &str) -> Result<QuestionSet, LoadError> {
        if let Some(set) = self.cache.read().await.get(sub_domain_id) {
            return Ok(set.clone());
        }

        let set = self.inner.fetch_questions(sub_domain_id).await?;
        self.cache
            .write()
            .await
            .insert(sub_domain_id.to_string(), set.clone());
        Ok(set)
    }
}
