//! Summary generator backed by an [`AIProvider`].
//!
//! Builds a compliance-review prompt from the answered questions, asks for a
//! JSON object with `strengths`, `issues` and `next_steps`, and parses the
//! reply into an [`AiSummary`].

use async_trait::async_trait;
use std::fmt::Write as _;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::report::AiSummary;
use crate::ports::{
    AIProvider, CompletionRequest, MessageRole, RequestMetadata, SummaryError, SummaryGenerator,
    SummaryRequest,
};

const SYSTEM_PROMPT: &str = "You are an experienced compliance auditor. \
You review questionnaire results and write short, practical feedback. \
Reply with a single JSON object and nothing else.";

/// Sampling settings for summary requests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummarySettings {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for SummarySettings {
    fn default() -> Self {
        Self {
            temperature: 0.4,
            max_tokens: 600,
        }
    }
}

/// [`SummaryGenerator`] that prompts an LLM.
pub struct LlmSummaryGenerator {
    provider: Arc<dyn AIProvider>,
    settings: SummarySettings,
}

impl LlmSummaryGenerator {
    pub fn new(provider: Arc<dyn AIProvider>) -> Self {
        Self {
            provider,
            settings: SummarySettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: SummarySettings) -> Self {
        self.settings = settings;
        self
    }

    fn build_prompt(request: &SummaryRequest) -> String {
        let mut prompt = String::new();
        let _ = writeln!(
            prompt,
            "Assessment: {} ({}) at {}.",
            request.assessment_name, request.sub_domain_name, request.facility_name
        );
        prompt.push_str("Answers:\n");
        for (n, item) in request.items.iter().enumerate() {
            let _ = writeln!(prompt, "{}. {} -> {}", n + 1, item.question, item.answer);
        }
        prompt.push_str(
            "\nReturn JSON with exactly these keys:\n\
             {\"strengths\": [string], \
             \"issues\": [{\"area\": string, \"problem\": string, \"improvement\": string, \"where\": string, \"how\": string}], \
             \"next_steps\": [string]}\n\
             List an issue for every NON_COMPLIANT answer. Ignore NOT_APPLICABLE answers.",
        );
        prompt
    }
}

/// Removes a surrounding Markdown code fence, if any.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the language tag line.
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

#[async_trait]
impl SummaryGenerator for LlmSummaryGenerator {
    async fn generate(&self, request: &SummaryRequest) -> Result<AiSummary, SummaryError> {
        if !request.has_question_texts() {
            return Err(SummaryError::NoQuestionTexts);
        }

        let metadata = RequestMetadata::for_user(request.user_id.clone(), Uuid::new_v4().to_string())
            .with_report(request.report_id.clone());
        let completion = CompletionRequest::new(metadata)
            .with_system_prompt(SYSTEM_PROMPT)
            .with_message(MessageRole::User, Self::build_prompt(request))
            .with_temperature(self.settings.temperature)
            .with_max_tokens(self.settings.max_tokens)
            .with_json_output(true);

        let response = self.provider.complete(completion).await?;

        tracing::debug!(
            report_id = %request.report_id,
            model = %response.model,
            tokens = response.usage.total_tokens,
            "AI summary received"
        );

        AiSummary::from_json(strip_code_fence(&response.content))
            .map_err(|e| SummaryError::Malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAIProvider, MockError};
    use crate::domain::foundation::{ReportId, UserId};
    use crate::domain::questionnaire::AnswerType;
    use crate::ports::SummaryItem;

    fn request(items: Vec<SummaryItem>) -> SummaryRequest {
        SummaryRequest {
            user_id: UserId::new("user-1").unwrap(),
            report_id: ReportId::new("rep-1").unwrap(),
            assessment_name: "Fire Safety Audit".to_string(),
            sub_domain_name: "Fire Safety".to_string(),
            facility_name: "Main Plant".to_string(),
            items,
        }
    }

    fn item(question: &str, answer: AnswerType) -> SummaryItem {
        SummaryItem {
            question: question.to_string(),
            answer,
        }
    }

    #[test]
    fn strip_code_fence_handles_plain_and_fenced_text() {
        assert_eq!(strip_code_fence("  {\"a\":1} "), "{\"a\":1}");
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n{}\n```\n"), "{}");
    }

    #[test]
    fn prompt_lists_every_answer() {
        let prompt = LlmSummaryGenerator::build_prompt(&request(vec![
            item("Exits clear?", AnswerType::Compliant),
            item("Extinguishers serviced?", AnswerType::NonCompliant),
        ]));
        assert!(prompt.contains("1. Exits clear? -> COMPLIANT"));
        assert!(prompt.contains("2. Extinguishers serviced? -> NON_COMPLIANT"));
        assert!(prompt.contains("\"next_steps\""));
    }

    #[tokio::test]
    async fn parses_fenced_json_reply() {
        let provider = MockAIProvider::new()
            .with_response("```json\n{\"strengths\":[\"Good signage\"],\"issues\":[],\"next_steps\":[]}\n```");
        let generator = LlmSummaryGenerator::new(Arc::new(provider.clone()));

        let summary = generator
            .generate(&request(vec![item("Signs?", AnswerType::Compliant)]))
            .await
            .unwrap();

        assert_eq!(summary.strengths, vec!["Good signage"]);
        let call = &provider.get_calls()[0];
        assert!(call.json_output);
        assert_eq!(call.temperature, Some(0.4));
        assert_eq!(call.max_tokens, Some(600));
    }

    #[tokio::test]
    async fn refuses_requests_without_question_texts() {
        let provider = MockAIProvider::new();
        let generator = LlmSummaryGenerator::new(Arc::new(provider.clone()));

        let result = generator.generate(&request(vec![])).await;

        assert!(matches!(result, Err(SummaryError::NoQuestionTexts)));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn non_json_reply_is_malformed() {
        let provider = MockAIProvider::new().with_response("Everything looks fine!");
        let generator = LlmSummaryGenerator::new(Arc::new(provider));

        let result = generator
            .generate(&request(vec![item("Q", AnswerType::Compliant)]))
            .await;

        assert!(matches!(result, Err(SummaryError::Malformed(_))));
    }

    #[tokio::test]
    async fn provider_errors_are_wrapped() {
        let provider = MockAIProvider::new().with_error(MockError::Unavailable {
            message: "maintenance".to_string(),
        });
        let generator = LlmSummaryGenerator::new(Arc::new(provider));

        let result = generator
            .generate(&request(vec![item("Q", AnswerType::Compliant)]))
            .await;

        assert!(matches!(result, Err(SummaryError::Provider(_))));
    }
}
