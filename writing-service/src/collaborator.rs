//! Model-backed implementation of the wizard's collaborator operations,
//! built on rig against OpenRouter. Transport failures and malformed model
//! output both degrade to the wizard's error shapes; nothing here can fail
//! a session transition.

use async_trait::async_trait;
use rig::{agent::Agent, client::CompletionClient, completion::Chat, providers::openrouter};
use tracing::warn;
use wizard_flow::{
    AiResult, Collaborator, CompetencyAssessment, ParagraphFeedback, ParseFailure, ToneAnalysis,
    WritingRubric, parser,
};

const MODEL: &str = "openai/gpt-4o-mini";

const SUMMARIZE_PREAMBLE: &str =
    "You are a news-literacy assistant. Summarize the given news article in English, \
     in five to ten sentences. Respond with the summary only, no preamble.";

const TRANSLATE_PREAMBLE: &str =
    "You are a translator. Translate the given text into the requested language. \
     Respond with the translation only.";

const TONE_PREAMBLE: &str = r#"You are a media analyst. Analyze the tone of the given news article.
Respond **only** with JSON of the form:
{
  "classification": "positive" | "neutral" | "negative",
  "score": <integer -3 to 3>,
  "key_points": ["...", "...", "..."],
  "emotional_phrases": ["..."],
  "credibility_score": <integer 1 to 10>,
  "objectivity_score": <integer 1 to 10>
}"#;

const FEEDBACK_PREAMBLE: &str =
    "You are an academic writing coach. Evaluate the following comparative explanatory essay \
     and provide constructive feedback in English. Focus on: content (clarity of the main idea, \
     richness of supporting details, logical development), organization (coherence of structure, \
     effectiveness of introductions and conclusions, use of transitions), vocabulary, language \
     use, and mechanics. Provide 3-5 specific improvement suggestions.";

const RUBRIC_PREAMBLE: &str = r#"You are an essay grader. Score the given comparative essay.
Respond **only** with JSON of the form:
{
  "content": {"score": <1-4>, "justification": "..."},
  "organization": {"score": <1-4>, "justification": "..."},
  "language": {"score": <1-4>, "justification": "..."},
  "overall": "..."
}"#;

const COMPETENCY_PREAMBLE: &str = r#"You assess a student's problem-solving competencies from their written reflection.
Respond **only** with JSON of the form:
{
  "problem_identification": <1-5>,
  "analysis": <1-5>,
  "solution_building": <1-5>,
  "reflection": <1-5>,
  "overall": "..."
}"#;

const PARAGRAPH_PREAMBLE: &str = r#"You are a writing coach reviewing one paragraph of a comparative essay.
Respond **only** with JSON of the form:
{
  "strengths": ["..."],
  "weaknesses": ["..."],
  "suggestion": "...",
  "recommended_score": <1-4>
}"#;

pub struct RigCollaborator {
    client: openrouter::Client,
}

impl RigCollaborator {
    pub fn new(api_key: &str) -> Self {
        Self {
            client: openrouter::Client::new(api_key),
        }
    }

    fn agent(&self, preamble: &str) -> Agent<openrouter::CompletionModel> {
        self.client.agent(MODEL).preamble(preamble).build()
    }

    async fn chat(&self, preamble: &str, prompt: &str) -> Result<String, String> {
        self.agent(preamble)
            .chat(prompt, vec![])
            .await
            .map_err(|e| e.to_string())
    }

    /// Structured call: chat, then push the raw response through the
    /// tolerant parser. A transport error becomes a ParseFailure with an
    /// empty raw response.
    async fn chat_structured<T: serde::de::DeserializeOwned>(
        &self,
        preamble: &str,
        prompt: &str,
        operation: &str,
    ) -> AiResult<T> {
        match self.chat(preamble, prompt).await {
            Ok(raw) => parser::parse_as(&raw),
            Err(e) => {
                warn!(operation, error = %e, "model call failed");
                AiResult::Err(ParseFailure::new(format!("model call failed: {e}"), ""))
            }
        }
    }
}

#[async_trait]
impl Collaborator for RigCollaborator {
    async fn summarize(&self, text: &str) -> String {
        match self.chat(SUMMARIZE_PREAMBLE, text).await {
            Ok(summary) => summary.trim().to_string(),
            Err(e) => {
                warn!(error = %e, "summarize failed");
                format!("summary unavailable: {e}")
            }
        }
    }

    async fn translate(&self, text: &str, target_lang: &str) -> String {
        let prompt = format!("Translate into {target_lang}:\n\n{text}");
        match self.chat(TRANSLATE_PREAMBLE, &prompt).await {
            Ok(translated) => translated.trim().to_string(),
            Err(e) => {
                warn!(error = %e, "translate failed");
                format!("translation unavailable: {e}")
            }
        }
    }

    async fn analyze_tone(&self, text: &str) -> AiResult<ToneAnalysis> {
        self.chat_structured(TONE_PREAMBLE, text, "analyze_tone")
            .await
    }

    async fn draft_feedback(&self, essay: &str) -> String {
        match self.chat(FEEDBACK_PREAMBLE, essay).await {
            Ok(feedback) => feedback.trim().to_string(),
            Err(e) => {
                warn!(error = %e, "draft feedback failed");
                format!("feedback unavailable: {e}")
            }
        }
    }

    async fn evaluate_rubric(&self, essay: &str) -> AiResult<WritingRubric> {
        self.chat_structured(RUBRIC_PREAMBLE, essay, "evaluate_rubric")
            .await
    }

    async fn assess_reflection(&self, text: &str) -> AiResult<CompetencyAssessment> {
        self.chat_structured(COMPETENCY_PREAMBLE, text, "assess_reflection")
            .await
    }

    async fn paragraph_feedback(
        &self,
        text: &str,
        slot_label: &str,
        context: Option<&str>,
    ) -> AiResult<ParagraphFeedback> {
        let prompt = match context {
            Some(context) => format!(
                "Section: {slot_label}\n\nArticle context:\n{context}\n\nParagraph:\n{text}"
            ),
            None => format!("Section: {slot_label}\n\nParagraph:\n{text}"),
        };
        self.chat_structured(PARAGRAPH_PREAMBLE, &prompt, "paragraph_feedback")
            .await
    }
}
