//! The boundary between the wizard and the model that does the actual
//! summarizing, translating, and grading.
//!
//! Every operation is infallible from the session's point of view: string
//! producers return an error-prefixed string on failure, structured
//! producers return an [`AiResult`] carrying a [`ParseFailure`]. A
//! collaborator fault can degrade a field but never abort a transition.

use async_trait::async_trait;

use crate::model::{
    AiResult, CompetencyAssessment, ParagraphFeedback, ToneAnalysis, WritingRubric,
};
use crate::parser::ParseFailure;

/// Reflections shorter than this never reach the model; they short-circuit
/// to the canned insufficient-input record.
pub const MIN_REFLECTION_CHARS: usize = 10;

/// Notice used by [`DisabledCollaborator`] when no model credential is
/// configured.
pub const FEATURE_DISABLED: &str = "AI features disabled: no model credential configured";

#[async_trait]
pub trait Collaborator: Send + Sync {
    /// English summary of an article.
    async fn summarize(&self, text: &str) -> String;

    /// Translation of `text` into `target_lang`.
    async fn translate(&self, text: &str, target_lang: &str) -> String;

    /// Structured tone analysis of an article.
    async fn analyze_tone(&self, text: &str) -> AiResult<ToneAnalysis>;

    /// Narrative critique of the assembled essay.
    async fn draft_feedback(&self, essay: &str) -> String;

    /// Rubric evaluation of the assembled essay.
    async fn evaluate_rubric(&self, essay: &str) -> AiResult<WritingRubric>;

    /// Competency assessment of a free-text reflection. Callers should go
    /// through the module-level [`assess_reflection`] which applies the
    /// minimum-length guard.
    async fn assess_reflection(&self, text: &str) -> AiResult<CompetencyAssessment>;

    /// Feedback on a single paragraph. `context` carries the article
    /// summaries when they are available.
    async fn paragraph_feedback(
        &self,
        text: &str,
        slot_label: &str,
        context: Option<&str>,
    ) -> AiResult<ParagraphFeedback>;
}

/// Length-guarded entry point for reflection assessment. Input under
/// [`MIN_REFLECTION_CHARS`] bypasses the collaborator entirely.
pub async fn assess_reflection(
    collaborator: &dyn Collaborator,
    text: &str,
) -> AiResult<CompetencyAssessment> {
    if text.trim().chars().count() < MIN_REFLECTION_CHARS {
        return AiResult::Ok(CompetencyAssessment::insufficient_input());
    }
    collaborator.assess_reflection(text).await
}

/// Collaborator installed at startup when no credential is available. Every
/// operation answers with a fixed disabled notice; the wizard keeps working
/// with degraded content.
pub struct DisabledCollaborator;

impl DisabledCollaborator {
    fn disabled_failure() -> ParseFailure {
        ParseFailure::new(FEATURE_DISABLED, "")
    }
}

#[async_trait]
impl Collaborator for DisabledCollaborator {
    async fn summarize(&self, _text: &str) -> String {
        FEATURE_DISABLED.to_string()
    }

    async fn translate(&self, _text: &str, _target_lang: &str) -> String {
        FEATURE_DISABLED.to_string()
    }

    async fn analyze_tone(&self, _text: &str) -> AiResult<ToneAnalysis> {
        AiResult::Err(Self::disabled_failure())
    }

    async fn draft_feedback(&self, _essay: &str) -> String {
        FEATURE_DISABLED.to_string()
    }

    async fn evaluate_rubric(&self, _essay: &str) -> AiResult<WritingRubric> {
        AiResult::Err(Self::disabled_failure())
    }

    async fn assess_reflection(&self, _text: &str) -> AiResult<CompetencyAssessment> {
        AiResult::Err(Self::disabled_failure())
    }

    async fn paragraph_feedback(
        &self,
        _text: &str,
        _slot_label: &str,
        _context: Option<&str>,
    ) -> AiResult<ParagraphFeedback> {
        AiResult::Err(Self::disabled_failure())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingCollaborator {
        assess_calls: AtomicUsize,
    }

    #[async_trait]
    impl Collaborator for CountingCollaborator {
        async fn summarize(&self, _text: &str) -> String {
            String::new()
        }

        async fn translate(&self, _text: &str, _target_lang: &str) -> String {
            String::new()
        }

        async fn analyze_tone(&self, _text: &str) -> AiResult<ToneAnalysis> {
            AiResult::Ok(ToneAnalysis::default())
        }

        async fn draft_feedback(&self, _essay: &str) -> String {
            String::new()
        }

        async fn evaluate_rubric(&self, _essay: &str) -> AiResult<WritingRubric> {
            AiResult::Ok(WritingRubric::default())
        }

        async fn assess_reflection(&self, _text: &str) -> AiResult<CompetencyAssessment> {
            self.assess_calls.fetch_add(1, Ordering::SeqCst);
            AiResult::Ok(CompetencyAssessment {
                problem_identification: 4,
                analysis: 4,
                solution_building: 3,
                reflection: 5,
                overall: "solid reflection".to_string(),
            })
        }

        async fn paragraph_feedback(
            &self,
            _text: &str,
            _slot_label: &str,
            _context: Option<&str>,
        ) -> AiResult<ParagraphFeedback> {
            AiResult::Ok(ParagraphFeedback::default())
        }
    }

    #[tokio::test]
    async fn short_reflection_never_reaches_the_model() {
        let collab = CountingCollaborator::default();
        let result = assess_reflection(&collab, "ok").await;
        assert_eq!(
            result.ok().unwrap(),
            &CompetencyAssessment::insufficient_input()
        );
        assert_eq!(collab.assess_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn meaningful_reflection_is_sent_to_the_model() {
        let collab = CountingCollaborator::default();
        let text = "I learned to compare framing choices across both outlets.";
        let result = assess_reflection(&collab, text).await;
        assert_eq!(result.ok().unwrap().reflection, 5);
        assert_eq!(collab.assess_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn disabled_collaborator_degrades_every_operation() {
        let collab = DisabledCollaborator;
        assert_eq!(collab.summarize("anything").await, FEATURE_DISABLED);
        let tone = collab.analyze_tone("anything").await;
        assert_eq!(tone.err().unwrap().error, FEATURE_DISABLED);
    }
}
