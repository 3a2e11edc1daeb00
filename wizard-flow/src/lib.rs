pub mod collaborator;
pub mod error;
pub mod model;
pub mod parser;
pub mod runner;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use collaborator::{
    Collaborator, DisabledCollaborator, FEATURE_DISABLED, MIN_REFLECTION_CHARS, assess_reflection,
};
pub use error::{Result, WizardError};
pub use model::{
    AiResult, AnalysisBundle, ArticlePair, ArticleSummary, CompetencyAssessment, CriterionScore,
    EssayReview, ParagraphDraft, ParagraphFeedback, ParagraphSlot, ReflectionEntry, Stage, Tone,
    ToneAnalysis, WritingRubric,
};
pub use parser::ParseFailure;
pub use runner::WizardRunner;
pub use session::{Session, SessionConfig};
pub use storage::{InMemorySessionStorage, SessionStorage};

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct EchoCollaborator;

    #[async_trait]
    impl Collaborator for EchoCollaborator {
        async fn summarize(&self, text: &str) -> String {
            format!("summary: {text}")
        }

        async fn translate(&self, text: &str, target_lang: &str) -> String {
            format!("{target_lang}: {text}")
        }

        async fn analyze_tone(&self, _text: &str) -> AiResult<ToneAnalysis> {
            AiResult::Ok(ToneAnalysis::default())
        }

        async fn draft_feedback(&self, _essay: &str) -> String {
            "good draft".to_string()
        }

        async fn evaluate_rubric(&self, _essay: &str) -> AiResult<WritingRubric> {
            AiResult::Ok(WritingRubric::default())
        }

        async fn assess_reflection(&self, _text: &str) -> AiResult<CompetencyAssessment> {
            AiResult::Ok(CompetencyAssessment::default())
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
    async fn runner_walks_the_full_wizard() {
        let storage = Arc::new(InMemorySessionStorage::new());
        let runner = WizardRunner::new(storage, Arc::new(EchoCollaborator));

        let session = runner.create_session().await.unwrap();
        let id = session.id.clone();

        runner
            .set_articles(&id, "Article about rates", "Article about markets")
            .await
            .unwrap();
        let session = runner.advance(&id).await.unwrap();
        assert_eq!(session.stage, Stage::Analysis);
        assert!(
            session.analysis.as_ref().unwrap().summaries[0]
                .korean
                .starts_with("Korean:")
        );

        runner
            .set_reflection(&id, "The sourcing differs a lot between the two.")
            .await
            .unwrap();
        runner.advance(&id).await.unwrap();

        for slot in ParagraphSlot::ORDER {
            runner
                .update_paragraph(&id, slot, "paragraph text")
                .await
                .unwrap();
        }
        let (_, feedback) = runner
            .paragraph_feedback(&id, ParagraphSlot::Intro)
            .await
            .unwrap();
        assert!(feedback.is_ok());

        let session = runner.advance(&id).await.unwrap();
        assert_eq!(session.stage, Stage::Feedback);
        assert_eq!(session.essay_review.as_ref().unwrap().narrative, "good draft");

        runner
            .set_reflection(&id, "The feedback pointed at my weak transitions.")
            .await
            .unwrap();
        let session = runner.advance(&id).await.unwrap();
        assert_eq!(session.stage, Stage::Final);
        assert!(session.final_text.is_some());

        let session = runner.restart(&id).await.unwrap();
        assert_eq!(session.stage, Stage::Input);
        assert!(session.final_text.is_none());
    }

    #[tokio::test]
    async fn runner_reports_unknown_sessions() {
        let storage = Arc::new(InMemorySessionStorage::new());
        let runner = WizardRunner::new(storage, Arc::new(EchoCollaborator));
        assert!(matches!(
            runner.advance("no-such-id").await,
            Err(WizardError::SessionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn storage_round_trips_sessions() {
        let storage = InMemorySessionStorage::new();
        let session = Session::new();
        let id = session.id.clone();

        storage.save(session).await.unwrap();
        let retrieved = storage.get(&id).await.unwrap();
        assert!(retrieved.is_some());
        assert_eq!(retrieved.unwrap().stage, Stage::Input);

        storage.delete(&id).await.unwrap();
        assert!(storage.get(&id).await.unwrap().is_none());
    }
}
