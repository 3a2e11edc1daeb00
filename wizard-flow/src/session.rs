//! The per-user session: a linear five-stage wizard with validation-gated
//! transitions and compute-once caching of everything the model produces.

use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::collaborator::{self, Collaborator};
use crate::error::{Result, WizardError};
use crate::model::{
    AiResult, AnalysisBundle, ArticlePair, ArticleSummary, CompetencyAssessment, EssayReview,
    ParagraphDraft, ParagraphFeedback, ParagraphSlot, ReflectionEntry, Stage, ToneAnalysis,
};

/// Cache-invalidation knobs. The source material disagreed with itself on
/// both of these, so they are explicit configuration instead of folklore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Regenerate summaries and tone analyses when an article is edited
    /// after analysis already ran. Default false: the cached analysis stays,
    /// even if it now describes stale text.
    pub invalidate_summaries_on_edit: bool,
    /// Drop a slot's cached feedback when its text changes. Default true;
    /// set false to reproduce the legacy keep-stale-feedback behavior.
    pub invalidate_paragraph_feedback_on_edit: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            invalidate_summaries_on_edit: false,
            invalidate_paragraph_feedback_on_edit: true,
        }
    }
}

/// All state for one user's run through the wizard. An explicit value owned
/// by the caller; every operation is a method, nothing lives in ambient
/// state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub stage: Stage,
    pub config: SessionConfig,
    pub articles: Option<ArticlePair>,
    /// `None` until the analysis batch has run; the `Option` is the
    /// compute-once flag for summaries and tone analyses together.
    pub analysis: Option<AnalysisBundle>,
    pub draft: HashMap<ParagraphSlot, ParagraphDraft>,
    pub essay_review: Option<EssayReview>,
    pub analysis_reflection: String,
    pub feedback_reflection: String,
    pub reflection_log: Vec<ReflectionEntry>,
    pub competency: Option<AiResult<CompetencyAssessment>>,
    pub final_text: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    pub fn with_config(config: SessionConfig) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            stage: Stage::Input,
            config,
            articles: None,
            analysis: None,
            draft: Self::empty_draft(),
            essay_review: None,
            analysis_reflection: String::new(),
            feedback_reflection: String::new(),
            reflection_log: Vec::new(),
            competency: None,
            final_text: None,
        }
    }

    fn empty_draft() -> HashMap<ParagraphSlot, ParagraphDraft> {
        ParagraphSlot::ORDER
            .into_iter()
            .map(|slot| (slot, ParagraphDraft::default()))
            .collect()
    }

    /// Store both article texts. Only legal in the input stage; articles
    /// are immutable once analysis has started except by coming `back()`
    /// to input first.
    pub fn set_articles(
        &mut self,
        first: impl Into<String>,
        second: impl Into<String>,
    ) -> Result<()> {
        if self.stage != Stage::Input {
            return Err(WizardError::InvalidStage {
                operation: "set_articles",
                stage: self.stage,
            });
        }
        let first = first.into();
        let second = second.into();
        if first.trim().is_empty() || second.trim().is_empty() {
            return Err(WizardError::Validation(
                "both article texts must be non-empty".to_string(),
            ));
        }
        if self.analysis.is_some() && self.config.invalidate_summaries_on_edit {
            info!(session_id = %self.id, "article edit invalidates cached analysis");
            self.analysis = None;
        }
        self.articles = Some(ArticlePair { first, second });
        Ok(())
    }

    /// Pure completeness check for the current stage. Empty result means
    /// `advance` will proceed; each entry is a user-facing message naming
    /// one missing requirement.
    pub fn unmet_requirements(&self) -> Vec<String> {
        let mut unmet = Vec::new();
        match self.stage {
            Stage::Input => {
                let (first_ok, second_ok) = match &self.articles {
                    Some(pair) => (
                        !pair.first.trim().is_empty(),
                        !pair.second.trim().is_empty(),
                    ),
                    None => (false, false),
                };
                if !first_ok {
                    unmet.push("article 1 text is required".to_string());
                }
                if !second_ok {
                    unmet.push("article 2 text is required".to_string());
                }
            }
            Stage::Analysis => {
                if self.analysis_reflection.trim().is_empty() {
                    unmet.push("write a short reflection on the analysis before drafting".to_string());
                }
            }
            Stage::Draft => {
                for slot in ParagraphSlot::ORDER {
                    let filled = self
                        .draft
                        .get(&slot)
                        .is_some_and(|d| !d.text.trim().is_empty());
                    if !filled {
                        unmet.push(format!("paragraph '{}' is empty", slot.id()));
                    }
                }
            }
            Stage::Feedback => {
                if self.feedback_reflection.trim().is_empty() {
                    unmet.push("write a short reflection on the feedback before finishing".to_string());
                }
            }
            Stage::Final => {
                unmet.push("the essay is complete; restart to begin a new comparison".to_string());
            }
        }
        unmet
    }

    /// Move to the next stage if the current stage's requirements are met,
    /// running that transition's one-time side effects. On refusal the
    /// session is left untouched and the error carries every unmet
    /// requirement.
    pub async fn advance(&mut self, collaborator: &dyn Collaborator) -> Result<Stage> {
        let requirements = self.unmet_requirements();
        if !requirements.is_empty() {
            return Err(WizardError::StageIncomplete {
                stage: self.stage,
                requirements,
            });
        }
        match self.stage {
            Stage::Input => {
                self.ensure_analysis(collaborator).await;
                self.stage = Stage::Analysis;
            }
            Stage::Analysis => {
                self.log_reflection(Stage::Analysis);
                self.stage = Stage::Draft;
            }
            Stage::Draft => {
                self.ensure_essay_review(collaborator).await;
                self.stage = Stage::Feedback;
            }
            Stage::Feedback => {
                self.log_reflection(Stage::Feedback);
                self.ensure_competency(collaborator).await;
                if self.final_text.is_none() {
                    // Seeded once; thereafter the final text is edited
                    // independently of the draft slots.
                    self.final_text = Some(self.assembled_draft());
                }
                self.stage = Stage::Final;
            }
            Stage::Final => {
                // Unreachable in practice: Final always reports an unmet
                // requirement above. Kept total for safety.
                return Err(WizardError::StageIncomplete {
                    stage: Stage::Final,
                    requirements: vec![
                        "the essay is complete; restart to begin a new comparison".to_string(),
                    ],
                });
            }
        }
        info!(session_id = %self.id, stage = %self.stage, "advanced");
        Ok(self.stage)
    }

    /// Return to the previous stage. Cached analysis, feedback, and scores
    /// are kept; coming forward again will not recompute them.
    pub fn back(&mut self) -> Result<Stage> {
        match self.stage.prev() {
            Some(prev) => {
                self.stage = prev;
                info!(session_id = %self.id, stage = %self.stage, "went back");
                Ok(prev)
            }
            None => Err(WizardError::InvalidStage {
                operation: "back",
                stage: self.stage,
            }),
        }
    }

    /// Reset to a blank input stage. Always legal; only the id and the
    /// configuration survive.
    pub fn restart(&mut self) {
        info!(session_id = %self.id, "restarting");
        self.stage = Stage::Input;
        self.articles = None;
        self.analysis = None;
        self.draft = Self::empty_draft();
        self.essay_review = None;
        self.analysis_reflection.clear();
        self.feedback_reflection.clear();
        self.reflection_log.clear();
        self.competency = None;
        self.final_text = None;
    }

    /// Record the pending reflection for the current stage. Only the
    /// analysis and feedback stages collect reflections.
    pub fn set_reflection(&mut self, text: impl Into<String>) -> Result<()> {
        match self.stage {
            Stage::Analysis => {
                self.analysis_reflection = text.into();
                Ok(())
            }
            Stage::Feedback => {
                self.feedback_reflection = text.into();
                Ok(())
            }
            _ => Err(WizardError::InvalidStage {
                operation: "set_reflection",
                stage: self.stage,
            }),
        }
    }

    /// Replace one paragraph slot's text. Under the default configuration
    /// this drops the slot's cached feedback, since it no longer describes
    /// the current text.
    pub fn update_paragraph(&mut self, slot: ParagraphSlot, text: impl Into<String>) -> Result<()> {
        if self.stage != Stage::Draft {
            return Err(WizardError::InvalidStage {
                operation: "update_paragraph",
                stage: self.stage,
            });
        }
        let entry = self.draft.entry(slot).or_default();
        entry.text = text.into();
        if self.config.invalidate_paragraph_feedback_on_edit {
            entry.feedback = None;
        }
        Ok(())
    }

    /// Ask the collaborator for feedback on one slot, overwriting any prior
    /// result for that slot.
    pub async fn request_paragraph_feedback(
        &mut self,
        slot: ParagraphSlot,
        collaborator: &dyn Collaborator,
    ) -> Result<AiResult<ParagraphFeedback>> {
        if self.stage != Stage::Draft {
            return Err(WizardError::InvalidStage {
                operation: "request_paragraph_feedback",
                stage: self.stage,
            });
        }
        let text = self
            .draft
            .get(&slot)
            .map(|d| d.text.clone())
            .unwrap_or_default();
        if text.trim().is_empty() {
            return Err(WizardError::Validation(format!(
                "paragraph '{}' has no text to review",
                slot.id()
            )));
        }
        let context = self.analysis.as_ref().map(|analysis| {
            format!(
                "Article 1 summary: {}\nArticle 2 summary: {}",
                analysis.summaries[0].english, analysis.summaries[1].english
            )
        });
        let result = collaborator
            .paragraph_feedback(&text, slot.label(), context.as_deref())
            .await;
        if let Some(failure) = result.err() {
            warn!(session_id = %self.id, slot = slot.id(), error = %failure.error,
                "paragraph feedback degraded to error record");
        }
        self.draft.entry(slot).or_default().feedback = Some(result.clone());
        Ok(result)
    }

    /// Replace the final text. Only legal once the final stage is reached.
    pub fn set_final_text(&mut self, text: impl Into<String>) -> Result<()> {
        if self.stage != Stage::Final {
            return Err(WizardError::InvalidStage {
                operation: "set_final_text",
                stage: self.stage,
            });
        }
        self.final_text = Some(text.into());
        Ok(())
    }

    /// The full draft, projected from the five slots in fixed order with a
    /// section header per slot. Never stored; recomputed on every call.
    pub fn assembled_draft(&self) -> String {
        ParagraphSlot::ORDER
            .into_iter()
            .map(|slot| {
                let text = self
                    .draft
                    .get(&slot)
                    .map(|d| d.text.as_str())
                    .unwrap_or("");
                format!("[{}]\n{}", slot.label(), text)
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn log_reflection(&mut self, stage: Stage) {
        let text = match stage {
            Stage::Analysis => self.analysis_reflection.clone(),
            Stage::Feedback => self.feedback_reflection.clone(),
            _ => return,
        };
        self.reflection_log.push(ReflectionEntry {
            stage,
            text,
            timestamp: Utc::now(),
        });
    }

    /// Summaries, translations, and tone analyses for both articles, run at
    /// most once per session. The two articles are analyzed independently:
    /// a failure on one becomes that article's error record and never
    /// touches the other.
    async fn ensure_analysis(&mut self, collaborator: &dyn Collaborator) {
        if self.analysis.is_some() {
            return;
        }
        let Some(pair) = self.articles.clone() else {
            return;
        };
        info!(session_id = %self.id, "generating summaries and tone analyses");
        let (first_summary, first_tone) = analyze_article(collaborator, &pair.first).await;
        let (second_summary, second_tone) = analyze_article(collaborator, &pair.second).await;
        for tone in [&first_tone, &second_tone] {
            if let Some(failure) = tone.err() {
                warn!(session_id = %self.id, error = %failure.error,
                    "tone analysis degraded to error record");
            }
        }
        self.analysis = Some(AnalysisBundle {
            summaries: [first_summary, second_summary],
            tones: [first_tone, second_tone],
        });
    }

    async fn ensure_essay_review(&mut self, collaborator: &dyn Collaborator) {
        if self.essay_review.is_some() {
            return;
        }
        let essay = self.assembled_draft();
        info!(session_id = %self.id, "generating essay feedback and rubric");
        let narrative = collaborator.draft_feedback(&essay).await;
        let rubric = collaborator.evaluate_rubric(&essay).await;
        if let Some(failure) = rubric.err() {
            warn!(session_id = %self.id, error = %failure.error,
                "rubric evaluation degraded to error record");
        }
        self.essay_review = Some(EssayReview { narrative, rubric });
    }

    async fn ensure_competency(&mut self, collaborator: &dyn Collaborator) {
        if self.competency.is_some() {
            return;
        }
        let text = self.feedback_reflection.clone();
        self.competency = Some(collaborator::assess_reflection(collaborator, &text).await);
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

async fn analyze_article(
    collaborator: &dyn Collaborator,
    text: &str,
) -> (ArticleSummary, AiResult<ToneAnalysis>) {
    let english = collaborator.summarize(text).await;
    let korean = collaborator.translate(&english, "Korean").await;
    let tone = collaborator.analyze_tone(text).await;
    (ArticleSummary { english, korean }, tone)
}
