use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::parser::ParseFailure;

/// One step of the linear wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Input,
    Analysis,
    Draft,
    Feedback,
    Final,
}

impl Stage {
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Input => Some(Stage::Analysis),
            Stage::Analysis => Some(Stage::Draft),
            Stage::Draft => Some(Stage::Feedback),
            Stage::Feedback => Some(Stage::Final),
            Stage::Final => None,
        }
    }

    pub fn prev(self) -> Option<Stage> {
        match self {
            Stage::Input => None,
            Stage::Analysis => Some(Stage::Input),
            Stage::Draft => Some(Stage::Analysis),
            Stage::Feedback => Some(Stage::Draft),
            Stage::Final => Some(Stage::Feedback),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Input => "input",
            Stage::Analysis => "analysis",
            Stage::Draft => "draft",
            Stage::Feedback => "feedback",
            Stage::Final => "final",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the five fixed paragraph positions in the essay draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParagraphSlot {
    Intro,
    Body1,
    Body2,
    Compare,
    Conclusion,
}

impl ParagraphSlot {
    /// Fixed assembly order; the draft is always projected in this order
    /// regardless of the order the slots were filled in.
    pub const ORDER: [ParagraphSlot; 5] = [
        ParagraphSlot::Intro,
        ParagraphSlot::Body1,
        ParagraphSlot::Body2,
        ParagraphSlot::Compare,
        ParagraphSlot::Conclusion,
    ];

    pub fn id(self) -> &'static str {
        match self {
            ParagraphSlot::Intro => "intro",
            ParagraphSlot::Body1 => "body1",
            ParagraphSlot::Body2 => "body2",
            ParagraphSlot::Compare => "compare",
            ParagraphSlot::Conclusion => "conclusion",
        }
    }

    /// Section header used when assembling the draft and when asking the
    /// model for slot-specific feedback.
    pub fn label(self) -> &'static str {
        match self {
            ParagraphSlot::Intro => "Introduction",
            ParagraphSlot::Body1 => "Article 1 Analysis",
            ParagraphSlot::Body2 => "Article 2 Analysis",
            ParagraphSlot::Compare => "Comparison",
            ParagraphSlot::Conclusion => "Conclusion",
        }
    }

    pub fn from_id(id: &str) -> Option<ParagraphSlot> {
        Self::ORDER.into_iter().find(|slot| slot.id() == id)
    }
}

/// Outcome of a structured collaborator call. Exactly one shape is present;
/// callers must branch rather than assume success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum AiResult<T> {
    Ok(T),
    Err(ParseFailure),
}

impl<T> AiResult<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, AiResult::Ok(_))
    }

    pub fn ok(&self) -> Option<&T> {
        match self {
            AiResult::Ok(value) => Some(value),
            AiResult::Err(_) => None,
        }
    }

    pub fn err(&self) -> Option<&ParseFailure> {
        match self {
            AiResult::Ok(_) => None,
            AiResult::Err(failure) => Some(failure),
        }
    }
}

/// The two raw article texts, captured during the input stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticlePair {
    pub first: String,
    pub second: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Positive,
    #[default]
    Neutral,
    Negative,
}

/// Structured tone analysis of one article. All fields default so a model
/// response with missing keys degrades instead of failing to decode.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToneAnalysis {
    pub classification: Tone,
    /// Overall tone score, -3 (strongly negative) to 3 (strongly positive).
    pub score: i32,
    /// Expected length 3.
    pub key_points: Vec<String>,
    /// 0 to 5 phrases carrying emotional weight.
    pub emotional_phrases: Vec<String>,
    /// 1 to 10.
    pub credibility_score: i32,
    /// 1 to 10.
    pub objectivity_score: i32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ArticleSummary {
    pub english: String,
    pub korean: String,
}

/// Everything derived from the two articles when entering the analysis
/// stage. The surrounding `Option` on the session is the compute-once flag
/// for the whole batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisBundle {
    pub summaries: [ArticleSummary; 2],
    pub tones: [AiResult<ToneAnalysis>; 2],
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParagraphFeedback {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub suggestion: String,
    /// 1 to 4.
    pub recommended_score: i32,
}

/// Text and cached feedback for one paragraph slot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParagraphDraft {
    pub text: String,
    pub feedback: Option<AiResult<ParagraphFeedback>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CriterionScore {
    /// 1 to 4.
    pub score: i32,
    pub justification: String,
}

/// Rubric evaluation of the assembled essay, three named criteria.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WritingRubric {
    pub content: CriterionScore,
    pub organization: CriterionScore,
    pub language: CriterionScore,
    pub overall: String,
}

/// Narrative critique plus rubric, produced once on leaving the draft stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EssayReview {
    pub narrative: String,
    pub rubric: AiResult<WritingRubric>,
}

/// Problem-solving competency assessment over the user's reflection,
/// four named competencies scored 1 to 5.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompetencyAssessment {
    pub problem_identification: i32,
    pub analysis: i32,
    pub solution_building: i32,
    pub reflection: i32,
    pub overall: String,
}

impl CompetencyAssessment {
    pub const INSUFFICIENT_INPUT: &'static str =
        "Reflection too short to assess. Write a few sentences about what you learned.";

    /// Canned record returned when the reflection is too short to send to
    /// the model at all.
    pub fn insufficient_input() -> Self {
        Self {
            problem_identification: 1,
            analysis: 1,
            solution_building: 1,
            reflection: 1,
            overall: Self::INSUFFICIENT_INPUT.to_string(),
        }
    }
}

/// Append-only record of a reflection submitted while advancing out of a
/// reflection-bearing stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReflectionEntry {
    pub stage: Stage,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}
