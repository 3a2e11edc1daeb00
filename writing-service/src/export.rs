//! Renders a completed (or in-progress) session as a plain-text document.
//! Pure formatting sink: every structured record's present fields are
//! rendered, and missing or degraded fields are labeled as such rather than
//! skipped.

use chrono::Utc;
use wizard_flow::{AiResult, Session, ToneAnalysis};

pub fn render_document(session: &Session) -> String {
    let mut doc = String::new();

    doc.push_str("News Comparison Analysis\n");
    doc.push_str("=========================\n");
    doc.push_str(&format!(
        "Generated: {}\n\n",
        Utc::now().format("%Y-%m-%d %H:%M UTC")
    ));

    doc.push_str("## Article Summaries\n\n");
    match &session.analysis {
        Some(analysis) => {
            for (index, summary) in analysis.summaries.iter().enumerate() {
                doc.push_str(&format!("### Article {}\n", index + 1));
                doc.push_str(&format!("English: {}\n", summary.english));
                doc.push_str(&format!("Korean: {}\n\n", summary.korean));
                render_tone(&mut doc, &analysis.tones[index]);
            }
        }
        None => doc.push_str("(not yet generated)\n\n"),
    }

    doc.push_str("## Essay\n\n");
    match &session.final_text {
        Some(text) => doc.push_str(&format!("{text}\n\n")),
        None => {
            doc.push_str(&session.assembled_draft());
            doc.push_str("\n\n");
        }
    }

    doc.push_str("## Writing Feedback\n\n");
    match &session.essay_review {
        Some(review) => {
            doc.push_str(&format!("{}\n\n", review.narrative));
            match &review.rubric {
                AiResult::Ok(rubric) => {
                    for (name, criterion) in [
                        ("Content", &rubric.content),
                        ("Organization", &rubric.organization),
                        ("Language", &rubric.language),
                    ] {
                        doc.push_str(&format!(
                            "- {name}: {}/4 — {}\n",
                            criterion.score, criterion.justification
                        ));
                    }
                    doc.push_str(&format!("Overall: {}\n\n", rubric.overall));
                }
                AiResult::Err(failure) => {
                    doc.push_str(&format!("Rubric unavailable: {}\n\n", failure.error));
                }
            }
        }
        None => doc.push_str("(not yet generated)\n\n"),
    }

    doc.push_str("## Problem-Solving Assessment\n\n");
    match &session.competency {
        Some(AiResult::Ok(assessment)) => {
            doc.push_str(&format!(
                "- Problem identification: {}/5\n- Analysis: {}/5\n- Solution building: {}/5\n- Reflection: {}/5\nOverall: {}\n\n",
                assessment.problem_identification,
                assessment.analysis,
                assessment.solution_building,
                assessment.reflection,
                assessment.overall
            ));
        }
        Some(AiResult::Err(failure)) => {
            doc.push_str(&format!("Assessment unavailable: {}\n\n", failure.error));
        }
        None => doc.push_str("(not yet generated)\n\n"),
    }

    doc.push_str("## Reflection Log\n\n");
    if session.reflection_log.is_empty() {
        doc.push_str("(no reflections recorded)\n");
    } else {
        for entry in &session.reflection_log {
            doc.push_str(&format!(
                "- [{}] {}: {}\n",
                entry.timestamp.format("%Y-%m-%d %H:%M UTC"),
                entry.stage,
                entry.text
            ));
        }
    }

    doc
}

fn render_tone(doc: &mut String, tone: &AiResult<ToneAnalysis>) {
    match tone {
        AiResult::Ok(tone) => {
            doc.push_str(&format!(
                "Tone: {:?} (score {}), credibility {}/10, objectivity {}/10\n",
                tone.classification, tone.score, tone.credibility_score, tone.objectivity_score
            ));
            for point in &tone.key_points {
                doc.push_str(&format!("  - {point}\n"));
            }
            if !tone.emotional_phrases.is_empty() {
                doc.push_str(&format!(
                    "  Emotional phrases: {}\n",
                    tone.emotional_phrases.join("; ")
                ));
            }
            doc.push('\n');
        }
        AiResult::Err(failure) => {
            doc.push_str(&format!("Tone analysis unavailable: {}\n\n", failure.error));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wizard_flow::{
        AnalysisBundle, ArticleSummary, EssayReview, ParseFailure, WritingRubric,
    };

    #[test]
    fn blank_session_labels_missing_sections() {
        let session = Session::new();
        let doc = render_document(&session);
        assert!(doc.contains("## Article Summaries"));
        assert!(doc.contains("(not yet generated)"));
        assert!(doc.contains("(no reflections recorded)"));
    }

    #[test]
    fn degraded_records_are_labeled_not_skipped() {
        let mut session = Session::new();
        session.analysis = Some(AnalysisBundle {
            summaries: [
                ArticleSummary {
                    english: "summary A".into(),
                    korean: "요약 A".into(),
                },
                ArticleSummary::default(),
            ],
            tones: [
                AiResult::Err(ParseFailure::new("invalid JSON", "gibberish")),
                AiResult::Ok(ToneAnalysis::default()),
            ],
        });
        session.essay_review = Some(EssayReview {
            narrative: "needs work".into(),
            rubric: AiResult::Ok(WritingRubric::default()),
        });

        let doc = render_document(&session);
        assert!(doc.contains("summary A"));
        assert!(doc.contains("Tone analysis unavailable: invalid JSON"));
        assert!(doc.contains("needs work"));
        assert!(doc.contains("- Content: 0/4"));
    }
}
