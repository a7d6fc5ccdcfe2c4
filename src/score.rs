use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
    exam::{AnswerKey, SubjectMap},
    types::QuestionDecision,
};

/// How many questions were answered correctly, overall and per subject.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    /// Percentage of the answer key's questions answered correctly.
    pub total_score: f32,
    pub correct: u32,
    /// Number of questions in the answer key.
    pub total_questions: u32,
    pub subject_scores: BTreeMap<String, u32>,
}

/// Scores decisions against the answer key. Every subject is listed, even
/// with no correct answers; questions outside every subject only count
/// toward the total.
pub fn score_decisions(
    decisions: &[QuestionDecision],
    answer_key: &AnswerKey,
    subjects: &SubjectMap,
) -> Score {
    let mut subject_scores = subjects
        .iter()
        .map(|subject| (subject.label.clone(), 0))
        .collect::<BTreeMap<String, u32>>();
    let mut correct = 0;

    for decision in decisions {
        let is_correct = match (answer_key.correct_option(decision.question), decision.selected) {
            (Some(expected), Some(selected)) => expected == selected,
            _ => false,
        };
        if !is_correct {
            continue;
        }

        correct += 1;
        if let Some(subject) = subjects.subject_for(decision.question) {
            *subject_scores.entry(subject.label.clone()).or_default() += 1;
        }
    }

    let total_questions = answer_key.len() as u32;
    let total_score = if total_questions == 0 {
        0.0
    } else {
        correct as f32 / total_questions as f32 * 100.0
    };

    Score {
        total_score,
        correct,
        total_questions,
        subject_scores,
    }
}
