// crates/quick-surveys-core/src/runtime/flow.rs
// ============================================================================
// Module: Quick Surveys Question Flow
// Description: Runtime walk over conditional internal survey questions.
// Purpose: Decide which questions to show given the answers so far.
// Dependencies: crate::core, rand
// ============================================================================

//! ## Overview
//! The factory guarantees that every dependency points at an earlier
//! question, so visibility can be computed in one forward pass. A question is
//! visible when every dependency names a visible, answered question whose
//! chosen labels intersect the allowed labels. A dependency without allowed
//! labels accepts any answer.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::core::Answer;
use crate::core::InternalQuestion;
use crate::core::InternalSurvey;

// ============================================================================
// SECTION: Answer Sheet
// ============================================================================

/// Answers chosen so far, keyed by question name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerSheet {
    /// Chosen labels per question.
    answers: BTreeMap<String, Vec<String>>,
}

impl AnswerSheet {
    /// Creates an empty sheet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the chosen labels of a question, replacing earlier choices.
    pub fn answer<I, S>(&mut self, question: &str, labels: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if labels.is_empty() {
            self.answers.remove(question);
        } else {
            self.answers.insert(question.to_string(), labels);
        }
    }

    /// Returns the chosen labels of a question.
    #[must_use]
    pub fn chosen(&self, question: &str) -> Option<&[String]> {
        self.answers.get(question).map(Vec::as_slice)
    }
}

// ============================================================================
// SECTION: Question Flow
// ============================================================================

/// Visibility view of an internal survey's questions.
#[derive(Debug, Clone, Copy)]
pub struct QuestionFlow<'a> {
    /// Questions in display order.
    questions: &'a [InternalQuestion],
}

impl<'a> QuestionFlow<'a> {
    /// Creates a flow over a survey's questions.
    #[must_use]
    pub fn new(survey: &'a InternalSurvey) -> Self {
        Self {
            questions: &survey.questions,
        }
    }

    /// Returns the visibility of every question in order.
    #[must_use]
    pub fn visibility(&self, sheet: &AnswerSheet) -> Vec<bool> {
        let mut visible: Vec<bool> = Vec::with_capacity(self.questions.len());
        for question in self.questions {
            let shown = question.depends_on.iter().all(|dependency| {
                let position =
                    self.questions.iter().position(|earlier| earlier.name == dependency.question);
                let parent_visible =
                    position.is_some_and(|index| visible.get(index).copied().unwrap_or(false));
                let Some(chosen) = sheet.chosen(&dependency.question) else {
                    return false;
                };
                parent_visible
                    && dependency
                        .answer_is_one_of
                        .as_ref()
                        .is_none_or(|allowed| chosen.iter().any(|label| allowed.contains(label)))
            });
            visible.push(shown);
        }
        visible
    }

    /// Returns true when the question at `index` is visible.
    #[must_use]
    pub fn is_visible(&self, index: usize, sheet: &AnswerSheet) -> bool {
        self.visibility(sheet).get(index).copied().unwrap_or(false)
    }

    /// Returns the first visible question strictly after `after`, or the first
    /// visible question when `after` is `None`.
    #[must_use]
    pub fn next_visible(&self, after: Option<usize>, sheet: &AnswerSheet) -> Option<usize> {
        let start = after.map_or(0, |index| index + 1);
        self.visibility(sheet)
            .into_iter()
            .enumerate()
            .skip(start)
            .find_map(|(index, shown)| shown.then_some(index))
    }

    /// Returns the visible questions in order.
    #[must_use]
    pub fn visible_questions(&self, sheet: &AnswerSheet) -> Vec<&'a InternalQuestion> {
        self.questions
            .iter()
            .zip(self.visibility(sheet))
            .filter_map(|(question, shown)| shown.then_some(question))
            .collect()
    }
}

// ============================================================================
// SECTION: Answer Display
// ============================================================================

/// Returns the answers of `question` in display order.
///
/// When shuffling is enabled, answers without a free-text field are shuffled
/// and free-text answers follow them in configured order.
pub fn display_answers<'a, R: Rng + ?Sized>(
    question: &'a InternalQuestion,
    rng: &mut R,
) -> Vec<&'a Answer> {
    if !question.shuffle_answers_display {
        return question.answers.iter().collect();
    }
    let (mut fixed, freeform): (Vec<&Answer>, Vec<&Answer>) =
        question.answers.iter().partition(|answer| answer.freeform_text_label.is_none());
    fixed.shuffle(rng);
    fixed.extend(freeform);
    fixed
}
