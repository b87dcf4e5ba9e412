//! Answer evaluation.
//!
//! Maps a question and a raw answer to a correct / partial / incorrect
//! verdict. Every input produces a result.

use crate::model::{EvaluationResult, Messages, Question, QuestionKind};

/// Evaluates answers using an author-defined message set.
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    messages: Messages,
}

impl Evaluator {
    pub fn new(messages: Messages) -> Self {
        Self { messages }
    }

    pub fn messages(&self) -> &Messages {
        &self.messages
    }

    /// Evaluate `answer` against `question`.
    ///
    /// - A blank answer (after trimming) is always incorrect, whatever the kind.
    /// - Single choice: correct only on an exact, case-sensitive match with the
    ///   correct option value. A question without a correct answer is never
    ///   correct.
    /// - Free text: each keyword must appear in the answer, case-insensitively.
    ///   All present is correct (including when there are no keywords), some
    ///   present is partial, none present is incorrect.
    pub fn evaluate(&self, question: &Question, answer: &str) -> EvaluationResult {
        if answer.trim().is_empty() {
            return EvaluationResult::incorrect(&self.messages.answer_required);
        }

        match &question.kind {
            QuestionKind::SingleChoice { correct_answer, .. } => {
                if correct_answer.as_deref() == Some(answer) {
                    EvaluationResult::correct(&self.messages.choice_correct)
                } else {
                    EvaluationResult::incorrect(&self.messages.choice_incorrect)
                }
            }
            QuestionKind::FreeText { keywords, .. } => self.evaluate_keywords(keywords, answer),
        }
    }

    fn evaluate_keywords(&self, keywords: &[String], answer: &str) -> EvaluationResult {
        let normalized = answer.to_lowercase();
        let (matched, missing): (Vec<&String>, Vec<&String>) = keywords
            .iter()
            .partition(|keyword| normalized.contains(&keyword.to_lowercase()));

        if missing.is_empty() {
            return EvaluationResult::correct(&self.messages.text_correct);
        }

        if !matched.is_empty() {
            let missing: Vec<String> = missing.into_iter().cloned().collect();
            let message = self
                .messages
                .text_partial
                .replace("{missing}", &missing.join(", "));
            return EvaluationResult::partial(message, missing);
        }

        EvaluationResult::incorrect(&self.messages.text_incorrect)
    }
}

/// Evaluate with the default message set.
pub fn evaluate(question: &Question, answer: &str) -> EvaluationResult {
    Evaluator::default().evaluate(question, answer)
}
