//! Question set error types.
//!
//! Malformed question data is an authoring-time problem. These errors are
//! raised once, when a question set is loaded, so nothing downstream has to
//! recover from them per keystroke.

use thiserror::Error;

use crate::model::QuestionId;

/// Authoring-time violations that make a question set unusable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionSetError {
    /// The set contains no questions at all.
    #[error("question set '{0}' has no questions")]
    Empty(String),

    /// A single-choice question without options.
    #[error("question {0}: choice question has no options")]
    NoOptions(QuestionId),

    /// `correct_answer` does not name one of the options.
    #[error("question {id}: correct answer '{answer}' is not one of the options")]
    UnknownCorrectAnswer { id: QuestionId, answer: String },

    /// Two questions share an id.
    #[error("duplicate question id: {0}")]
    DuplicateId(QuestionId),

    /// A flat question list entry without a category.
    #[error("question {0}: missing category in a flat question list")]
    MissingCategory(QuestionId),

    /// Both `sections` and `questions` were given.
    #[error("question set '{0}' mixes sections and flat questions")]
    MixedLayout(String),
}

impl QuestionSetError {
    /// The offending question, if the error is about one.
    pub fn question_id(&self) -> Option<&QuestionId> {
        match self {
            QuestionSetError::NoOptions(id)
            | QuestionSetError::DuplicateId(id)
            | QuestionSetError::MissingCategory(id) => Some(id),
            QuestionSetError::UnknownCorrectAnswer { id, .. } => Some(id),
            QuestionSetError::Empty(_) | QuestionSetError::MixedLayout(_) => None,
        }
    }
}
