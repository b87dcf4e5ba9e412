//! Navigation state machine for one quiz session.
//!
//! A session owns the current position in the flow, the live answer map and
//! any stored check results. Transitions are synchronous and never fail:
//! moving past either end is a no-op, and an empty flow simply has no
//! current question.
//!
//! Whether `advance` requires an answer is decided by [`AdvancePolicy`],
//! which every session is constructed with. The default is
//! [`AdvancePolicy::RequireAnswer`].

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::evaluate::Evaluator;
use crate::flow::Flow;
use crate::model::{AnswerMap, EvaluationResult, FlowItem, QuestionId, QuestionSet, Verdict};
use crate::notice::NoticeBoard;

/// When `advance` is allowed to move forward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdvancePolicy {
    /// The current question needs a non-empty (trimmed) answer.
    #[default]
    RequireAnswer,
    /// The current question needs a stored check result.
    RequireCheck,
    /// Advancing is never gated on answers.
    Unrestricted,
}

impl fmt::Display for AdvancePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdvancePolicy::RequireAnswer => write!(f, "require-answer"),
            AdvancePolicy::RequireCheck => write!(f, "require-check"),
            AdvancePolicy::Unrestricted => write!(f, "unrestricted"),
        }
    }
}

impl FromStr for AdvancePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "require-answer" | "answer" => Ok(AdvancePolicy::RequireAnswer),
            "require-check" | "check" => Ok(AdvancePolicy::RequireCheck),
            "unrestricted" | "free" => Ok(AdvancePolicy::Unrestricted),
            other => Err(format!("unknown advance policy: {other}")),
        }
    }
}

/// Why an advance was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    AnswerRequired,
    CheckRequired,
}

/// Result of [`QuizSession::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Moved to the given position.
    Moved(usize),
    /// Already on the last question (or the flow is empty).
    AtEnd,
    /// Rejected by the advance policy; a notice was raised.
    Blocked(BlockReason),
}

/// A "k/total" counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.current, self.total)
    }
}

/// The in-progress state of one quiz run.
#[derive(Debug, Clone)]
pub struct QuizSession {
    flow: Flow,
    evaluator: Evaluator,
    policy: AdvancePolicy,
    position: usize,
    answers: AnswerMap,
    results: HashMap<QuestionId, EvaluationResult>,
    notices: NoticeBoard,
}

impl QuizSession {
    pub fn new(flow: Flow, evaluator: Evaluator, policy: AdvancePolicy) -> Self {
        Self {
            flow,
            evaluator,
            policy,
            position: 0,
            answers: AnswerMap::new(),
            results: HashMap::new(),
            notices: NoticeBoard::default(),
        }
    }

    /// Build the flow once from a question set and start at the first question.
    pub fn from_question_set(set: &QuestionSet, policy: AdvancePolicy) -> Self {
        Self::new(
            Flow::from_question_set(set),
            Evaluator::new(set.messages.clone()),
            policy,
        )
    }

    /// Use a different notice auto-dismiss timeout.
    pub fn with_notice_ttl(mut self, ttl: Duration) -> Self {
        self.notices = NoticeBoard::new(ttl);
        self
    }

    pub fn flow(&self) -> &Flow {
        &self.flow
    }

    pub fn policy(&self) -> AdvancePolicy {
        self.policy
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    pub fn notices_mut(&mut self) -> &mut NoticeBoard {
        &mut self.notices
    }

    /// The question at the current position; `None` for an empty flow.
    pub fn current(&self) -> Option<&FlowItem> {
        self.flow.get(self.position)
    }

    pub fn is_first(&self) -> bool {
        self.position == 0
    }

    pub fn is_last(&self) -> bool {
        self.flow.last_position() == Some(self.position)
    }

    /// Store an answer, discarding any check result for that question.
    pub fn set_answer(&mut self, id: QuestionId, value: impl Into<String>) {
        let value = value.into();
        tracing::debug!(question = %id, len = value.len(), "answer updated");
        self.results.remove(&id);
        self.answers.set(id, value);
    }

    /// Answer the current question. Returns `false` when there is none.
    pub fn answer_current(&mut self, value: impl Into<String>) -> bool {
        let Some(id) = self.current().map(|item| item.id().clone()) else {
            return false;
        };
        self.set_answer(id, value);
        true
    }

    /// Select the option at `index` (0-based) on the current question.
    ///
    /// Returns `false` if the current question has no such option.
    pub fn choose_option(&mut self, index: usize) -> bool {
        let Some((id, value)) = self.current().and_then(|item| {
            item.question
                .options()
                .get(index)
                .map(|option| (item.id().clone(), option.value.clone()))
        }) else {
            return false;
        };
        self.set_answer(id, value);
        true
    }

    pub fn answer(&self, id: &QuestionId) -> Option<&str> {
        self.answers.get(id)
    }

    /// Evaluate the current answer and keep the result until the answer changes.
    pub fn check(&mut self) -> Option<&EvaluationResult> {
        let item = self.flow.get(self.position)?;
        let answer = self.answers.get(item.id()).unwrap_or_default();
        let result = self.evaluator.evaluate(&item.question, answer);
        tracing::debug!(question = %item.id(), verdict = %result.verdict, "answer checked");
        let id = item.id().clone();
        self.results.insert(id.clone(), result);
        self.results.get(&id)
    }

    /// Stored check result for a question.
    pub fn result(&self, id: &QuestionId) -> Option<&EvaluationResult> {
        self.results.get(id)
    }

    /// Evaluate a question's current answer without storing anything.
    pub fn evaluate(&self, id: &QuestionId) -> Option<EvaluationResult> {
        let item = self.flow.iter().find(|item| item.id() == id)?;
        let answer = self.answers.get(id).unwrap_or_default();
        Some(self.evaluator.evaluate(&item.question, answer))
    }

    /// Move to the next question, subject to the advance policy.
    pub fn advance(&mut self) -> AdvanceOutcome {
        let Some(item) = self.current() else {
            return AdvanceOutcome::AtEnd;
        };
        if self.is_last() {
            return AdvanceOutcome::AtEnd;
        }

        let blocked = match self.policy {
            AdvancePolicy::RequireAnswer if !self.answers.is_answered(item.id()) => {
                Some(BlockReason::AnswerRequired)
            }
            AdvancePolicy::RequireCheck if !self.results.contains_key(item.id()) => {
                Some(BlockReason::CheckRequired)
            }
            _ => None,
        };

        if let Some(reason) = blocked {
            let text = match reason {
                BlockReason::AnswerRequired => self.evaluator.messages().advance_blocked.clone(),
                BlockReason::CheckRequired => self.evaluator.messages().check_required.clone(),
            };
            tracing::debug!(position = self.position, ?reason, "advance blocked");
            self.notices.show(text);
            return AdvanceOutcome::Blocked(reason);
        }

        self.position += 1;
        tracing::debug!(position = self.position, "advanced");
        AdvanceOutcome::Moved(self.position)
    }

    /// Move to the previous question. Returns `false` at the first question.
    pub fn retreat(&mut self) -> bool {
        if self.position == 0 {
            return false;
        }
        self.position -= 1;
        tracing::debug!(position = self.position, "retreated");
        true
    }

    pub fn jump_to_start(&mut self) {
        self.position = 0;
    }

    /// Clear answers, results and notices and return to the first question.
    pub fn reset(&mut self) {
        self.answers.clear();
        self.results.clear();
        self.notices.clear();
        self.position = 0;
        tracing::debug!("session reset");
    }

    /// Number of flow questions with a non-empty answer.
    pub fn answered_count(&self) -> usize {
        self.flow
            .iter()
            .filter(|item| self.answers.is_answered(item.id()))
            .count()
    }

    /// Number of flow questions whose stored check result is correct.
    pub fn checked_correct_count(&self) -> usize {
        self.flow
            .iter()
            .filter(|item| {
                self.results
                    .get(item.id())
                    .is_some_and(|r| r.verdict == Verdict::Correct)
            })
            .count()
    }

    /// Every question in a non-empty flow has a non-empty answer.
    pub fn is_complete(&self) -> bool {
        !self.flow.is_empty() && self.answered_count() == self.flow.len()
    }

    /// Ordinal position within the current section.
    pub fn section_progress(&self) -> Option<Progress> {
        self.current().map(|item| Progress {
            current: item.order_in_section,
            total: item.total_in_section,
        })
    }

    /// Answered questions within the current section.
    pub fn section_answered(&self) -> Option<Progress> {
        let range = self.flow.section_range(self.position)?;
        let total = range.len();
        let current = self.flow.items()[range]
            .iter()
            .filter(|item| self.answers.is_answered(item.id()))
            .count();
        Some(Progress { current, total })
    }

    /// `(position + 1) / flow length`.
    pub fn overall_progress(&self) -> Option<Progress> {
        self.current().map(|_| Progress {
            current: self.position + 1,
            total: self.flow.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Question, Section};

    fn flow() -> Flow {
        let mut a = Section::new("a", "A");
        a.questions = vec![
            Question::single_choice(1, "pick", &["A", "B"], Some("A")),
            Question::free_text(2, "write", &["x"]),
        ];
        let mut b = Section::new("b", "B");
        b.questions = vec![Question::free_text(3, "more", &[])];
        Flow::from_sections(&[a, b])
    }

    fn session(policy: AdvancePolicy) -> QuizSession {
        QuizSession::new(flow(), Evaluator::default(), policy)
    }

    #[test]
    fn starts_at_first_question_with_no_answers() {
        let s = session(AdvancePolicy::default());
        assert_eq!(s.position(), 0);
        assert!(s.answers().is_empty());
        assert_eq!(s.current().unwrap().id(), &QuestionId::from(1));
        assert!(s.is_first());
        assert!(!s.is_last());
    }

    #[test]
    fn retreat_at_start_is_noop() {
        let mut s = session(AdvancePolicy::Unrestricted);
        assert!(!s.retreat());
        assert_eq!(s.position(), 0);
    }

    #[test]
    fn advance_at_end_is_noop() {
        let mut s = session(AdvancePolicy::Unrestricted);
        assert_eq!(s.advance(), AdvanceOutcome::Moved(1));
        assert_eq!(s.advance(), AdvanceOutcome::Moved(2));
        assert!(s.is_last());
        assert_eq!(s.advance(), AdvanceOutcome::AtEnd);
        assert_eq!(s.position(), 2);
    }

    #[test]
    fn require_answer_blocks_and_raises_notice() {
        let mut s = session(AdvancePolicy::RequireAnswer);
        assert_eq!(
            s.advance(),
            AdvanceOutcome::Blocked(BlockReason::AnswerRequired)
        );
        assert_eq!(s.position(), 0);
        assert_eq!(
            s.notices().current().unwrap().text,
            "답변을 입력해야 다음으로 이동할 수 있어요."
        );

        s.answer_current("   ");
        assert!(matches!(s.advance(), AdvanceOutcome::Blocked(_)));

        assert!(s.choose_option(1));
        assert_eq!(s.answer(&QuestionId::from(1)), Some("B"));
        assert_eq!(s.advance(), AdvanceOutcome::Moved(1));
    }

    #[test]
    fn require_check_needs_stored_result() {
        let mut s = session(AdvancePolicy::RequireCheck);
        s.answer_current("A");
        assert_eq!(
            s.advance(),
            AdvanceOutcome::Blocked(BlockReason::CheckRequired)
        );
        assert_eq!(s.check().unwrap().verdict, Verdict::Correct);
        assert_eq!(s.advance(), AdvanceOutcome::Moved(1));
    }

    #[test]
    fn unrestricted_never_blocks() {
        let mut s = session(AdvancePolicy::Unrestricted);
        assert_eq!(s.advance(), AdvanceOutcome::Moved(1));
        assert!(s.notices().current().is_none());
    }

    #[test]
    fn retreat_is_never_blocked() {
        let mut s = session(AdvancePolicy::RequireAnswer);
        s.answer_current("A");
        s.advance();
        assert!(s.retreat());
        assert_eq!(s.position(), 0);
    }

    #[test]
    fn changing_answer_clears_check_result() {
        let mut s = session(AdvancePolicy::default());
        s.answer_current("A");
        s.check();
        let id = QuestionId::from(1);
        assert!(s.result(&id).is_some());
        assert_eq!(s.checked_correct_count(), 1);

        s.set_answer(id.clone(), "B");
        assert!(s.result(&id).is_none());
        assert_eq!(s.checked_correct_count(), 0);
    }

    #[test]
    fn check_without_answer_is_incorrect() {
        let mut s = session(AdvancePolicy::default());
        let result = s.check().unwrap();
        assert_eq!(result.verdict, Verdict::Incorrect);
    }

    #[test]
    fn jump_to_start_keeps_answers() {
        let mut s = session(AdvancePolicy::Unrestricted);
        s.answer_current("A");
        s.advance();
        s.advance();
        s.jump_to_start();
        assert_eq!(s.position(), 0);
        assert_eq!(s.answer(&QuestionId::from(1)), Some("A"));
    }

    #[test]
    fn reset_clears_answers_and_position() {
        let mut s = session(AdvancePolicy::Unrestricted);
        s.answer_current("A");
        s.check();
        s.advance();
        s.reset();
        assert_eq!(s.position(), 0);
        assert!(s.answers().is_empty());
        assert!(s.result(&QuestionId::from(1)).is_none());
    }

    #[test]
    fn completion_requires_every_answer() {
        let mut s = session(AdvancePolicy::Unrestricted);
        s.set_answer(QuestionId::from(1), "A");
        s.set_answer(QuestionId::from(2), "x");
        assert!(!s.is_complete());
        s.set_answer(QuestionId::from(3), " ");
        assert!(!s.is_complete());
        s.set_answer(QuestionId::from(3), "done");
        assert!(s.is_complete());
        assert_eq!(s.answered_count(), 3);
    }

    #[test]
    fn progress_reporting() {
        let mut s = session(AdvancePolicy::Unrestricted);
        assert_eq!(s.overall_progress().unwrap().to_string(), "1/3");
        assert_eq!(s.section_progress().unwrap().to_string(), "1/2");
        assert_eq!(s.section_answered().unwrap().to_string(), "0/2");

        s.set_answer(QuestionId::from(2), "x");
        assert_eq!(s.section_answered().unwrap().to_string(), "1/2");

        s.advance();
        s.advance();
        assert_eq!(s.overall_progress().unwrap().to_string(), "3/3");
        assert_eq!(s.section_progress().unwrap().to_string(), "1/1");
        assert_eq!(s.section_answered().unwrap().to_string(), "0/1");
    }

    #[test]
    fn empty_flow_degrades_gracefully() {
        let mut s = QuizSession::new(Flow::default(), Evaluator::default(), AdvancePolicy::default());
        assert!(s.current().is_none());
        assert_eq!(s.advance(), AdvanceOutcome::AtEnd);
        assert!(!s.retreat());
        assert!(s.check().is_none());
        assert!(!s.answer_current("x"));
        assert!(!s.choose_option(0));
        assert!(!s.is_complete());
        assert!(s.overall_progress().is_none());
        assert!(s.section_answered().is_none());
    }

    #[test]
    fn choose_option_out_of_range() {
        let mut s = session(AdvancePolicy::default());
        assert!(!s.choose_option(5));
        assert!(s.answers().is_empty());
    }

    #[test]
    fn policy_parse_and_display() {
        assert_eq!("require-answer".parse::<AdvancePolicy>().unwrap(), AdvancePolicy::RequireAnswer);
        assert_eq!("CHECK".parse::<AdvancePolicy>().unwrap(), AdvancePolicy::RequireCheck);
        assert_eq!("free".parse::<AdvancePolicy>().unwrap(), AdvancePolicy::Unrestricted);
        assert!("sometimes".parse::<AdvancePolicy>().is_err());
        assert_eq!(AdvancePolicy::Unrestricted.to_string(), "unrestricted");
    }
}
