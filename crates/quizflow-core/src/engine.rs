//! Quiz flow orchestrator.
//!
//! Ties a [`QuizSession`] to a [`ParticipationTracker`]: the flag is
//! consulted on entry, set when the flow becomes complete, and cleared on
//! retake. Screen changes are returned to the host as [`HostRequest`]s.

use crate::model::{EvaluationResult, QuestionId, QuestionSet};
use crate::participation::ParticipationTracker;
use crate::session::{AdvanceOutcome, AdvancePolicy, QuizSession};

/// What the host should show when the user arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    /// Start the quiz.
    Quiz,
    /// The user already finished; offer a retake instead.
    AlreadyParticipated,
}

/// Abstract screen transition for the host to carry out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostRequest {
    Intro,
    Quiz,
}

/// A session plus its durable participation flag.
#[derive(Debug)]
pub struct QuizFlow {
    session: QuizSession,
    tracker: ParticipationTracker,
    complete: bool,
}

impl QuizFlow {
    pub fn new(session: QuizSession, tracker: ParticipationTracker) -> Self {
        let complete = session.is_complete();
        Self {
            session,
            tracker,
            complete,
        }
    }

    pub fn from_question_set(
        set: &QuestionSet,
        policy: AdvancePolicy,
        tracker: ParticipationTracker,
    ) -> Self {
        Self::new(QuizSession::from_question_set(set, policy), tracker)
    }

    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    pub fn tracker(&self) -> &ParticipationTracker {
        &self.tracker
    }

    pub fn has_participated(&self) -> bool {
        self.tracker.has_participated()
    }

    /// Decide what to show on arrival.
    pub fn enter(&self) -> Entry {
        if self.tracker.has_participated() {
            tracing::debug!("entry gated: already participated");
            Entry::AlreadyParticipated
        } else {
            Entry::Quiz
        }
    }

    /// Store an answer. Returns `true` when this answer completed the flow.
    pub fn answer(&mut self, id: QuestionId, value: impl Into<String>) -> bool {
        self.session.set_answer(id, value);
        self.update_completion()
    }

    /// Answer the current question. Returns `true` when this completed the flow.
    pub fn answer_current(&mut self, value: impl Into<String>) -> bool {
        self.session.answer_current(value);
        self.update_completion()
    }

    /// Choose an option (0-based) on the current question.
    ///
    /// Returns `None` when there is no such option, otherwise whether the
    /// choice completed the flow.
    pub fn choose_option(&mut self, index: usize) -> Option<bool> {
        if !self.session.choose_option(index) {
            return None;
        }
        Some(self.update_completion())
    }

    pub fn check(&mut self) -> Option<&EvaluationResult> {
        self.session.check()
    }

    pub fn advance(&mut self) -> AdvanceOutcome {
        self.session.advance()
    }

    pub fn retreat(&mut self) -> bool {
        self.session.retreat()
    }

    pub fn jump_to_start(&mut self) {
        self.session.jump_to_start();
    }

    /// Clear the session. The participation flag is left alone.
    pub fn reset(&mut self) {
        self.session.reset();
        self.complete = false;
    }

    /// Clear the participation flag and the session, then go to the quiz.
    pub fn retake(&mut self) -> HostRequest {
        self.tracker.reset();
        self.reset();
        tracing::info!("retake requested");
        HostRequest::Quiz
    }

    /// Leave the quiz for the intro screen.
    pub fn leave(&self) -> HostRequest {
        HostRequest::Intro
    }

    pub fn notices_mut(&mut self) -> &mut crate::notice::NoticeBoard {
        self.session.notices_mut()
    }

    fn update_completion(&mut self) -> bool {
        let now_complete = self.session.is_complete();
        let became_complete = now_complete && !self.complete;
        self.complete = now_complete;

        if became_complete {
            tracing::info!(
                questions = self.session.flow().len(),
                "all questions answered"
            );
            if !self.tracker.has_participated() {
                self.tracker.mark();
            }
        }
        became_complete
    }
}
