//! quizflow-core: question model, flow building, answer evaluation and the
//! quiz session state machine.
//!
//! This crate defines the data model and the synchronous logic the hosts
//! build on. Persistence of the participation flag is injected through
//! [`participation::FlagStore`].

pub mod engine;
pub mod error;
pub mod evaluate;
pub mod flow;
pub mod model;
pub mod notice;
pub mod parser;
pub mod participation;
pub mod report;
pub mod session;

pub use engine::{Entry, HostRequest, QuizFlow};
pub use error::QuestionSetError;
pub use evaluate::Evaluator;
pub use flow::Flow;
pub use participation::{FlagStore, MemoryFlagStore, ParticipationTracker};
pub use session::{AdvanceOutcome, AdvancePolicy, QuizSession};
