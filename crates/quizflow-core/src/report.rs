//! Session report types with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{EvaluationResult, QuestionId, QuestionSet, Verdict};
use crate::session::{AdvancePolicy, QuizSession};

/// Snapshot of one quiz session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Summary of the question set.
    pub question_set: QuestionSetSummary,
    pub policy: AdvancePolicy,
    /// One entry per flow item, in flow order.
    pub items: Vec<ItemReport>,
    pub totals: Totals,
}

/// Summary of a question set (without the questions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionSetSummary {
    pub id: String,
    pub name: String,
    pub question_count: usize,
}

/// Answer and evaluation for one question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemReport {
    pub question_id: QuestionId,
    pub section_title: String,
    pub prompt: String,
    pub kind: String,
    #[serde(default)]
    pub answer: Option<String>,
    /// Evaluation of the final answer; absent when unanswered.
    #[serde(default)]
    pub result: Option<EvaluationResult>,
    /// Whether the user checked this answer during the session.
    #[serde(default)]
    pub checked: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub total: usize,
    pub answered: usize,
    pub correct: usize,
    pub partial: usize,
    pub incorrect: usize,
    /// Correct answers among those checked during the session.
    pub checked_correct: usize,
    pub complete: bool,
}

impl SessionReport {
    /// Build a report from the current state of a session.
    pub fn from_session(set: &QuestionSet, session: &QuizSession) -> Self {
        let mut totals = Totals {
            total: session.flow().len(),
            answered: session.answered_count(),
            checked_correct: session.checked_correct_count(),
            complete: session.is_complete(),
            ..Totals::default()
        };

        let items = session
            .flow()
            .iter()
            .map(|item| {
                let id = item.id();
                let answered = session.answers().is_answered(id);
                let result = answered.then(|| session.evaluate(id)).flatten();
                match result.as_ref().map(|r| r.verdict) {
                    Some(Verdict::Correct) => totals.correct += 1,
                    Some(Verdict::Partial) => totals.partial += 1,
                    Some(Verdict::Incorrect) => totals.incorrect += 1,
                    None => {}
                }
                ItemReport {
                    question_id: id.clone(),
                    section_title: item.section_title.clone(),
                    prompt: item.question.prompt.clone(),
                    kind: item.question.kind_label().to_string(),
                    answer: session.answer(id).map(str::to_string),
                    result,
                    checked: session.result(id).is_some(),
                }
            })
            .collect();

        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            question_set: QuestionSetSummary {
                id: set.id.clone(),
                name: set.name.clone(),
                question_count: set.question_count(),
            },
            policy: session.policy(),
            items,
            totals,
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Save the report as a markdown table.
    pub fn save_markdown(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_markdown())
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Format the report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!("## {}\n\n", self.question_set.name));
        md.push_str(&format!(
            "**Summary:** {}/{} answered, {} correct, {} partial, {} incorrect\n\n",
            self.totals.answered,
            self.totals.total,
            self.totals.correct,
            self.totals.partial,
            self.totals.incorrect
        ));

        md.push_str("| # | Section | Question | Answer | Result |\n");
        md.push_str("|---|---------|----------|--------|--------|\n");
        for (index, item) in self.items.iter().enumerate() {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                index + 1,
                item.section_title,
                item.prompt,
                item.answer.as_deref().unwrap_or("-").replace('\n', " "),
                item.result
                    .as_ref()
                    .map(|r| r.verdict.heading())
                    .unwrap_or("-")
            ));
        }

        md
    }
}
